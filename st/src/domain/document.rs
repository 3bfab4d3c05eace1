//! Document Reference
//!
//! An uploaded document held entirely in memory as a data URL. Immutable once
//! created; a new upload replaces it wholesale.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use thiserror::Error;
use tracing::debug;

/// File extensions accepted by the local file input, with their media types
pub const ACCEPTED_TYPES: [(&str, &str); 7] = [
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
];

/// Errors at the local file input boundary
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type '{0}'. Supports: PDF, PNG, JPG, WEBP, TXT, MD")]
    UnsupportedType(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Look up the declared media type for a file extension
pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, media_type)| *media_type)
}

/// An uploaded document: encoded content, declared media type, original name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    data_url: String,
    name: String,
    media_type: String,
}

impl DocumentRef {
    /// Wrap an already-encoded data URL
    ///
    /// No validation happens here; a malformed payload is rejected later by the
    /// generation client before anything goes over the network.
    pub fn new(data_url: impl Into<String>, name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
            name: name.into(),
            media_type: media_type.into(),
        }
    }

    /// Encode raw bytes into a data URL document
    pub fn from_bytes(bytes: &[u8], name: impl Into<String>, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        debug!(len = bytes.len(), %media_type, "DocumentRef::from_bytes: called");
        let data_url = format!("data:{};base64,{}", media_type, BASE64_STANDARD.encode(bytes));
        Self {
            data_url,
            name: name.into(),
            media_type,
        }
    }

    /// Read a file from disk, constrained to the accepted media types
    pub async fn from_path(path: &Path) -> Result<Self, DocumentError> {
        debug!(?path, "DocumentRef::from_path: called");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let media_type = media_type_for_extension(ext).ok_or_else(|| DocumentError::UnsupportedType(ext.to_string()))?;

        let bytes = tokio::fs::read(path).await.map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::from_bytes(&bytes, name, media_type))
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}
