//! Study tutor configuration types and loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Settings;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Generation service configuration
    pub llm: LlmConfig,

    /// Session behavior and form defaults
    pub tutor: TutorConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Fails fast when no API key can be resolved for the configured provider.
    pub fn validate(&self) -> Result<()> {
        debug!(provider = %self.llm.provider, "Config::validate: called");
        self.llm.get_api_key().map(|_| ())
    }

    /// Load configuration with fallback chain
    ///
    /// 1. explicit path (errors propagate)
    /// 2. `./.studytutor.yml`
    /// 3. `<config dir>/studytutor/studytutor.yml`
    /// 4. defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::implicit_paths() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only `log-level`, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        #[derive(Deserialize)]
        struct LogLevelOnly {
            #[serde(rename = "log-level")]
            log_level: Option<String>,
        }

        let read = |path: &Path| -> Option<String> {
            let content = fs::read_to_string(path).ok()?;
            serde_yaml::from_str::<LogLevelOnly>(&content).ok()?.log_level
        };

        match config_path {
            Some(path) => read(path),
            None => Self::implicit_paths().iter().filter(|p| p.exists()).find_map(|p| read(p)),
        }
    }

    fn implicit_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".studytutor.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("studytutor").join("studytutor.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generation service provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Anthropic,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-flash",
            Provider::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Generation service configuration
///
/// Unset model, key variable and base URL fall back to the provider's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,

    /// Model identifier
    pub model: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: Option<String>,

    /// File containing the API key, used when the variable is unset
    #[serde(rename = "api-key-file")]
    pub api_key_file: Option<PathBuf>,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: Option<u32>,

    /// HTTP client timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: Option<u64>,
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.provider.default_model())
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(self.provider.default_api_key_env())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(self.provider.default_base_url())
            .trim_end_matches('/')
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(8192)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(120_000))
    }

    /// Resolve the API key: environment variable first, then the key file
    pub fn get_api_key(&self) -> Result<String> {
        let env_name = self.api_key_env();
        debug!(%env_name, "LlmConfig::get_api_key: called");

        if let Ok(key) = std::env::var(env_name)
            && !key.trim().is_empty()
        {
            return Ok(key.trim().to_string());
        }

        if let Some(path) = &self.api_key_file {
            let key = fs::read_to_string(path).context(format!("Failed to read API key file {}", path.display()))?;
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
            return Err(eyre!("API key file {} is empty", path.display()));
        }

        Err(eyre!(
            "LLM API key not found. Set the {} environment variable or configure llm.api-key-file.",
            env_name
        ))
    }
}

/// Session behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Upper bound on a single generation round trip, in milliseconds
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Directory of `<name>.pmt` prompt overrides
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<PathBuf>,

    /// Pre-selected values in the personalization form
    pub defaults: Settings,
}

impl TutorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 180_000,
            prompts_dir: None,
            defaults: Settings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Goal, Tone};
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, Provider::Gemini);
        assert_eq!(config.llm.model(), "gemini-2.5-flash");
        assert_eq!(config.llm.api_key_env(), "GEMINI_API_KEY");
        assert_eq!(config.llm.base_url(), "https://generativelanguage.googleapis.com");
        assert_eq!(config.llm.max_tokens(), 8192);
        assert_eq!(config.tutor.request_timeout_ms, 180_000);
        assert_eq!(config.tutor.defaults, Settings::default());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
llm:
  provider: anthropic
  api-key-env: MY_KEY
  max-tokens: 4096
  timeout-ms: 60000
tutor:
  request-timeout-ms: 90000
  prompts-dir: /tmp/prompts
  defaults:
    language: Spanish
    tone: Encouraging
    goal: Exam Prep
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.provider, Provider::Anthropic);
        assert_eq!(config.llm.model(), "claude-sonnet-4-20250514");
        assert_eq!(config.llm.base_url(), "https://api.anthropic.com");
        assert_eq!(config.llm.api_key_env(), "MY_KEY");
        assert_eq!(config.llm.max_tokens(), 4096);
        assert_eq!(config.llm.timeout(), Duration::from_secs(60));
        assert_eq!(config.tutor.request_timeout(), Duration::from_secs(90));
        assert_eq!(config.tutor.prompts_dir, Some(PathBuf::from("/tmp/prompts")));
        assert_eq!(config.tutor.defaults.language, "Spanish");
        assert_eq!(config.tutor.defaults.tone, Tone::Encouraging);
        assert_eq!(config.tutor.defaults.goal, Goal::ExamPrep);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("llm:\n  model: gemini-2.5-pro\n").unwrap();
        assert_eq!(config.llm.model(), "gemini-2.5-pro");
        assert_eq!(config.llm.provider, Provider::Gemini);
        assert_eq!(config.tutor.request_timeout_ms, 180_000);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = LlmConfig {
            base_url: Some("http://localhost:8080/".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let missing = PathBuf::from("/nonexistent/studytutor.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_log_level_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("studytutor.yml");
        fs::write(&path, "log-level: trace\nllm:\n  provider: gemini\n").unwrap();
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("trace"));

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("trace"));
    }

    #[test]
    #[serial]
    fn test_api_key_from_env() {
        let config = LlmConfig {
            api_key_env: Some("STUDYTUTOR_TEST_KEY_ENV".to_string()),
            ..LlmConfig::default()
        };
        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::set_var("STUDYTUTOR_TEST_KEY_ENV", " secret-key \n") };
        assert_eq!(config.get_api_key().unwrap(), "secret-key");
        unsafe { std::env::remove_var("STUDYTUTOR_TEST_KEY_ENV") };
    }

    #[test]
    #[serial]
    fn test_api_key_falls_back_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let key_path = dir.path().join("key");
        fs::write(&key_path, "file-key\n").unwrap();

        let config = LlmConfig {
            api_key_env: Some("STUDYTUTOR_TEST_KEY_UNSET".to_string()),
            api_key_file: Some(key_path),
            ..LlmConfig::default()
        };
        unsafe { std::env::remove_var("STUDYTUTOR_TEST_KEY_UNSET") };
        assert_eq!(config.get_api_key().unwrap(), "file-key");
    }

    #[test]
    #[serial]
    fn test_validate_without_key_fails() {
        let mut config = Config::default();
        config.llm.api_key_env = Some("STUDYTUTOR_TEST_KEY_MISSING".to_string());
        unsafe { std::env::remove_var("STUDYTUTOR_TEST_KEY_MISSING") };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("STUDYTUTOR_TEST_KEY_MISSING"));
    }
}
