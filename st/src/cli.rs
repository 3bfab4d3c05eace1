//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;
use crate::domain::{Goal, Level, Tone};
use crate::markdown::Dialect;

/// StudyTutor - document-driven study tutor
#[derive(Parser)]
#[command(
    name = "st",
    about = "Turn a document into a personalized study plan and learn it topic by topic",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive tutor
    Study {
        /// Document to load straight away (txt, md, pdf, png, jpg, webp)
        file: Option<PathBuf>,
    },

    /// Generate a study plan for a document without opening the tutor
    Plan {
        /// Document to analyze
        file: PathBuf,

        /// Teaching language
        #[arg(long)]
        language: Option<String>,

        /// Proficiency level (Beginner, Intermediate, Advanced)
        #[arg(long)]
        level: Option<Level>,

        /// Tone (Strict, Friendly, "Fast & Focused", Encouraging)
        #[arg(long)]
        tone: Option<Tone>,

        /// Goal ("Exam Prep", "Deep Understanding", "Study Notes", "Quick Revision")
        #[arg(long)]
        goal: Option<Goal>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Render a markdown file in the tutor's markdown dialect
    Render {
        /// Markdown file to render
        file: PathBuf,

        /// Dialect (chat, plan)
        #[arg(short, long, default_value = "chat")]
        dialect: Dialect,
    },
}

/// Whether the API key for the configured provider can be resolved
pub struct KeyCheck {
    pub provider: String,
    pub env_name: String,
    pub available: bool,
}

impl KeyCheck {
    pub fn check(config: &Config) -> Self {
        debug!(provider = %config.llm.provider, "KeyCheck::check: called");
        Self {
            provider: config.llm.provider.to_string(),
            env_name: config.llm.api_key_env().to_string(),
            available: config.llm.get_api_key().is_ok(),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studytutor")
        .join("logs")
        .join("studytutor.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with the API key status and log location
pub fn generate_after_help(config_path: Option<&PathBuf>) -> String {
    debug!("generate_after_help: called");
    let config = Config::load(config_path).unwrap_or_default();
    let key = KeyCheck::check(&config);
    let log_path = get_log_path();

    let mut help = String::new();

    help.push_str(&format!("{}\n", "Generation Service:".bold()));
    let icon = if key.available {
        debug!("generate_after_help: api key available");
        "\u{2705}"
    } else {
        debug!("generate_after_help: api key missing");
        "\u{274C}"
    };
    let status = if key.available {
        "key found".green()
    } else {
        "key missing".red()
    };
    help.push_str(&format!(
        "  {} {:<10} {} ({})\n",
        icon,
        key.provider,
        status,
        key.env_name
    ));
    help.push_str(&format!("  model: {}\n", config.llm.model()));

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", log_path.display()));

    debug!("generate_after_help: returning help text");
    help
}

/// Output format for the plan command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["st"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_study_without_file() {
        let cli = Cli::parse_from(["st", "study"]);
        assert!(matches!(cli.command, Some(Command::Study { file: None })));
    }

    #[test]
    fn test_cli_parse_plan_with_settings() {
        let cli = Cli::parse_from([
            "st",
            "plan",
            "notes.pdf",
            "--language",
            "Spanish",
            "--tone",
            "Fast & Focused",
            "--goal",
            "exam prep",
            "--format",
            "json",
        ]);
        if let Some(Command::Plan {
            file,
            language,
            level,
            tone,
            goal,
            format,
        }) = cli.command
        {
            assert_eq!(file, PathBuf::from("notes.pdf"));
            assert_eq!(language.as_deref(), Some("Spanish"));
            assert!(level.is_none());
            assert_eq!(tone, Some(Tone::FastAndFocused));
            assert_eq!(goal, Some(Goal::ExamPrep));
            assert_eq!(format, OutputFormat::Json);
        } else {
            panic!("Expected Plan command");
        }
    }

    #[test]
    fn test_cli_parse_plan_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["st", "plan", "notes.pdf", "--level", "Expert"]).is_err());
    }

    #[test]
    fn test_cli_parse_render_dialect() {
        let cli = Cli::parse_from(["st", "render", "plan.md", "--dialect", "plan"]);
        assert!(matches!(
            cli.command,
            Some(Command::Render {
                dialect: Dialect::Plan,
                ..
            })
        ));
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["st", "-c", "/path/to/config.yml", "render", "x.md"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
    }
}
