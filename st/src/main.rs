//! StudyTutor - document-driven study tutor
//!
//! CLI entry point: the interactive tutor, headless plan generation and the
//! markdown renderer.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::{debug, info};

use studytutor::cli::{Cli, Command, OutputFormat, generate_after_help};
use studytutor::config::Config;
use studytutor::domain::{DocumentRef, Goal, Level, Settings, Tone, TopicDraft};
use studytutor::generation::{GenerationClient, GenerationService};
use studytutor::llm::create_client;
use studytutor::markdown::{Dialect, OutlineRenderer, parse, render_terminal};
use studytutor::prompts::PromptComposer;
use studytutor::session::{EffectRunner, SessionDriver};
use studytutor::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studytutor")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("studytutor.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // after_help shows the API key status and log location
    let cmd = Cli::command().after_help(generate_after_help(None));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.llm.model(), "StudyTutor loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Study { file }) => cmd_study(&config, file).await,
        Some(Command::Plan {
            file,
            language,
            level,
            tone,
            goal,
            format,
        }) => {
            let settings = plan_settings(&config.tutor.defaults, language, level, tone, goal);
            cmd_plan(&config, &file, settings, format).await
        }
        Some(Command::Render { file, dialect }) => cmd_render(&file, dialect),
        None => {
            Cli::command().after_help(generate_after_help(cli.config.as_ref())).print_help()?;
            Ok(())
        }
    }
}

/// Build the generation service for the configured provider
fn generation_service(config: &Config) -> Result<Arc<dyn GenerationService>> {
    config.validate()?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let composer = PromptComposer::new(config.tutor.prompts_dir.as_deref())?;
    Ok(Arc::new(GenerationClient::new(llm, Arc::new(composer), config.llm.max_tokens())))
}

async fn cmd_study(config: &Config, file: Option<PathBuf>) -> Result<()> {
    debug!(?file, "cmd_study: called");
    let service = generation_service(config)?;
    let driver = SessionDriver::new(EffectRunner::new(service, config.tutor.request_timeout()));
    tui::run(driver, config.tutor.defaults.clone(), file).await
}

/// Command-line choices override the configured form defaults
fn plan_settings(
    defaults: &Settings,
    language: Option<String>,
    level: Option<Level>,
    tone: Option<Tone>,
    goal: Option<Goal>,
) -> Settings {
    Settings {
        language: language.unwrap_or_else(|| defaults.language.clone()),
        level: level.unwrap_or(defaults.level),
        tone: tone.unwrap_or(defaults.tone),
        goal: goal.unwrap_or(defaults.goal),
    }
}

/// Plan topics in the plan dialect, one section per topic
fn plan_markdown(topics: &[TopicDraft]) -> String {
    topics
        .iter()
        .enumerate()
        .map(|(i, t)| format!("### {}. {}\n{}\n---", i + 1, t.title, t.objective))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn cmd_plan(config: &Config, file: &Path, settings: Settings, format: OutputFormat) -> Result<()> {
    debug!(?file, ?settings, %format, "cmd_plan: called");
    let document = DocumentRef::from_path(file).await?;
    let service = generation_service(config)?;

    let topics = service
        .generate_plan(&document, &settings)
        .await
        .context(format!("Failed to generate a study plan for {}", file.display()))?;
    info!(topics = topics.len(), "cmd_plan: plan generated");

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "document": document.name(),
                "settings": settings,
                "topics": topics,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            let blocks = parse(&plan_markdown(&topics), Dialect::Plan);
            println!("{}", render_terminal(&blocks, &OutlineRenderer));
        }
    }
    Ok(())
}

fn cmd_render(file: &Path, dialect: Dialect) -> Result<()> {
    debug!(?file, ?dialect, "cmd_render: called");
    let source = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let blocks = parse(&source, dialect);
    println!("{}", render_terminal(&blocks, &OutlineRenderer));
    Ok(())
}
