use mailprep::cli::{Cli, Commands, ConfigAction};
use mailprep::config::Config;
use mailprep::error::{MailprepError, Result};
use mailprep::patterns::BUILTIN_PATTERNS;
use mailprep::preprocess::{EmailPreprocessor, PreprocessingResult};
use mailprep::prompt::DraftRequest;
use mailprep::summarizer::StatisticalSummarizer;
use mailprep::tokenizer::TiktokenCounter;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Process {
            file,
            json,
            classification,
            prompt,
        } => {
            cmd_process(cli.config, file, json, classification, prompt)?;
        }
        Commands::Restore { result, file } => {
            cmd_restore(&result, file)?;
        }
        Commands::Summarize { file, max_tokens } => {
            cmd_summarize(cli.config, file, max_tokens)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose {
        "mailprep=debug"
    } else {
        "mailprep=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries results, keep logs on stderr
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `process` output: the result fields plus an optional draft request
#[derive(Serialize)]
struct ProcessOutput<'a> {
    #[serde(flatten)]
    result: &'a PreprocessingResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    draft: Option<DraftRequest>,
}

fn cmd_process(
    config_path: Option<PathBuf>,
    file: Option<PathBuf>,
    json: bool,
    classification: Option<String>,
    prompt: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let preprocessor = EmailPreprocessor::new(&config)?;

    let body = read_input(file.as_deref())?;
    let result = preprocessor.process_email_for_llm(&body);

    let draft =
        prompt.then(|| preprocessor.build_draft_request(&result, classification.as_deref()));

    if json {
        let output = ProcessOutput {
            result: &result,
            draft,
        };
        let json = serde_json::to_string_pretty(&output).map_err(|e| MailprepError::Json {
            source: e,
            context: "Failed to serialize preprocessing result".to_string(),
        })?;
        println!("{}", json);
        return Ok(());
    }

    println!("Thread detected:      {}", result.has_thread);
    println!("Summary applied:      {}", result.thread_summary_applied);
    println!(
        "Tokens:               {} -> {}",
        result.initial_token_count, result.final_llm_input_token_count
    );
    match result.language_confidence {
        Some(confidence) => println!(
            "Language:             {} ({:.2})",
            result.detected_language, confidence
        ),
        None => println!("Language:             {} (fallback)", result.detected_language),
    }
    println!("Placeholders:         {}", result.placeholders.len());
    if result.input_truncated {
        println!("Input truncated:      yes");
    }
    println!();
    println!("{}", result.final_text);

    if let Some(draft) = draft {
        println!();
        println!(
            "--- Draft prompt ({} tokens, {} for generation) ---",
            draft.prompt_tokens, draft.max_tokens_to_generate
        );
        println!("{}", draft.prompt);
    }

    Ok(())
}

fn cmd_restore(result_path: &Path, file: Option<PathBuf>) -> Result<()> {
    let content = std::fs::read_to_string(result_path).map_err(|e| MailprepError::Io {
        source: e,
        context: format!("Failed to read result file: {:?}", result_path),
    })?;
    let result: PreprocessingResult =
        serde_json::from_str(&content).map_err(|e| MailprepError::Json {
            source: e,
            context: format!("Failed to parse result file: {:?}", result_path),
        })?;

    let generated = read_input(file.as_deref())?;
    tracing::debug!(
        "Restoring with {} placeholder(s)",
        result.placeholders.reverse.len()
    );

    print!("{}", result.restore(&generated));

    Ok(())
}

fn cmd_summarize(
    config_path: Option<PathBuf>,
    file: Option<PathBuf>,
    max_tokens: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let counter = Arc::new(TiktokenCounter::for_model(&config.tokenizer.model)?);
    let summarizer = StatisticalSummarizer::from_config(&config.summarizer, counter)?;

    let text = read_input(file.as_deref())?;
    let budget = max_tokens.unwrap_or(config.limits.max_summary_tokens);
    let summary = summarizer.summarize_detailed(&text, budget);

    tracing::info!(
        "Kept {} of {} sentences (budget {} tokens)",
        summary.selected.len(),
        summary.sentence_count,
        budget
    );

    println!("{}", summary.text);

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| MailprepError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;

            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Tokenizer model: {}", config.tokenizer.model);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            let config_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));

            std::fs::create_dir_all(&config_dir).map_err(|e| MailprepError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", config_dir),
            })?;

            // Save default config
            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());

            let patterns_path = config_dir.join("patterns.toml");
            if force || !patterns_path.exists() {
                std::fs::write(&patterns_path, BUILTIN_PATTERNS).map_err(|e| MailprepError::Io {
                    source: e,
                    context: format!("Failed to write pattern file: {:?}", patterns_path),
                })?;
                println!("✓ Pattern tables written to: {}", patterns_path.display());
                println!(
                    "  Set [patterns] file = \"{}\" to use an edited copy",
                    patterns_path.display()
                );
            }
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = config_path {
        return Config::load(&path);
    }

    let path = Config::default_path()?;
    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'mailprep config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        return Ok(config);
    }

    Config::load(&path)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| MailprepError::Io {
            source: e,
            context: format!("Failed to read input file: {:?}", path),
        }),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| MailprepError::Io {
                    source: e,
                    context: "Failed to read stdin".to_string(),
                })?;
            Ok(buffer)
        }
    }
}
