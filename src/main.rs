// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use textmill::app_config::{self, Config};
use textmill::app_controller::{Controller, RunOptions};
use textmill::language_utils;
use textmill::storage::MemoryStore;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate files or directories of files
    Translate(TranslateArgs),

    /// Show file details and the beginning of its content
    Preview {
        /// File to preview
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of characters to show
        #[arg(long)]
        length: Option<usize>,
    },

    /// Guess the language of a file
    Detect {
        /// File to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the selectable languages
    Languages,

    /// Show recent translations
    History {
        /// Remove every history entry
        #[arg(long)]
        clear: bool,
    },

    /// Manage the translation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Generate shell completions for textmill
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Remove every cached translation
    Clear,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Files or directories to translate
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Source language code (e.g., 'en', 'es', 'auto')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Directory the translated files are written to
    #[arg(short, long, value_name = "OUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum chunk length in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Write a single bundled file instead of one file per input
    #[arg(long)]
    bundle: bool,

    /// Keep the cache and history in memory only
    #[arg(long)]
    no_persist: bool,
}

/// textmill - chunked file translation through free web translation services
#[derive(Parser, Debug)]
#[command(name = "textmill")]
#[command(version)]
#[command(about = "Translate text, subtitle, CSV and JSON files")]
#[command(long_about = "textmill splits files into chunks, translates each chunk through a chain of web translation services and reassembles the result in the original format.

EXAMPLES:
    textmill translate notes.txt                     # Translate using default config
    textmill translate -s en -t fr movie.srt         # Translate from English to French
    textmill translate -o out/ --bundle docs/        # Translate a directory into one file
    textmill preview data.csv --length 100           # Show the first 100 characters
    textmill detect notes.txt                        # Guess the language of a file
    textmill history --clear                         # Forget recent translations
    textmill completions bash > textmill.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; the max level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "textmill", &mut std::io::stdout());
        return Ok(());
    }

    if let Commands::Languages = &cli.command {
        for (code, name) in language_utils::supported_languages() {
            println!("{:<6} {}", code, name);
        }
        return Ok(());
    }

    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Translate(args) => run_translate(&mut config, args).await,
        Commands::Preview { file, length } => {
            let controller = Controller::with_store(config, Arc::new(MemoryStore::new()));
            let preview = controller.preview(&file, length)?;
            println!("Name:     {}", preview.name);
            println!("Size:     {}", preview.size);
            println!("Type:     {}", preview.file_type);
            println!("Chunks:   {}", preview.chunk_count);
            println!("Language: {}", language_label(&preview.detected_language));
            println!();
            println!("{}", preview.preview);
            Ok(())
        }
        Commands::Detect { file } => {
            let controller = Controller::with_store(config, Arc::new(MemoryStore::new()));
            let code = controller.detect(&file)?;
            println!("{}", language_label(&code));
            Ok(())
        }
        Commands::History { clear } => {
            let controller = Controller::with_config(config)?;
            if clear {
                controller.clear_history();
                info!("Translation history cleared");
                return Ok(());
            }

            let entries = controller.history();
            if entries.is_empty() {
                println!("No translations yet");
            }
            for entry in entries {
                println!(
                    "{}  {}  {} -> {}  {} chunk(s)  {}s  {}",
                    entry.timestamp,
                    entry.file_name,
                    entry.source_language,
                    entry.target_language,
                    entry.chunk_count,
                    entry.duration_secs,
                    textmill::session::format_file_size(entry.file_size)
                );
            }
            Ok(())
        }
        Commands::Cache { action: CacheAction::Clear } => {
            let controller = Controller::with_config(config)?;
            let removed = controller.clear_cache();
            info!("Removed {} cached translation(s)", removed);
            Ok(())
        }
        Commands::Languages | Commands::Completions { .. } => Ok(()),
    }
}

/// Load the config file and apply the global CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config)?;

    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

async fn run_translate(config: &mut Config, args: TranslateArgs) -> Result<()> {
    if let Some(source) = &args.source_language {
        config.source_language = language_utils::normalize_code(source)?;
    }

    if let Some(target) = &args.target_language {
        config.target_language = language_utils::normalize_code(target)?;
    }

    if let Some(chunk_size) = args.chunk_size {
        config.chunking.max_chunk_length = chunk_size;
    }

    config.validate().context("Configuration validation failed")?;

    let controller = if args.no_persist {
        Controller::with_store(config.clone(), Arc::new(MemoryStore::new()))
    } else {
        Controller::with_config(config.clone())?
    };

    let cancellation = controller.cancellation_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current chunk");
            cancellation.cancel();
        }
    });

    let report = controller
        .run(RunOptions {
            inputs: args.inputs,
            output_dir: args.output_dir,
            bundle: args.bundle,
        })
        .await?;

    for path in &report.written {
        println!("{}", path.display());
    }

    if !report.skipped.is_empty() {
        warn!("Skipped {} file(s): {}", report.skipped.len(), report.skipped.join(", "));
    }

    Ok(())
}

fn language_label(code: &str) -> String {
    match language_utils::get_language_name(code) {
        Ok(name) => format!("{} ({})", name, code),
        Err(_) => code.to_string(),
    }
}
