// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use bunkai::app_config::{self, Config};
use bunkai::app_controller::{CardsJob, Controller};

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
    /// Decompose subtitles and media into flash cards
    Cards(CardsArgs),

    /// Generate shell completions for bunkai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct CardsArgs {
    /// Subtitles in the language being studied
    #[arg(value_name = "FOREIGN_SUBS")]
    foreign_subtitles: PathBuf,

    /// Subtitles in your native language, aligned by time
    #[arg(value_name = "NATIVE_SUBS")]
    native_subtitles: Option<PathBuf>,

    /// Media file to extract audio clips and images from
    #[arg(short, long, value_name = "MEDIA_FILE")]
    media_file: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output field separator (a single character)
    #[arg(long)]
    separator: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// bunkai - decompose media into flash cards
///
/// Generates flash cards for an SRT application like Anki from subtitles
/// and optional associated media content.
#[derive(Parser, Debug)]
#[command(name = "bunkai")]
#[command(version)]
#[command(about = "Decompose media into flash cards")]
#[command(long_about = "bunkai generates flash cards for an SRS application like Anki from subtitles
and optional associated media content.

EXAMPLES:
    bunkai cards foreign.srt                         # Cards from one subtitle file
    bunkai cards foreign.srt native.srt              # Add the aligned translation
    bunkai cards -m media.mp4 foreign.srt native.srt # Add audio clips and images
    bunkai cards --separator , foreign.srt           # Write foreign.csv instead
    bunkai completions bash > bunkai.bash            # Generate bash completions

Given foreign.srt, the cards are written to foreign.tsv next to it, and clips
to the directory foreign.media/. The timing reference is always the foreign
subtitle file.

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Accept everything here; the effective level is set through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "bunkai", &mut std::io::stdout());
            Ok(())
        }
        Commands::Cards(args) => run_cards(args).await,
    }
}

async fn run_cards(options: CardsArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level((&config_log_level).into());
    }

    let mut config = load_config(&options.config_path, options.log_level.clone())?;

    if let Some(separator) = &options.separator {
        config.export.field_separator = separator.clone();
        config.export.output_extension.clear();
    }

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level((&config.log_level).into());
    }

    let controller = Controller::with_config(config)?;

    let job = CardsJob {
        foreign_subtitles: options.foreign_subtitles,
        native_subtitles: options.native_subtitles,
        media_file: options.media_file,
        force_overwrite: options.force_overwrite,
    };

    if let Some(output_file) = controller.run_cards(&job).await? {
        info!("Success: {:?}", output_file);
    }

    Ok(())
}

/// Load the configuration file, creating a default one if it is missing
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Update log level in config if specified via command line
    if let Some(log_level) = log_level {
        config.log_level = log_level.into();
    }

    Ok(config)
}
