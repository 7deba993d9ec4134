// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use backtrans::app_config::{Config, EngineMode, LogLevel};
use backtrans::app_controller::Controller;
use backtrans::file_utils::FileManager;
use backtrans::report;

/// CLI Wrapper for EngineMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEngineMode {
    Dual,
    Deepseek,
    Deepl,
}

impl From<CliEngineMode> for EngineMode {
    fn from(cli_mode: CliEngineMode) -> Self {
        match cli_mode {
            CliEngineMode::Dual => EngineMode::Dual,
            CliEngineMode::Deepseek => EngineMode::DeepSeek,
            CliEngineMode::Deepl => EngineMode::DeepL,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a text forward and back and score the result (default command)
    Analyze(AnalyzeArgs),

    /// Check that the configured engines are reachable
    TestConnection(ConfigArgs),

    /// List supported languages
    Languages,

    /// Generate shell completions for backtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that loads the configuration
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: String,

    /// Engines to use
    #[arg(short, long, value_enum)]
    engine: Option<CliEngineMode>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    /// Text to analyze
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// File with the text to analyze (UTF-8, or UTF-16 with a byte order mark)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Source language (e.g. 'Chinese', 'zh', '中文')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language (e.g. 'English', 'th', '泰语')
    #[arg(short, long)]
    target_language: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Report file path
    #[arg(short, long)]
    output: Option<String>,

    /// Do not write the report file
    #[arg(long)]
    no_save: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Use the plain translation prompt for DeepSeek
    #[arg(long)]
    basic_prompts: bool,

    /// Texts longer than this many characters are chunked
    #[arg(long)]
    max_chunk_size: Option<usize>,
}

/// backtrans - round-trip translation quality analysis
///
/// Translates text with DeepL and DeepSeek, keeps the better candidate,
/// translates it back and scores how much of the meaning survived.
#[derive(Parser, Debug)]
#[command(name = "backtrans")]
#[command(version)]
#[command(about = "Round-trip translation quality analysis with DeepL and DeepSeek")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "backtrans translates text with DeepL and DeepSeek, selects the better translation,
translates it back and scores the semantic consistency of the round trip.

EXAMPLES:
    backtrans --text '今天天气很好'                 # Chinese -> English -> Chinese
    backtrans -s zh -t th --file article.txt        # Long texts are chunked automatically
    echo '你好' | backtrans --json                   # Read stdin, print the JSON report
    backtrans -e deepseek --text '...'               # Use a single engine
    backtrans test-connection                        # Check the configured engines
    backtrans languages                              # List supported languages
    backtrans completions bash > backtrans.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. DEEPSEEK_API_KEY, DEEPSEEK_BASE_URL, DEEPL_API_KEY
    and DEEPL_BASE_URL (also read from a .env file) override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    analyze: AnalyzeArgs,
}

// @struct: Custom logger implementation; filtering follows log::max_level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger);
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // API keys may come from a .env file
    dotenv::dotenv().ok();

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "backtrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Languages) => {
            print_languages();
            Ok(())
        }
        Some(Commands::TestConnection(args)) => run_test_connection(args).await,
        Some(Commands::Analyze(args)) => run_analyze(args).await,
        // Default behavior - top-level args are analyze args
        None => run_analyze(cli.analyze).await,
    }
}

fn apply_log_level(level: &LogLevel) {
    // Just update the max level without reinitializing the logger
    log::set_max_level(level.to_level_filter());
}

// @returns: Config from file (created with defaults when missing), environment and CLI
fn load_config(args: &ConfigArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &args.log_level {
        apply_log_level(&cmd_log_level.clone().into());
    }

    let config_path = Path::new(&args.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", args.config_path);
        let config = Config::default();
        config
            .save(config_path)
            .context(format!("Failed to write default config to file: {}", args.config_path))?;
        config
    };

    config.apply_env_overrides();

    if let Some(engine) = &args.engine {
        config.engines.mode = engine.clone().into();
    }
    if let Some(log_level) = &args.log_level {
        config.log_level = log_level.clone().into();
    }

    // If log level was not set via command line, update it from config now
    if args.log_level.is_none() {
        apply_log_level(&config.log_level);
    }

    Ok(config)
}

// @returns: Text from --text, --file or stdin
fn read_input(args: &AnalyzeArgs) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return FileManager::read_text(path);
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(anyhow!("No input given; use --text, --file or pipe text on stdin"));
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text).context("Failed to read text from stdin")?;
    Ok(text)
}

async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;

    // Override config with CLI options if provided
    if let Some(source_lang) = &args.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &args.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(output) = &args.output {
        config.output.report_path = output.clone();
    }
    if args.no_save {
        config.output.save_report = false;
    }
    if args.basic_prompts {
        config.common.enhanced_prompts = false;
    }
    if let Some(max_chunk_size) = args.max_chunk_size {
        config.chunking.max_chunk_size = max_chunk_size;
        config.chunking.overlap_size = config.chunking.overlap_size.min(max_chunk_size.saturating_sub(1));
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    let text = read_input(&args)?;
    if text.trim().is_empty() {
        return Err(anyhow!("Input text is empty"));
    }

    let controller = Controller::with_config(config)?.with_progress(!args.json);
    let analysis = controller.run_analysis(&text).await?;

    if args.json {
        println!("{}", report::render_json(&analysis)?);
    } else {
        print!("{}", report::render_console(&analysis));
    }

    Ok(())
}

async fn run_test_connection(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let results = controller.test_connections().await;

    let mut failed = 0;
    for (engine, result) in &results {
        match result {
            Ok(()) => println!("{:<10} OK", engine.display_name()),
            Err(e) => {
                failed += 1;
                println!("{:<10} FAILED: {}", engine.display_name(), e);
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} engine(s) failed the connection test", failed, results.len()));
    }
    info!("All engines reachable");
    Ok(())
}

fn print_languages() {
    println!("{:<12} {:<6} {:<12} {}", "Language", "Code", "Native", "DeepL");
    for (language, deepl) in Controller::languages() {
        println!(
            "{:<12} {:<6} {:<12} {}",
            language.english_name(),
            language.code(),
            language.native_name(),
            if deepl { "yes" } else { "no (DeepSeek only)" }
        );
    }
}
