//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::Example;

/// evl - event loop visualizer
#[derive(Parser)]
#[command(
    name = "evl",
    about = "Visualize how an event loop orders macrotasks, microtasks and animation frames",
    version = env!("GIT_DESCRIBE"),
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
    /// Launch the interactive TUI (default)
    Tui,

    /// Run the loop headless and print the timeline
    Run(RunArgs),

    /// List the scripted examples
    Examples,
}

/// Options for a headless run
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Scripted examples to schedule, in order
    #[arg(value_name = "EXAMPLE")]
    pub examples: Vec<Example>,

    /// Number of macrotasks to add
    #[arg(long = "macro", default_value = "0")]
    pub macros: usize,

    /// Number of microtasks to add
    #[arg(long = "micro", default_value = "0")]
    pub micros: usize,

    /// Number of animation frame callbacks to add
    #[arg(long = "raf", default_value = "0")]
    pub rafs: usize,

    /// Ready delay for macrotasks in milliseconds
    #[arg(short, long = "delay-ms")]
    pub delay_ms: Option<u64>,

    /// How long to run the loop, in milliseconds
    #[arg(long = "duration-ms", default_value = "1000")]
    pub duration_ms: u64,

    /// Use wall-clock timers instead of simulated time
    #[arg(long)]
    pub realtime: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Also write every timeline event to this file as JSON lines
    #[arg(long)]
    pub record: Option<PathBuf>,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evloop")
        .join("logs")
        .join("evloop.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text listing examples, keys and the log path
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("Examples:\n");
    for example in Example::ALL {
        help.push_str(&format!("  {:<18} {}\n", example.to_string(), example.title()));
    }

    help.push('\n');
    help.push_str("TUI keys:\n");
    help.push_str("  m macrotask  u microtask  f animation frame  r reset\n");
    help.push_str("  1-3 examples  +/- delay  ? help  q quit\n");

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));

    help
}

/// Output format for the run command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
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
        let cli = Cli::parse_from(["evl"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_tui() {
        let cli = Cli::parse_from(["evl", "tui"]);
        assert!(matches!(cli.command, Some(Command::Tui)));
    }

    #[test]
    fn test_cli_parse_examples() {
        let cli = Cli::parse_from(["evl", "examples"]);
        assert!(matches!(cli.command, Some(Command::Examples)));
    }

    fn run_args(cli: Cli) -> RunArgs {
        match cli.command {
            Some(Command::Run(args)) => args,
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_run_defaults() {
        let args = run_args(Cli::parse_from(["evl", "run"]));
        assert!(args.examples.is_empty());
        assert_eq!((args.macros, args.micros, args.rafs), (0, 0, 0));
        assert!(args.delay_ms.is_none());
        assert_eq!(args.duration_ms, 1000);
        assert!(!args.realtime);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.record.is_none());
    }

    #[test]
    fn test_cli_parse_run_full() {
        let args = run_args(Cli::parse_from([
            "evl",
            "run",
            "macro-then-micro",
            "three-micro",
            "--macro",
            "2",
            "--micro",
            "1",
            "--raf",
            "1",
            "--delay-ms",
            "200",
            "--duration-ms",
            "500",
            "--realtime",
            "--format",
            "json",
            "--record",
            "/tmp/timeline.jsonl",
        ]));
        assert_eq!(args.examples, vec![Example::MacroThenMicro, Example::ThreeMicro]);
        assert_eq!((args.macros, args.micros, args.rafs), (2, 1, 1));
        assert_eq!(args.delay_ms, Some(200));
        assert_eq!(args.duration_ms, 500);
        assert!(args.realtime);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.record, Some(PathBuf::from("/tmp/timeline.jsonl")));
    }

    #[test]
    fn test_cli_rejects_unknown_example() {
        assert!(Cli::try_parse_from(["evl", "run", "four-micro"]).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_with_config_and_log_level() {
        let cli = Cli::parse_from(["evl", "-c", "/path/to/config.yml", "-l", "debug", "examples"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_after_help_lists_examples() {
        let help = generate_after_help();
        assert!(help.contains("macro-then-micro"));
        assert!(help.contains("three-micro"));
        assert!(help.contains("evloop.log"));
    }
}
