//! evl - Event Loop Visualizer
//!
//! CLI entry point: interactive TUI by default, headless runs for scripting.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use evloop::cli::{Cli, Command, OutputFormat, RunArgs, generate_after_help, get_log_path};
use evloop::config::Config;
use evloop::domain::Example;
use evloop::events::{TimelineEntry, TimelineEvent, create_event_bus, spawn_timeline_recorder};
use evloop::headless::{RunOutcome, RunPlan, run_realtime, run_simulated};
use evloop::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
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

    // Write to log file, not stdout/stderr - the TUI owns the terminal
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

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
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Run(args)) => {
            debug!(?args, "main: matched Run command");
            cmd_run(&config, args).await
        }
        Some(Command::Examples) => {
            debug!("main: matched Examples command");
            cmd_examples()
        }
        Some(Command::Tui) | None => {
            debug!("main: launching TUI");
            cmd_tui(&config).await
        }
    }
}

/// Launch the interactive TUI
async fn cmd_tui(config: &Config) -> Result<()> {
    debug!("cmd_tui: called");
    tui::run(config).await.context("TUI failed")
}

/// List the scripted examples
fn cmd_examples() -> Result<()> {
    debug!("cmd_examples: called");
    for (i, example) in Example::ALL.iter().enumerate() {
        let steps: Vec<String> = example.steps().iter().map(|k| k.to_string()).collect();
        println!(
            "{} {:<18} {}",
            format!("{}.", i + 1).cyan(),
            example.to_string().bold(),
            steps.join(", ").dimmed()
        );
        println!("   {}", example.note());
    }
    Ok(())
}

/// Run the loop headless and print the timeline
async fn cmd_run(config: &Config, args: RunArgs) -> Result<()> {
    debug!(?args, "cmd_run: called");
    let plan = RunPlan {
        examples: args.examples,
        macros: args.macros,
        micros: args.micros,
        rafs: args.rafs,
        delay: args.delay_ms.map(Duration::from_millis),
        duration: Duration::from_millis(args.duration_ms),
    };
    if plan.is_empty() {
        println!("{}", "Nothing scheduled; the loop will only tick.".yellow());
    }

    let bus = create_event_bus();
    let recorder = match &args.record {
        Some(path) => Some(spawn_timeline_recorder(path, &bus).context("Failed to start timeline recorder")?),
        None => None,
    };

    let outcome = if args.realtime {
        run_realtime(config.scheduler.clone(), &plan, bus.clone()).await
    } else {
        run_simulated(config.scheduler.clone(), &plan, bus.clone())
    };

    // Closing the bus lets the recorder finish
    drop(bus);
    let recorded = match recorder {
        Some(handle) => Some(handle.await.context("Timeline recorder task failed")?),
        None => None,
    };

    match args.format {
        OutputFormat::Text => print_text(&outcome),
        OutputFormat::Json => print_json(&outcome)?,
    }

    if let (Some(written), Some(path)) = (recorded, &args.record) {
        info!(written, path = %path.display(), "cmd_run: timeline recorded");
        if args.format == OutputFormat::Text {
            println!("{} {} entries to {}", "Recorded".green(), written, path.display());
        }
    }
    Ok(())
}

fn print_text(outcome: &RunOutcome) {
    for entry in &outcome.entries {
        let at = format!("{:>6}ms", entry.at_ms).dimmed();
        println!("{} · {}", at, colorize(entry));
    }

    let snap = &outcome.snapshot;
    println!();
    println!(
        "{} ticks {}, macrotasks {}, microtasks {}, pending {} macro / {} micro",
        "Summary:".bold(),
        snap.stats.ticks,
        snap.stats.macrotasks_run,
        snap.stats.microtasks_run,
        snap.macrotasks.len(),
        snap.microtasks.len()
    );
    if outcome.missed > 0 {
        println!("{} {} entries dropped", "Warning:".yellow(), outcome.missed);
    }
}

fn colorize(entry: &TimelineEntry) -> colored::ColoredString {
    let text = entry.event.to_string();
    match entry.event {
        TimelineEvent::Scheduled { .. } => text.normal(),
        TimelineEvent::MacroStarted { .. } | TimelineEvent::MacroFinished { .. } => text.blue(),
        TimelineEvent::DrainStarted { .. } => text.cyan(),
        TimelineEvent::MicroStarted { .. } | TimelineEvent::MicroFinished { .. } => text.green(),
        TimelineEvent::ExampleScheduled { .. } => text.magenta(),
        TimelineEvent::Reset => text.red(),
    }
}

fn print_json(outcome: &RunOutcome) -> Result<()> {
    for entry in &outcome.entries {
        println!("{}", serde_json::to_string(entry).context("Failed to serialize entry")?);
    }
    Ok(())
}
