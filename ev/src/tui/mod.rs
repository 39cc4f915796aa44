//! Terminal User Interface for evloop
//!
//! Live view of the event loop:
//! - call stack, microtask queue and macrotask queue (with eligibility)
//! - timeline log, newest first
//! - single-key commands to schedule work, run examples and tune the delay

mod app;
mod events;
mod runner;
pub mod state;
mod views;

pub use app::App;
pub use events::{Event, EventHandler};
pub use runner::{TuiRunner, execute_action};
pub use state::{AppState, InteractionMode, PendingAction};

use std::io::{self, Stdout};
use std::sync::Arc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::clock::TokioClock;
use crate::config::Config;
use crate::scheduler::SchedulerLoop;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the TUI against a real-time scheduler
///
/// Must be called from within a tokio runtime.
pub async fn run(config: &Config) -> Result<()> {
    let clock = Arc::new(TokioClock::new());
    let scheduler = SchedulerLoop::new(config.scheduler.clone(), clock);

    let terminal = init()?;

    // Use a guard to ensure terminal is restored even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let mut runner = TuiRunner::new(terminal, scheduler, config.ui.clone());
    runner.run().await
}
