//! TUI Runner - main loop that owns the terminal and the scheduler
//!
//! The TuiRunner is responsible for:
//! - Dispatching terminal events to App for handling
//! - Applying queued actions to the SchedulerLoop
//! - Re-rendering from a fresh scheduler snapshot every frame

use std::time::Duration;

use eyre::Result;
use tracing::debug;

use crate::config::UiConfig;
use crate::scheduler::SchedulerLoop;

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::PendingAction;
use super::views;

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Application state
    app: App,
    /// Terminal handle
    terminal: Tui,
    /// Loop being visualized
    scheduler: SchedulerLoop,
    /// Event handler
    event_handler: EventHandler,
}

impl TuiRunner {
    pub fn new(terminal: Tui, scheduler: SchedulerLoop, ui: UiConfig) -> Self {
        let frame_rate = ui.frame_rate();
        scheduler.set_macro_delay(Duration::from_millis(ui.initial_delay()));
        Self {
            app: App::new(ui),
            terminal,
            scheduler,
            event_handler: EventHandler::new(frame_rate),
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        self.scheduler.start();

        loop {
            self.app.state_mut().update_snapshot(self.scheduler.snapshot());
            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            match self.event_handler.next().await? {
                Event::Tick => {}
                Event::Key(key_event) => {
                    if self.app.handle_key(key_event) {
                        break;
                    }
                }
                Event::Resize(width, height) => {
                    debug!(width, height, "TuiRunner::run: terminal resized");
                }
            }

            for action in self.app.state_mut().take_actions() {
                let status = execute_action(&self.scheduler, action);
                self.app.state_mut().set_status(status);
            }

            if self.app.state().should_quit {
                break;
            }
        }

        self.scheduler.stop();
        Ok(())
    }
}

/// Apply one action to the scheduler and describe what happened
pub fn execute_action(scheduler: &SchedulerLoop, action: PendingAction) -> String {
    debug!(?action, "execute_action: called");
    match action {
        PendingAction::AddMacrotask => {
            let item = scheduler.add_macrotask();
            format!("Scheduled {} (delay {}ms)", item.label, item.ready_delay.as_millis())
        }
        PendingAction::AddMicrotask => format!("Scheduled {}", scheduler.add_microtask().label),
        PendingAction::AddRaf => format!("Scheduled {}", scheduler.add_raf().label),
        PendingAction::Reset => {
            scheduler.reset();
            "Reset demo".to_string()
        }
        PendingAction::RunExample(example) => {
            scheduler.run_example(example);
            example.note().to_string()
        }
        PendingAction::SetDelay(delay_ms) => {
            scheduler.set_macro_delay(Duration::from_millis(delay_ms));
            format!("Macrotask delay {}ms", delay_ms)
        }
    }
}
