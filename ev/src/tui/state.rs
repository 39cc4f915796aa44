//! TUI state - pure data, no rendering or key handling

use tracing::debug;

use crate::config::UiConfig;
use crate::domain::Example;
use crate::scheduler::Snapshot;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Normal,
    /// Help overlay shown
    Help,
}

/// Command for the runner to apply to the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    AddMacrotask,
    AddMicrotask,
    AddRaf,
    Reset,
    RunExample(Example),
    SetDelay(u64),
}

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Latest scheduler snapshot
    pub snapshot: Snapshot,
    /// Ready delay for new macrotasks, always within `0..=ui.max_delay_ms`
    pub delay_ms: u64,
    pub ui: UiConfig,
    pub interaction_mode: InteractionMode,
    pub should_quit: bool,
    /// Transient message shown in the footer
    pub status_message: Option<String>,
    /// Actions queued by key handling, oldest first
    pub pending_actions: Vec<PendingAction>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(UiConfig::default())
    }
}

impl AppState {
    pub fn new(ui: UiConfig) -> Self {
        Self {
            snapshot: Snapshot::default(),
            delay_ms: ui.initial_delay(),
            ui,
            interaction_mode: InteractionMode::default(),
            should_quit: false,
            status_message: None,
            pending_actions: Vec::new(),
        }
    }

    pub fn queue(&mut self, action: PendingAction) {
        self.pending_actions.push(action);
    }

    pub fn take_actions(&mut self) -> Vec<PendingAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Move the delay by `delta` steps, clamped; queues the change if it moved
    pub fn adjust_delay(&mut self, delta: i64) {
        let step = i64::try_from(self.ui.delay_step_ms).unwrap_or(i64::MAX);
        let current = i64::try_from(self.delay_ms).unwrap_or(i64::MAX);
        let next = self.ui.clamp_delay(current.saturating_add(delta.saturating_mul(step)));
        debug!(delta, from = self.delay_ms, to = next, "AppState::adjust_delay: called");
        if next != self.delay_ms {
            self.delay_ms = next;
            self.queue(PendingAction::SetDelay(next));
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn update_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }
}
