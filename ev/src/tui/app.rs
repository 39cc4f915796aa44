//! TUI application - key handling
//!
//! The App struct owns the AppState and turns key presses into queued
//! scheduler actions. It does not do any rendering - that's delegated to the
//! views module - and it never touches the scheduler directly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::UiConfig;
use crate::domain::Example;

use super::state::{AppState, InteractionMode, PendingAction};

/// TUI application
#[derive(Debug, Default)]
pub struct App {
    /// Application state
    state: AppState,
}

impl App {
    pub fn new(ui: UiConfig) -> Self {
        Self {
            state: AppState::new(ui),
        }
    }

    /// Get reference to state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get mutable reference to state
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.state.interaction_mode {
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::Help => self.handle_help_key(key),
        }
    }

    /// Handle key in normal mode
    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        self.state.clear_status();

        match key.code {
            // === Quit / help ===
            KeyCode::Char('q') => {
                self.state.should_quit = true;
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.state.interaction_mode = InteractionMode::Help;
            }

            // === Scheduling ===
            KeyCode::Char('m') => self.state.queue(PendingAction::AddMacrotask),
            KeyCode::Char('u') => self.state.queue(PendingAction::AddMicrotask),
            KeyCode::Char('f') => self.state.queue(PendingAction::AddRaf),
            KeyCode::Char('r') => self.state.queue(PendingAction::Reset),

            // === Examples ===
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                if let Some(example) = Example::ALL.get(index) {
                    self.state.queue(PendingAction::RunExample(*example));
                }
            }

            // === Delay control ===
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => self.state.adjust_delay(1),
            KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Left => self.state.adjust_delay(-1),

            _ => {}
        }

        self.state.should_quit
    }

    /// Handle key in help mode
    fn handle_help_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(1) => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            _ => {}
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, c: char) -> bool {
        app.handle_key(KeyEvent::from(KeyCode::Char(c)))
    }

    #[test]
    fn test_app_new() {
        let app = App::default();
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
        assert_eq!(app.state().delay_ms, 50);
    }

    #[test]
    fn test_app_quit_key() {
        let mut app = App::default();
        assert!(press(&mut app, 'q'));
        assert!(app.state().should_quit);

        let mut app = App::default();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.handle_key(key));
    }

    #[test]
    fn test_app_help_toggle() {
        let mut app = App::default();
        press(&mut app, '?');
        assert!(matches!(app.state().interaction_mode, InteractionMode::Help));

        // scheduling keys are ignored while help is open
        press(&mut app, 'm');
        assert!(app.state().pending_actions.is_empty());

        // q closes help rather than quitting
        assert!(!press(&mut app, 'q'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
    }

    #[test]
    fn test_scheduling_keys() {
        let mut app = App::default();
        for c in ['m', 'u', 'f', 'r'] {
            assert!(!press(&mut app, c));
        }
        assert_eq!(
            app.state_mut().take_actions(),
            vec![
                PendingAction::AddMacrotask,
                PendingAction::AddMicrotask,
                PendingAction::AddRaf,
                PendingAction::Reset,
            ]
        );
    }

    #[test]
    fn test_example_keys() {
        let mut app = App::default();
        press(&mut app, '1');
        press(&mut app, '3');
        press(&mut app, '9');
        assert_eq!(
            app.state_mut().take_actions(),
            vec![
                PendingAction::RunExample(Example::MacroThenMicro),
                PendingAction::RunExample(Example::ThreeMicro),
            ]
        );
    }

    #[test]
    fn test_delay_keys() {
        let mut app = App::default();
        press(&mut app, '+');
        app.handle_key(KeyEvent::from(KeyCode::Right));
        press(&mut app, '-');
        assert_eq!(app.state().delay_ms, 60);

        for _ in 0..20 {
            app.handle_key(KeyEvent::from(KeyCode::Left));
        }
        assert_eq!(app.state().delay_ms, 0);
    }
}
