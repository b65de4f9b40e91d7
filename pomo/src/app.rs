use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pomo_ipc::{SessionKind, SessionSnapshot};
use tracing::warn;

use crate::config::{Config, Theme};
use crate::profile::Profile;
use crate::timer::SessionTimer;

/// The three presentation views bound to the one session controller.
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub enum View {
    #[default]
    Timer,
    Tasks,
    Profile,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            Self::Timer => Self::Tasks,
            Self::Tasks => Self::Profile,
            Self::Profile => Self::Timer,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ProfileField {
    Username,
    Email,
}

#[derive(Default, Clone, PartialEq, Debug)]
pub enum AppMode {
    #[default]
    Normal,
    EnteringActivity,
    EditingProfile(ProfileField),
    ConfirmReset,
    SessionComplete,
}

/// Rows of the profile form, top to bottom.
pub const PROFILE_ROWS: usize = 6;

pub struct App {
    pub config: Config,
    pub light_theme: Theme,
    pub profile: Profile,
    pub timer: SessionTimer,
    pub snapshot: SessionSnapshot,
    pub view: View,
    pub mode: AppMode,
    pub input_buffer: String,
    pub profile_cursor: usize,
    pub notifications: Arc<AtomicBool>,
    pub completion_flag: Arc<AtomicBool>,
    /// Activity named by the most recent completion, for the overlay.
    pub last_completed: Option<String>,
    seen_history_len: usize,
}

impl App {
    pub fn new(
        config: Config,
        profile: Profile,
        timer: SessionTimer,
        notifications: Arc<AtomicBool>,
        completion_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            light_theme: Theme::light(),
            profile,
            timer,
            snapshot: SessionSnapshot {
                kind: SessionKind::Work,
                remaining_seconds: SessionKind::Work.duration_secs(),
                is_running: false,
                completed_work_sessions: 0,
                current_activity: String::new(),
                completed_activities: Vec::new(),
            },
            view: View::Timer,
            mode: AppMode::Normal,
            input_buffer: String::new(),
            profile_cursor: 0,
            notifications,
            completion_flag,
            last_completed: None,
            seen_history_len: 0,
        }
    }

    pub fn theme(&self) -> &Theme {
        if self.profile.dark_mode {
            &self.config.theme
        } else {
            &self.light_theme
        }
    }

    /// Pull a fresh snapshot before drawing, and surface a pending
    /// completion as the acknowledgement overlay.
    pub async fn refresh(&mut self) {
        self.snapshot = self.timer.snapshot().await;
        let history_len = self.snapshot.completed_activities.len();
        if self.completion_flag.swap(false, Ordering::SeqCst) {
            // A completion with no activity set appends nothing, so only a
            // grown history names the overlay.
            self.last_completed = if history_len > self.seen_history_len {
                self.snapshot
                    .completed_activities
                    .last()
                    .map(|activity| activity.name.clone())
            } else {
                None
            };
            if self.mode == AppMode::Normal {
                self.mode = AppMode::SessionComplete;
            }
        }
        self.seen_history_len = history_len;
    }

    /// The start/pause control. Starting with no activity set routes
    /// through the activity prompt first; the controller itself never
    /// rejects a start.
    pub async fn toggle_session(&mut self) {
        if self.snapshot.is_running {
            self.timer.pause().await;
        } else if self.snapshot.current_activity.is_empty() {
            self.mode = AppMode::EnteringActivity;
            self.input_buffer.clear();
        } else {
            self.timer.start().await;
        }
    }

    pub async fn reset_session(&mut self) {
        self.timer.reset().await;
    }

    pub fn handle_char(&mut self, c: char) {
        if matches!(
            self.mode,
            AppMode::EnteringActivity | AppMode::EditingProfile(_)
        ) {
            self.input_buffer.push(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if matches!(
            self.mode,
            AppMode::EnteringActivity | AppMode::EditingProfile(_)
        ) {
            self.input_buffer.pop();
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_buffer.clear();
        self.mode = AppMode::Normal;
    }

    /// Commit the input overlay for the current mode.
    pub async fn submit_input(&mut self) {
        match self.mode {
            AppMode::EnteringActivity => {
                if !self.input_buffer.is_empty() {
                    let name = std::mem::take(&mut self.input_buffer);
                    self.timer.set_activity(name).await;
                    self.timer.start().await;
                }
                self.mode = AppMode::Normal;
            }
            AppMode::EditingProfile(field) => {
                let value = std::mem::take(&mut self.input_buffer);
                match field {
                    ProfileField::Username => self.profile.username = value,
                    ProfileField::Email => self.profile.email = value,
                }
                self.mode = AppMode::Normal;
            }
            _ => {}
        }
        self.input_buffer.clear();
    }

    pub fn profile_cursor_up(&mut self) {
        self.profile_cursor = self.profile_cursor.saturating_sub(1);
    }

    pub fn profile_cursor_down(&mut self) {
        self.profile_cursor = (self.profile_cursor + 1).min(PROFILE_ROWS - 1);
    }

    /// Act on the selected profile row: edit, toggle, save, or ask to
    /// reset all activity.
    pub fn activate_profile_row(&mut self) {
        match self.profile_cursor {
            0 => {
                self.input_buffer = self.profile.username.clone();
                self.mode = AppMode::EditingProfile(ProfileField::Username);
            }
            1 => {
                self.input_buffer = self.profile.email.clone();
                self.mode = AppMode::EditingProfile(ProfileField::Email);
            }
            2 => {
                self.profile.notifications_enabled = !self.profile.notifications_enabled;
                self.notifications
                    .store(self.profile.notifications_enabled, Ordering::SeqCst);
            }
            3 => {
                self.profile.dark_mode = !self.profile.dark_mode;
            }
            4 => self.save_profile(),
            _ => self.mode = AppMode::ConfirmReset,
        }
    }

    pub fn save_profile(&self) {
        if let Err(e) = self.profile.save() {
            warn!("Failed to save profile: {}", e);
        }
    }

    pub async fn confirm_reset(&mut self) {
        self.timer.reset().await;
        self.mode = AppMode::Normal;
    }

    pub fn dismiss_completion(&mut self) {
        self.last_completed = None;
        self.mode = AppMode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionController;

    fn test_app() -> App {
        App::new(
            Config::default(),
            Profile::default(),
            SessionTimer::new(SessionController::new()),
            Arc::new(AtomicBool::new(true)),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn view_cycle_covers_all_three() {
        assert_eq!(View::Timer.next(), View::Tasks);
        assert_eq!(View::Tasks.next(), View::Profile);
        assert_eq!(View::Profile.next(), View::Timer);
    }

    #[test]
    fn input_buffer_only_accepts_chars_in_input_modes() {
        let mut app = test_app();
        app.handle_char('x');
        assert!(app.input_buffer.is_empty());

        app.mode = AppMode::EnteringActivity;
        app.handle_char('f');
        app.handle_char('o');
        app.handle_char('o');
        app.handle_backspace();
        assert_eq!(app.input_buffer, "fo");

        app.cancel_input();
        assert!(app.input_buffer.is_empty());
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn profile_cursor_stays_in_bounds() {
        let mut app = test_app();
        app.profile_cursor_up();
        assert_eq!(app.profile_cursor, 0);
        for _ in 0..20 {
            app.profile_cursor_down();
        }
        assert_eq!(app.profile_cursor, PROFILE_ROWS - 1);
    }

    #[test]
    fn toggling_notifications_updates_the_shared_flag() {
        let mut app = test_app();
        app.profile_cursor = 2;
        app.activate_profile_row();
        assert!(!app.profile.notifications_enabled);
        assert!(!app.notifications.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn submitting_an_activity_starts_the_session() {
        let mut app = test_app();
        app.toggle_session().await;
        assert_eq!(app.mode, AppMode::EnteringActivity);

        app.handle_char('a');
        app.submit_input().await;
        assert_eq!(app.mode, AppMode::Normal);

        let snapshot = app.timer.snapshot().await;
        assert!(snapshot.is_running);
        assert_eq!(snapshot.current_activity, "a");
    }

    #[tokio::test]
    async fn empty_activity_submission_does_not_start() {
        let mut app = test_app();
        app.mode = AppMode::EnteringActivity;
        app.submit_input().await;
        assert_eq!(app.mode, AppMode::Normal);
        assert!(!app.timer.snapshot().await.is_running);
    }
}
