//! The session state machine: one countdown, cycled through work and
//! break kinds as sessions complete.

use chrono::Local;
use pomo_ipc::{CompletedActivity, SessionKind, SessionSnapshot};

/// The cycle counter wraps after this many completed sessions.
const SESSIONS_PER_CYCLE: u32 = 4;

/// Raised synchronously after every state mutation, once the new state is
/// consistent.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    Paused,
    Tick {
        remaining_seconds: u32,
    },
    Completed {
        finished: SessionKind,
        next: SessionKind,
        activity: String,
    },
    Reset,
    ActivityChanged {
        name: String,
    },
}

/// Countdown state plus the session-cycling policy. One instance lives for
/// the whole process and is shared by every presentation layer; the
/// periodic ticker that drives [`SessionController::tick`] is owned by
/// [`crate::timer::SessionTimer`].
pub struct SessionController {
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub completed_work_sessions: u32,
    pub current_activity: String,
    pub current_session_kind: SessionKind,
    pub completed_activities: Vec<CompletedActivity>,
    listeners: Vec<Box<dyn Fn(&SessionEvent) + Send>>,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            remaining_seconds: SessionKind::Work.duration_secs(),
            is_running: false,
            completed_work_sessions: 0,
            current_activity: String::new(),
            current_session_kind: SessionKind::Work,
            completed_activities: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Register a change listener. Listeners are invoked in registration
    /// order, on the thread that performed the mutation.
    pub fn on_event(&mut self, listener: impl Fn(&SessionEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Mark the countdown running. No-op while already running, so calling
    /// layers can issue it freely without stacking tickers.
    pub fn start(&mut self) {
        if self.is_running {
            return;
        }
        self.is_running = true;
        self.notify(&SessionEvent::Started);
    }

    /// Stop the countdown. Idempotent.
    pub fn pause(&mut self) {
        if !self.is_running {
            return;
        }
        self.is_running = false;
        self.notify(&SessionEvent::Paused);
    }

    /// Pause, restore the work-session default countdown, clear the
    /// activity and the cycle counter. The session kind and the completed
    /// history are left untouched.
    pub fn reset(&mut self) {
        self.pause();
        self.remaining_seconds = SessionKind::Work.duration_secs();
        self.current_activity.clear();
        self.completed_work_sessions = 0;
        self.notify(&SessionEvent::Reset);
    }

    pub fn set_activity(&mut self, name: impl Into<String>) {
        self.current_activity = name.into();
        let name = self.current_activity.clone();
        self.notify(&SessionEvent::ActivityChanged { name });
    }

    /// Advance the countdown by one second. Once the countdown sits at
    /// zero, the next tick completes the session instead of decrementing,
    /// so the value never goes negative.
    pub fn tick(&mut self) {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            self.notify(&SessionEvent::Tick {
                remaining_seconds: self.remaining_seconds,
            });
        } else {
            self.complete_session();
        }
    }

    /// Every completed session advances the cycle counter, breaks
    /// included, and the next kind is classified against the incremented
    /// value. Count 1 therefore classifies back to Work.
    fn complete_session(&mut self) {
        let finished = self.current_session_kind;
        self.completed_work_sessions += 1;
        let next = if self.completed_work_sessions % SESSIONS_PER_CYCLE == 0 {
            SessionKind::LongBreak
        } else if self.completed_work_sessions % 2 == 0 {
            SessionKind::ShortBreak
        } else {
            SessionKind::Work
        };
        self.current_session_kind = next;
        self.remaining_seconds = next.duration_secs();
        if self.completed_work_sessions >= SESSIONS_PER_CYCLE {
            self.completed_work_sessions = 0;
        }
        if !self.current_activity.is_empty() {
            self.completed_activities.push(CompletedActivity {
                name: self.current_activity.clone(),
                completed_at: Local::now(),
            });
        }
        self.is_running = false;
        let activity = self.current_activity.clone();
        self.notify(&SessionEvent::Completed {
            finished,
            next,
            activity,
        });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            kind: self.current_session_kind,
            remaining_seconds: self.remaining_seconds,
            is_running: self.is_running,
            completed_work_sessions: self.completed_work_sessions,
            current_activity: self.current_activity.clone(),
            completed_activities: self.completed_activities.clone(),
        }
    }

    fn notify(&self, event: &SessionEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn complete_once(controller: &mut SessionController) {
        controller.remaining_seconds = 0;
        controller.tick();
    }

    #[test]
    fn fresh_controller_defaults() {
        let controller = SessionController::new();
        assert_eq!(controller.remaining_seconds, 1500);
        assert!(!controller.is_running);
        assert_eq!(controller.completed_work_sessions, 0);
        assert_eq!(controller.current_session_kind, SessionKind::Work);
        assert!(controller.current_activity.is_empty());
        assert!(controller.completed_activities.is_empty());
    }

    #[test]
    fn tick_decrements_by_one() {
        let mut controller = SessionController::new();
        controller.start();
        for n in 1..=100 {
            controller.tick();
            assert_eq!(controller.remaining_seconds, 1500 - n);
        }
    }

    #[test]
    fn countdown_sits_at_zero_before_completing() {
        let mut controller = SessionController::new();
        controller.start();
        for _ in 0..1500 {
            controller.tick();
        }
        // The countdown has just reached zero; the session has not
        // completed yet.
        assert_eq!(controller.remaining_seconds, 0);
        assert_eq!(controller.completed_work_sessions, 0);
        assert!(controller.is_running);

        // The tick after zero completes exactly once.
        controller.tick();
        assert_eq!(controller.completed_work_sessions, 1);
        assert_eq!(controller.current_session_kind, SessionKind::Work);
        assert_eq!(controller.remaining_seconds, 1500);
        assert!(!controller.is_running);
    }

    #[test]
    fn first_completion_cycles_back_to_work() {
        let mut controller = SessionController::new();
        complete_once(&mut controller);
        // 1 % 4 != 0 and 1 % 2 != 0, so the first completion re-enters a
        // work session.
        assert_eq!(controller.current_session_kind, SessionKind::Work);
        assert_eq!(controller.remaining_seconds, 1500);
    }

    #[test]
    fn cycle_sequence_over_two_full_rounds() {
        let mut controller = SessionController::new();
        let mut kinds = Vec::new();
        let mut counts = Vec::new();
        for _ in 0..8 {
            complete_once(&mut controller);
            kinds.push(controller.current_session_kind);
            counts.push(controller.completed_work_sessions);
        }
        use SessionKind::{LongBreak, ShortBreak, Work};
        assert_eq!(
            kinds,
            vec![Work, ShortBreak, Work, LongBreak, Work, ShortBreak, Work, LongBreak]
        );
        // The counter wraps to 0 each time it reaches 4.
        assert_eq!(counts, vec![1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn fourth_completion_is_long_break_and_wraps() {
        let mut controller = SessionController::new();
        for _ in 0..4 {
            complete_once(&mut controller);
        }
        assert_eq!(controller.current_session_kind, SessionKind::LongBreak);
        assert_eq!(controller.remaining_seconds, 900);
        assert_eq!(controller.completed_work_sessions, 0);
    }

    #[test]
    fn break_completion_advances_cycle_counter() {
        let mut controller = SessionController::new();
        complete_once(&mut controller);
        complete_once(&mut controller);
        assert_eq!(controller.current_session_kind, SessionKind::ShortBreak);

        // Completing the break itself also counts and classifies the next
        // kind.
        complete_once(&mut controller);
        assert_eq!(controller.completed_work_sessions, 3);
        assert_eq!(controller.current_session_kind, SessionKind::Work);
    }

    #[test]
    fn session_durations_by_kind() {
        let mut controller = SessionController::new();
        complete_once(&mut controller);
        assert_eq!(controller.remaining_seconds, 1500);
        complete_once(&mut controller);
        assert_eq!(controller.remaining_seconds, 300);
        complete_once(&mut controller);
        assert_eq!(controller.remaining_seconds, 1500);
        complete_once(&mut controller);
        assert_eq!(controller.remaining_seconds, 900);
    }

    #[test]
    fn reset_keeps_kind_and_history() {
        let mut controller = SessionController::new();
        controller.set_activity("write report");
        complete_once(&mut controller);
        complete_once(&mut controller);
        assert_eq!(controller.current_session_kind, SessionKind::ShortBreak);
        assert_eq!(controller.completed_activities.len(), 2);

        controller.start();
        controller.reset();
        assert_eq!(controller.remaining_seconds, 1500);
        assert!(!controller.is_running);
        assert!(controller.current_activity.is_empty());
        assert_eq!(controller.completed_work_sessions, 0);
        // Reset is asymmetric: the kind and the history survive.
        assert_eq!(controller.current_session_kind, SessionKind::ShortBreak);
        assert_eq!(controller.completed_activities.len(), 2);
    }

    #[test]
    fn start_is_idempotent() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut controller = SessionController::new();
        controller.on_event(move |event| sink.lock().unwrap().push(event.clone()));

        controller.start();
        controller.start();
        assert!(controller.is_running);
        assert_eq!(*events.lock().unwrap(), vec![SessionEvent::Started]);
    }

    #[test]
    fn pause_is_idempotent() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut controller = SessionController::new();
        controller.on_event(move |event| sink.lock().unwrap().push(event.clone()));

        controller.pause();
        assert!(events.lock().unwrap().is_empty());

        controller.start();
        controller.pause();
        controller.pause();
        assert_eq!(
            *events.lock().unwrap(),
            vec![SessionEvent::Started, SessionEvent::Paused]
        );
    }

    #[test]
    fn completion_records_activity() {
        let mut controller = SessionController::new();
        controller.set_activity("study borrowck");
        complete_once(&mut controller);
        assert_eq!(controller.completed_activities.len(), 1);
        assert_eq!(controller.completed_activities[0].name, "study borrowck");
        // Insertion order is completion order.
        controller.set_activity("review queue");
        complete_once(&mut controller);
        assert_eq!(controller.completed_activities[1].name, "review queue");
    }

    #[test]
    fn completion_without_activity_records_nothing() {
        let mut controller = SessionController::new();
        complete_once(&mut controller);
        assert!(controller.completed_activities.is_empty());
    }

    #[test]
    fn listeners_fire_after_state_is_consistent() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut controller = SessionController::new();
        controller.on_event(move |event| sink.lock().unwrap().push(event.clone()));

        controller.set_activity("draft notes");
        controller.start();
        controller.tick();
        controller.remaining_seconds = 0;
        controller.tick();
        controller.reset();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                SessionEvent::ActivityChanged {
                    name: "draft notes".into()
                },
                SessionEvent::Started,
                SessionEvent::Tick {
                    remaining_seconds: 1499
                },
                SessionEvent::Completed {
                    finished: SessionKind::Work,
                    next: SessionKind::Work,
                    activity: "draft notes".into()
                },
                SessionEvent::Reset,
            ]
        );
    }
}
