//! Async ownership of the session controller: a cloneable handle that
//! drives one-second ticks while the countdown runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use crate::session::{SessionController, SessionEvent};
use pomo_ipc::SessionSnapshot;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Shared handle over the single [`SessionController`] instance.
///
/// The ticker task is a scoped resource: spawned on [`start`], aborted on
/// [`pause`] and [`reset`], and it exits on its own when a session
/// completes. At most one ticker is ever alive per controller.
///
/// [`start`]: SessionTimer::start
/// [`pause`]: SessionTimer::pause
/// [`reset`]: SessionTimer::reset
#[derive(Clone)]
pub struct SessionTimer {
    controller: Arc<Mutex<SessionController>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionTimer {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    /// Begin (or resume) the countdown. Calling this while the countdown
    /// already runs changes nothing and never stacks a second ticker.
    pub async fn start(&self) {
        {
            let mut controller = self.controller.lock().await;
            if controller.is_running {
                return;
            }
            controller.start();
        }
        self.spawn_ticker().await;
    }

    /// Stop the countdown and release the ticker. Idempotent.
    pub async fn pause(&self) {
        self.controller.lock().await.pause();
        self.cancel_ticker().await;
    }

    /// Pause and restore the controller's defaults. The session kind and
    /// completed history survive, matching the controller's reset.
    pub async fn reset(&self) {
        self.controller.lock().await.reset();
        self.cancel_ticker().await;
    }

    pub async fn set_activity(&self, name: impl Into<String>) {
        self.controller.lock().await.set_activity(name);
    }

    pub async fn on_event(&self, listener: impl Fn(&SessionEvent) + Send + 'static) {
        self.controller.lock().await.on_event(listener);
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.controller.lock().await.snapshot()
    }

    async fn spawn_ticker(&self) {
        let mut ticker = self.ticker.lock().await;
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let controller = self.controller.clone();
        *ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval(TICK_INTERVAL);
            // The first interval tick completes immediately; consume it so
            // the first decrement lands a full second after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut controller = controller.lock().await;
                if !controller.is_running {
                    break;
                }
                controller.tick();
                if !controller.is_running {
                    // A session just completed; completion always pauses.
                    debug!("session completed, ticker exiting");
                    break;
                }
            }
        }));
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomo_ipc::SessionKind;
    use tokio::task::yield_now;
    use tokio::time::advance;

    // Let the spawned ticker observe elapsed virtual time.
    async fn settle() {
        for _ in 0..4 {
            yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_decrements_once_per_second() {
        let timer = SessionTimer::new(SessionController::new());
        timer.set_activity("write changelog").await;
        timer.start().await;
        settle().await;

        advance(Duration::from_millis(3050)).await;
        settle().await;

        let snapshot = timer.snapshot().await;
        assert!(snapshot.is_running);
        assert_eq!(snapshot.remaining_seconds, 1497);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_never_double_ticks() {
        let timer = SessionTimer::new(SessionController::new());
        timer.set_activity("triage inbox").await;
        timer.start().await;
        settle().await;

        advance(Duration::from_millis(2050)).await;
        settle().await;

        timer.start().await;
        settle().await;

        advance(Duration::from_millis(2000)).await;
        settle().await;

        let snapshot = timer.snapshot().await;
        assert_eq!(snapshot.remaining_seconds, 1496);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_halts_the_countdown() {
        let timer = SessionTimer::new(SessionController::new());
        timer.set_activity("read rfc").await;
        timer.start().await;
        settle().await;

        advance(Duration::from_millis(2050)).await;
        settle().await;
        timer.pause().await;

        advance(Duration::from_secs(10)).await;
        settle().await;

        let snapshot = timer.snapshot().await;
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.remaining_seconds, 1498);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_pauses_and_stops_the_ticker() {
        let timer = SessionTimer::new(SessionController::new());
        timer.set_activity("polish slides").await;
        timer.controller.lock().await.remaining_seconds = 2;
        timer.start().await;
        settle().await;

        // Two decrements reach zero, the third tick completes.
        advance(Duration::from_millis(3050)).await;
        settle().await;

        let snapshot = timer.snapshot().await;
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.completed_work_sessions, 1);
        assert_eq!(snapshot.kind, SessionKind::Work);
        assert_eq!(snapshot.remaining_seconds, 1500);
        assert_eq!(snapshot.completed_activities.len(), 1);

        // The ticker is gone; nothing moves until the next start.
        advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(timer.snapshot().await.remaining_seconds, 1500);
    }
}
