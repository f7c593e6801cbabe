//! Navigation pacing
//!
//! Every navigation, from any browsing context, takes a turn from the same
//! `Pacer`. Turns are handed out at most once per `min_interval`, so running
//! branches concurrently never raises the request rate seen by the site.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Shared minimum spacing between navigations
///
/// Cloning a pacer yields a handle to the same schedule.
#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,

    /// When the previous turn was granted
    last_turn: Arc<Mutex<Option<Instant>>>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_turn: Arc::new(Mutex::new(None)),
        }
    }

    /// A pacer that never waits
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits until a navigation may start, then claims the turn
    ///
    /// Callers are served one at a time; a waiting caller holds the schedule
    /// so later callers queue behind it.
    pub async fn wait_turn(&self) {
        let mut last_turn = self.last_turn.lock().await;

        if let Some(previous) = *last_turn {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    "Pacing: waiting {:?} before next navigation",
                    ready_at - Instant::now()
                );
                sleep_until(ready_at).await;
            }
        }

        *last_turn = Some(Instant::now());
    }
}
