//! Payment countdown
//!
//! A pending booking shows how long the customer has left to pay. The countdown
//! is display-only: reaching zero does not change the booking's status.

use std::{fmt, time::Duration};

use thiserror::Error;
use tokio::{
    runtime::{Handle, TryCurrentError},
    sync::watch,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Default time a customer has to complete payment.
pub const PAYMENT_WINDOW: Duration = Duration::from_secs(900);

/// Interval between countdown ticks.
pub const TICK: Duration = Duration::from_secs(1);

/// Errors raised when starting a countdown task.
#[derive(Debug, Error)]
pub enum CountdownError {
    /// No Tokio runtime is available to drive the countdown.
    #[error("no async runtime available to run the payment countdown")]
    NoRuntime(#[from] TryCurrentError),
}

/// Seconds left to pay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
}

impl Countdown {
    /// Start a countdown over `window`, truncated to whole seconds.
    pub fn new(window: Duration) -> Self {
        Self {
            remaining: window.as_secs(),
        }
    }

    /// Seconds remaining.
    pub fn remaining(self) -> u64 {
        self.remaining
    }

    /// Whether the countdown has reached zero.
    pub fn is_elapsed(self) -> bool {
        self.remaining == 0
    }

    /// Advance one second. Stays at zero once elapsed.
    pub fn tick(&mut self) -> u64 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(PAYMENT_WINDOW)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

/// A countdown running on the Tokio runtime.
///
/// The remaining seconds are published on a watch channel once per [`TICK`]. The
/// task is aborted when [`CountdownTask::stop`] is called or the handle is dropped.
#[derive(Debug)]
pub struct CountdownTask {
    receiver: watch::Receiver<u64>,
    handle: JoinHandle<()>,
}

impl CountdownTask {
    /// Spawn a countdown over `window` on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CountdownError::NoRuntime`] when called outside a Tokio runtime.
    pub fn start(window: Duration) -> Result<Self, CountdownError> {
        let runtime = Handle::try_current()?;
        let mut countdown = Countdown::new(window);
        let (sender, receiver) = watch::channel(countdown.remaining());

        let handle = runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while !countdown.is_elapsed() {
                interval.tick().await;

                if sender.send(countdown.tick()).is_err() {
                    return;
                }
            }

            debug!("payment countdown elapsed");
        });

        Ok(Self { receiver, handle })
    }

    /// Subscribe to the remaining seconds.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.receiver.clone()
    }

    /// Seconds remaining, as last published.
    pub fn remaining(&self) -> u64 {
        *self.receiver.borrow()
    }

    /// Whether the countdown is still ticking.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop ticking and release the task.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for CountdownTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn tick_saturates_at_zero() {
        let mut countdown = Countdown::new(Duration::from_secs(2));

        assert_eq!(countdown.tick(), 1);
        assert_eq!(countdown.tick(), 0);
        assert_eq!(countdown.tick(), 0);
        assert!(countdown.is_elapsed());
    }

    #[test]
    fn renders_minutes_and_seconds() {
        assert_eq!(Countdown::default().to_string(), "15:00");
        assert_eq!(Countdown::new(Duration::from_secs(61)).to_string(), "01:01");
        assert_eq!(Countdown::new(Duration::ZERO).to_string(), "00:00");
    }

    #[test]
    fn start_outside_runtime_errors() {
        let result = CountdownTask::start(PAYMENT_WINDOW);

        assert!(matches!(result, Err(CountdownError::NoRuntime(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_to_zero_and_finishes() -> TestResult {
        let task = CountdownTask::start(Duration::from_secs(3))?;
        let mut receiver = task.subscribe();
        let mut seen = Vec::new();

        while receiver.changed().await.is_ok() {
            seen.push(*receiver.borrow_and_update());
        }

        assert_eq!(seen.last(), Some(&0));
        assert!(seen.windows(2).all(|pair| matches!(pair, [a, b] if a > b)));
        assert!(!task.is_running());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn stop_releases_the_timer() -> TestResult {
        let task = CountdownTask::start(PAYMENT_WINDOW)?;
        let mut receiver = task.subscribe();

        task.stop();

        assert!(receiver.changed().await.is_err());
        assert_eq!(*receiver.borrow(), 900);

        Ok(())
    }
}
