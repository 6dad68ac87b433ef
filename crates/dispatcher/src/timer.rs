//! Flush trigger - single-shot, resettable inactivity timer

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, Instant, Sleep};

/// Timer armed on the first event of a batch
///
/// `armed` gates whether the dispatch loop polls the timer at all, so an
/// idle loop never waits on a deadline.
#[derive(Debug)]
pub struct FlushTimer {
    delay: Duration,
    // Created on first arm, so a timer can be built outside a runtime
    sleep: Option<Pin<Box<Sleep>>>,
    armed: bool,
}

impl FlushTimer {
    /// Create a disarmed timer firing `delay` after each `arm`
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sleep: None,
            armed: false,
        }
    }

    /// Start (or restart) the countdown from now
    pub fn arm(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => sleep.as_mut().reset(Instant::now() + self.delay),
            None => self.sleep = Some(Box::pin(sleep(self.delay))),
        }
        self.armed = true;
    }

    /// Stop the countdown
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Deadline of the running countdown
    pub fn deadline(&self) -> Option<Instant> {
        if !self.armed {
            return None;
        }
        self.sleep.as_ref().map(|sleep| sleep.deadline())
    }

    /// Completes at the deadline and disarms
    ///
    /// Only poll while armed; a disarmed timer's deadline is stale and a
    /// never-armed timer never completes.
    pub async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => sleep.as_mut().await,
            None => std::future::pending::<()>().await,
        }
        self.armed = false;
    }
}
