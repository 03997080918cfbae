//! Position poller
//!
//! Fixed-interval timer that drives `seek` position reports while the
//! current track plays. Armed only while there is something to report;
//! when disarmed, [`PositionPoller::tick`] never completes, so a
//! `select!` branch on it stays idle without spinning.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::trace;

/// Cancellable interval owned by the session manager
#[derive(Debug)]
pub struct PositionPoller {
    period: Duration,
    interval: Option<Interval>,
}

impl PositionPoller {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the timer; first tick one period from now
    ///
    /// No effect if already armed, so repeated play reports keep the
    /// existing cadence.
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        // Re-arm after each tick's work completes; ticks never pile up
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        trace!("Position poller armed ({:?})", self.period);
    }

    /// Disarm the timer
    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            trace!("Position poller disarmed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick (pending forever while disarmed)
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
