//! Regen scheduler — +1 energy per regen period while the session runs.
//!
//! Catch-up for time spent offline belongs to the offline reconciler; a
//! fire here only ever adds a single point.

use crate::{
    snapshot::Snapshot,
    ticker::{Fire, Ticker},
    types::Millis,
};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RegenScheduler {
    ticker: Ticker,
}

impl RegenScheduler {
    pub fn new() -> Self {
        Self { ticker: Ticker::new("energy_regen") }
    }

    pub fn start(&mut self, now: DateTime<Utc>, rate_ms: Millis) {
        self.ticker.start(now, rate_ms);
    }

    /// Cancel the running schedule and start over at `rate_ms`.
    pub fn reschedule(&mut self, now: DateTime<Utc>, rate_ms: Millis) {
        self.ticker.cancel();
        self.ticker.start(now, rate_ms);
    }

    pub fn cancel(&mut self) {
        self.ticker.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_active()
    }

    pub fn period_ms(&self) -> Millis {
        self.ticker.period_ms()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.ticker.next_due()
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Fire> {
        self.ticker.poll(now)
    }

    /// Apply one fire. Fires issued before the last reschedule are dropped.
    /// Returns true when energy went up.
    pub fn apply(&self, fire: &Fire, snapshot: &mut Snapshot) -> bool {
        if !self.ticker.is_current(fire) {
            log::debug!("dropping stale regen fire (gen {})", fire.generation);
            return false;
        }
        if snapshot.energy_is_full() {
            return false;
        }
        snapshot.energy += 1;
        true
    }
}

impl Default for RegenScheduler {
    fn default() -> Self { Self::new() }
}
