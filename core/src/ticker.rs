//! Polled recurring timer.
//!
//! A ticker never runs code on its own. The owner polls it with the
//! current instant and acts on the `Fire` it returns, so mutation only
//! ever happens on the owner's thread, inside the owner's `&mut self`.
//!
//! Every start or cancel bumps the generation. A `Fire` carries the
//! generation it was issued under; owners drop fires from an older
//! generation, which is what makes a rate change take effect without a
//! stale tick sneaking through.

use crate::types::Millis;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fire {
    pub generation: u64,
    pub at:         DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Ticker {
    name:       &'static str,
    period_ms:  Millis,
    next_due:   Option<DateTime<Utc>>,
    generation: u64,
}

impl Ticker {
    pub fn new(name: &'static str) -> Self {
        Self { name, period_ms: 0, next_due: None, generation: 0 }
    }

    /// (Re)start with a new period. Any schedule in flight is discarded.
    pub fn start(&mut self, now: DateTime<Utc>, period_ms: Millis) {
        self.generation += 1;
        self.period_ms = period_ms.max(1);
        self.next_due = Some(now + period(self.period_ms));
        log::debug!("ticker {} started: every {}ms (gen {})", self.name, self.period_ms, self.generation);
    }

    pub fn cancel(&mut self) {
        if self.next_due.take().is_some() {
            self.generation += 1;
            log::debug!("ticker {} cancelled (gen {})", self.name, self.generation);
        }
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn period_ms(&self) -> Millis {
        self.period_ms
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    /// Fire at most once. When several periods were missed (the host
    /// stalled) they collapse into this single fire and the schedule
    /// re-anchors on `now`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Fire> {
        let due = self.next_due?;
        if now < due {
            return None;
        }

        let mut next = due + period(self.period_ms);
        if next <= now {
            next = now + period(self.period_ms);
        }
        self.next_due = Some(next);

        Some(Fire { generation: self.generation, at: now })
    }

    /// True when `fire` was issued under the current schedule.
    pub fn is_current(&self, fire: &Fire) -> bool {
        self.is_active() && fire.generation == self.generation
    }
}

fn period(ms: Millis) -> Duration {
    Duration::milliseconds(ms.min(i64::MAX as u64) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn fires_once_per_period() {
        let mut ticker = Ticker::new("test");
        ticker.start(t0(), 1_000);

        assert!(ticker.poll(t0() + Duration::milliseconds(999)).is_none());
        assert!(ticker.poll(t0() + Duration::milliseconds(1_000)).is_some());
        assert!(ticker.poll(t0() + Duration::milliseconds(1_500)).is_none());
        assert!(ticker.poll(t0() + Duration::milliseconds(2_000)).is_some());
    }

    #[test]
    fn missed_periods_collapse_into_one_fire() {
        let mut ticker = Ticker::new("test");
        ticker.start(t0(), 1_000);

        let late = t0() + Duration::milliseconds(10_500);
        assert!(ticker.poll(late).is_some());
        assert!(ticker.poll(late).is_none());
        assert_eq!(ticker.next_due(), Some(late + Duration::milliseconds(1_000)));
    }

    #[test]
    fn restart_invalidates_earlier_fires() {
        let mut ticker = Ticker::new("test");
        ticker.start(t0(), 1_000);
        let fire = ticker.poll(t0() + Duration::seconds(1)).unwrap();
        assert!(ticker.is_current(&fire));

        ticker.start(t0() + Duration::seconds(1), 500);
        assert!(!ticker.is_current(&fire));
    }

    #[test]
    fn cancelled_ticker_never_fires() {
        let mut ticker = Ticker::new("test");
        ticker.start(t0(), 1_000);
        ticker.cancel();
        assert!(!ticker.is_active());
        assert!(ticker.poll(t0() + Duration::hours(1)).is_none());
    }
}
