//! Live regeneration: one energy per period, rescheduled on rate changes.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tapforge_core::{
    clock::ManualClock,
    config::{BoosterTrack, GameConfig},
    controller::GameController,
    event::GameEvent,
    persistence::MemoryStore,
    regen_scheduler::RegenScheduler,
    snapshot::Snapshot,
};

const R: i64 = 1_800_000;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap()
}

fn start(payload: Option<&str>) -> (ManualClock, GameController) {
    let clock = ManualClock::new(t0());
    let store = match payload {
        Some(p) => MemoryStore::with_payload(p),
        None => MemoryStore::new(),
    };
    let mut c = GameController::start(GameConfig::standard(), Box::new(store), Box::new(clock.clone()));
    c.drain_events();
    (clock, c)
}

#[test]
fn one_energy_per_period() {
    let (clock, mut c) = start(None);
    for _ in 0..3 {
        c.tap();
    }

    clock.advance_ms(R - 1);
    c.pump();
    assert_eq!(c.snapshot().energy, 97);

    clock.advance_ms(1);
    c.pump();
    assert_eq!(c.snapshot().energy, 98);

    clock.advance_ms(R);
    c.pump();
    assert_eq!(c.snapshot().energy, 99);
    assert!(c.drain_events().contains(&GameEvent::EnergyRegenerated { energy: 99, max_energy: 100 }));
}

/// A stalled host gets one point, not a burst.
#[test]
fn missed_periods_do_not_batch() {
    let (clock, mut c) = start(Some(r#"{"energy": 10}"#));

    clock.advance_ms(5 * R);
    c.pump();
    c.pump();

    assert_eq!(c.snapshot().energy, 11);
}

#[test]
fn full_bar_stays_full() {
    let (clock, mut c) = start(None);

    clock.advance_ms(R);
    c.pump();

    assert_eq!(c.snapshot().energy, 100);
    assert!(!c
        .drain_events()
        .iter()
        .any(|e| matches!(e, GameEvent::EnergyRegenerated { .. })));
}

/// After a regen upgrade, nothing fires at the old period's boundary.
#[test]
fn rate_change_mid_period_leaves_no_stale_tick() {
    let (clock, mut c) = start(Some(r#"{"coins": 1000, "energy": 50}"#));

    clock.advance(Duration::minutes(29));
    c.pump();
    assert!(c.purchase_booster(BoosterTrack::EnergyRegen));
    assert_eq!(c.next_regen_due(), Some(t0() + Duration::minutes(54)));

    // Old boundary.
    clock.advance(Duration::minutes(1));
    c.pump();
    assert_eq!(c.snapshot().energy, 50);

    clock.advance(Duration::minutes(24));
    c.pump();
    assert_eq!(c.snapshot().energy, 51);
}

#[test]
fn fire_from_before_a_reschedule_is_dropped() {
    let config = GameConfig::standard();
    let mut s = Snapshot::defaults(&config, t0());
    s.energy = 20;
    let mut regen = RegenScheduler::new();
    regen.start(t0(), R as u64);

    let stale = regen.poll(t0() + Duration::milliseconds(R)).unwrap();
    regen.reschedule(t0() + Duration::milliseconds(R), 1_500_000);

    assert!(!regen.apply(&stale, &mut s));
    assert_eq!(s.energy, 20);

    let fresh = regen.poll(t0() + Duration::milliseconds(R + 1_500_000)).unwrap();
    assert!(regen.apply(&fresh, &mut s));
    assert_eq!(s.energy, 21);
}

#[test]
fn shutdown_stops_regeneration() {
    let (clock, mut c) = start(Some(r#"{"energy": 10}"#));

    assert!(c.shutdown());
    assert!(!c.is_running());
    assert!(c.next_regen_due().is_none());

    clock.advance_ms(3 * R);
    c.pump();
    assert_eq!(c.snapshot().energy, 10);
    assert!(!c.shutdown());
}
