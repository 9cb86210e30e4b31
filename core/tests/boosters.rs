//! Booster purchases: exact debits, tier effects, capacity grandfathering.

use chrono::{DateTime, TimeZone, Utc};
use tapforge_core::{
    booster_economy::{self, BoosterEffect, PurchaseRejected},
    clock::ManualClock,
    config::{BoosterTrack, GameConfig},
    controller::GameController,
    event::GameEvent,
    persistence::MemoryStore,
    snapshot::Snapshot,
    types::TASK_ENERGY_MASTER,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap()
}

fn with_coins(coins: u64) -> (GameConfig, Snapshot) {
    let config = GameConfig::standard();
    let mut s = Snapshot::defaults(&config, t0());
    s.coins = coins;
    (config, s)
}

#[test]
fn purchase_debits_exact_cost_and_levels_up() {
    let (config, mut s) = with_coins(1_000);

    let p = booster_economy::purchase(&config, &mut s, BoosterTrack::CoinsPerTap).unwrap();

    assert_eq!(p.cost, 200);
    assert_eq!(p.level, 1);
    assert_eq!(s.coins, 800);
    assert_eq!(s.level(BoosterTrack::CoinsPerTap), 1);
    assert_eq!(s.coins_per_tap, 2);
    assert_eq!(p.effect, BoosterEffect::CoinsPerTap { old: 1, new: 2 });
}

#[test]
fn insufficient_coins_changes_nothing() {
    let (config, mut s) = with_coins(99);
    let before = s.clone();

    let err = booster_economy::purchase(&config, &mut s, BoosterTrack::EnergyCapacity).unwrap_err();

    assert_eq!(err, PurchaseRejected::InsufficientCoins { cost: 100, coins: 99 });
    assert_eq!(s, before);
    assert!(!booster_economy::can_purchase(&config, &s, BoosterTrack::EnergyCapacity));
}

#[test]
fn max_level_rejects_without_debit() {
    let (config, mut s) = with_coins(10_000);
    for _ in 0..4 {
        booster_economy::purchase(&config, &mut s, BoosterTrack::EnergyRegen).unwrap();
    }
    assert_eq!(s.coins, 10_000 - (150 + 300 + 600 + 1200));
    assert_eq!(s.energy_regen_rate_ms, 600_000);
    let before = s.clone();

    let err = booster_economy::purchase(&config, &mut s, BoosterTrack::EnergyRegen).unwrap_err();

    assert_eq!(err, PurchaseRejected::MaxLevel { level: 4 });
    assert_eq!(s, before);
}

/// A full bar grows with the capacity.
#[test]
fn capacity_refills_a_full_bar() {
    let (config, mut s) = with_coins(100);

    let p = booster_economy::purchase(&config, &mut s, BoosterTrack::EnergyCapacity).unwrap();

    assert_eq!(s.max_energy, 150);
    assert_eq!(s.energy, 150);
    assert_eq!(p.effect, BoosterEffect::MaxEnergy { old: 100, new: 150, energy: 150 });
}

/// A partly spent bar keeps its current energy.
#[test]
fn capacity_leaves_partial_bar_unchanged() {
    let (config, mut s) = with_coins(100);
    s.energy = 60;

    booster_economy::purchase(&config, &mut s, BoosterTrack::EnergyCapacity).unwrap();

    assert_eq!(s.max_energy, 150);
    assert_eq!(s.energy, 60);
}

#[test]
fn capacity_feeds_energy_master() {
    let (config, mut s) = with_coins(10_000);
    assert_eq!(s.task(TASK_ENERGY_MASTER).unwrap().progress, 100);

    booster_economy::purchase(&config, &mut s, BoosterTrack::EnergyCapacity).unwrap();
    assert_eq!(s.task(TASK_ENERGY_MASTER).unwrap().progress, 150);

    let mut completed = None;
    for _ in 0..3 {
        let p = booster_economy::purchase(&config, &mut s, BoosterTrack::EnergyCapacity).unwrap();
        completed = completed.or(p.completed);
    }

    assert_eq!(s.max_energy, 500);
    assert_eq!(completed.map(|c| c.reward), Some(2_000));
    assert!(s.task(TASK_ENERGY_MASTER).unwrap().completed);
    assert_eq!(s.coins, 10_000 - (100 + 250 + 500 + 1000) + 2_000);
    assert_eq!(s.total_earned, 2_000);
}

#[test]
fn quote_shows_next_tier_and_price() {
    let (config, mut s) = with_coins(150);

    let q = booster_economy::quote(&config, &s, BoosterTrack::CoinsPerTap);
    assert_eq!((q.level, q.current, q.next, q.cost), (0, 1, Some(2), Some(200)));
    assert!(!q.affordable);
    assert!(!q.at_max);

    s.booster_levels.coins_per_tap = 4;
    s.normalize(&config);
    let q = booster_economy::quote(&config, &s, BoosterTrack::CoinsPerTap);
    assert_eq!((q.current, q.next, q.cost), (10, None, None));
    assert!(q.at_max);
}

/// A regen purchase through the controller moves the regen schedule and saves.
#[test]
fn controller_regen_purchase_reschedules_and_saves() {
    let clock = ManualClock::new(t0());
    let store = MemoryStore::with_payload(r#"{"coins": 1000}"#);
    let mut c = GameController::start(GameConfig::standard(), Box::new(store.clone()), Box::new(clock));
    let coins = c.snapshot().coins;
    c.drain_events();

    assert!(c.purchase_booster(BoosterTrack::EnergyRegen));

    assert_eq!(c.snapshot().coins, coins - 150);
    assert_eq!(c.regen_period_ms(), 1_500_000);
    let events = c.drain_events();
    assert!(events.contains(&GameEvent::RegenRescheduled { period_ms: 1_500_000 }));
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::BoosterPurchased { track: BoosterTrack::EnergyRegen, level: 1, cost: 150, .. }
    )));

    let saved: serde_json::Value = serde_json::from_str(&store.payload().unwrap()).unwrap();
    assert_eq!(saved["boosterLevels"]["energyRegen"], 1);
    assert_eq!(saved["energyRegenRateMs"], 1_500_000);
}

#[test]
fn controller_rejects_unaffordable_purchase() {
    let clock = ManualClock::new(t0());
    let mut c = GameController::start(GameConfig::standard(), Box::new(MemoryStore::new()), Box::new(clock));
    let before = c.snapshot().clone();

    assert!(!c.can_purchase(BoosterTrack::CoinsPerTap));
    assert!(!c.purchase_booster(BoosterTrack::CoinsPerTap));
    assert_eq!(c.snapshot(), &before);
}
