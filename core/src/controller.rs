//! The game controller — composition root of the progression engine.
//!
//! STARTUP ORDER (fixed):
//!   1. Load the snapshot through the persistence gateway (defaults if none)
//!   2. Offline reconciliation
//!   3. Daily login evaluation
//!   4. Start the regen ticker and the autosave ticker
//!
//! RULES:
//!   - The controller is the only owner of the snapshot. Callers get `&Snapshot`.
//!   - Every mutation goes through `&mut self`, so mutations never interleave.
//!     Hosts that share the controller across threads wrap it in a `Session`.
//!   - A regen purchase reschedules the regen ticker inside the same call.

use crate::{
    booster_economy::{self, BoosterEffect, BoosterQuote},
    clock::Clock,
    command::{CommandOutcome, PlayerCommand},
    config::{BoosterTrack, GameConfig},
    daily_login::{self, DailyLoginState},
    event::{event_type_name, GameEvent},
    offline_reconciler,
    persistence::{PersistenceGateway, SaveStore},
    regen_scheduler::RegenScheduler,
    snapshot::Snapshot,
    tap_action,
    task_tracker::{self, TaskCompleted},
    ticker::{Fire, Ticker},
    types::TASK_RECRUIT,
};
use chrono::{DateTime, Utc};

pub struct GameController {
    config:   GameConfig,
    snapshot: Snapshot,
    gateway:  PersistenceGateway,
    clock:    Box<dyn Clock>,
    regen:    RegenScheduler,
    autosave: Ticker,
    outbox:   Vec<GameEvent>,
    running:  bool,
}

impl GameController {
    /// Load, reconcile and start both tickers.
    pub fn start(config: GameConfig, store: Box<dyn SaveStore>, clock: Box<dyn Clock>) -> Self {
        let gateway = PersistenceGateway::new(store);
        let now = clock.now();

        let loaded = gateway.load(&config, now);
        let returning = loaded.is_some();
        let mut snapshot = loaded.unwrap_or_else(|| Snapshot::defaults(&config, now));
        if returning {
            snapshot.first_time = false;
        }

        let mut controller = Self {
            config,
            snapshot,
            gateway,
            clock,
            regen:    RegenScheduler::new(),
            autosave: Ticker::new("autosave"),
            outbox:   Vec::new(),
            running:  true,
        };
        controller.emit(GameEvent::SessionStarted { returning });

        if let Some(gain) = offline_reconciler::reconcile(&mut controller.snapshot, now) {
            controller.emit(GameEvent::OfflineEnergyRestored {
                elapsed_ms: gain.elapsed_ms,
                gained:     gain.gained,
            });
        }

        controller.check_daily_login();

        controller.regen.start(now, controller.snapshot.energy_regen_rate_ms);
        controller.autosave.start(now, controller.config.autosave_interval_ms);

        log::info!(
            "session started ({}): {} coins, energy {}/{}",
            if returning { "returning player" } else { "new player" },
            controller.snapshot.coins,
            controller.snapshot.energy,
            controller.snapshot.max_energy
        );
        controller
    }

    // ── Read-only view ─────────────────────────────────────────

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn can_purchase(&self, track: BoosterTrack) -> bool {
        booster_economy::can_purchase(&self.config, &self.snapshot, track)
    }

    pub fn booster_quotes(&self) -> Vec<BoosterQuote> {
        BoosterTrack::ALL
            .into_iter()
            .map(|track| booster_economy::quote(&self.config, &self.snapshot, track))
            .collect()
    }

    pub fn daily_login_state(&self) -> DailyLoginState {
        daily_login::state(&self.snapshot, self.clock.as_ref())
    }

    pub fn claimable_tasks(&self) -> Vec<&str> {
        task_tracker::claimable(&self.snapshot)
    }

    pub fn regen_period_ms(&self) -> u64 {
        self.regen.period_ms()
    }

    pub fn next_regen_due(&self) -> Option<DateTime<Utc>> {
        self.regen.next_due()
    }

    /// Hand pending display events to the caller.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ── Player operations ──────────────────────────────────────

    pub fn tap(&mut self) -> bool {
        let Some(outcome) = tap_action::tap(&mut self.snapshot) else {
            self.emit(GameEvent::TapRejected);
            return false;
        };

        self.emit(GameEvent::Tapped {
            earned:     outcome.earned,
            energy:     outcome.energy_left,
            total_taps: outcome.total_taps,
        });
        if let Some(done) = outcome.completed {
            self.task_completed(done);
            self.save();
        }
        true
    }

    /// Buy the next tier on `track`: debit, level up, apply the effect and
    /// reschedule dependent tickers, then persist.
    pub fn purchase_booster(&mut self, track: BoosterTrack) -> bool {
        let purchase = match booster_economy::purchase(&self.config, &mut self.snapshot, track) {
            Ok(purchase) => purchase,
            Err(rejected) => {
                log::debug!("{track} purchase rejected: {rejected:?}");
                return false;
            }
        };

        if let BoosterEffect::RegenRate { new_ms, .. } = purchase.effect {
            let now = self.clock.now();
            self.regen.reschedule(now, new_ms);
            self.emit(GameEvent::RegenRescheduled { period_ms: new_ms });
        }

        self.emit(GameEvent::BoosterPurchased {
            track,
            level:  purchase.level,
            cost:   purchase.cost,
            effect: purchase.effect,
        });
        if let Some(done) = purchase.completed {
            self.task_completed(done);
        }
        self.save();
        true
    }

    /// Push progress for a task. Returns true when this call completed it.
    pub fn update_task_progress(&mut self, task_id: &str, value: u64) -> bool {
        match task_tracker::update_progress(&mut self.snapshot, task_id, value) {
            Some(done) => {
                self.task_completed(done);
                self.save();
                true
            }
            None => false,
        }
    }

    /// Flip the staking opt-in and persist. Returns the new value.
    pub fn toggle_staking_notification(&mut self) -> bool {
        self.snapshot.staking_notified = !self.snapshot.staking_notified;
        let enabled = self.snapshot.staking_notified;
        self.emit(GameEvent::StakingNotificationToggled { enabled });
        self.save();
        enabled
    }

    /// A friend joined through this player's referral.
    pub fn record_referral(&mut self) -> u32 {
        let bonus = self.config.referral_bonus;
        self.snapshot.friends = self.snapshot.friends.saturating_add(1);
        self.snapshot.coins += bonus;
        self.snapshot.total_earned += bonus;
        let friends = self.snapshot.friends;
        self.emit(GameEvent::ReferralRecorded { friends, bonus });

        if let Some(done) = task_tracker::update_progress(&mut self.snapshot, TASK_RECRUIT, friends as u64) {
            self.task_completed(done);
        }
        self.save();
        friends
    }

    pub fn dismiss_tutorial(&mut self) {
        self.snapshot.first_time = false;
        self.emit(GameEvent::TutorialDismissed);
        self.save();
    }

    /// Single entry point for hosts that speak in commands.
    pub fn apply(&mut self, command: PlayerCommand) -> CommandOutcome {
        let accepted = match command {
            PlayerCommand::Tap => self.tap(),
            PlayerCommand::PurchaseBooster { track } => self.purchase_booster(track),
            PlayerCommand::UpdateTaskProgress { task_id, value } => {
                self.update_task_progress(&task_id, value)
            }
            PlayerCommand::ToggleStakingNotification => {
                self.toggle_staking_notification();
                true
            }
            PlayerCommand::RecordReferral => {
                self.record_referral();
                true
            }
            PlayerCommand::DismissTutorial => {
                self.dismiss_tutorial();
                true
            }
            PlayerCommand::Save => self.save(),
        };
        accepted.into()
    }

    // ── Time & persistence ─────────────────────────────────────

    /// Run whatever is due at the current instant: day rollover, one regen
    /// tick, autosave. Hosts call this on a short fixed interval.
    pub fn pump(&mut self) {
        if !self.running {
            return;
        }
        let now = self.clock.now();

        self.check_daily_login();

        if let Some(fire) = self.regen.poll(now) {
            self.deliver_regen(fire);
        }
        if self.autosave.poll(now).is_some() {
            self.save();
        }
    }

    /// Persist now. Safe to call at any time, any number of times.
    pub fn save(&mut self) -> bool {
        let now = self.clock.now();
        let saved = self.gateway.save(&mut self.snapshot, now);
        if saved {
            self.emit(GameEvent::SnapshotSaved { at: now });
        } else {
            self.emit(GameEvent::SaveFailed);
        }
        saved
    }

    /// Stop both tickers and write a final save.
    pub fn shutdown(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.regen.cancel();
        self.autosave.cancel();
        self.running = false;
        let saved = self.save();
        self.emit(GameEvent::SessionEnded);
        log::info!("session ended (saved: {saved})");
        saved
    }

    fn deliver_regen(&mut self, fire: Fire) {
        if self.regen.apply(&fire, &mut self.snapshot) {
            self.emit(GameEvent::EnergyRegenerated {
                energy:     self.snapshot.energy,
                max_energy: self.snapshot.max_energy,
            });
        }
    }

    fn check_daily_login(&mut self) {
        let Some(claim) = daily_login::evaluate(&mut self.snapshot, self.clock.as_ref()) else {
            return;
        };
        self.emit(GameEvent::DailyLoginClaimed { date: claim.date, streak: claim.streak });
        if let Some(done) = claim.completed {
            self.task_completed(done);
        }
        self.save();
    }

    fn task_completed(&mut self, done: TaskCompleted) {
        self.emit(GameEvent::TaskCompleted { task_id: done.task_id, reward: done.reward });
    }

    fn emit(&mut self, event: GameEvent) {
        log::debug!("event {}", event_type_name(&event));
        self.outbox.push(event);
    }
}
