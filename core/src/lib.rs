//! Progression engine for a tap-to-earn game.
//!
//! The `controller` module is the composition root; everything else is a
//! component it wires together. Display layers only ever see a shared
//! reference to the owned `Snapshot`.

pub mod booster_economy;
pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod daily_login;
pub mod error;
pub mod event;
pub mod offline_reconciler;
pub mod persistence;
pub mod regen_scheduler;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod tap_action;
pub mod task_tracker;
pub mod ticker;
pub mod types;
