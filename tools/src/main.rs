//! session-runner: headless host for the tap-to-earn progression engine.
//!
//! Usage:
//!   session-runner --db progress.db --player alice --taps 25
//!   session-runner --save-file save.json --ipc-mode
//!
//! In IPC mode, each stdin line is a JSON request and each reply is one
//! JSON line on stdout:
//!   {"type":"get_state"}
//!   {"type":"command","command":{"cmd":"purchase_booster","track":"coinsPerTap"}}
//!   {"type":"quit"}

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tapforge_core::{
    booster_economy::BoosterQuote,
    clock::SystemClock,
    command::PlayerCommand,
    config::GameConfig,
    controller::GameController,
    event::GameEvent,
    persistence::{FileStore, SaveStore},
    session::Session,
    snapshot::Snapshot,
    store::SqliteStore,
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Command { command: PlayerCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    accepted: Option<bool>,
    snapshot: Snapshot,
    boosters: Vec<BoosterQuote>,
    claimable_tasks: Vec<String>,
    events: Vec<GameEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let taps = parse_arg(&args, "--taps", 0u64);
    let pump_ms = parse_arg(&args, "--pump-ms", 250u64);
    let player = arg_value(&args, "--player")
        .map(str::to_string)
        .unwrap_or_else(|| format!("player-{}", uuid::Uuid::new_v4()));

    let config = match arg_value(&args, "--config") {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::standard(),
    };

    let store: Box<dyn SaveStore> = match arg_value(&args, "--save-file") {
        Some(path) => Box::new(FileStore::new(path)),
        None => {
            let db = arg_value(&args, "--db").unwrap_or("tapforge.db");
            let store = SqliteStore::open(db, player.clone())?;
            store.migrate()?;
            Box::new(store)
        }
    };

    if !ipc_mode {
        println!("tapforge — session-runner");
        println!("  player:  {player}");
        println!("  store:   {}", store.name());
        println!();
    }

    let controller = GameController::start(config, store, Box::new(SystemClock));

    if ipc_mode {
        run_ipc_loop(Session::new(controller), Duration::from_millis(pump_ms))?;
    } else {
        run_summary(controller, taps);
    }
    Ok(())
}

fn run_ipc_loop(session: Session, pump_interval: Duration) -> Result<()> {
    let pump = session.spawn_pump(pump_interval)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("bad ipc request: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let state = match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => session.with(|c| build_ui_state(c, None)),
            IpcRequest::Command { command } => session.with(|c| {
                let outcome = c.apply(command);
                build_ui_state(c, Some(outcome.accepted))
            }),
        };
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }

    // stdin closed or quit: stop ticking, then the session-end save.
    pump.stop();
    session.with(|c| c.shutdown());
    log::info!("ipc session closed");
    Ok(())
}

fn build_ui_state(controller: &mut GameController, accepted: Option<bool>) -> UiState {
    UiState {
        accepted,
        snapshot: controller.snapshot().clone(),
        boosters: controller.booster_quotes(),
        claimable_tasks: controller.claimable_tasks().into_iter().map(str::to_string).collect(),
        events: controller.drain_events(),
    }
}

fn run_summary(mut controller: GameController, taps: u64) {
    let mut landed = 0u64;
    for _ in 0..taps {
        if !controller.tap() {
            break;
        }
        landed += 1;
    }
    controller.shutdown();

    for event in controller.drain_events() {
        match event {
            GameEvent::OfflineEnergyRestored { elapsed_ms, gained } => {
                println!("  offline {}m: +{gained} energy", elapsed_ms / 60_000);
            }
            GameEvent::DailyLoginClaimed { date, streak } => {
                println!("  daily login {date} (streak {streak})");
            }
            GameEvent::TaskCompleted { task_id, reward } => {
                println!("  task {task_id} completed: +{reward}");
            }
            _ => {}
        }
    }

    let s = controller.snapshot();
    println!();
    println!("=== SESSION SUMMARY ===");
    println!("  taps landed:    {landed}/{taps}");
    println!("  coins:          {}", s.coins);
    println!("  energy:         {}/{}", s.energy, s.max_energy);
    println!("  coins per tap:  {}", s.coins_per_tap);
    println!("  regen:          {}m per energy", s.energy_regen_rate_ms / 60_000);
    println!("  total earned:   {}", s.total_earned);
    println!("  total taps:     {}", s.total_taps);
    println!("  streak:         {}", s.streak_count);

    println!();
    println!("=== BOOSTERS ===");
    for q in controller.booster_quotes() {
        match q.cost {
            Some(cost) => println!(
                "  {:<15} lvl {}  {} -> {}  cost {cost}{}",
                q.track.as_str(),
                q.level,
                q.current,
                q.next.unwrap_or(q.current),
                if q.affordable { "  (affordable)" } else { "" }
            ),
            None => println!("  {:<15} lvl {}  {}  MAX", q.track.as_str(), q.level, q.current),
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
