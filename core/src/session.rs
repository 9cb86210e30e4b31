//! Single-writer access to a controller from many threads.
//!
//! The UI thread, the background pump and any session-end hook all go
//! through the same mutex, so a tick or an autosave can never land in the
//! middle of a tap or a purchase.

use crate::controller::GameController;
use std::{
    sync::{mpsc, Arc, Mutex},
    thread::JoinHandle,
    time::Duration,
};

#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<GameController>>,
}

impl Session {
    pub fn new(controller: GameController) -> Self {
        Self { inner: Arc::new(Mutex::new(controller)) }
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<R>(&self, f: impl FnOnce(&mut GameController) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    /// Pump the controller every `interval` on a background thread until
    /// the handle is stopped or dropped.
    pub fn spawn_pump(&self, interval: Duration) -> std::io::Result<PumpHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let session = self.clone();
        let thread = std::thread::Builder::new()
            .name("session-pump".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(mpsc::RecvTimeoutError::Timeout) => session.with(|c| c.pump()),
                    // Explicit stop or handle dropped.
                    _ => break,
                }
            })?;
        Ok(PumpHandle { stop: Some(stop_tx), thread: Some(thread) })
    }
}

pub struct PumpHandle {
    stop:   Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl PumpHandle {
    /// Stop the pump and wait for its last iteration to finish.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("session pump thread panicked");
            }
        }
    }
}

impl Drop for PumpHandle {
    fn drop(&mut self) {
        self.halt();
    }
}
