//! Chase animation: one display lit at a time, sweeping the bank.
//!
//! States: Idle --start--> Running --stop--> Idle. The sweep runs on its own
//! thread and walks [`chain_order`] forever. Each step clears the grid, lights
//! one display, refreshes and dwells. Cancellation is checked between steps,
//! never during the dwell. When the loop ends the grid is cleared and one last
//! blank frame is sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};

use crate::bank::{Panel, lock_panel};
use crate::wiring::{chain_order, physical_to_chain};

/// Whether the chase loop is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Running,
}

impl std::fmt::Display for AnimationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
        }
    }
}

struct Worker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Owner of the chase thread.
pub struct ChaseAnimation {
    panel: Arc<Mutex<Panel>>,
    dwell: Duration,
    worker: Mutex<Option<Worker>>,
}

impl ChaseAnimation {
    pub fn new(panel: Arc<Mutex<Panel>>, dwell: Duration) -> Self {
        Self {
            panel,
            dwell,
            worker: Mutex::new(None),
        }
    }

    fn worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Dwell per display.
    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    /// Current state. A loop that ended on its own (wire fault) reads as Idle.
    pub fn state(&self) -> AnimationState {
        match self.worker().as_ref() {
            Some(w) if !w.handle.is_finished() => AnimationState::Running,
            _ => AnimationState::Idle,
        }
    }

    /// Start the sweep. Returns `false` if it was already running.
    pub fn start(&self) -> bool {
        let mut slot = self.worker();
        if let Some(w) = slot.as_ref()
            && !w.handle.is_finished()
        {
            debug!("chase already running");
            return false;
        }
        if let Some(stale) = slot.take() {
            reap(stale.handle);
        }

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let panel = Arc::clone(&self.panel);
        let dwell = self.dwell;
        let handle = thread::spawn(move || run_chase(&panel, dwell, &flag));

        info!("chase started (dwell {}ms)", dwell.as_millis());
        *slot = Some(Worker { running, handle });
        true
    }

    /// Stop the sweep and wait for the blanking frame. Returns `false` if it
    /// was not running.
    pub fn stop(&self) -> bool {
        let mut slot = self.worker();
        let Some(worker) = slot.take() else {
            return false;
        };
        let was_running = !worker.handle.is_finished();
        worker.running.store(false, Ordering::SeqCst);
        if worker.handle.join().is_err() {
            error!("chase thread panicked; blanking from caller");
            let mut panel = lock_panel(&self.panel);
            panel.grid_mut().clear_all();
            if let Err(e) = panel.refresh() {
                error!("final blank failed: {e}");
            }
        }
        info!("chase stopped");
        was_running
    }
}

impl Drop for ChaseAnimation {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reap(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!("previous chase thread panicked");
    }
}

/// The sweep itself. Returns once `running` is cleared or the wire fails.
fn run_chase(panel: &Mutex<Panel>, dwell: Duration, running: &AtomicBool) {
    'sweep: while running.load(Ordering::SeqCst) {
        for (physical, display) in chain_order() {
            if !running.load(Ordering::SeqCst) {
                break 'sweep;
            }
            let Some(board) = physical_to_chain(physical) else {
                debug!("no chain index for board {physical}, skipping");
                continue;
            };

            let frame = {
                let mut panel = lock_panel(panel);
                panel.grid_mut().clear_all();
                if let Err(e) = panel.grid_mut().set_display(board, display, true) {
                    debug!("skipping board {physical}: {e}");
                    continue;
                }
                panel.refresh()
            };
            if let Err(e) = frame {
                error!("chase aborted on board {physical} display {display}: {e}");
                break 'sweep;
            }
            thread::sleep(dwell);
        }
    }

    let mut panel = lock_panel(panel);
    panel.grid_mut().clear_all();
    if let Err(e) = panel.refresh() {
        error!("final blank failed: {e}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
