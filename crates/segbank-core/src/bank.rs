//! Caller-facing facade over the whole display bank.
//!
//! Architecture:
//! 1. [`Panel`] pairs the grid with the chain serializer behind one mutex, so
//!    a mutation and the refresh that follows it are one atomic step
//! 2. The chase thread and the caller share that mutex and nothing else
//! 3. Presets live beside, not inside, the lock: disk I/O never blocks a frame
//! 4. Dropping the bank stops the chase and blanks the display

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{error, warn};

use crate::animation::{AnimationState, ChaseAnimation};
use crate::chain::ChainSerializer;
use crate::config::DriverConfig;
use crate::grid::{Matrix, SegmentGrid};
use crate::preset::PresetStore;
use crate::wire::ShiftRegister;

/// Boxed register so one panel type fits every line backend.
pub type DynRegister = Box<dyn ShiftRegister + Send>;

/// Grid plus the serializer that displays it.
pub struct Panel {
    grid: SegmentGrid,
    chain: ChainSerializer<DynRegister>,
}

impl Panel {
    /// Blank grid driving `register`. Nothing is sent until the first refresh.
    pub fn new<R: ShiftRegister + Send + 'static>(register: R) -> Self {
        Self {
            grid: SegmentGrid::new(),
            chain: ChainSerializer::new(Box::new(register)),
        }
    }

    pub fn grid(&self) -> &SegmentGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut SegmentGrid {
        &mut self.grid
    }

    /// Send the current grid to the wire.
    pub fn refresh(&mut self) -> io::Result<()> {
        self.chain.refresh(&self.grid)
    }

    /// Blank the wire without touching the grid.
    pub fn blank(&mut self) -> io::Result<()> {
        self.chain.blank()
    }

    /// Frames latched so far.
    pub fn frames(&self) -> u64 {
        self.chain.frames()
    }
}

/// Lock a shared panel. A poisoned lock is taken over: the grid is plain
/// data and always a valid 15×24 matrix.
pub(crate) fn lock_panel(panel: &Mutex<Panel>) -> MutexGuard<'_, Panel> {
    panel.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The display bank: grid, wire, presets and chase animation.
pub struct SegmentBank {
    panel: Arc<Mutex<Panel>>,
    presets: PresetStore,
    animation: ChaseAnimation,
}

impl SegmentBank {
    /// Build a bank from `config`, opening its preset directory.
    pub fn open<R: ShiftRegister + Send + 'static>(
        config: &DriverConfig,
        register: R,
    ) -> io::Result<Self> {
        let presets = PresetStore::open(&config.presets_dir)?;
        Ok(Self::new(register, presets, config.dwell()))
    }

    pub fn new<R: ShiftRegister + Send + 'static>(
        register: R,
        presets: PresetStore,
        dwell: Duration,
    ) -> Self {
        let panel = Arc::new(Mutex::new(Panel::new(register)));
        let animation = ChaseAnimation::new(Arc::clone(&panel), dwell);
        Self {
            panel,
            presets,
            animation,
        }
    }

    fn panel(&self) -> MutexGuard<'_, Panel> {
        lock_panel(&self.panel)
    }

    /// Run `f` on the grid and refresh, all under one lock.
    fn update<F>(&self, what: &str, f: F) -> bool
    where
        F: FnOnce(&mut SegmentGrid) -> Result<(), crate::grid::GridError>,
    {
        let mut panel = self.panel();
        if let Err(e) = f(panel.grid_mut()) {
            warn!("{what} rejected: {e}");
            return false;
        }
        match panel.refresh() {
            Ok(()) => true,
            Err(e) => {
                error!("{what}: refresh failed: {e}");
                false
            }
        }
    }

    /// Flip one segment and redraw. `false` for a bad index or wire fault.
    pub fn toggle_segment(&self, board: usize, segment: usize) -> bool {
        self.update("toggle", |grid| grid.toggle(board, segment))
    }

    /// Set one segment and redraw.
    pub fn set_segment(&self, board: usize, segment: usize, on: bool) -> bool {
        self.update("set", |grid| grid.set(board, segment, on))
    }

    /// Switch a whole display and redraw. Unknown display numbers do nothing
    /// but still redraw.
    pub fn set_display(&self, board: usize, display: u8, on: bool) -> bool {
        self.update("set display", |grid| grid.set_display(board, display, on))
    }

    /// Zero the grid and blank the wire.
    pub fn clear_all(&self) -> bool {
        let mut panel = self.panel();
        panel.grid_mut().clear_all();
        match panel.blank() {
            Ok(()) => true,
            Err(e) => {
                error!("clear: blank failed: {e}");
                false
            }
        }
    }

    /// Redraw the current grid.
    pub fn refresh(&self) -> io::Result<()> {
        self.panel().refresh()
    }

    /// Copy of the current grid.
    pub fn grid_state(&self) -> Matrix {
        self.panel().grid().snapshot()
    }

    /// Save the current grid as `name`.
    pub fn save_preset(&self, name: &str) -> bool {
        let snapshot = self.grid_state();
        self.presets.save(name, &snapshot).is_ok()
    }

    /// Load `name` onto the grid (clamped to 15×24) and redraw.
    ///
    /// Returns the resulting grid. A missing preset is `ErrorKind::NotFound`,
    /// an undecodable one `ErrorKind::InvalidData`; the grid is untouched in
    /// both cases.
    pub fn load_preset(&self, name: &str) -> io::Result<Matrix> {
        let matrix = self.presets.load(name)?;
        let mut panel = self.panel();
        panel.grid_mut().restore(&matrix);
        panel.refresh().inspect_err(|e| error!("load: refresh failed: {e}"))?;
        Ok(panel.grid().snapshot())
    }

    /// Delete preset `name`. `false` if it did not exist or could not be removed.
    pub fn delete_preset(&self, name: &str) -> bool {
        self.presets.delete(name).is_ok()
    }

    /// Preset names, sorted.
    pub fn list_presets(&self) -> Vec<String> {
        self.presets.list()
    }

    /// Preset store backing this bank.
    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    /// Preset directory.
    pub fn presets_dir(&self) -> &Path {
        self.presets.dir()
    }

    /// Start the chase. `false` if it was already running.
    pub fn start_animation(&self) -> bool {
        self.animation.start()
    }

    /// Stop the chase and wait until the display is blank.
    pub fn stop_animation(&self) -> bool {
        self.animation.stop()
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animation.state()
    }

    /// Frames latched so far.
    pub fn frames(&self) -> u64 {
        self.panel().frames()
    }

    /// Stop the chase, zero the grid and blank the wire. Best effort; errors
    /// are logged.
    pub fn shutdown(&self) {
        self.animation.stop();
        let mut panel = self.panel();
        panel.grid_mut().clear_all();
        if let Err(e) = panel.blank() {
            error!("shutdown: blank failed: {e}");
        }
    }
}

impl Drop for SegmentBank {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
