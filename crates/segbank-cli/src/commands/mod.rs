pub mod apply;
pub mod blank;
pub mod chase;
pub mod console;
pub mod presets;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use segbank_core::bank::DynRegister;
use segbank_core::sim::SimLines;
use segbank_core::{DriverConfig, PresetStore, SegmentBank};

use crate::GlobalArgs;

/// Load the config file (if any) and apply command-line overrides.
pub fn resolve_config(args: &GlobalArgs) -> DriverConfig {
    let mut config = match args.config.as_deref() {
        Some(path) => DriverConfig::load(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Error loading config {path}: {e}");
            std::process::exit(1);
        }),
        None => DriverConfig::default(),
    };
    if let Some(dir) = &args.presets_dir {
        config.presets_dir = PathBuf::from(dir);
    }
    if let Some(us) = args.edge_delay_us {
        config.edge_delay_us = us;
    }
    if let Some(ms) = args.dwell_ms {
        config.dwell_ms = ms;
    }
    config
}

/// Open the shift-register chain: GPIO lines, or simulated lines for a dry run.
pub fn open_register(config: &DriverConfig, dry_run: bool) -> DynRegister {
    if dry_run {
        log::info!("dry run: driving simulated lines");
        return simulated(config);
    }
    open_gpio(config)
}

fn simulated(config: &DriverConfig) -> DynRegister {
    Box::new(SimLines::new().protocol(config.edge_delay()))
}

#[cfg(feature = "cdev")]
fn open_gpio(config: &DriverConfig) -> DynRegister {
    match segbank_core::cdev::open(config) {
        Ok(wire) => Box::new(wire),
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: pass --dry-run to drive simulated lines instead.");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "cdev"))]
fn open_gpio(config: &DriverConfig) -> DynRegister {
    log::warn!("built without the `cdev` feature; driving simulated lines");
    simulated(config)
}

pub fn make_bank(config: &DriverConfig, dry_run: bool) -> SegmentBank {
    let register = open_register(config, dry_run);
    SegmentBank::open(config, register).unwrap_or_else(|e| {
        eprintln!(
            "Error opening preset directory {}: {e}",
            config.presets_dir.display()
        );
        std::process::exit(1);
    })
}

pub fn open_store(config: &DriverConfig) -> PresetStore {
    PresetStore::open(&config.presets_dir).unwrap_or_else(|e| {
        eprintln!(
            "Error opening preset directory {}: {e}",
            config.presets_dir.display()
        );
        std::process::exit(1);
    })
}

/// Flag cleared by Ctrl+C.
pub fn interrupt_flag() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .unwrap_or_else(|e| {
        eprintln!("Error installing Ctrl+C handler: {e}");
        std::process::exit(1);
    });
    running
}

/// Sleep in short slices until `running` clears or `limit` elapses.
pub fn hold(running: &AtomicBool, limit: Option<Duration>) {
    let start = std::time::Instant::now();
    while running.load(Ordering::SeqCst) {
        if limit.is_some_and(|l| start.elapsed() >= l) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Parse "500ms", "30s", "5m", "1h" or a bare number of seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();

    let (numeric, multiplier) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 1u64)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1000)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60_000)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3_600_000)
    } else {
        (s, 1000)
    };

    let value: u64 = numeric.trim().parse().ok()?;
    Some(Duration::from_millis(value.checked_mul(multiplier)?))
}
