//! Driver configuration: line numbers, timing and storage location.
//!
//! Every field has a default matching the reference wiring, so a config file
//! only needs the values that differ:
//!
//! ```json
//! { "edge_delay_us": 150, "presets_dir": "/var/lib/segbank/presets" }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for one display bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// GPIO character device holding the three lines.
    pub gpio_chip: PathBuf,
    /// Line offset of the serial data input (SDI).
    pub data_pin: u32,
    /// Line offset of the shift clock.
    pub clock_pin: u32,
    /// Line offset of the latch enable (LE).
    pub latch_pin: u32,
    /// Hold time per clock/latch edge, in microseconds.
    pub edge_delay_us: u64,
    /// Time each display stays lit during the chase animation, in milliseconds.
    pub dwell_ms: u64,
    /// Directory holding `<name>.json` preset files.
    pub presets_dir: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            gpio_chip: PathBuf::from("/dev/gpiochip0"),
            data_pin: 10,
            clock_pin: 11,
            latch_pin: 5,
            edge_delay_us: 100,
            dwell_ms: 500,
            presets_dir: PathBuf::from("presets"),
        }
    }
}

impl DriverConfig {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to parse config JSON: {e}"),
            )
        })
    }

    /// Clock/latch edge hold time.
    pub fn edge_delay(&self) -> Duration {
        Duration::from_micros(self.edge_delay_us)
    }

    /// Chase animation dwell per display.
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }
}
