//! Real output lines through the Linux GPIO character device.
//!
//! Lines are requested as outputs driven low and released when the returned
//! protocol (and with it each [`CdevPin`]) is dropped.

use std::io;

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::{CdevPin, Delay};
use log::info;

use crate::config::DriverConfig;
use crate::wire::WireProtocol;

/// Wire protocol over character-device lines.
pub type CdevWire = WireProtocol<CdevPin, CdevPin, CdevPin, Delay>;

fn request(chip: &mut Chip, offset: u32, consumer: &str) -> io::Result<CdevPin> {
    let handle = chip
        .get_line(offset)
        .and_then(|line| line.request(LineRequestFlags::OUTPUT, 0, consumer))
        .map_err(|e| io::Error::other(format!("requesting line {offset} ({consumer}): {e}")))?;
    CdevPin::new(handle)
        .map_err(|e| io::Error::other(format!("creating pin for line {offset}: {e}")))
}

/// Open the data, clock and latch lines named in `config`.
pub fn open(config: &DriverConfig) -> io::Result<CdevWire> {
    let mut chip = Chip::new(&config.gpio_chip).map_err(|e| {
        io::Error::other(format!(
            "opening GPIO chip {}: {e}",
            config.gpio_chip.display()
        ))
    })?;

    let data = request(&mut chip, config.data_pin, "segbank-sdi")?;
    let clock = request(&mut chip, config.clock_pin, "segbank-clk")?;
    let latch = request(&mut chip, config.latch_pin, "segbank-le")?;
    info!(
        "acquired {} lines data={} clock={} latch={}",
        config.gpio_chip.display(),
        config.data_pin,
        config.clock_pin,
        config.latch_pin
    );

    Ok(WireProtocol::new(
        data,
        clock,
        latch,
        Delay,
        config.edge_delay(),
    ))
}
