//! Bit-level protocol for the shift-register chain.
//!
//! Three output lines: data (SDI), clock and latch (LE). A word is clocked in
//! most-significant bit first; each clock and latch pulse is held high for one
//! edge delay and low for one edge delay.

use std::io;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Default hold time per clock/latch edge.
pub const DEFAULT_EDGE_DELAY: Duration = Duration::from_micros(100);

/// Bits per shifted word.
pub const WORD_BITS: u32 = 16;

/// Anything that can accept 16-bit words and latch them.
///
/// [`WireProtocol`] implements this over real or simulated pins; tests use
/// recorders that capture the words directly.
pub trait ShiftRegister {
    /// Clock one word into the chain, MSB first.
    fn shift_word(&mut self, word: u16) -> io::Result<()>;

    /// Pulse the latch line, moving shifted bits to the outputs.
    fn latch(&mut self) -> io::Result<()>;
}

impl<R: ShiftRegister + ?Sized> ShiftRegister for Box<R> {
    fn shift_word(&mut self, word: u16) -> io::Result<()> {
        (**self).shift_word(word)
    }

    fn latch(&mut self) -> io::Result<()> {
        (**self).latch()
    }
}

/// Pin-level driver for the data/clock/latch lines.
///
/// Every edge, rising and falling, is followed by one edge delay, so a bit
/// costs two delays and a 16-bit word 32. Drivers that hold only while the
/// line is high spend half that; halve `edge_delay` to match their throughput.
pub struct WireProtocol<D, C, L, T> {
    data: D,
    clock: C,
    latch: L,
    delay: T,
    edge_delay_ns: u32,
}

impl<D, C, L, T> WireProtocol<D, C, L, T>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
    T: DelayNs,
{
    /// Wrap three output lines and a delay source.
    ///
    /// `edge_delay` saturates at `u32::MAX` nanoseconds (about 4.29 s).
    pub fn new(data: D, clock: C, latch: L, delay: T, edge_delay: Duration) -> Self {
        let edge_delay_ns = u32::try_from(edge_delay.as_nanos()).unwrap_or(u32::MAX);
        Self {
            data,
            clock,
            latch,
            delay,
            edge_delay_ns,
        }
    }

    /// Edge hold time in nanoseconds.
    pub fn edge_delay_ns(&self) -> u32 {
        self.edge_delay_ns
    }

    /// Give the lines back, e.g. to release them.
    pub fn release(self) -> (D, C, L, T) {
        (self.data, self.clock, self.latch, self.delay)
    }

    fn hold(&mut self) {
        if self.edge_delay_ns > 0 {
            self.delay.delay_ns(self.edge_delay_ns);
        }
    }
}

fn pin_fault<E: std::fmt::Debug>(line: &str) -> impl FnOnce(E) -> io::Error + '_ {
    move |e| io::Error::other(format!("{line} line fault: {e:?}"))
}

impl<D, C, L, T> ShiftRegister for WireProtocol<D, C, L, T>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
    T: DelayNs,
{
    fn shift_word(&mut self, word: u16) -> io::Result<()> {
        for bit in (0..WORD_BITS).rev() {
            let high = word & (1 << bit) != 0;
            if high {
                self.data.set_high().map_err(pin_fault("data"))?;
            } else {
                self.data.set_low().map_err(pin_fault("data"))?;
            }
            self.clock.set_high().map_err(pin_fault("clock"))?;
            self.hold();
            self.clock.set_low().map_err(pin_fault("clock"))?;
            self.hold();
        }
        Ok(())
    }

    fn latch(&mut self) -> io::Result<()> {
        self.latch.set_high().map_err(pin_fault("latch"))?;
        self.hold();
        self.latch.set_low().map_err(pin_fault("latch"))?;
        self.hold();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Line, SimLines};

    #[test]
    fn test_shift_word_is_msb_first() {
        let lines = SimLines::new();
        let mut wire = lines.protocol(Duration::ZERO);
        wire.shift_word(0b1000_0000_0000_0011).unwrap();

        let bits = lines.clocked_bits();
        assert_eq!(bits.len(), 16);
        assert!(bits[0]);
        assert!(bits[1..14].iter().all(|&b| !b));
        assert!(bits[14]);
        assert!(bits[15]);
    }

    #[test]
    fn test_shift_word_pulses_clock_sixteen_times() {
        let lines = SimLines::new();
        let mut wire = lines.protocol(Duration::ZERO);
        wire.shift_word(0xA5A5).unwrap();
        assert_eq!(lines.rising_edges(Line::Clock), 16);
        assert_eq!(lines.rising_edges(Line::Latch), 0);
        assert!(!lines.level(Line::Clock));
    }

    #[test]
    fn test_latch_pulses_once_and_returns_low() {
        let lines = SimLines::new();
        let mut wire = lines.protocol(Duration::ZERO);
        wire.latch().unwrap();
        assert_eq!(lines.rising_edges(Line::Latch), 1);
        assert!(!lines.level(Line::Latch));
        assert_eq!(lines.rising_edges(Line::Clock), 0);
    }

    #[test]
    fn test_edge_delay_applied_per_edge() {
        let lines = SimLines::new();
        let mut wire = lines.protocol(Duration::from_micros(100));
        wire.shift_word(0).unwrap();
        wire.latch().unwrap();
        // 16 bits × 2 edges + 2 latch edges
        assert_eq!(lines.total_delay(), Duration::from_micros(100) * 34);
    }

    #[test]
    fn test_zero_edge_delay_skips_sleeping() {
        let lines = SimLines::new();
        let mut wire = lines.protocol(Duration::ZERO);
        wire.shift_word(0xFFFF).unwrap();
        assert_eq!(lines.total_delay(), Duration::ZERO);
    }

    #[test]
    fn test_edge_delay_saturates() {
        let lines = SimLines::new();
        let wire = lines.protocol(Duration::from_secs(10));
        assert_eq!(wire.edge_delay_ns(), u32::MAX);
    }

    #[test]
    fn test_pin_fault_aborts_word() {
        let lines = SimLines::new();
        lines.fail_after(3);
        let mut wire = lines.protocol(Duration::ZERO);
        let err = wire.shift_word(0xFFFF).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(lines.clocked_bits().len() < 16);
    }
}
