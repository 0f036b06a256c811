//! Simulated output lines.
//!
//! [`SimLines`] hands out three [`SimPin`]s and a [`SimDelay`] that share one
//! recorder. The recorder emulates the register chain itself: every rising
//! clock edge shifts the data level in, every rising latch edge copies the
//! chain to the outputs. Used by the tests and by the CLI's `--dry-run`.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::chain::CHAIN_WORDS;
use crate::wire::{ShiftRegister, WORD_BITS, WireProtocol};

/// Bits held by the full chain.
pub const CHAIN_BITS: usize = CHAIN_WORDS * WORD_BITS as usize;

/// Clocked bits kept for inspection before the trace stops growing.
const TRACE_LIMIT: usize = 1 << 16;

/// Which of the three lines a pin drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    Data,
    Clock,
    Latch,
}

impl Line {
    fn index(self) -> usize {
        match self {
            Self::Data => 0,
            Self::Clock => 1,
            Self::Latch => 2,
        }
    }
}

/// Injected line failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimFault;

impl embedded_hal::digital::Error for SimFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct Recorder {
    levels: [bool; 3],
    rising: [u64; 3],
    register: VecDeque<bool>,
    outputs: Vec<bool>,
    trace: Vec<bool>,
    latches: u64,
    delay: Duration,
    writes_until_fault: Option<u64>,
}

impl Recorder {
    fn drive(&mut self, line: Line, high: bool) -> Result<(), SimFault> {
        if let Some(left) = self.writes_until_fault.as_mut() {
            if *left == 0 {
                return Err(SimFault);
            }
            *left -= 1;
        }

        let i = line.index();
        let rising = high && !self.levels[i];
        self.levels[i] = high;
        if !rising {
            return Ok(());
        }
        self.rising[i] += 1;

        match line {
            Line::Clock => {
                let bit = self.levels[Line::Data.index()];
                self.register.push_back(bit);
                if self.register.len() > CHAIN_BITS {
                    self.register.pop_front();
                }
                if self.trace.len() < TRACE_LIMIT {
                    self.trace.push(bit);
                }
            }
            Line::Latch => {
                self.outputs = self.register.iter().copied().collect();
                self.latches += 1;
            }
            Line::Data => {}
        }
        Ok(())
    }
}

/// Shared handle to a simulated set of lines.
#[derive(Clone, Default)]
pub struct SimLines {
    inner: Arc<Mutex<Recorder>>,
}

/// Wire protocol over simulated lines.
pub type SimWire = WireProtocol<SimPin, SimPin, SimPin, SimDelay>;

impl SimLines {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A pin driving `line`.
    pub fn pin(&self, line: Line) -> SimPin {
        SimPin {
            line,
            inner: Arc::clone(&self.inner),
        }
    }

    /// A delay source that records instead of sleeping.
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            inner: Arc::clone(&self.inner),
        }
    }

    /// A complete wire protocol over these lines.
    pub fn protocol(&self, edge_delay: Duration) -> SimWire {
        WireProtocol::new(
            self.pin(Line::Data),
            self.pin(Line::Clock),
            self.pin(Line::Latch),
            self.delay(),
            edge_delay,
        )
    }

    /// Make every pin write fail once `writes` more have succeeded.
    pub fn fail_after(&self, writes: u64) {
        self.lock().writes_until_fault = Some(writes);
    }

    /// Current level of a line.
    pub fn level(&self, line: Line) -> bool {
        self.lock().levels[line.index()]
    }

    /// Rising edges seen on a line.
    pub fn rising_edges(&self, line: Line) -> u64 {
        self.lock().rising[line.index()]
    }

    /// Number of latch pulses.
    pub fn latch_count(&self) -> u64 {
        self.lock().latches
    }

    /// Data levels sampled on each rising clock edge, oldest first.
    pub fn clocked_bits(&self) -> Vec<bool> {
        self.lock().trace.clone()
    }

    /// Total time requested from the delay source.
    pub fn total_delay(&self) -> Duration {
        self.lock().delay
    }

    /// Words on the outputs after the last latch, in the order they were
    /// shifted in. Empty until the chain has been filled and latched.
    pub fn latched_words(&self) -> Vec<u16> {
        let rec = self.lock();
        if rec.outputs.len() < CHAIN_BITS {
            return Vec::new();
        }
        rec.outputs
            .chunks(WORD_BITS as usize)
            .map(|bits| bits.iter().fold(0u16, |acc, &b| (acc << 1) | u16::from(b)))
            .collect()
    }

    /// Clear counters and trace, keeping levels and latched outputs.
    pub fn reset_trace(&self) {
        let mut rec = self.lock();
        rec.rising = [0; 3];
        rec.trace.clear();
        rec.latches = 0;
        rec.delay = Duration::ZERO;
    }
}

/// One simulated output line.
pub struct SimPin {
    line: Line,
    inner: Arc<Mutex<Recorder>>,
}

impl ErrorType for SimPin {
    type Error = SimFault;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut rec = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rec.drive(self.line, false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut rec = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rec.drive(self.line, true)
    }
}

/// Delay source that only accumulates the requested time.
pub struct SimDelay {
    inner: Arc<Mutex<Recorder>>,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut rec = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rec.delay += Duration::from_nanos(u64::from(ns));
    }
}

/// Register that records every latched frame instead of driving lines.
///
/// Frames are kept for the lifetime of the log; meant for tests and short
/// dry runs.
#[derive(Clone, Default)]
pub struct FrameLog {
    inner: Arc<Mutex<FrameLogInner>>,
}

#[derive(Default)]
struct FrameLogInner {
    pending: Vec<u16>,
    frames: Vec<Vec<u16>>,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrameLogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every latched frame, oldest first, each in shift order.
    pub fn frames(&self) -> Vec<Vec<u16>> {
        self.lock().frames.clone()
    }

    /// Number of latched frames.
    pub fn frame_count(&self) -> usize {
        self.lock().frames.len()
    }

    /// Most recent latched frame.
    pub fn last_frame(&self) -> Option<Vec<u16>> {
        self.lock().frames.last().cloned()
    }
}

impl ShiftRegister for FrameLog {
    fn shift_word(&mut self, word: u16) -> io::Result<()> {
        self.lock().pending.push(word);
        Ok(())
    }

    fn latch(&mut self) -> io::Result<()> {
        let mut log = self.lock();
        let frame = std::mem::take(&mut log.pending);
        log.frames.push(frame);
        Ok(())
    }
}
