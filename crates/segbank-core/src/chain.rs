//! Grid → wire serialization for the whole chain.
//!
//! Each board holds two 16-bit registers. Cells 0..8 go into the low byte of
//! word A (cell i → bit i); cells 8..24 fill word B (cell i → bit i − 8). The
//! board furthest down the chain (chain index 14) is shifted first so that after
//! 30 words every board holds its own pair, then one latch shows the frame.

use std::io;

use log::debug;

use crate::grid::{BOARD_COUNT, SEGMENTS_PER_BOARD, SegmentGrid};
use crate::wire::ShiftRegister;

/// Words per board.
pub const WORDS_PER_BOARD: usize = 2;

/// Words per full frame.
pub const CHAIN_WORDS: usize = BOARD_COUNT * WORDS_PER_BOARD;

/// Cells carried by word A.
const WORD_A_CELLS: usize = 8;

/// Pack one board's cells into its `(A, B)` register words.
pub fn pack_board(cells: &[bool; SEGMENTS_PER_BOARD]) -> (u16, u16) {
    let mut a = 0u16;
    let mut b = 0u16;
    for (i, &on) in cells.iter().enumerate() {
        if !on {
            continue;
        }
        if i < WORD_A_CELLS {
            a |= 1 << i;
        } else {
            b |= 1 << (i - WORD_A_CELLS);
        }
    }
    (a, b)
}

/// The full frame as it goes on the wire: 30 words, chain index 14 first.
pub fn frame_words(grid: &SegmentGrid) -> Vec<u16> {
    (0..BOARD_COUNT)
        .rev()
        .filter_map(|board| grid.board(board))
        .flat_map(|cells| {
            let (a, b) = pack_board(cells);
            [a, b]
        })
        .collect()
}

/// Drives grid frames onto a [`ShiftRegister`].
pub struct ChainSerializer<R> {
    register: R,
    frames: u64,
}

impl<R: ShiftRegister> ChainSerializer<R> {
    pub fn new(register: R) -> Self {
        Self {
            register,
            frames: 0,
        }
    }

    /// Shift the whole grid out and latch once.
    pub fn refresh(&mut self, grid: &SegmentGrid) -> io::Result<()> {
        for word in frame_words(grid) {
            self.register.shift_word(word)?;
        }
        self.register.latch()?;
        self.frames += 1;
        debug!("refresh #{}: {} segments lit", self.frames, grid.lit_count());
        Ok(())
    }

    /// Blank every output without looking at (or touching) any grid.
    pub fn blank(&mut self) -> io::Result<()> {
        for _ in 0..CHAIN_WORDS {
            self.register.shift_word(0x0000)?;
        }
        self.register.latch()?;
        self.frames += 1;
        debug!("blank #{}", self.frames);
        Ok(())
    }

    /// Latched frames so far (refreshes and blanks).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Borrow the underlying register.
    pub fn register(&self) -> &R {
        &self.register
    }

    /// Take the register back.
    pub fn into_inner(self) -> R {
        self.register
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
