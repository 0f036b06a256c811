//! Physical board labels versus chain position.
//!
//! Boards carry a silk-screened number 1..=15, but the cable harness strings
//! them in a different order. Everything that talks to the wire uses the
//! chain index; everything a human reads uses the physical number. This
//! module is the only place the two meet.

use crate::grid::{BOARD_COUNT, Display};

/// Physical board numbers in chain order: `TRAVERSAL[chain] == physical`.
///
/// The harness groups boards in columns of five (1,6,11 / 2,7,12 / ...).
pub const TRAVERSAL: [u8; BOARD_COUNT] = [1, 6, 11, 2, 7, 12, 3, 8, 13, 4, 9, 14, 5, 10, 15];

/// Entries in one sweep of [`chain_order`].
pub const CHAIN_ORDER_LEN: usize = BOARD_COUNT * Display::ALL.len();

/// Chain index of a physical board, `None` when the label does not exist.
pub fn physical_to_chain(physical: u8) -> Option<usize> {
    TRAVERSAL.iter().position(|&p| p == physical)
}

/// Physical board label at a chain index.
pub fn chain_to_physical(chain: usize) -> Option<u8> {
    TRAVERSAL.get(chain).copied()
}

/// Sweep order for animations: each board of [`TRAVERSAL`] with its displays
/// 1, 2, 3 back to back.
pub fn chain_order() -> impl Iterator<Item = (u8, u8)> {
    TRAVERSAL
        .into_iter()
        .flat_map(|physical| Display::ALL.into_iter().map(move |d| (physical, d.number())))
}
