//! # segbank-core
//!
//! **Driver and state engine for a daisy-chained shift-register segment bank.**
//!
//! The bank is 15 boards of 24 segments each, wired as three eight-segment
//! displays per board and fed from three output lines (data, clock, latch).
//! This crate owns everything between "which segments should be lit" and the
//! exact bit sequence the register chain expects.
//!
//! ## Quick Start
//!
//! ```no_run
//! use segbank_core::{DriverConfig, SegmentBank};
//! use segbank_core::sim::SimLines;
//!
//! let config = DriverConfig::default();
//! let lines = SimLines::new();
//! let bank = SegmentBank::open(&config, lines.protocol(config.edge_delay())).unwrap();
//!
//! assert!(bank.toggle_segment(0, 3));
//! assert_eq!(bank.grid_state()[0][3], 1);
//!
//! bank.start_animation();
//! bank.stop_animation();
//! ```
//!
//! ## Architecture
//!
//! SegmentGrid → ChainSerializer → WireProtocol → output lines
//!
//! - [`grid::SegmentGrid`] is the canonical 15×24 state.
//! - [`chain::ChainSerializer`] packs each board into two 16-bit words and
//!   shifts boards from chain index 14 down to 0, then latches once.
//! - [`wire::WireProtocol`] drives any `embedded-hal` output pins MSB-first.
//! - [`wiring`] translates silk-screen board numbers to chain indices.
//! - [`animation::ChaseAnimation`] sweeps one display at a time on a background
//!   thread.
//! - [`preset::PresetStore`] keeps named JSON snapshots on disk.
//! - [`SegmentBank`] ties them together behind one lock.

pub mod animation;
pub mod bank;
#[cfg(feature = "cdev")]
pub mod cdev;
pub mod chain;
pub mod config;
pub mod grid;
pub mod preset;
pub mod sim;
pub mod wire;
pub mod wiring;

pub use animation::{AnimationState, ChaseAnimation};
pub use bank::{Panel, SegmentBank};
pub use chain::{ChainSerializer, pack_board};
pub use config::DriverConfig;
pub use grid::{BOARD_COUNT, Display, GridError, Matrix, SEGMENTS_PER_BOARD, SegmentGrid};
pub use preset::PresetStore;
pub use wire::{ShiftRegister, WireProtocol};
pub use wiring::{CHAIN_ORDER_LEN, TRAVERSAL, chain_order, chain_to_physical, physical_to_chain};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
