//! Integration tests for segbank-core.
//!
//! These drive the public API end to end over simulated lines:
//! grid mutation → serializer → wire protocol → emulated register chain.

use std::time::{Duration, Instant};

use segbank_core::sim::{Line, SimLines};
use segbank_core::{
    AnimationState, BOARD_COUNT, DriverConfig, PresetStore, SEGMENTS_PER_BOARD, SegmentBank,
    SegmentGrid, chain_order, pack_board, physical_to_chain,
};

fn sim_bank(dir: &std::path::Path) -> (SimLines, SegmentBank) {
    let lines = SimLines::new();
    let config = DriverConfig {
        presets_dir: dir.join("presets"),
        edge_delay_us: 0,
        dwell_ms: 1,
        ..Default::default()
    };
    let bank = SegmentBank::open(&config, lines.protocol(config.edge_delay())).unwrap();
    (lines, bank)
}

#[test]
fn toggle_reaches_the_register_chain() {
    let tmp = tempfile::tempdir().unwrap();
    let (lines, bank) = sim_bank(tmp.path());

    assert!(bank.toggle_segment(7, 20));
    let words = lines.latched_words();
    assert_eq!(words.len(), BOARD_COUNT * 2);
    // Board 7 sits at shift position 14 - 7; cell 20 is bit 12 of word B.
    let at = (BOARD_COUNT - 1 - 7) * 2;
    assert_eq!(words[at], 0);
    assert_eq!(words[at + 1], 1 << 12);
    assert_eq!(lines.latch_count(), 1);
    assert!(!lines.level(Line::Latch));
}

#[test]
fn latched_frame_matches_packed_grid() {
    let tmp = tempfile::tempdir().unwrap();
    let (lines, bank) = sim_bank(tmp.path());

    for b in 0..BOARD_COUNT {
        bank.toggle_segment(b, (b * 5) % SEGMENTS_PER_BOARD);
    }
    let mut grid = SegmentGrid::new();
    grid.restore(&bank.grid_state());

    let expected: Vec<u16> = (0..BOARD_COUNT)
        .rev()
        .flat_map(|b| {
            let (a, w) = pack_board(grid.board(b).unwrap());
            [a, w]
        })
        .collect();
    assert_eq!(lines.latched_words(), expected);
}

#[test]
fn preset_roundtrip_through_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let (_lines, bank) = sim_bank(tmp.path());

    bank.set_display(physical_to_chain(12).unwrap(), 2, true);
    bank.toggle_segment(0, 0);
    let saved = bank.grid_state();
    assert!(bank.save_preset("scene one"));

    bank.clear_all();
    assert_eq!(bank.load_preset("scene one").unwrap(), saved);

    // A second store over the same directory sees the same file.
    let store = PresetStore::open(bank.presets_dir()).unwrap();
    assert_eq!(store.load("scene one").unwrap(), saved);
}

#[test]
fn preset_listing_and_deletion() {
    let tmp = tempfile::tempdir().unwrap();
    let (_lines, bank) = sim_bank(tmp.path());

    assert!(bank.save_preset("beta"));
    assert!(bank.save_preset("alpha"));
    assert_eq!(bank.list_presets(), vec!["alpha", "beta"]);

    assert!(!bank.delete_preset("nope"));
    assert_eq!(bank.list_presets(), vec!["alpha", "beta"]);

    assert!(bank.delete_preset("alpha"));
    assert_eq!(bank.list_presets(), vec!["beta"]);
}

#[test]
fn chase_lights_boards_in_harness_order() {
    let tmp = tempfile::tempdir().unwrap();
    let (lines, bank) = sim_bank(tmp.path());

    assert!(bank.start_animation());
    assert!(!bank.start_animation());

    let deadline = Instant::now() + Duration::from_secs(5);
    while lines.latch_count() < 6 {
        assert!(Instant::now() < deadline, "chase produced no frames");
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(bank.stop_animation());
    assert!(!bank.stop_animation());
    assert_eq!(bank.animation_state(), AnimationState::Idle);

    assert!(bank.grid_state().iter().flatten().all(|&v| v == 0));
    assert!(lines.latched_words().iter().all(|&w| w == 0));
}

#[test]
fn every_sweep_entry_resolves() {
    let resolved = chain_order()
        .filter(|&(physical, _)| physical_to_chain(physical).is_some())
        .count();
    assert_eq!(resolved, BOARD_COUNT * 3);
}

#[test]
fn dropping_the_bank_blanks_the_display() {
    let tmp = tempfile::tempdir().unwrap();
    let lines;
    {
        let (l, bank) = sim_bank(tmp.path());
        lines = l;
        bank.set_display(3, 1, true);
        assert!(lines.latched_words().iter().any(|&w| w != 0));
    }
    assert!(lines.latched_words().iter().all(|&w| w == 0));
}
