//! The canonical segment state: 15 boards × 24 binary cells.
//!
//! Boards are addressed by *chain index* (0..15, wire order). Translating the
//! silk-screened board numbers is [`crate::wiring`]'s job, never this module's.

use std::ops::Range;

/// Number of boards in the chain.
pub const BOARD_COUNT: usize = 15;

/// Segments (shift-register outputs) per board.
pub const SEGMENTS_PER_BOARD: usize = 24;

/// Segments driven by one display unit.
pub const SEGMENTS_PER_DISPLAY: usize = 8;

/// Portable grid value, row-major `[board][segment]`, cells 0 or 1.
///
/// This is the shape presets are stored in and the shape callers read back.
pub type Matrix = Vec<Vec<u8>>;

/// One of the three eight-segment displays on a board.
///
/// The cell ranges are not in numeric order: display 3 sits between 1 and 2.
/// That is how the boards are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Display {
    One,
    Two,
    Three,
}

impl Display {
    /// All displays in label order.
    pub const ALL: [Display; 3] = [Display::One, Display::Two, Display::Three];

    /// Map a 1-based display label to a display, `None` outside 1..=3.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    /// 1-based label as printed on the board.
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Cell range this display occupies within a board.
    pub fn cells(self) -> Range<usize> {
        match self {
            Self::One => 0..8,
            Self::Three => 8..16,
            Self::Two => 16..24,
        }
    }
}

impl std::fmt::Display for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "display {}", self.number())
    }
}

/// Rejected grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Board chain index outside `0..BOARD_COUNT`.
    BoardOutOfRange(usize),
    /// Segment index outside `0..SEGMENTS_PER_BOARD`.
    SegmentOutOfRange(usize),
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoardOutOfRange(b) => {
                write!(f, "board index {b} out of range (0..{BOARD_COUNT})")
            }
            Self::SegmentOutOfRange(s) => {
                write!(f, "segment index {s} out of range (0..{SEGMENTS_PER_BOARD})")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Fixed-size binary segment matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentGrid {
    cells: [[bool; SEGMENTS_PER_BOARD]; BOARD_COUNT],
}

impl Default for SegmentGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentGrid {
    /// All-off grid.
    pub fn new() -> Self {
        Self {
            cells: [[false; SEGMENTS_PER_BOARD]; BOARD_COUNT],
        }
    }

    fn check(board: usize, segment: usize) -> Result<(), GridError> {
        if board >= BOARD_COUNT {
            return Err(GridError::BoardOutOfRange(board));
        }
        if segment >= SEGMENTS_PER_BOARD {
            return Err(GridError::SegmentOutOfRange(segment));
        }
        Ok(())
    }

    /// Read one cell, `None` when out of range.
    pub fn get(&self, board: usize, segment: usize) -> Option<bool> {
        self.cells.get(board)?.get(segment).copied()
    }

    /// Set one cell.
    pub fn set(&mut self, board: usize, segment: usize, on: bool) -> Result<(), GridError> {
        Self::check(board, segment)?;
        self.cells[board][segment] = on;
        Ok(())
    }

    /// Flip one cell. Out-of-range coordinates leave the grid untouched.
    pub fn toggle(&mut self, board: usize, segment: usize) -> Result<(), GridError> {
        Self::check(board, segment)?;
        let cell = &mut self.cells[board][segment];
        *cell = !*cell;
        Ok(())
    }

    /// Turn every cell off.
    pub fn clear_all(&mut self) {
        for row in &mut self.cells {
            row.fill(false);
        }
    }

    /// Set all eight cells of a display on or off.
    ///
    /// An unknown display number is ignored. An out-of-range board is an
    /// error.
    pub fn set_display(&mut self, board: usize, display: u8, on: bool) -> Result<(), GridError> {
        if board >= BOARD_COUNT {
            return Err(GridError::BoardOutOfRange(board));
        }
        let Some(display) = Display::from_number(display) else {
            return Ok(());
        };
        self.cells[board][display.cells()].fill(on);
        Ok(())
    }

    /// The 24 cells of one board, in segment order.
    pub fn board(&self, board: usize) -> Option<&[bool; SEGMENTS_PER_BOARD]> {
        self.cells.get(board)
    }

    /// Number of lit cells across the whole grid.
    pub fn lit_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c).count()
    }

    /// Copy the grid out as a 15×24 matrix of 0/1.
    pub fn snapshot(&self) -> Matrix {
        self.cells
            .iter()
            .map(|row| row.iter().map(|&c| u8::from(c)).collect())
            .collect()
    }

    /// Overwrite cells from `matrix`, clamped to the overlapping region.
    ///
    /// Rows past the source length and columns past a source row's length are
    /// left as they were, so short or ragged legacy presets still load. Any
    /// non-zero source value lights the cell.
    pub fn restore(&mut self, matrix: &[Vec<u8>]) {
        for (row, src) in self.cells.iter_mut().zip(matrix) {
            for (cell, &value) in row.iter_mut().zip(src) {
                *cell = value != 0;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all_zero(m: &Matrix) {
        for row in m {
            assert!(row.iter().all(|&v| v == 0));
        }
    }

    // -----------------------------------------------------------------------
    // Shape
    // -----------------------------------------------------------------------

    #[test]
    fn test_new_grid_dimensions_and_zero() {
        let grid = SegmentGrid::new();
        let m = grid.snapshot();
        assert_eq!(m.len(), BOARD_COUNT);
        for row in &m {
            assert_eq!(row.len(), SEGMENTS_PER_BOARD);
        }
        assert_all_zero(&m);
    }

    // -----------------------------------------------------------------------
    // toggle / set / get
    // -----------------------------------------------------------------------

    #[test]
    fn test_toggle_turns_on_then_off() {
        let mut grid = SegmentGrid::new();
        grid.toggle(3, 5).unwrap();
        assert_eq!(grid.get(3, 5), Some(true));
        grid.toggle(3, 5).unwrap();
        assert_eq!(grid.get(3, 5), Some(false));
    }

    #[test]
    fn test_toggle_is_involution_everywhere() {
        let mut grid = SegmentGrid::new();
        grid.set(7, 12, true).unwrap();
        let before = grid.clone();
        for b in 0..BOARD_COUNT {
            for s in 0..SEGMENTS_PER_BOARD {
                grid.toggle(b, s).unwrap();
                grid.toggle(b, s).unwrap();
            }
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn test_toggle_out_of_range_is_rejected_without_mutation() {
        let mut grid = SegmentGrid::new();
        assert_eq!(grid.toggle(15, 0), Err(GridError::BoardOutOfRange(15)));
        assert_eq!(grid.toggle(0, 24), Err(GridError::SegmentOutOfRange(24)));
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let grid = SegmentGrid::new();
        assert_eq!(grid.get(15, 0), None);
        assert_eq!(grid.get(0, 24), None);
    }

    // -----------------------------------------------------------------------
    // clear_all
    // -----------------------------------------------------------------------

    #[test]
    fn test_clear_all_zeroes_dirty_grid() {
        let mut grid = SegmentGrid::new();
        grid.set(0, 0, true).unwrap();
        grid.set(7, 12, true).unwrap();
        grid.set(14, 23, true).unwrap();
        grid.clear_all();
        assert_all_zero(&grid.snapshot());
    }

    // -----------------------------------------------------------------------
    // set_display
    // -----------------------------------------------------------------------

    fn lit_range(grid: &SegmentGrid, board: usize) -> Vec<usize> {
        (0..SEGMENTS_PER_BOARD)
            .filter(|&s| grid.get(board, s) == Some(true))
            .collect()
    }

    #[test]
    fn test_set_display_1_lights_first_eight() {
        let mut grid = SegmentGrid::new();
        grid.set_display(0, 1, true).unwrap();
        assert_eq!(lit_range(&grid, 0), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_set_display_2_lights_last_eight() {
        let mut grid = SegmentGrid::new();
        grid.set_display(4, 2, true).unwrap();
        assert_eq!(lit_range(&grid, 4), (16..24).collect::<Vec<_>>());
    }

    #[test]
    fn test_set_display_3_lights_middle_eight() {
        let mut grid = SegmentGrid::new();
        grid.set_display(9, 3, true).unwrap();
        assert_eq!(lit_range(&grid, 9), (8..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_set_display_leaves_other_cells_untouched() {
        let mut grid = SegmentGrid::new();
        grid.set(2, 10, true).unwrap();
        grid.set(2, 20, true).unwrap();
        grid.set_display(2, 1, true).unwrap();
        assert_eq!(grid.get(2, 10), Some(true));
        assert_eq!(grid.get(2, 20), Some(true));
        grid.set_display(2, 1, false).unwrap();
        assert_eq!(lit_range(&grid, 2), vec![10, 20]);
    }

    #[test]
    fn test_set_display_unknown_number_is_noop() {
        let mut grid = SegmentGrid::new();
        assert!(grid.set_display(0, 0, true).is_ok());
        assert!(grid.set_display(0, 4, true).is_ok());
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_set_display_bad_board() {
        let mut grid = SegmentGrid::new();
        assert_eq!(
            grid.set_display(15, 1, true),
            Err(GridError::BoardOutOfRange(15))
        );
    }

    #[test]
    fn test_display_ranges_partition_board() {
        let mut covered: Vec<usize> = Display::ALL.iter().flat_map(|d| d.cells()).collect();
        covered.sort_unstable();
        assert_eq!(covered, (0..SEGMENTS_PER_BOARD).collect::<Vec<_>>());
        for d in Display::ALL {
            assert_eq!(d.cells().len(), SEGMENTS_PER_DISPLAY);
            assert_eq!(Display::from_number(d.number()), Some(d));
        }
    }

    // -----------------------------------------------------------------------
    // snapshot / restore
    // -----------------------------------------------------------------------

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut grid = SegmentGrid::new();
        grid.set_display(6, 3, true).unwrap();
        grid.set(14, 23, true).unwrap();
        let snap = grid.snapshot();

        let mut other = SegmentGrid::new();
        other.restore(&snap);
        assert_eq!(other, grid);
    }

    #[test]
    fn test_restore_small_matrix_only_touches_prefix() {
        let mut grid = SegmentGrid::new();
        grid.restore(&[vec![1, 1, 1]]);
        let m = grid.snapshot();
        assert_eq!(&m[0][..3], &[1, 1, 1]);
        assert_eq!(grid.lit_count(), 3);
    }

    #[test]
    fn test_restore_ragged_rows_leave_tail_untouched() {
        let mut grid = SegmentGrid::new();
        grid.set(1, 23, true).unwrap();
        grid.set(14, 0, true).unwrap();
        grid.restore(&[vec![0; SEGMENTS_PER_BOARD], vec![1, 0]]);
        assert_eq!(grid.get(1, 0), Some(true));
        assert_eq!(grid.get(1, 23), Some(true));
        assert_eq!(grid.get(14, 0), Some(true));
    }

    #[test]
    fn test_restore_oversized_matrix_is_clamped() {
        let mut grid = SegmentGrid::new();
        let big = vec![vec![1u8; SEGMENTS_PER_BOARD + 5]; BOARD_COUNT + 3];
        grid.restore(&big);
        assert_eq!(grid.lit_count(), BOARD_COUNT * SEGMENTS_PER_BOARD);
    }
}
