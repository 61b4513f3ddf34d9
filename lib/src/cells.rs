//! Cells and the per-row/per-column bookkeeping of generation 0.

use std::ops::Not;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Possible states of a cell.
///
/// The numeric values are load-bearing: the neighborhood descriptor is
/// computed by summing the states of the eight neighbors, so eight unknown
/// neighbors (`8 * 0x10`) can never be confused with any mix of known ones.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum State {
    /// The cell is known to be off.
    Off = 0x00,
    /// The cell is known to be on.
    On = 0x01,
    /// The state of the cell is not decided yet.
    Unk = 0x10,
}

/// Flips a known state. Unknown stays unknown.
impl Not for State {
    type Output = State;

    fn not(self) -> Self::Output {
        match self {
            State::Off => State::On,
            State::On => State::Off,
            State::Unk => State::Unk,
        }
    }
}

/// An index into the world's cell arena.
///
/// Cells never move once the world is built, so an index is a stable name
/// for a cell. Index 0 is the shared boundary sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CellId(pub(crate) u32);

/// The boundary sentinel: permanently off, all of its links point to itself.
pub(crate) const BOUNDARY: CellId = CellId(0);

impl CellId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Slots of the eight same-generation neighbor links, in the order
/// up-left, up, up-right, left, right, down-left, down, down-right.
/// The opposite of slot `i` is slot `7 - i`.
pub(crate) mod nbhd {
    pub const UP: usize = 1;
    pub const RIGHT: usize = 4;
    pub const DOWN: usize = 6;

    /// Row/column deltas per slot.
    pub const OFFSETS: [(i32, i32); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];
}

/// The shared dummy row/column info slot, used by every cell whose counters
/// nobody reads: boundary, auxiliary, edge, and all generations after 0.
pub(crate) const DUMMY_INFO: usize = 0;

/// One cell of the search.
#[derive(Debug)]
pub(crate) struct Cell {
    /// Current state.
    pub(crate) state: State,
    /// Whether this assignment is a free choice (a backtrack candidate)
    /// rather than a forced deduction. Only meaningful while set.
    pub(crate) free: bool,
    /// Whether the cell must keep the generation-0 state of its position.
    pub(crate) frozen: bool,
    /// Whether the selector may branch on this cell.
    pub(crate) choose: bool,
    /// Generation, row and column. Auxiliary cells may carry coordinates
    /// outside the nominal rectangle; the boundary sentinel carries -1.
    pub(crate) gen: i32,
    pub(crate) row: i32,
    pub(crate) col: i32,
    /// Count of on cells within `near_cols` previous columns, maintained
    /// incrementally by `adjust_near`.
    pub(crate) near: i32,
    /// The eight same-generation neighbors. Off-grid directions resolve to
    /// the boundary sentinel.
    pub(crate) nbhd: [CellId; 8],
    /// The cell at this position in the previous generation, with the
    /// configured transformation applied across the wrap.
    pub(crate) past: CellId,
    /// The cell at this position in the next generation, likewise.
    pub(crate) future: CellId,
    /// The next cell on this cell's must-be-equal ring, if it is on one.
    pub(crate) next_in_loop: Option<CellId>,
    /// Index of this cell's row counters, `DUMMY_INFO` for cells that are
    /// not in-grid generation 0.
    pub(crate) row_info: usize,
    /// Index of this cell's column counters, likewise.
    pub(crate) col_info: usize,
}

impl Cell {
    /// A blank cell, initialized as if it were a boundary cell.
    pub(crate) fn new() -> Self {
        Cell {
            state: State::Off,
            free: false,
            frozen: false,
            choose: false,
            gen: -1,
            row: -1,
            col: -1,
            near: 0,
            nbhd: [BOUNDARY; 8],
            past: BOUNDARY,
            future: BOUNDARY,
            next_in_loop: None,
            row_info: DUMMY_INFO,
            col_info: DUMMY_INFO,
        }
    }
}

/// Counters for one row of generation 0.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RowInfo {
    /// Number of cells in the row which are set on.
    pub(crate) on_count: i32,
}

/// Counters for one column of generation 0.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ColInfo {
    /// Number of cells in the column which are decided.
    pub(crate) set_count: i32,
    /// Number of cells in the column which are set on.
    pub(crate) on_count: i32,
    /// Sum of the row positions of the on cells, for the follow heuristic.
    pub(crate) sum_pos: i32,
}
