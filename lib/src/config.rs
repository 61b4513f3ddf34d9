//! World configuration.

use crate::error::Error;
use crate::world::World;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest translation allowed between the last and the first generation.
///
/// This also bounds the table of auxiliary cells that translations and
/// flips can reach outside the search rectangle.
pub const TRANS_MAX: i32 = 4;

/// World configuration.
///
/// Rows and columns are 1-based inside the search rectangle; the symmetry
/// and flip fields that take a coordinate use 0 for "disabled" and the
/// coordinate where the constraint starts otherwise, so plain `1` applies
/// it to the whole rectangle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Number of rows of the search rectangle.
    pub row_max: i32,
    /// Number of columns of the search rectangle.
    pub col_max: i32,
    /// Number of generations of the period.
    pub gen_max: i32,

    /// Translation of rows between the last and the first generation.
    pub row_trans: i32,
    /// Translation of columns between the last and the first generation.
    pub col_trans: i32,

    /// Mirror rows across the middle row, for columns >= this.
    pub row_sym: i32,
    /// Mirror columns across the middle column, for rows >= this.
    pub col_sym: i32,
    /// Symmetry under 180 degree rotation.
    pub point_sym: bool,
    /// Symmetry across the forward diagonal. Requires a square world.
    pub fwd_sym: bool,
    /// Symmetry across the backward diagonal. Requires a square world.
    pub bwd_sym: bool,

    /// Flip rows between the last and the first generation, for columns
    /// >= this.
    pub flip_rows: i32,
    /// Flip columns between the last and the first generation, for rows
    /// >= this.
    pub flip_cols: i32,
    /// Rotate a quarter turn between the last and the first generation.
    /// Requires a square world.
    pub flip_quads: bool,

    /// Only look for parents of the last generation.
    pub parent: bool,
    /// Report objects even when some sub-period divides the full period.
    pub all_objects: bool,

    /// An on cell of generation 0 must be within this many previous
    /// columns of another on cell (0 disables).
    pub near_cols: i32,
    /// Maximum number of on cells in generation 0 (0 disables).
    pub max_count: i32,
    /// This row of generation 0 must contain an on cell (0 disables).
    pub use_row: i32,
    /// This column of generation 0 must contain an on cell (0 disables).
    pub use_col: i32,
    /// Maximum number of on cells in any column of generation 0
    /// (0 disables).
    pub col_cells: i32,
    /// Maximum width of the span of on cells in any column of generation 0
    /// (0 disables).
    pub col_width: i32,

    /// Pick unknown cells against the average position of the previous
    /// column's on cells.
    pub follow: bool,
    /// Order the search to find wide objects first.
    pub order_wide: bool,
    /// Order the search over all generations of a column before moving on.
    pub order_gens: bool,
    /// Order the search from the middle column outwards.
    pub order_middle: bool,
    /// First try the state a neighboring generation already has.
    pub follow_gens: bool,

    /// The rule string of the cellular automaton.
    pub rule_string: String,
}

impl Config {
    /// Creates a configuration with the given dimensions and every other
    /// option at its default.
    pub fn new(row_max: i32, col_max: i32, gen_max: i32) -> Self {
        Config {
            row_max,
            col_max,
            gen_max,
            ..Config::default()
        }
    }

    /// Sets the translation between the last and the first generation.
    pub fn set_translate(mut self, row_trans: i32, col_trans: i32) -> Self {
        self.row_trans = row_trans;
        self.col_trans = col_trans;
        self
    }

    /// Enables row mirror symmetry starting at the given column.
    pub fn set_row_sym(mut self, row_sym: i32) -> Self {
        self.row_sym = row_sym;
        self
    }

    /// Enables column mirror symmetry starting at the given row.
    pub fn set_col_sym(mut self, col_sym: i32) -> Self {
        self.col_sym = col_sym;
        self
    }

    /// Enables symmetry under 180 degree rotation.
    pub fn set_point_sym(mut self, point_sym: bool) -> Self {
        self.point_sym = point_sym;
        self
    }

    /// Enables symmetry across the forward diagonal.
    pub fn set_fwd_sym(mut self, fwd_sym: bool) -> Self {
        self.fwd_sym = fwd_sym;
        self
    }

    /// Enables symmetry across the backward diagonal.
    pub fn set_bwd_sym(mut self, bwd_sym: bool) -> Self {
        self.bwd_sym = bwd_sym;
        self
    }

    /// Flips rows at the wrap, starting at the given column.
    pub fn set_flip_rows(mut self, flip_rows: i32) -> Self {
        self.flip_rows = flip_rows;
        self
    }

    /// Flips columns at the wrap, starting at the given row.
    pub fn set_flip_cols(mut self, flip_cols: i32) -> Self {
        self.flip_cols = flip_cols;
        self
    }

    /// Rotates a quarter turn at the wrap.
    pub fn set_flip_quads(mut self, flip_quads: bool) -> Self {
        self.flip_quads = flip_quads;
        self
    }

    /// Searches for parents of the last generation only.
    pub fn set_parent(mut self, parent: bool) -> Self {
        self.parent = parent;
        self
    }

    /// Reports objects with sub-periods too.
    pub fn set_all_objects(mut self, all_objects: bool) -> Self {
        self.all_objects = all_objects;
        self
    }

    /// Sets the near-columns pruning distance.
    pub fn set_near_cols(mut self, near_cols: i32) -> Self {
        self.near_cols = near_cols;
        self
    }

    /// Caps the number of on cells in generation 0.
    pub fn set_max_count(mut self, max_count: i32) -> Self {
        self.max_count = max_count;
        self
    }

    /// Requires an on cell in the given row of generation 0.
    pub fn set_use_row(mut self, use_row: i32) -> Self {
        self.use_row = use_row;
        self
    }

    /// Requires an on cell in the given column of generation 0.
    pub fn set_use_col(mut self, use_col: i32) -> Self {
        self.use_col = use_col;
        self
    }

    /// Caps the number of on cells in any column of generation 0.
    pub fn set_col_cells(mut self, col_cells: i32) -> Self {
        self.col_cells = col_cells;
        self
    }

    /// Caps the width of the on span in any column of generation 0.
    pub fn set_col_width(mut self, col_width: i32) -> Self {
        self.col_width = col_width;
        self
    }

    /// Follows the average position of the previous column's on cells.
    pub fn set_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    /// Orders the search to find wide objects first.
    pub fn set_order_wide(mut self, order_wide: bool) -> Self {
        self.order_wide = order_wide;
        self
    }

    /// Orders the search over all generations of a column first.
    pub fn set_order_gens(mut self, order_gens: bool) -> Self {
        self.order_gens = order_gens;
        self
    }

    /// Orders the search from the middle column outwards.
    pub fn set_order_middle(mut self, order_middle: bool) -> Self {
        self.order_middle = order_middle;
        self
    }

    /// First tries the state of a neighboring generation.
    pub fn set_follow_gens(mut self, follow_gens: bool) -> Self {
        self.follow_gens = follow_gens;
        self
    }

    /// Sets the rule string.
    pub fn set_rule_string<S: Into<String>>(mut self, rule_string: S) -> Self {
        self.rule_string = rule_string.into();
        self
    }

    /// Builds the world for this configuration.
    pub fn world(&self) -> Result<World, Error> {
        World::new(self)
    }

    /// Checks ranges and option conflicts.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.row_max <= 0 || self.col_max <= 0 || self.gen_max <= 0 {
            return Err(Error::NonPositive);
        }

        if self.row_trans.abs() > TRANS_MAX || self.col_trans.abs() > TRANS_MAX {
            return Err(Error::TranslationRange(TRANS_MAX));
        }

        if self.parent
            && (self.row_trans != 0
                || self.col_trans != 0
                || self.flip_rows != 0
                || self.flip_cols != 0
                || self.flip_quads)
        {
            return Err(Error::ParentTransform);
        }

        let sym_families = self.point_sym as i32
            + (self.row_sym != 0 || self.col_sym != 0) as i32
            + (self.fwd_sym || self.bwd_sym) as i32;
        if sym_families > 1 {
            return Err(Error::ConflictingSymmetries);
        }

        if (self.fwd_sym || self.bwd_sym || self.flip_quads) && self.row_max != self.col_max {
            return Err(Error::SquareWorld);
        }

        if (self.row_trans != 0 || self.col_trans != 0) && self.flip_quads {
            return Err(Error::ConflictingTransforms);
        }

        if (self.row_trans != 0 && self.flip_rows != 0)
            || (self.col_trans != 0 && self.flip_cols != 0)
        {
            return Err(Error::ConflictingTransforms);
        }

        if self.use_row < 0 || self.use_row > self.row_max {
            return Err(Error::BadUseRow(self.use_row));
        }

        if self.use_col < 0 || self.use_col > self.col_max {
            return Err(Error::BadUseCol(self.use_col));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            row_max: 10,
            col_max: 10,
            gen_max: 1,
            row_trans: 0,
            col_trans: 0,
            row_sym: 0,
            col_sym: 0,
            point_sym: false,
            fwd_sym: false,
            bwd_sym: false,
            flip_rows: 0,
            flip_cols: 0,
            flip_quads: false,
            parent: false,
            all_objects: false,
            near_cols: 0,
            max_count: 0,
            use_row: 0,
            use_col: 0,
            col_cells: 0,
            col_width: 0,
            follow: false,
            order_wide: false,
            order_gens: false,
            order_middle: false,
            follow_gens: false,
            rule_string: String::from("B3/S23"),
        }
    }
}
