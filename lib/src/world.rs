//! The world: the static graph of cells plus its bookkeeping.

use crate::cells::{nbhd, Cell, CellId, ColInfo, RowInfo, State, BOUNDARY};
use crate::config::{Config, TRANS_MAX};
use crate::error::Error;
use crate::rules::Rule;
use crate::search::Status;
use log::trace;
use std::cmp::Ordering;

/// The world.
///
/// One cell exists per (row, column, generation) of the padded rectangle,
/// plus a single boundary sentinel at index 0 and a small table of
/// auxiliary cells for coordinates that translations and flips reach
/// outside the rectangle. The arena is allocated once and never resized;
/// every link between cells is an index into it.
#[derive(Debug)]
pub struct World {
    pub(crate) config: Config,
    pub(crate) rule: Rule,

    /// The cell arena. Index 0 is the boundary sentinel.
    pub(crate) cells: Vec<Cell>,
    /// Auxiliary cells, found by linear search over their coordinates.
    aux: Vec<CellId>,
    /// Cap on the auxiliary table, derived from the translation bound.
    aux_cap: usize,

    /// Per-row counters of generation 0. Slot 0 is the shared dummy.
    pub(crate) row_info: Vec<RowInfo>,
    /// Per-column counters of generation 0. Slot 0 is the shared dummy.
    pub(crate) col_info: Vec<ColInfo>,
    /// Number of generation-0 columns with every cell decided.
    pub(crate) full_columns: i32,
    /// Number of on cells in generation 0.
    pub(crate) cell_count: i32,

    /// The cells whose state has been fixed, in setting order. This stack
    /// is the transaction log of the search; undo pops it.
    pub(crate) set_table: Vec<CellId>,
    /// Start of the part of the stack that backtracking may undo.
    pub(crate) base_set: usize,
    /// Next stack entry the propagator has not examined yet.
    pub(crate) next_set: usize,

    /// All searchable cells in selection order.
    pub(crate) search_list: Vec<CellId>,
    /// Cursor into `search_list`; reset whenever the search backs up.
    pub(crate) search_index: usize,

    pub(crate) cur_status: Status,
    /// Whether initial seeding is over and the init-gated pruning checks
    /// are armed.
    pub(crate) inited: bool,
}

impl World {
    /// Creates a world from the configuration.
    ///
    /// Validates the configuration, parses the rule, and builds the cell
    /// graph, the symmetry loops and the search order.
    pub fn new(config: &Config) -> Result<Self, Error> {
        config.validate()?;
        let rule: Rule = config.rule_string.parse()?;

        let rows = config.row_max;
        let cols = config.col_max;
        let gens = config.gen_max;
        let grid = ((rows + 2) * (cols + 2) * gens) as usize;

        let mut cells = Vec::with_capacity(grid + 1);
        for _ in 0..=grid {
            cells.push(Cell::new());
        }

        let mut world = World {
            config: config.clone(),
            rule,
            cells,
            aux: Vec::new(),
            aux_cap: (2 * TRANS_MAX * (rows + cols + 4)) as usize,
            row_info: vec![RowInfo::default(); rows as usize + 1],
            col_info: vec![ColInfo::default(); cols as usize + 1],
            full_columns: 0,
            cell_count: 0,
            set_table: Vec::with_capacity(grid),
            base_set: 0,
            next_set: 0,
            search_list: Vec::new(),
            search_index: 0,
            cur_status: Status::Ok,
            inited: false,
        };
        world.init_cells()?;
        world.init_search_order();
        trace!(
            "world built: {} cells, {} auxiliary",
            world.cells.len(),
            world.aux.len()
        );
        Ok(world)
    }

    /// Wires coordinates, neighbor links, temporal links, symmetry loops
    /// and the generation-0 row/column counters.
    fn init_cells(&mut self) -> Result<(), Error> {
        let rows = self.config.row_max;
        let cols = self.config.col_max;
        let gens = self.config.gen_max;

        for col in 0..=cols + 1 {
            for row in 0..=rows + 1 {
                for gen in 0..gens {
                    let id = self.cell_at(row, col, gen);
                    let edge = row == 0 || col == 0 || row > rows || col > cols;

                    {
                        let cell = &mut self.cells[id.index()];
                        cell.gen = gen;
                        cell.row = row;
                        cell.col = col;
                    }

                    if !edge {
                        for (slot, &(dr, dc)) in nbhd::OFFSETS.iter().enumerate() {
                            let neighbor = self.cell_at(row + dr, col + dc, gen);
                            self.cells[id.index()].nbhd[slot] = neighbor;
                            self.cells[neighbor.index()].nbhd[7 - slot] = id;
                        }
                        let cell = &mut self.cells[id.index()];
                        cell.state = State::Unk;
                        cell.free = true;
                        cell.choose = true;
                    }

                    // Time wraps around cyclically; translations and flips
                    // rewire the wrap below.
                    let past = self.cell_at(row, col, (gen + gens - 1) % gens);
                    let future = self.cell_at(row, col, (gen + 1) % gens);
                    let cell = &mut self.cells[id.index()];
                    cell.past = past;
                    cell.future = future;
                }
            }
        }

        if self.config.row_trans != 0
            || self.config.col_trans != 0
            || self.config.flip_rows != 0
            || self.config.flip_cols != 0
            || self.config.flip_quads
        {
            for row in 0..=rows + 1 {
                for col in 0..=cols + 1 {
                    let id = self.cell_at(row, col, gens - 1);
                    let image = self.map_cell(id, true)?;
                    self.cells[id.index()].future = image;
                    self.cells[image.index()].past = id;

                    let id = self.cell_at(row, col, 0);
                    let image = self.map_cell(id, false)?;
                    self.cells[id.index()].past = image;
                    self.cells[image.index()].future = id;
                }
            }
        }

        for row in 1..=rows {
            for col in 1..=cols {
                let id = self.cell_at(row, col, 0);
                let cell = &mut self.cells[id.index()];
                cell.row_info = row as usize;
                cell.col_info = col as usize;
            }
        }

        if self.config.row_sym != 0
            || self.config.col_sym != 0
            || self.config.point_sym
            || self.config.fwd_sym
            || self.config.bwd_sym
        {
            for gen in 0..gens {
                for col in 1..=cols {
                    for row in 1..=rows {
                        if let Some(partner) = self.sym_cell(row, col, gen) {
                            let id = self.cell_at(row, col, gen);
                            self.loop_cells(id, partner);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Orders the searchable cells. Cells redundant under row or column
    /// mirror symmetry past the fold line are left out entirely.
    fn init_search_order(&mut self) {
        let rows = self.config.row_max;
        let cols = self.config.col_max;
        let gens = self.config.gen_max;
        let row_sym = self.config.row_sym;
        let col_sym = self.config.col_sym;

        let mut table = Vec::new();
        for gen in 0..gens {
            for col in 1..=cols {
                for row in 1..=rows {
                    if row_sym != 0 && col >= row_sym && row * 2 > rows + 1 {
                        continue;
                    }
                    if col_sym != 0 && row >= col_sym && col * 2 > cols + 1 {
                        continue;
                    }
                    table.push(self.cell_at(row, col, gen));
                }
            }
        }

        let order_gens = self.config.order_gens;
        let order_middle = self.config.order_middle;
        let order_wide = self.config.order_wide;
        let mid_col = (cols + 1) / 2;
        let mid_row = (rows + 1) / 2;
        let cells = &self.cells;

        table.sort_by(|&a, &b| {
            let c1 = &cells[a.index()];
            let c2 = &cells[b.index()];

            // Unless ordering over generations, all of generation 0 comes
            // ahead of the other generations.
            if !order_gens {
                match c1.gen.cmp(&c2.gen) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }

            let col_ord = if order_middle {
                (c1.col - mid_col).abs().cmp(&(c2.col - mid_col).abs())
            } else {
                c1.col.cmp(&c2.col)
            };
            match col_ord {
                Ordering::Equal => {}
                other => return other,
            }

            // Even positions ahead of odd positions.
            let p1 = (c1.row + c1.col + c1.gen) & 1;
            let p2 = (c2.row + c2.col + c2.gen) & 1;
            match p1.cmp(&p2) {
                Ordering::Equal => {}
                other => return other,
            }

            // Rows sort relative to the middle row. New cells are first
            // tried off, so the order here is the opposite of the shape
            // being encouraged.
            let d1 = (c1.row - mid_row).abs();
            let d2 = (c2.row - mid_row).abs();
            let row_ord = if order_wide {
                d1.cmp(&d2)
            } else {
                d1.cmp(&d2).reverse()
            };
            match row_ord {
                Ordering::Equal => {}
                other => return other,
            }

            c1.gen.cmp(&c2.gen)
        });

        self.search_list = table;
    }

    /// The arena index of an in-range cell.
    #[inline]
    pub(crate) fn cell_at(&self, row: i32, col: i32, gen: i32) -> CellId {
        debug_assert!(self.in_range(row, col, gen));
        let rows = self.config.row_max;
        let gens = self.config.gen_max;
        CellId(((col * (rows + 2) + row) * gens + gen) as u32 + 1)
    }

    #[inline]
    fn in_range(&self, row: i32, col: i32, gen: i32) -> bool {
        row >= 0
            && row <= self.config.row_max + 1
            && col >= 0
            && col <= self.config.col_max + 1
            && gen >= 0
            && gen < self.config.gen_max
    }

    /// Whether the coordinates are inside the unpadded search rectangle.
    #[inline]
    pub(crate) fn in_grid(&self, row: i32, col: i32) -> bool {
        row >= 1 && row <= self.config.row_max && col >= 1 && col <= self.config.col_max
    }

    /// Finds a cell by its coordinates, without materializing anything.
    pub(crate) fn find_cell(&self, row: i32, col: i32, gen: i32) -> Option<CellId> {
        if self.in_range(row, col, gen) {
            return Some(self.cell_at(row, col, gen));
        }
        self.aux.iter().copied().find(|&id| {
            let cell = &self.cells[id.index()];
            cell.row == row && cell.col == col && cell.gen == gen
        })
    }

    /// Finds a cell by its coordinates, materializing an auxiliary cell if
    /// the coordinates are outside the padded rectangle.
    fn find_or_create_cell(&mut self, row: i32, col: i32, gen: i32) -> Result<CellId, Error> {
        if let Some(id) = self.find_cell(row, col, gen) {
            return Ok(id);
        }
        if self.aux.len() >= self.aux_cap {
            return Err(Error::AuxOverflow);
        }
        let id = CellId(self.cells.len() as u32);
        let mut cell = Cell::new();
        cell.row = row;
        cell.col = col;
        cell.gen = gen;
        self.cells.push(cell);
        self.aux.push(id);
        Ok(id)
    }

    /// Maps a cell of the last generation onto generation 0 (`forward`) or
    /// a cell of generation 0 onto the last generation (backward),
    /// applying the configured flips and translation.
    fn map_cell(&mut self, id: CellId, forward: bool) -> Result<CellId, Error> {
        let mut row = self.cells[id.index()].row;
        let mut col = self.cells[id.index()].col;
        let rows = self.config.row_max;
        let cols = self.config.col_max;

        if self.config.flip_rows != 0 && col >= self.config.flip_rows {
            row = rows + 1 - row;
        }

        if self.config.flip_cols != 0 && row >= self.config.flip_cols {
            col = cols + 1 - col;
        }

        if self.config.flip_quads {
            let tmp = col;
            col = row;
            row = cols + 1 - tmp;
        }

        if forward {
            row += self.config.row_trans;
            col += self.config.col_trans;
            self.find_or_create_cell(row, col, 0)
        } else {
            row -= self.config.row_trans;
            col -= self.config.col_trans;
            self.find_or_create_cell(row, col, self.config.gen_max - 1)
        }
    }

    /// A cell symmetric to the given one, or `None` if the symmetry does
    /// not constrain it.
    ///
    /// A single partner per cell is enough: partners are chained into
    /// loops, and with two axes the chain through the four quadrants
    /// closes the loop.
    fn sym_cell(&self, row: i32, col: i32, gen: i32) -> Option<CellId> {
        let rows = self.config.row_max;
        let cols = self.config.col_max;
        let n_row = rows + 1 - row;
        let n_col = cols + 1 - col;

        if self.config.point_sym {
            return Some(self.cell_at(n_row, n_col, gen));
        }

        if self.config.fwd_sym || self.config.bwd_sym {
            // Square world. The forward diagonal swaps the coordinates,
            // the backward diagonal swaps their mirror images. With both,
            // off-diagonal cells alternate a reflection with the rotation
            // so that the orbit of four closes into one loop.
            if self.config.fwd_sym && self.config.bwd_sym {
                return Some(if row < col {
                    self.cell_at(col, row, gen)
                } else {
                    self.cell_at(n_row, n_col, gen)
                });
            }
            if self.config.fwd_sym {
                return Some(self.cell_at(col, row, gen));
            }
            return Some(self.cell_at(n_col, n_row, gen));
        }

        let row_sym = self.config.row_sym;
        let col_sym = self.config.col_sym;

        if row_sym != 0 && col_sym == 0 {
            if col < row_sym {
                return None;
            }
            return Some(self.cell_at(n_row, col, gen));
        }

        if col_sym != 0 && row_sym == 0 {
            if row < col_sym {
                return None;
            }
            return Some(self.cell_at(row, n_col, gen));
        }

        if row_sym != 0 && col_sym != 0 {
            // Middle row or column cells pair straight across; the others
            // link to the next quadrant clockwise.
            if n_row == row || n_col == col {
                return Some(self.cell_at(n_row, n_col, gen));
            }
            if (row < n_row) == (col < n_col) {
                return Some(self.cell_at(row, n_col, gen));
            }
            return Some(self.cell_at(n_row, col, gen));
        }

        None
    }

    /// Joins the two cells into one must-be-equal loop. If the cells are
    /// already on loops, the loops are merged. If any cell of the merged
    /// loop is frozen, they all become frozen.
    pub(crate) fn loop_cells(&mut self, a: CellId, b: CellId) {
        debug_assert!(a != BOUNDARY && b != BOUNDARY);

        if a == b {
            return;
        }

        if self.cells[a.index()].next_in_loop.is_none() {
            self.cells[a.index()].next_in_loop = Some(a);
        }
        if self.cells[b.index()].next_in_loop.is_none() {
            self.cells[b.index()].next_in_loop = Some(b);
        }

        // Already on the same loop?
        let mut walk = self.cells[a.index()].next_in_loop.unwrap();
        while walk != a {
            if walk == b {
                return;
            }
            walk = self.cells[walk.index()].next_in_loop.unwrap();
        }

        // Splice the two rings into one.
        let a_next = self.cells[a.index()].next_in_loop;
        self.cells[a.index()].next_in_loop = self.cells[b.index()].next_in_loop;
        self.cells[b.index()].next_in_loop = a_next;

        let mut frozen = self.cells[a.index()].frozen;
        let mut members = vec![a];
        let mut walk = self.cells[a.index()].next_in_loop.unwrap();
        while walk != a {
            frozen |= self.cells[walk.index()].frozen;
            members.push(walk);
            walk = self.cells[walk.index()].next_in_loop.unwrap();
        }
        if frozen {
            for id in members {
                self.cells[id.index()].frozen = true;
            }
        }
    }

    /// Freezes all generations of a position: the cell may be on or off,
    /// but must be the same in every generation.
    pub fn freeze_cell(&mut self, row: i32, col: i32) -> Result<(), Error> {
        if !self.in_grid(row, col) {
            return Err(Error::CellRange(row, col, 0));
        }
        let first = self.cell_at(row, col, 0);
        for gen in 0..self.config.gen_max {
            let id = self.cell_at(row, col, gen);
            self.cells[id.index()].frozen = true;
            self.loop_cells(first, id);
        }
        Ok(())
    }

    /// Excludes from the selector every in-grid cell inside the future
    /// light cone of the given cell.
    pub fn exclude_cone(&mut self, row: i32, col: i32, gen: i32) -> Result<(), Error> {
        if !self.in_grid(row, col) || gen < 0 || gen >= self.config.gen_max {
            return Err(Error::CellRange(row, col, gen));
        }
        for t_gen in gen..self.config.gen_max {
            let dist = t_gen - gen;
            for t_row in row - dist..=row + dist {
                for t_col in col - dist..=col + dist {
                    if self.in_grid(t_row, t_col) {
                        let id = self.cell_at(t_row, t_col, t_gen);
                        self.cells[id.index()].choose = false;
                    }
                }
            }
        }
        Ok(())
    }

    /// Excludes a single cell from the selector. Used when restoring a
    /// dumped state.
    pub(crate) fn set_unchoosable(&mut self, row: i32, col: i32, gen: i32) -> Result<(), Error> {
        if !self.in_grid(row, col) || gen < 0 || gen >= self.config.gen_max {
            return Err(Error::CellRange(row, col, gen));
        }
        let id = self.cell_at(row, col, gen);
        self.cells[id.index()].choose = false;
        Ok(())
    }

    /// Seals everything set so far as the immutable base of the search and
    /// arms the init-gated pruning checks.
    pub fn commit_init(&mut self) {
        self.base_set = self.next_set;
        self.inited = true;
    }

    /// World configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The rule being searched.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Current search status.
    pub fn status(&self) -> Status {
        self.cur_status
    }

    /// Number of on cells in generation 0.
    pub fn cell_count(&self) -> i32 {
        self.cell_count
    }

    /// Number of generation-0 columns with every cell decided.
    pub fn full_columns(&self) -> i32 {
        self.full_columns
    }

    /// Number of on cells in some generation.
    pub fn count_gen(&self, gen: i32) -> i32 {
        let gen = gen.rem_euclid(self.config.gen_max);
        let mut count = 0;
        for row in 1..=self.config.row_max {
            for col in 1..=self.config.col_max {
                let id = self.cell_at(row, col, gen);
                if self.cells[id.index()].state == State::On {
                    count += 1;
                }
            }
        }
        count
    }

    /// The state of a cell. Coordinates outside the rectangle read as off.
    pub fn get_cell_state(&self, row: i32, col: i32, gen: i32) -> State {
        if gen < 0 || gen >= self.config.gen_max || !self.in_grid(row, col) {
            return State::Off;
        }
        self.cells[self.cell_at(row, col, gen).index()].state
    }

    /// Renders one generation as text, one character per cell:
    /// `.` off, `O` on, `?` unknown, `+` unknown frozen, `X` unknown
    /// excluded from the search.
    pub fn display_gen(&self, gen: i32) -> String {
        let gen = gen.rem_euclid(self.config.gen_max);
        let mut out = String::new();
        for row in 1..=self.config.row_max {
            for col in 1..=self.config.col_max {
                let cell = &self.cells[self.cell_at(row, col, gen).index()];
                out.push(match cell.state {
                    State::Off => '.',
                    State::On => 'O',
                    State::Unk => {
                        if !cell.choose {
                            'X'
                        } else if cell.frozen {
                            '+'
                        } else {
                            '?'
                        }
                    }
                });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_links_are_symmetric() {
        let world = Config::new(5, 4, 2).world().unwrap();
        for gen in 0..2 {
            for row in 1..=5 {
                for col in 1..=4 {
                    let id = world.cell_at(row, col, gen);
                    for slot in 0..8 {
                        let neighbor = world.cells[id.index()].nbhd[slot];
                        assert_ne!(neighbor, BOUNDARY);
                        assert_eq!(world.cells[neighbor.index()].nbhd[7 - slot], id);
                    }
                }
            }
        }
    }

    #[test]
    fn temporal_links_are_inverse() {
        // A translated world exercises the rewired wrap.
        let world = Config::new(4, 4, 3).set_translate(1, 1).world().unwrap();
        for gen in 0..3 {
            for row in 0..=5 {
                for col in 0..=5 {
                    let id = world.cell_at(row, col, gen);
                    let future = world.cells[id.index()].future;
                    let past = world.cells[id.index()].past;
                    assert_eq!(world.cells[future.index()].past, id);
                    assert_eq!(world.cells[past.index()].future, id);
                }
            }
        }
    }

    #[test]
    fn translation_materializes_auxiliary_cells() {
        let world = Config::new(3, 3, 2).set_translate(1, 0).world().unwrap();
        // Forward mapping of the bottom padding row lands one row below
        // the padded rectangle.
        assert!(world.find_cell(5, 2, 0).is_some());
        assert!(world.find_cell(7, 2, 0).is_none());
    }

    #[test]
    fn point_symmetry_loops_partners() {
        let world = Config::new(3, 3, 1).set_point_sym(true).world().unwrap();
        let a = world.cell_at(1, 1, 0);
        let b = world.cell_at(3, 3, 0);
        let mut walk = world.cells[a.index()].next_in_loop.unwrap();
        let mut found = false;
        while walk != a {
            if walk == b {
                found = true;
            }
            walk = world.cells[walk.index()].next_in_loop.unwrap();
        }
        assert!(found);
    }

    #[test]
    fn diagonal_symmetry_closes_orbits() {
        let world = Config::new(5, 5, 1)
            .set_fwd_sym(true)
            .set_bwd_sym(true)
            .world()
            .unwrap();
        // The orbit of (2, 3) under both diagonals has four members.
        let start = world.cell_at(2, 3, 0);
        let mut members = vec![start];
        let mut walk = world.cells[start.index()].next_in_loop.unwrap();
        while walk != start {
            members.push(walk);
            walk = world.cells[walk.index()].next_in_loop.unwrap();
        }
        assert_eq!(members.len(), 4);
        for &(r, c) in &[(3, 2), (3, 4), (4, 3)] {
            assert!(members.contains(&world.cell_at(r, c, 0)));
        }
    }

    #[test]
    fn search_order_starts_in_generation_zero() {
        let world = Config::new(4, 6, 3).world().unwrap();
        assert_eq!(
            world.search_list.len(),
            (4 * 6 * 3) as usize
        );
        let first = &world.cells[world.search_list[0].index()];
        assert_eq!(first.gen, 0);
        assert_eq!(first.col, 1);
    }
}
