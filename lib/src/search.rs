//! The search: constraint propagation, pruning, and the backtracking
//! driver.

use crate::cells::{nbhd, CellId, State};
use crate::error::Error;
use crate::rules::{sum_to_desc, ImplFlags};
use crate::world::World;
use log::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Search status.
///
/// The discriminants are the values written into dump files and must not
/// change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// The search is in progress. `search` returns this when the step
    /// budget runs out before a result is decided.
    Ok = 0,
    /// No pattern satisfies the constraints.
    NotExist = 3,
    /// A pattern was found. Calling `search` again looks for the next one.
    Found = 4,
}

/// A propagation contradiction. Never surfaced to the caller; it only
/// drives backtracking.
#[derive(Debug)]
pub(crate) struct Conflict;

impl World {
    /// The only legal writer of a cell state.
    ///
    /// Fails on contradiction with the current state, or when one of the
    /// generation-0 pruning gates rejects the assignment. On success the
    /// cell is pushed onto the set stack and the generation-0 aggregates
    /// are updated.
    pub(crate) fn set_cell(
        &mut self,
        id: CellId,
        state: State,
        free: bool,
    ) -> Result<(), Conflict> {
        let cell = &self.cells[id.index()];
        if cell.state == state {
            return Ok(());
        }
        if cell.state != State::Unk {
            return Err(Conflict);
        }

        let gen = cell.gen;
        let row = cell.row;
        let col = cell.col;
        let near = cell.near;
        let row_slot = cell.row_info;
        let col_slot = cell.col_info;

        if gen == 0 {
            let use_col = self.config.use_col;
            if use_col != 0 && self.inited {
                let info = &self.col_info[use_col as usize];
                if info.on_count == 0 && info.set_count == self.config.row_max {
                    return Err(Conflict);
                }
            }

            if state == State::On {
                if self.config.max_count != 0 && self.cell_count >= self.config.max_count {
                    return Err(Conflict);
                }
                if self.config.near_cols != 0 && near <= 0 && col > 1 && self.inited {
                    return Err(Conflict);
                }
                if self.config.col_cells != 0
                    && self.col_info[col_slot].on_count >= self.config.col_cells
                    && self.inited
                {
                    return Err(Conflict);
                }
                if self.config.col_width != 0 && self.inited && self.check_width(id) {
                    return Err(Conflict);
                }

                if self.config.near_cols != 0 {
                    self.adjust_near(id, 1);
                }
                self.row_info[row_slot].on_count += 1;
                self.col_info[col_slot].on_count += 1;
                self.col_info[col_slot].sum_pos += row;
                self.cell_count += 1;
            }
        }

        trace!(
            "set {} {} {} {} {:?}",
            row,
            col,
            gen,
            if free { "free" } else { "forced" },
            state
        );

        self.set_table.push(id);
        let cell = &mut self.cells[id.index()];
        cell.state = state;
        cell.free = free;
        self.col_info[col_slot].set_count += 1;
        if gen == 0 && self.col_info[col_slot].set_count == self.config.row_max {
            self.full_columns += 1;
        }

        Ok(())
    }

    /// Undoes set cells until the most recent free choice, which is popped
    /// and returned so the caller can try its other state. Returns `None`
    /// when only the immutable base remains.
    pub(crate) fn backup(&mut self) -> Option<CellId> {
        self.search_index = 0;

        while self.set_table.len() > self.base_set {
            let id = *self.set_table.last().unwrap();
            let cell = &self.cells[id.index()];
            let gen = cell.gen;
            let row = cell.row;
            let state = cell.state;
            let free = cell.free;
            let row_slot = cell.row_info;
            let col_slot = cell.col_info;

            trace!("backing up {} {} {} {:?}", row, cell.col, gen, state);

            if state == State::On && gen == 0 {
                self.row_info[row_slot].on_count -= 1;
                self.col_info[col_slot].on_count -= 1;
                self.col_info[col_slot].sum_pos -= row;
                self.cell_count -= 1;
                if self.config.near_cols != 0 {
                    self.adjust_near(id, -1);
                }
            }

            if gen == 0 && self.col_info[col_slot].set_count == self.config.row_max {
                self.full_columns -= 1;
            }
            self.col_info[col_slot].set_count -= 1;
            self.set_table.pop();

            if !free {
                let cell = &mut self.cells[id.index()];
                cell.state = State::Unk;
                cell.free = true;
                continue;
            }

            self.next_set = self.set_table.len();
            return Some(id);
        }

        self.next_set = self.base_set;
        None
    }

    /// The descriptor of a cell's neighborhood.
    #[inline]
    fn descriptor(&self, id: CellId) -> usize {
        let cell = &self.cells[id.index()];
        let mut sum = 0;
        for &neighbor in &cell.nbhd {
            sum += self.cells[neighbor.index()].state as usize;
        }
        sum_to_desc(cell.state, sum)
    }

    /// Makes sure the previous generation can validly produce this cell,
    /// forcing cell states where only one completion exists.
    fn consistify(&mut self, id: CellId) -> Result<(), Conflict> {
        // A parent search has no generation before 0.
        if self.config.parent && self.cells[id.index()].gen == 0 {
            return Ok(());
        }

        let prev = self.cells[id.index()].past;
        let desc = self.descriptor(prev);

        let forced = self.rule.transit(desc);
        if forced != State::Unk && forced != self.cells[id.index()].state {
            self.set_cell(id, forced, false)?;
        }

        let flags = self.rule.implic(desc);
        let state = self.cells[id.index()].state;
        if flags.is_empty() || state == State::Unk {
            return Ok(());
        }

        if state == State::Off {
            if flags.contains(ImplFlags::SUCC0_SELF0) {
                self.set_cell(prev, State::Off, false)?;
            }
            if flags.contains(ImplFlags::SUCC0_SELF1) {
                self.set_cell(prev, State::On, false)?;
            }
        } else {
            if flags.contains(ImplFlags::SUCC1_SELF0) {
                self.set_cell(prev, State::Off, false)?;
            }
            if flags.contains(ImplFlags::SUCC1_SELF1) {
                self.set_cell(prev, State::On, false)?;
            }
        }

        let forced_nbhd = if state == State::Off {
            if flags.contains(ImplFlags::SUCC0_NBHD0) {
                Some(State::Off)
            } else if flags.contains(ImplFlags::SUCC0_NBHD1) {
                Some(State::On)
            } else {
                None
            }
        } else if flags.contains(ImplFlags::SUCC1_NBHD0) {
            Some(State::Off)
        } else if flags.contains(ImplFlags::SUCC1_NBHD1) {
            Some(State::On)
        } else {
            None
        };

        if let Some(forced) = forced_nbhd {
            for slot in 0..8 {
                let neighbor = self.cells[prev.index()].nbhd[slot];
                if self.cells[neighbor.index()].state == State::Unk {
                    self.set_cell(neighbor, forced, false)?;
                }
            }
        }

        Ok(())
    }

    /// Consistifies every cell whose past neighborhood touches this one:
    /// the cell itself, its future, and the futures of its eight
    /// neighbors.
    fn consistify10(&mut self, id: CellId) -> Result<(), Conflict> {
        self.consistify(id)?;
        let future = self.cells[id.index()].future;
        self.consistify(future)?;
        for slot in 0..8 {
            let neighbor = self.cells[id.index()].nbhd[slot];
            let neighbor_future = self.cells[neighbor.index()].future;
            self.consistify(neighbor_future)?;
        }
        Ok(())
    }

    /// Sets a cell and drains the propagation work list until quiescence
    /// or contradiction.
    pub(crate) fn proceed(
        &mut self,
        id: CellId,
        state: State,
        free: bool,
    ) -> Result<(), Conflict> {
        self.set_cell(id, state, free)?;

        while self.next_set < self.set_table.len() {
            let cell = self.set_table[self.next_set];
            self.next_set += 1;

            // Loop members are forced to follow.
            if let Some(first) = self.cells[cell.index()].next_in_loop {
                let state = self.cells[cell.index()].state;
                let mut member = first;
                while member != cell {
                    let next = self.cells[member.index()].next_in_loop.unwrap();
                    self.set_cell(member, state, false)?;
                    member = next;
                }
            }

            self.consistify10(cell)?;
        }

        Ok(())
    }

    /// Proceeds with the given choice, backing up and flipping free
    /// choices for as long as contradictions arise. Fails only when the
    /// whole tree above the base is exhausted.
    fn go(&mut self, id: CellId, state: State, free: bool) -> Result<(), Conflict> {
        let mut id = id;
        let mut state = state;
        let mut free = free;
        loop {
            if self.proceed(id, state, free).is_ok() {
                return Ok(());
            }
            match self.backtrack() {
                Some((flip_id, flip_state)) => {
                    id = flip_id;
                    state = flip_state;
                    free = false;
                }
                None => return Err(Conflict),
            }
        }
    }

    /// Backs up to the most recent free choice and flips it.
    fn backtrack(&mut self) -> Option<(CellId, State)> {
        let id = self.backup()?;
        let state = !self.cells[id.index()].state;
        self.cells[id.index()].state = State::Unk;
        Some((id, state))
    }

    /// The next unknown cell to branch on, by the configured selector.
    fn get_unknown(&mut self) -> Option<CellId> {
        if self.config.follow {
            self.get_average_unknown()
        } else {
            self.get_normal_unknown()
        }
    }

    /// The first choosable unknown cell at or after the cursor.
    fn get_normal_unknown(&mut self) -> Option<CellId> {
        for i in self.search_index..self.search_list.len() {
            let id = self.search_list[i];
            let cell = &self.cells[id.index()];
            if cell.choose && cell.state == State::Unk {
                self.search_index = i;
                return Some(id);
            }
        }
        None
    }

    /// The unknown cell farthest from the average row of the previous
    /// live column, within the first column that has any. Since the first
    /// state tried is off, taking the farthest first drives the on cells
    /// toward that row.
    fn get_average_unknown(&mut self) -> Option<CellId> {
        let len = self.search_list.len();
        let mut i = self.search_index;

        while i < len {
            self.search_index = i;
            let cur_col = self.cells[self.search_list[i].index()].col;

            let mut test_col = cur_col - 1;
            while test_col > 0 && self.col_info[test_col as usize].on_count <= 0 {
                test_col -= 1;
            }
            let want_row = if test_col > 0 {
                let info = &self.col_info[test_col as usize];
                info.sum_pos / info.on_count
            } else {
                (self.config.row_max + 1) / 2
            };

            let mut best = None;
            let mut best_dist = -1;
            while i < len {
                let id = self.search_list[i];
                let cell = &self.cells[id.index()];
                if cell.col != cur_col {
                    break;
                }
                if cell.choose && cell.state == State::Unk {
                    let dist = (cell.row - want_row).abs();
                    if dist > best_dist {
                        best = Some(id);
                        best_dist = dist;
                    }
                }
                i += 1;
            }

            if best.is_some() {
                return best;
            }
        }

        None
    }

    /// The first state to try for an unknown cell. Off terminates objects
    /// soonest; with `follow_gens` a decided neighboring generation is
    /// matched instead.
    fn choose_state(&self, id: CellId) -> State {
        if self.config.follow_gens {
            let cell = &self.cells[id.index()];
            let past = self.cells[cell.past.index()].state;
            let future = self.cells[cell.future.index()].state;
            if past == State::On || future == State::On {
                return State::On;
            }
            if past == State::Off || future == State::Off {
                return State::Off;
            }
        }
        State::Off
    }

    /// Adds `inc` to the near count of every cell within the `near_cols`
    /// rectangle in the following columns. Must stay the exact inverse of
    /// itself under negation so that backtracking restores the counters.
    fn adjust_near(&mut self, id: CellId, inc: i32) {
        let near_cols = self.config.near_cols;
        let mut col_cell = id;

        for _ in 0..near_cols {
            col_cell = self.cells[col_cell.index()].nbhd[nbhd::RIGHT];

            let mut cur = col_cell;
            for _ in 0..=near_cols {
                self.cells[cur.index()].near += inc;
                cur = self.cells[cur.index()].nbhd[nbhd::UP];
            }

            let mut cur = self.cells[col_cell.index()].nbhd[nbhd::DOWN];
            for _ in 0..near_cols {
                self.cells[cur.index()].near += inc;
                cur = self.cells[cur.index()].nbhd[nbhd::DOWN];
            }
        }
    }

    /// Whether setting this generation-0 cell on would stretch the span of
    /// on cells in its column beyond `col_width`. When the column is
    /// mirrored by symmetry or a row flip, the span is measured only to
    /// the fold.
    fn check_width(&self, id: CellId) -> bool {
        let cell = &self.cells[id.index()];
        if self.config.col_width == 0 || !self.inited || cell.gen != 0 {
            return false;
        }

        let mut left = self.col_info[cell.col_info].on_count;
        if left <= 0 {
            return false;
        }

        let mut up = id;
        let mut down = id;
        let mut width = self.config.col_width;
        let mut min_row = cell.row;
        let mut max_row = cell.row;
        let mut src_min_row = 1;
        let mut src_max_row = self.config.row_max;
        let mut full = true;

        if (self.config.row_sym != 0 && cell.col >= self.config.row_sym)
            || (self.config.flip_rows != 0 && cell.col >= self.config.flip_rows)
        {
            full = false;
            src_max_row = (self.config.row_max + 1) / 2;
            if cell.row > src_max_row {
                src_min_row = self.config.row_max / 2 + 1;
                src_max_row = self.config.row_max;
            }
        }

        while left > 0 {
            if full {
                width -= 1;
                if width <= 0 {
                    return true;
                }
            }

            up = self.cells[up.index()].nbhd[nbhd::UP];
            down = self.cells[down.index()].nbhd[nbhd::DOWN];

            let up_cell = &self.cells[up.index()];
            if up_cell.state == State::On {
                if up_cell.row >= src_min_row {
                    min_row = up_cell.row;
                }
                left -= 1;
            }

            let down_cell = &self.cells[down.index()];
            if down_cell.state == State::On {
                if down_cell.row <= src_max_row {
                    max_row = down_cell.row;
                }
                left -= 1;
            }
        }

        max_row - min_row >= self.config.col_width
    }

    /// Whether generation 0 equals generation d for some proper divisor d
    /// of the period, meaning the object has a shorter period than
    /// requested.
    pub(crate) fn sub_periods(&self) -> bool {
        let gens = self.config.gen_max;
        'gen: for gen in 1..gens {
            if gens % gen != 0 {
                continue;
            }
            for row in 1..=self.config.row_max {
                for col in 1..=self.config.col_max {
                    let first = self.cell_at(row, col, 0);
                    let other = self.cell_at(row, col, gen);
                    if self.cells[first.index()].state != self.cells[other.index()].state {
                        continue 'gen;
                    }
                }
            }
            return true;
        }
        false
    }

    /// Whether a fully decided world is a reportable object.
    fn accept_candidate(&self) -> bool {
        if self.cell_count <= 0 {
            return false;
        }
        let use_row = self.config.use_row;
        if use_row != 0 && self.row_info[use_row as usize].on_count == 0 {
            return false;
        }
        if !self.config.all_objects && self.sub_periods() {
            return false;
        }
        true
    }

    /// The search driver.
    ///
    /// Returns [`Status::Found`] when an object is found, and
    /// [`Status::NotExist`] when the whole space is exhausted. When
    /// `max_step` top-level branch decisions pass without either, returns
    /// [`Status::Ok`] so the caller can poll input, view progress or dump
    /// state, and then call `search` again.
    ///
    /// Calling `search` again after [`Status::Found`] backtracks over the
    /// reported object and looks for the next one.
    pub fn search(&mut self, max_step: Option<u64>) -> Status {
        self.inited = true;

        if self.cur_status == Status::NotExist {
            return Status::NotExist;
        }

        // Resuming after a found object: back off the last solution first.
        if self.cur_status == Status::Found {
            self.cur_status = Status::Ok;
            match self.backtrack() {
                Some((id, state)) => {
                    if self.go(id, state, false).is_err() {
                        return self.finish(Status::NotExist);
                    }
                }
                None => return self.finish(Status::NotExist),
            }
        }

        let mut steps: u64 = 0;
        loop {
            steps += 1;
            if let Some(max) = max_step {
                if steps > max {
                    return Status::Ok;
                }
            }

            match self.get_unknown() {
                Some(id) => {
                    let state = self.choose_state(id);
                    if self.go(id, state, true).is_err() {
                        return self.finish(Status::NotExist);
                    }
                }
                None => {
                    if self.accept_candidate() {
                        return self.finish(Status::Found);
                    }
                    match self.backtrack() {
                        Some((id, state)) => {
                            if self.go(id, state, false).is_err() {
                                return self.finish(Status::NotExist);
                            }
                        }
                        None => return self.finish(Status::NotExist),
                    }
                }
            }
        }
    }

    fn finish(&mut self, status: Status) -> Status {
        trace!("search finished: {:?}", status);
        self.cur_status = status;
        status
    }

    /// Fixes a cell interactively and propagates the consequences. The
    /// setting becomes part of the immutable base; backtracking will never
    /// undo it.
    pub fn proceed_cell(&mut self, row: i32, col: i32, gen: i32, state: State) -> Result<(), Error> {
        if !self.in_grid(row, col) || gen < 0 || gen >= self.config.gen_max {
            return Err(Error::CellRange(row, col, gen));
        }
        let id = self.cell_at(row, col, gen);
        if self.proceed(id, state, false).is_err() {
            return Err(Error::InconsistentCell(row, col, gen));
        }
        self.base_set = self.next_set;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn undo_restores_everything() {
        // near_cols exercises the near counters without arming the gates,
        // since the world is never committed.
        let mut world = Config::new(5, 5, 2).set_near_cols(2).world().unwrap();

        let states: Vec<State> = world.cells.iter().map(|c| c.state).collect();
        let nears: Vec<i32> = world.cells.iter().map(|c| c.near).collect();
        let row_info = world.row_info.clone();
        let col_info = world.col_info.clone();
        let cell_count = world.cell_count;
        let full_columns = world.full_columns;

        // One free choice followed by a forced setting; a single backup
        // must undo both.
        let free_cell = world.cell_at(3, 3, 0);
        world.proceed(free_cell, State::On, true).unwrap();
        let forced_cell = world.cell_at(3, 2, 0);
        world.proceed(forced_cell, State::On, false).unwrap();
        assert_eq!(world.cell_count, 2);

        let popped = world.backup().unwrap();
        assert_eq!(popped, free_cell);
        world.cells[free_cell.index()].state = State::Unk;

        for (i, cell) in world.cells.iter().enumerate() {
            assert_eq!(cell.state, states[i], "state of cell {}", i);
            assert_eq!(cell.near, nears[i], "near of cell {}", i);
        }
        for (i, info) in world.row_info.iter().enumerate() {
            assert_eq!(info.on_count, row_info[i].on_count);
        }
        for (i, info) in world.col_info.iter().enumerate() {
            assert_eq!(info.set_count, col_info[i].set_count);
            assert_eq!(info.on_count, col_info[i].on_count);
            assert_eq!(info.sum_pos, col_info[i].sum_pos);
        }
        assert_eq!(world.cell_count, cell_count);
        assert_eq!(world.full_columns, full_columns);
        assert!(world.set_table.is_empty());
    }

    #[test]
    fn set_stack_is_faithful() {
        let mut world = Config::new(4, 4, 2).world().unwrap();
        let id = world.cell_at(2, 2, 0);
        world.proceed(id, State::On, true).unwrap();

        // Every stacked cell is decided and appears exactly once.
        for (i, &a) in world.set_table.iter().enumerate() {
            assert_ne!(world.cells[a.index()].state, State::Unk);
            for &b in &world.set_table[i + 1..] {
                assert_ne!(a, b);
            }
        }

        // Every decided in-grid cell is on the stack.
        let mut decided = 0;
        for gen in 0..2 {
            for row in 1..=4 {
                for col in 1..=4 {
                    let cell = world.cell_at(row, col, gen);
                    if world.cells[cell.index()].state != State::Unk {
                        assert!(world.set_table.contains(&cell));
                        decided += 1;
                    }
                }
            }
        }
        assert_eq!(decided, world.set_table.len());
    }

    #[test]
    fn counters_match_recount() {
        let mut world = Config::new(4, 4, 1).world().unwrap();
        for &(row, col) in &[(1, 1), (1, 2), (2, 1), (2, 2)] {
            let id = world.cell_at(row, col, 0);
            world.proceed(id, State::On, false).unwrap();
        }

        for col in 1..=4 {
            let mut on = 0;
            let mut set = 0;
            let mut sum = 0;
            for row in 1..=4 {
                match world.get_cell_state(row, col, 0) {
                    State::On => {
                        on += 1;
                        set += 1;
                        sum += row;
                    }
                    State::Off => set += 1,
                    State::Unk => {}
                }
            }
            let info = &world.col_info[col as usize];
            assert_eq!(info.on_count, on, "column {}", col);
            assert_eq!(info.set_count, set, "column {}", col);
            assert_eq!(info.sum_pos, sum, "column {}", col);
        }

        let full = (1..=4)
            .filter(|&c| world.col_info[c as usize].set_count == 4)
            .count() as i32;
        assert_eq!(world.full_columns, full);
    }

    #[test]
    fn loop_states_stay_equal() {
        let mut world = Config::new(4, 4, 1).set_point_sym(true).world().unwrap();
        let id = world.cell_at(1, 2, 0);
        world.proceed(id, State::On, true).unwrap();
        assert_eq!(world.get_cell_state(4, 3, 0), State::On);
    }
}
