//! Reading initial patterns and writing found objects.

use crate::cells::State;
use crate::error::Error;
use crate::world::World;
use std::io::{BufRead, Write};

/// How much of an initial pattern to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternMode {
    /// Set only the on cells.
    OnOnly,
    /// Set both the on and the off cells.
    All,
    /// Set on cells normally and off cells in every generation.
    Deep,
}

impl World {
    /// Reads an initial pattern into generation 0, or into the last
    /// generation when searching for parents.
    ///
    /// `*`, `O` and `o` set a cell on; `.` and space set it off (ignored
    /// in [`PatternMode::OnOnly`]); `:` sets it off in every generation;
    /// `?` leaves it unknown; `x` and `X` exclude its future light cone
    /// from the selector; `+` freezes it across all generations. On cells
    /// outside the configured rectangle are an error, ignorable characters
    /// there are tolerated.
    ///
    /// Everything the pattern forces becomes part of the immutable base of
    /// the search.
    pub fn read_pattern<R: BufRead>(&mut self, input: R, mode: PatternMode) -> Result<(), Error> {
        let active_gen = if self.config.parent {
            self.config.gen_max - 1
        } else {
            0
        };
        let last_gen = self.config.gen_max - 1;

        let mut row = 0;
        for line in input.lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            row += 1;
            let mut col = 0;

            for ch in line.chars() {
                col += 1;

                if !self.in_grid(row, col) {
                    match ch {
                        '.' | ' ' | ':' | '?' => continue,
                        _ => return Err(Error::PatternRange),
                    }
                }

                let mut min_gen = active_gen;
                let mut max_gen = active_gen;
                let state = match ch {
                    '?' => continue,
                    'x' | 'X' => {
                        self.exclude_cone(row, col, active_gen)?;
                        continue;
                    }
                    '+' => {
                        self.freeze_cell(row, col)?;
                        continue;
                    }
                    '.' | ' ' => {
                        if mode == PatternMode::OnOnly {
                            continue;
                        }
                        if mode == PatternMode::Deep {
                            min_gen = 0;
                            max_gen = last_gen;
                        }
                        State::Off
                    }
                    ':' => {
                        min_gen = 0;
                        max_gen = last_gen;
                        State::Off
                    }
                    'O' | 'o' | '*' => State::On,
                    _ => return Err(Error::PatternChar(ch, row)),
                };

                for gen in min_gen..=max_gen {
                    let id = self.cell_at(row, col, gen);
                    if self.proceed(id, state, false).is_err() {
                        return Err(Error::InconsistentCell(row, col, gen));
                    }
                }
            }
        }

        self.base_set = self.next_set;
        Ok(())
    }

    /// Writes the minimum bounding rectangle of one generation's non-off
    /// cells, one character per cell: `.` off, `*` on, `?` unknown,
    /// `X` unknown and excluded from the search. In append mode a blank
    /// line separates consecutive objects.
    pub fn write_gen<W: Write>(&self, out: &mut W, gen: i32, append: bool) -> Result<(), Error> {
        let gen = gen.rem_euclid(self.config.gen_max);

        let mut min_row = self.config.row_max;
        let mut max_row = 1;
        let mut min_col = self.config.col_max;
        let mut max_col = 1;

        for row in 1..=self.config.row_max {
            for col in 1..=self.config.col_max {
                if self.get_cell_state(row, col, gen) == State::Off {
                    continue;
                }
                min_row = min_row.min(row);
                max_row = max_row.max(row);
                min_col = min_col.min(col);
                max_col = max_col.max(col);
            }
        }

        if min_row > max_row {
            min_row = 1;
            max_row = 1;
            min_col = 1;
            max_col = 1;
        }

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let id = self.cell_at(row, col, gen);
                let cell = &self.cells[id.index()];
                let ch = match cell.state {
                    State::Off => '.',
                    State::On => '*',
                    State::Unk => {
                        if cell.choose {
                            '?'
                        } else {
                            'X'
                        }
                    }
                };
                write!(out, "{}", ch)?;
            }
            writeln!(out)?;
        }

        if append {
            writeln!(out)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn pattern_sets_and_freezes() {
        let mut world = Config::new(3, 3, 2).world().unwrap();
        world
            .read_pattern("?*?\n?+?\n".as_bytes(), PatternMode::All)
            .unwrap();
        assert_eq!(world.get_cell_state(1, 2, 0), State::On);
        // The frozen position is looped across both generations.
        assert_eq!(world.display_gen(0).lines().nth(1).unwrap(), "?+?");
    }

    #[test]
    fn on_cell_outside_rectangle_is_fatal() {
        let mut world = Config::new(2, 2, 1).world().unwrap();
        let result = world.read_pattern("...*\n".as_bytes(), PatternMode::OnOnly);
        assert_eq!(result, Err(Error::PatternRange));
    }

    #[test]
    fn write_gen_bounds_the_object() {
        let mut world = Config::new(4, 4, 1).world().unwrap();
        for &(row, col) in &[(2, 2), (2, 3), (3, 2), (3, 3)] {
            world.proceed_cell(row, col, 0, State::On).unwrap();
        }
        let mut out = Vec::new();
        world.write_gen(&mut out, 0, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "**\n**\n");
    }

    #[test]
    fn empty_generation_writes_one_cell() {
        let mut world = Config::new(2, 2, 1).world().unwrap();
        world
            .read_pattern("..\n..\n".as_bytes(), PatternMode::All)
            .unwrap();
        let mut out = Vec::new();
        world.write_gen(&mut out, 0, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ".\n");
    }
}
