//! Dumping and restoring the full engine state.
//!
//! The dump is line-oriented ASCII, version 6:
//!
//! ```text
//! V <version>
//! R <ruleString>                       omitted for B3/S23
//! P <int> <int> ...                    parameter vector, fixed order
//! S <row> <col> <gen> <state> <free>   one per set cell, in setting order
//! X <row> <col> <gen>                  cells excluded from the selector
//! F <row> <col>                        frozen generation-0 cells
//! T <baseOffset> <nextOffset>          indices into the set stack
//! E
//! ```
//!
//! The parameter order is the serialization contract: fields may only be
//! appended, and absent trailing fields read back as zero, so newer
//! programs load older dumps.

use crate::cells::State;
use crate::config::Config;
use crate::error::Error;
use crate::search::Status;
use crate::world::World;
use std::io::{BufRead, Write};

/// Version of the dump file format.
pub const DUMP_VERSION: i32 = 6;

impl World {
    /// Writes the full engine state, bit-stable for later resumption.
    pub fn dump_state<W: Write>(&self, out: &mut W) -> Result<(), Error> {
        writeln!(out, "V {}", DUMP_VERSION)?;

        if !self.rule.is_life() {
            writeln!(out, "R {}", self.rule.rule_string())?;
        }

        write!(out, "P")?;
        for value in self.param_vector().iter() {
            write!(out, " {}", value)?;
        }
        writeln!(out)?;

        for &id in &self.set_table[..self.next_set] {
            let cell = &self.cells[id.index()];
            writeln!(
                out,
                "S {} {} {} {} {}",
                cell.row, cell.col, cell.gen, cell.state as u8, cell.free as i32
            )?;
        }

        for row in 1..=self.config.row_max {
            for col in 1..=self.config.col_max {
                for gen in 0..self.config.gen_max {
                    let id = self.cell_at(row, col, gen);
                    if !self.cells[id.index()].choose {
                        writeln!(out, "X {} {} {}", row, col, gen)?;
                    }
                }
            }
        }

        // Frozen cells of the other generations are copies of generation 0,
        // so only generation 0 is recorded.
        for row in 1..=self.config.row_max {
            for col in 1..=self.config.col_max {
                let id = self.cell_at(row, col, 0);
                if self.cells[id.index()].frozen {
                    writeln!(out, "F {} {}", row, col)?;
                }
            }
        }

        writeln!(out, "T {} {}", self.base_set, self.next_set)?;
        writeln!(out, "E")?;
        Ok(())
    }

    fn param_vector(&self) -> [i32; 27] {
        let c = &self.config;
        [
            self.cur_status as i32,
            c.row_max,
            c.col_max,
            c.gen_max,
            c.row_trans,
            c.col_trans,
            c.row_sym,
            c.col_sym,
            c.point_sym as i32,
            c.fwd_sym as i32,
            c.bwd_sym as i32,
            c.flip_rows,
            c.flip_cols,
            c.flip_quads as i32,
            c.parent as i32,
            c.all_objects as i32,
            c.near_cols,
            c.max_count,
            c.use_row,
            c.use_col,
            c.col_cells,
            c.col_width,
            c.follow as i32,
            c.order_wide as i32,
            c.order_gens as i32,
            c.order_middle as i32,
            c.follow_gens as i32,
        ]
    }

    fn load_set_cell(
        &mut self,
        row: i32,
        col: i32,
        gen: i32,
        state: State,
        free: bool,
    ) -> Result<(), Error> {
        let id = self
            .find_cell(row, col, gen)
            .ok_or(Error::CellRange(row, col, gen))?;
        if self.set_cell(id, state, free).is_err() {
            return Err(Error::InconsistentCell(row, col, gen));
        }
        Ok(())
    }
}

fn parse_ints(rest: &str, what: &'static str) -> Result<Vec<i32>, Error> {
    rest.split_whitespace()
        .map(|t| t.parse().map_err(|_| Error::DumpLine(what)))
        .collect()
}

/// Restores a world from a dump written by [`World::dump_state`].
///
/// The set cells are replayed through the ordinary setting path before the
/// init-gated pruning checks are armed, so a dump of any legal state loads
/// back. A setting that contradicts the graph fails the load with a
/// diagnostic naming the cell.
pub fn load_state<R: BufRead>(input: R) -> Result<World, Error> {
    let mut lines = Vec::new();
    for line in input.lines() {
        lines.push(line?);
    }
    let mut pos = 0;

    let line = lines.get(pos).ok_or(Error::DumpMissing("version"))?;
    pos += 1;
    if !line.starts_with('V') {
        return Err(Error::DumpMissing("version"));
    }
    let version = parse_ints(&line[1..], "version")?;
    if version.first() != Some(&DUMP_VERSION) {
        return Err(Error::DumpVersion);
    }

    let mut line = lines.get(pos).ok_or(Error::DumpMissing("parameter"))?;
    pos += 1;
    let mut rule_string = String::from("B3/S23");
    if line.starts_with('R') {
        rule_string = line[1..].trim().to_string();
        line = lines.get(pos).ok_or(Error::DumpMissing("parameter"))?;
        pos += 1;
    }

    if !line.starts_with('P') {
        return Err(Error::DumpMissing("parameter"));
    }
    let params = parse_ints(&line[1..], "parameter")?;
    let param = |i: usize| params.get(i).copied().unwrap_or(0);

    let config = Config {
        row_max: param(1),
        col_max: param(2),
        gen_max: param(3),
        row_trans: param(4),
        col_trans: param(5),
        row_sym: param(6),
        col_sym: param(7),
        point_sym: param(8) != 0,
        fwd_sym: param(9) != 0,
        bwd_sym: param(10) != 0,
        flip_rows: param(11),
        flip_cols: param(12),
        flip_quads: param(13) != 0,
        parent: param(14) != 0,
        all_objects: param(15) != 0,
        near_cols: param(16),
        max_count: param(17),
        use_row: param(18),
        use_col: param(19),
        col_cells: param(20),
        col_width: param(21),
        follow: param(22) != 0,
        order_wide: param(23) != 0,
        order_gens: param(24) != 0,
        order_middle: param(25) != 0,
        follow_gens: param(26) != 0,
        rule_string,
    };
    let mut world = World::new(&config)?;

    loop {
        let line = lines.get(pos).ok_or(Error::DumpMissing("table"))?;
        if !line.starts_with('S') {
            break;
        }
        pos += 1;
        let fields = parse_ints(&line[1..], "setting")?;
        if fields.len() < 5 {
            return Err(Error::DumpLine("setting"));
        }
        let state = match fields[3] {
            0 => State::Off,
            1 => State::On,
            _ => return Err(Error::DumpLine("setting")),
        };
        world.load_set_cell(fields[0], fields[1], fields[2], state, fields[4] != 0)?;
    }

    loop {
        let line = lines.get(pos).ok_or(Error::DumpMissing("table"))?;
        if !line.starts_with('X') {
            break;
        }
        pos += 1;
        let fields = parse_ints(&line[1..], "exclusion")?;
        if fields.len() < 3 {
            return Err(Error::DumpLine("exclusion"));
        }
        world.set_unchoosable(fields[0], fields[1], fields[2])?;
    }

    loop {
        let line = lines.get(pos).ok_or(Error::DumpMissing("table"))?;
        if !line.starts_with('F') {
            break;
        }
        pos += 1;
        let fields = parse_ints(&line[1..], "freeze")?;
        if fields.len() < 2 {
            return Err(Error::DumpLine("freeze"));
        }
        world.freeze_cell(fields[0], fields[1])?;
    }

    let line = lines.get(pos).ok_or(Error::DumpMissing("table"))?;
    pos += 1;
    if !line.starts_with('T') {
        return Err(Error::DumpMissing("table"));
    }
    let fields = parse_ints(&line[1..], "table")?;
    if fields.len() < 2 {
        return Err(Error::DumpLine("table"));
    }
    let base = fields[0] as usize;
    let next = fields[1] as usize;
    if base > next || next > world.set_table.len() {
        return Err(Error::DumpLine("table"));
    }
    world.base_set = base;
    world.next_set = next;

    let line = lines.get(pos).ok_or(Error::DumpMissing("end of file"))?;
    if !line.starts_with('E') {
        return Err(Error::DumpMissing("end of file"));
    }

    world.cur_status = match param(0) {
        4 => Status::Found,
        3 => Status::NotExist,
        _ => Status::Ok,
    };

    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn dump_shape() {
        let world = Config::new(3, 3, 2).world().unwrap();
        let mut out = Vec::new();
        world.dump_state(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("V 6"));
        // Standard Life omits the rule line.
        assert_eq!(lines.next(), Some("P 0 3 3 2 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0"));
        assert_eq!(lines.next(), Some("T 0 0"));
        assert_eq!(lines.next(), Some("E"));
    }

    #[test]
    fn nonstandard_rule_is_recorded() {
        let world = Config::new(3, 3, 1)
            .set_rule_string("B36/S23")
            .world()
            .unwrap();
        let mut out = Vec::new();
        world.dump_state(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().any(|l| l == "R B36/S23"));
        let reloaded = load_state(text.as_bytes()).unwrap();
        assert_eq!(reloaded.rule().rule_string(), "B36/S23");
    }

    #[test]
    fn truncated_dump_is_rejected() {
        assert_eq!(
            load_state("V 6\n".as_bytes()).unwrap_err(),
            Error::DumpMissing("parameter")
        );
        assert_eq!(
            load_state("V 5\nP 0\n".as_bytes()).unwrap_err(),
            Error::DumpVersion
        );
        assert_eq!(
            load_state("V 6\nP 0 3 3 1\nT 0 0\n".as_bytes()).unwrap_err(),
            Error::DumpMissing("end of file")
        );
    }
}
