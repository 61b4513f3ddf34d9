//! Life-family birth/survival rules and the deduction tables that drive the
//! propagator.
//!
//! Both tables are indexed by an 8-bit neighborhood descriptor packing the
//! center state together with the counts of off, on and unknown neighbors.
//! The transit table answers "what must this cell become in the next
//! generation"; the implication table answers "given what the cell became,
//! what does that force onto the previous generation".

use crate::cells::State;
use crate::error::Error;
use bitflags::bitflags;
use std::str::FromStr;

bitflags! {
    /// Facts a resolved next-generation state forces onto the current
    /// neighborhood.
    ///
    /// `SUCC0`/`SUCC1` name the observed next-generation state; `SELF`
    /// flags force the center of the current neighborhood, `NBHD` flags
    /// force every still-unknown neighbor at once.
    pub(crate) struct ImplFlags: u8 {
        /// Next generation off forces the current cell off.
        const SUCC0_SELF0 = 0x01;
        /// Next generation off forces the current cell on.
        const SUCC0_SELF1 = 0x02;
        /// Next generation on forces the current cell off.
        const SUCC1_SELF0 = 0x04;
        /// Next generation on forces the current cell on.
        const SUCC1_SELF1 = 0x08;
        /// Next generation off forces the unknown neighbors off.
        const SUCC0_NBHD0 = 0x10;
        /// Next generation off forces the unknown neighbors on.
        const SUCC0_NBHD1 = 0x20;
        /// Next generation on forces the unknown neighbors off.
        const SUCC1_NBHD0 = 0x40;
        /// Next generation on forces the unknown neighbors on.
        const SUCC1_NBHD1 = 0x80;
    }
}

/// Packs a center state and the summed states of its eight neighbors into
/// the table index.
///
/// With `Off = 0x00`, `On = 0x01` and `Unk = 0x10`, the sum keeps the on
/// count in the low nibble and the unknown count in the high nibble; the
/// two encodings below keep every (center, sum) pair distinct in 8 bits.
#[inline]
pub(crate) fn sum_to_desc(state: State, sum: usize) -> usize {
    let s = state as usize;
    if sum & 0x88 != 0 {
        sum + s * 2 + 0x11
    } else {
        sum * 2 + s
    }
}

/// A totalistic birth/survival rule together with its deduction tables.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Whether a dead cell with n live neighbors is born.
    born: [bool; 9],
    /// Whether a live cell with n live neighbors survives.
    live: [bool; 9],
    /// The canonical `B.../S...` form, used for display and dumping.
    rule_string: String,
    /// Descriptor to forced next-generation state, or `Unk`.
    transit: [State; 256],
    /// Descriptor to backward implications.
    implic: [ImplFlags; 256],
}

impl Rule {
    /// Builds a rule and computes its tables by exhaustive enumeration over
    /// (center state, off count, on count).
    pub fn new(born: [bool; 9], live: [bool; 9]) -> Self {
        let mut rule = Rule {
            born,
            live,
            rule_string: Self::make_string(&born, &live),
            transit: [State::Unk; 256],
            implic: [ImplFlags::empty(); 256],
        };
        rule.init_transit();
        rule.init_implic();
        rule
    }

    /// The canonical rule string.
    pub fn rule_string(&self) -> &str {
        &self.rule_string
    }

    /// Whether this is standard Life.
    pub fn is_life(&self) -> bool {
        self.rule_string == "B3/S23"
    }

    #[inline]
    pub(crate) fn transit(&self, desc: usize) -> State {
        self.transit[desc]
    }

    #[inline]
    pub(crate) fn implic(&self, desc: usize) -> ImplFlags {
        self.implic[desc]
    }

    fn make_string(born: &[bool; 9], live: &[bool; 9]) -> String {
        let mut s = String::from("B");
        for (i, &b) in born.iter().enumerate() {
            if b {
                s.push((b'0' + i as u8) as char);
            }
        }
        s.push_str("/S");
        for (i, &l) in live.iter().enumerate() {
            if l {
                s.push((b'0' + i as u8) as char);
            }
        }
        s
    }

    /// The next state of a cell when all of its neighbors are known.
    fn next_state(&self, state: State, on_count: usize) -> State {
        match state {
            State::On => {
                if self.live[on_count] {
                    State::On
                } else {
                    State::Off
                }
            }
            State::Off => {
                if self.born[on_count] {
                    State::On
                } else {
                    State::Off
                }
            }
            State::Unk => {
                if self.born[on_count] == self.live[on_count] {
                    self.next_state(State::Off, on_count)
                } else {
                    State::Unk
                }
            }
        }
    }

    /// The transition of a cell over every completion of its unknown
    /// neighbors. The unknown count is implicit since there are eight
    /// neighbors.
    fn transition(&self, state: State, off_count: usize, on_count: usize) -> State {
        let unk_count = 8 - off_count - on_count;
        let mut on_always = true;
        let mut off_always = true;

        for i in 0..=unk_count {
            match self.next_state(state, on_count + i) {
                State::On => off_always = false,
                State::Off => on_always = false,
                State::Unk => return State::Unk,
            }
        }

        if on_always {
            State::On
        } else if off_always {
            State::Off
        } else {
            State::Unk
        }
    }

    /// The backward implications of a neighborhood, again over every
    /// completion of the unknown neighbors.
    fn implication(&self, state: State, off_count: usize, on_count: usize) -> ImplFlags {
        let unk_count = 8 - off_count - on_count;
        let mut flags = ImplFlags::empty();

        if state == State::Unk {
            // Start with everything implied and knock out the implications
            // for which a counterexample completion exists.
            flags |= ImplFlags::SUCC0_SELF0
                | ImplFlags::SUCC0_SELF1
                | ImplFlags::SUCC1_SELF0
                | ImplFlags::SUCC1_SELF1;

            for i in 0..=unk_count {
                match self.next_state(State::Off, on_count + i) {
                    State::On => flags -= ImplFlags::SUCC1_SELF1,
                    State::Off => flags -= ImplFlags::SUCC0_SELF1,
                    State::Unk => {}
                }
                match self.next_state(State::On, on_count + i) {
                    State::On => flags -= ImplFlags::SUCC1_SELF0,
                    State::Off => flags -= ImplFlags::SUCC0_SELF0,
                    State::Unk => {}
                }
            }
        }

        if unk_count > 0 {
            flags |= ImplFlags::SUCC0_NBHD0
                | ImplFlags::SUCC0_NBHD1
                | ImplFlags::SUCC1_NBHD0
                | ImplFlags::SUCC1_NBHD1;

            for &center in &[State::Off, State::On] {
                if state != center && state != State::Unk {
                    continue;
                }

                // All unknown neighbors off.
                match self.next_state(center, on_count) {
                    State::On => flags -= ImplFlags::SUCC1_NBHD1,
                    State::Off => flags -= ImplFlags::SUCC0_NBHD1,
                    State::Unk => {}
                }

                // All unknown neighbors on.
                match self.next_state(center, on_count + unk_count) {
                    State::On => flags -= ImplFlags::SUCC1_NBHD0,
                    State::Off => flags -= ImplFlags::SUCC0_NBHD0,
                    State::Unk => {}
                }

                // Mixed completions rule out both directions at once.
                for i in 1..unk_count {
                    match self.next_state(center, on_count + i) {
                        State::On => {
                            flags -= ImplFlags::SUCC1_NBHD0 | ImplFlags::SUCC1_NBHD1
                        }
                        State::Off => {
                            flags -= ImplFlags::SUCC0_NBHD0 | ImplFlags::SUCC0_NBHD1
                        }
                        State::Unk => {}
                    }
                }
            }
        }

        flags
    }

    fn init_transit(&mut self) {
        for &state in &[State::Off, State::On, State::Unk] {
            for off_count in (0..=8usize).rev() {
                for on_count in 0..=(8 - off_count) {
                    let sum = on_count + (8 - on_count - off_count) * (State::Unk as usize);
                    let desc = sum_to_desc(state, sum);
                    self.transit[desc] = self.transition(state, off_count, on_count);
                }
            }
        }
    }

    fn init_implic(&mut self) {
        for &state in &[State::Off, State::On, State::Unk] {
            for off_count in (0..=8usize).rev() {
                for on_count in 0..=(8 - off_count) {
                    let sum = on_count + (8 - on_count - off_count) * (State::Unk as usize);
                    let desc = sum_to_desc(state, sum);
                    self.implic[desc] = self.implication(state, off_count, on_count);
                }
            }
        }
    }
}

/// Standard Life, B3/S23.
impl Default for Rule {
    fn default() -> Self {
        let mut born = [false; 9];
        let mut live = [false; 9];
        born[3] = true;
        live[2] = true;
        live[3] = true;
        Rule::new(born, live)
    }
}

/// Parses `"born/live"`, `"born,live"`, `"Bxxx/Syyy"`, `"Bxxx,Syyy"`, or a
/// hex Wolfram encoding where bit pair 2n holds (born, live) for n live
/// neighbors. Note that the birth part comes first even in the bare form:
/// `"3/23"` is B3/S23.
impl FromStr for Rule {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bad = || Error::ParseRule(input.to_string());
        let mut born = [false; 9];
        let mut live = [false; 9];

        if input.is_empty() {
            return Err(bad());
        }

        if !input.contains(',') && !input.contains('/') {
            // Wolfram hex format. Rules wider than 10 bits are rejected.
            let mut bits = u32::from_str_radix(input, 16).map_err(|_| bad())?;
            if bits & !0x3ff != 0 {
                return Err(bad());
            }
            for i in 0..9 {
                if bits & 0x01 != 0 {
                    born[i] = true;
                }
                if bits & 0x02 != 0 {
                    live[i] = true;
                }
                bits >>= 2;
            }
        } else {
            let mut chars = input.chars().peekable();
            if let Some(&c) = chars.peek() {
                if c == 'b' || c == 'B' {
                    chars.next();
                }
            }
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(9)) {
                born[d as usize] = true;
                chars.next();
            }
            match chars.next() {
                Some(',') | Some('/') => {}
                _ => return Err(bad()),
            }
            if let Some(&c) = chars.peek() {
                if c == 's' || c == 'S' {
                    chars.next();
                }
            }
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(9)) {
                live[d as usize] = true;
                chars.next();
            }
            if chars.next().is_some() {
                return Err(bad());
            }
        }

        Ok(Rule::new(born, live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        for s in &["3/23", "B3/S23", "b3,s23", "B3,S23", "e0"] {
            let rule: Rule = s.parse().unwrap();
            assert_eq!(rule.rule_string(), "B3/S23", "from {:?}", s);
            assert!(rule.is_life());
        }
    }

    #[test]
    fn parse_rejects() {
        assert!("".parse::<Rule>().is_err());
        assert!("B3S23".parse::<Rule>().is_err());
        assert!("B3/S23/".parse::<Rule>().is_err());
        assert!("B9/S2".parse::<Rule>().is_err());
        // More than 10 bits of Wolfram encoding.
        assert!("fff".parse::<Rule>().is_err());
    }

    #[test]
    fn transit_matches_enumeration() {
        let rule = Rule::default();
        for &state in &[State::Off, State::On, State::Unk] {
            for off_count in 0..=8usize {
                for on_count in 0..=(8 - off_count) {
                    let unk_count = 8 - off_count - on_count;
                    let sum = on_count + unk_count * (State::Unk as usize);
                    let desc = sum_to_desc(state, sum);

                    // Recompute the forced state by brute force over every
                    // completion of the unknown neighbors.
                    let mut outcomes = Vec::new();
                    for extra_on in 0..=unk_count {
                        outcomes.push(rule.next_state(state, on_count + extra_on));
                    }
                    let expected = if outcomes.iter().all(|&s| s == State::On) {
                        State::On
                    } else if outcomes.iter().all(|&s| s == State::Off) {
                        State::Off
                    } else {
                        State::Unk
                    };

                    assert_eq!(rule.transit(desc), expected);
                }
            }
        }
    }

    #[test]
    fn descriptors_are_distinct() {
        let mut seen = [false; 256];
        for &state in &[State::Off, State::On, State::Unk] {
            for off_count in 0..=8usize {
                for on_count in 0..=(8 - off_count) {
                    let unk_count = 8 - off_count - on_count;
                    let sum = on_count + unk_count * (State::Unk as usize);
                    let desc = sum_to_desc(state, sum);
                    assert!(desc < 256);
                    assert!(!seen[desc], "descriptor collision at {:#x}", desc);
                    seen[desc] = true;
                }
            }
        }
    }

    #[test]
    fn implications_are_sound() {
        let rule = Rule::default();
        for &state in &[State::Off, State::On, State::Unk] {
            for off_count in 0..=8usize {
                for on_count in 0..=(8 - off_count) {
                    let unk_count = 8 - off_count - on_count;
                    let sum = on_count + unk_count * (State::Unk as usize);
                    let flags = rule.implic(sum_to_desc(state, sum));

                    // Center implications: the asserted center state must be
                    // the only one able to produce the observed next state.
                    if flags.contains(ImplFlags::SUCC1_SELF0) {
                        for k in 0..=unk_count {
                            assert_ne!(rule.next_state(State::On, on_count + k), State::On);
                        }
                    }
                    if flags.contains(ImplFlags::SUCC1_SELF1) {
                        for k in 0..=unk_count {
                            assert_ne!(rule.next_state(State::Off, on_count + k), State::On);
                        }
                    }
                    if flags.contains(ImplFlags::SUCC0_SELF0) {
                        for k in 0..=unk_count {
                            assert_ne!(rule.next_state(State::On, on_count + k), State::Off);
                        }
                    }
                    if flags.contains(ImplFlags::SUCC0_SELF1) {
                        for k in 0..=unk_count {
                            assert_ne!(rule.next_state(State::Off, on_count + k), State::Off);
                        }
                    }

                    // Neighborhood implications: the observed next state must
                    // be unreachable with any other unknown-neighbor count.
                    let centers: &[State] = match state {
                        State::Off => &[State::Off],
                        State::On => &[State::On],
                        State::Unk => &[State::Off, State::On],
                    };
                    for &center in centers {
                        if flags.contains(ImplFlags::SUCC1_NBHD0) {
                            for k in 1..=unk_count {
                                assert_ne!(rule.next_state(center, on_count + k), State::On);
                            }
                        }
                        if flags.contains(ImplFlags::SUCC1_NBHD1) {
                            for k in 0..unk_count {
                                assert_ne!(rule.next_state(center, on_count + k), State::On);
                            }
                        }
                        if flags.contains(ImplFlags::SUCC0_NBHD0) {
                            for k in 1..=unk_count {
                                assert_ne!(rule.next_state(center, on_count + k), State::Off);
                            }
                        }
                        if flags.contains(ImplFlags::SUCC0_NBHD1) {
                            for k in 0..unk_count {
                                assert_ne!(rule.next_state(center, on_count + k), State::Off);
                            }
                        }
                    }
                }
            }
        }
    }
}
