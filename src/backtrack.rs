// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The backtracking engine: a single recursive `run(pc, pos)`, grounded on
//! `fancy-regex`'s VM (`examples/other_examples/..._mbrubeck-fancy-regex__src-vm.rs.rs`)
//! for the parts the lockstep engine can't do — lookaround — while keeping
//! this crate's own `Inst` set and capture-slot model.
//!
//! `Split`'s `sec` branch is a loop continuation (`pc = sec; continue`)
//! rather than a second recursive call: trying the lower-priority branch
//! after the higher-priority one fails doesn't need its own stack frame,
//! only the higher-priority `pref` branch does, since its failure has to
//! unwind back to here before `sec` can run. `Save` restores the slot it
//! overwrote on failure by recursing into its `goto` and rolling back if
//! that returns `false` — the only way a capture taken by a path that
//! ultimately failed can stop being visible.
//!
//! Recursion depth is metered by `max_depth` (`RegexBuilder::backtrack_stack_limit`,
//! grounded on fancy-regex's `MAX_STACK`) rather than bounded automatically:
//! this engine has no `O(nm)` memoization table, so a pathological pattern
//! can still blow up exponentially, same as any plain backtracker.

use crate::error::Error;
use crate::inst::Inst;
use crate::input::Input;
use crate::literal;
use crate::program::{Pc, Program};

struct Backtracker<'p, 't> {
    prog: &'p Program,
    input: Input<'t>,
    slots: Vec<Option<usize>>,
    depth: usize,
    max_depth: usize,
}

impl<'p, 't> Backtracker<'p, 't> {
    fn run(&mut self, pc: Pc, pos: usize) -> Result<bool, Error> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(Error::BacktrackLimitExceeded);
        }

        let mut pc = pc;
        let mut pos = pos;
        let result = loop {
            match &self.prog.insts()[pc] {
                Inst::Match => break Ok(true),
                Inst::Jump { goto } => pc = *goto,
                Inst::Save { slot, goto } => {
                    let slot = *slot;
                    let goto = *goto;
                    let old = self.slots[slot];
                    self.slots[slot] = Some(pos);
                    match self.run(goto, pos) {
                        Ok(true) => break Ok(true),
                        Ok(false) => {
                            self.slots[slot] = old;
                            break Ok(false);
                        }
                        Err(e) => break Err(e),
                    }
                }
                Inst::Split { pref, sec } => {
                    let pref = *pref;
                    match self.run(pref, pos) {
                        Ok(true) => break Ok(true),
                        Ok(false) => pc = *sec,
                        Err(e) => break Err(e),
                    }
                }
                Inst::EmptyLook { look, goto } => {
                    let at = self.input.at(pos);
                    let before = self.input.previous_char(at);
                    let after = at.char();
                    if look.matches(before, after) {
                        pc = *goto;
                    } else {
                        break Ok(false);
                    }
                }
                Inst::LookAround { body, ahead, positive, distance, goto } => {
                    let (body, ahead, positive, distance, goto) =
                        (*body, *ahead, *positive, *distance, *goto);
                    let matched = if ahead {
                        self.run(body, pos)?
                    } else {
                        match self.input.step_back(pos, distance) {
                            Some(back_pos) => self.run(body, back_pos)?,
                            None => false,
                        }
                    };
                    if matched == positive {
                        pc = goto;
                    } else {
                        break Ok(false);
                    }
                }
                inst if inst.is_consuming() => {
                    let at = self.input.at(pos);
                    match at.char().as_char().and_then(|c| inst.matches_char(c)) {
                        Some(goto) => {
                            pc = goto;
                            pos = at.next_pos();
                        }
                        None => break Ok(false),
                    }
                }
                _ => unreachable!("every Inst variant is handled above"),
            }
        };

        self.depth -= 1;
        result
    }
}

/// Runs the backtracking search starting at byte offset `start` of `text`,
/// giving up with `Error::BacktrackLimitExceeded` if recursion ever goes
/// deeper than `max_depth`. Like the lockstep engine, the unanchored search
/// itself is handled by `prog.start()`'s compiled-in `.*?` prefix, not by
/// this function looping over candidate start positions.
pub fn exec(
    prog: &Program,
    text: &str,
    start: usize,
    max_depth: usize,
) -> Result<Option<Vec<Option<usize>>>, Error> {
    let start = match literal::skip_to_leading_byte(
        prog.leading_byte(),
        prog.anchored_begin(),
        text,
        start,
    ) {
        Some(start) => start,
        None => return Ok(None),
    };
    let mut bt = Backtracker {
        prog,
        input: Input::new(text),
        slots: vec![None; 2 * prog.num_captures()],
        depth: 0,
        max_depth,
    };
    match bt.run(prog.start(), start)? {
        true => Ok(Some(bt.slots)),
        false => Ok(None),
    }
}
