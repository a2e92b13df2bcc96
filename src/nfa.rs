// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The lockstep (Thompson/Pike) engine: every currently-alive thread steps
//! one code point in the same pass, in priority order, so a leftmost-first
//! match is found in a single `O(nm)` sweep with no backtracking. Cannot
//! execute lookaround (`Inst::LookAround`) — that requires re-running part
//! of the program at a fixed offset from the *current* thread, which this
//! engine has no way to express without abandoning its single-pass
//! guarantee; `Regex::Engine::Auto` falls back to the backtracker for
//! patterns that need it.
//!
//! Duplicate threads at the same `pc` within one step are suppressed with a
//! generation counter (`ThreadList::gen`) rather than a sparse/dense pair:
//! bumping `gen` and comparing against a per-pc `last_seen` array is one
//! array write per dedup check instead of the two swaps the classic
//! sparse-set trick uses, and this crate only needs "was this pc already
//! added this step", never removal.

use std::mem;
use std::rc::Rc;

use crate::error::Error;
use crate::inst::Inst;
use crate::input::{At, Input};
use crate::literal;
use crate::program::{Pc, Program};
use crate::state;

type Slots = Rc<Vec<Option<usize>>>;

struct Thread {
    pc: Pc,
    slots: Slots,
}

struct ThreadList {
    dense: Vec<Thread>,
    last_seen: Vec<usize>,
    gen: usize,
}

impl ThreadList {
    fn new(nstates: usize) -> ThreadList {
        ThreadList { dense: Vec::new(), last_seen: vec![0; nstates], gen: 1 }
    }

    fn clear(&mut self) {
        self.dense.clear();
        self.gen += 1;
    }

    fn contains(&self, pc: Pc) -> bool {
        self.last_seen[pc] == self.gen
    }

    fn mark(&mut self, pc: Pc) {
        self.last_seen[pc] = self.gen;
    }
}

/// Runs the lockstep simulation starting at byte offset `start` of `text`
/// and returns the capture slots of the leftmost-first match, if any.
/// `prog.start()` already encodes whether the search is anchored (see
/// `Program::compile`), so a single pass from `start` covers the whole
/// unanchored search — no outer loop over candidate start positions.
pub fn exec(prog: &Program, text: &str, start: usize) -> Result<Option<Vec<Option<usize>>>, Error> {
    let start = match literal::skip_to_leading_byte(
        prog.leading_byte(),
        prog.anchored_begin(),
        text,
        start,
    ) {
        Some(start) => start,
        None => return Ok(None),
    };
    let input = Input::new(text);
    let nstates = state::number_states(prog.insts());
    let mut clist = ThreadList::new(nstates);
    let mut nlist = ThreadList::new(nstates);
    let mut matched: Option<Slots> = None;

    let mut at = input.at(start);
    let init_slots: Slots = Rc::new(vec![None; 2 * prog.num_captures()]);
    add_thread(prog, &mut clist, prog.start(), init_slots, &input, at)?;

    loop {
        if clist.dense.is_empty() {
            break;
        }
        nlist.clear();
        let next_at = if at.is_end() { at } else { input.at(at.next_pos()) };
        let ch = at.char().as_char();

        let mut cut = false;
        for idx in 0..clist.dense.len() {
            if cut {
                break;
            }
            let pc = clist.dense[idx].pc;
            let slots = clist.dense[idx].slots.clone();
            match &prog.insts()[pc] {
                Inst::Match => {
                    matched = Some(slots);
                    cut = true;
                }
                inst if inst.is_consuming() => {
                    if let Some(c) = ch {
                        if let Some(goto) = inst.matches_char(c) {
                            add_thread(prog, &mut nlist, goto, slots, &input, next_at)?;
                        }
                    }
                }
                _ => unreachable!("non-epsilon instruction escaped add_thread's closure"),
            }
        }

        mem::swap(&mut clist, &mut nlist);
        if at.is_end() {
            break;
        }
        at = next_at;
    }

    Ok(matched.map(|s| (*s).clone()))
}

/// Epsilon closure: follows every non-consuming instruction reachable from
/// `pc` without consuming input, adding each consuming instruction (or
/// `Match`) it bottoms out at to `list`, deduped by `pc` within this step.
/// `Split`'s `pref` branch is always expanded before `sec`, which is what
/// gives `list.dense`'s order its leftmost-first/greedy-first priority.
fn add_thread(
    prog: &Program,
    list: &mut ThreadList,
    pc: Pc,
    slots: Slots,
    input: &Input,
    at: At,
) -> Result<(), Error> {
    if list.contains(pc) {
        return Ok(());
    }
    list.mark(pc);
    match &prog.insts()[pc] {
        Inst::Jump { goto } => add_thread(prog, list, *goto, slots, input, at),
        Inst::Split { pref, sec } => {
            add_thread(prog, list, *pref, slots.clone(), input, at)?;
            add_thread(prog, list, *sec, slots, input, at)
        }
        Inst::Save { slot, goto } => {
            let mut next = (*slots).clone();
            if *slot < next.len() {
                next[*slot] = Some(at.pos());
            }
            add_thread(prog, list, *goto, Rc::new(next), input, at)
        }
        Inst::EmptyLook { look, goto } => {
            let before = input.previous_char(at);
            let after = at.char();
            if look.matches(before, after) {
                add_thread(prog, list, *goto, slots, input, at)
            } else {
                Ok(())
            }
        }
        Inst::LookAround { .. } => Err(Error::LookaroundUnsupported),
        Inst::Match
        | Inst::Char { .. }
        | Inst::IChar { .. }
        | Inst::AnyChar { .. }
        | Inst::CharRange { .. }
        | Inst::ICharRange { .. }
        | Inst::CharBitmap { .. } => {
            list.dense.push(Thread { pc, slots });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;

    fn run(pattern: &str, text: &str) -> Option<Vec<Option<usize>>> {
        let prog = Program::compile(pattern, false, false, 1 << 20).unwrap();
        exec(&prog, text, 0).unwrap()
    }

    #[test]
    fn finds_leftmost_unanchored_match() {
        let slots = run("bc", "abcbc").unwrap();
        assert_eq!(slots[0], Some(1));
        assert_eq!(slots[1], Some(3));
    }

    #[test]
    fn greedy_star_consumes_as_much_as_possible() {
        let slots = run("a.*b", "axxbxxb").unwrap();
        assert_eq!((slots[0], slots[1]), (Some(0), Some(7)));
    }

    #[test]
    fn lazy_star_consumes_as_little_as_possible() {
        let slots = run("a.*?b", "axxbxxb").unwrap();
        assert_eq!((slots[0], slots[1]), (Some(0), Some(4)));
    }

    #[test]
    fn capture_groups_record_their_own_span() {
        let slots = run("(a+)(b+)", "aaabb").unwrap();
        assert_eq!((slots[2], slots[3]), (Some(0), Some(3)));
        assert_eq!((slots[4], slots[5]), (Some(3), Some(5)));
    }

    #[test]
    fn no_match_returns_none() {
        assert!(run("xyz", "abc").is_none());
    }

    #[test]
    fn leading_byte_skip_still_finds_a_distant_literal_match() {
        let haystack = format!("{}needle", "x".repeat(10_000));
        let slots = run("needle", &haystack).unwrap();
        assert_eq!((slots[0], slots[1]), (Some(10_000), Some(10_006)));
    }

    #[test]
    fn lookaround_is_rejected_at_runtime() {
        let prog = Program::compile("a(?=b)", false, false, 1 << 20).unwrap();
        assert_eq!(exec(&prog, "ab", 0), Err(Error::LookaroundUnsupported));
    }
}
