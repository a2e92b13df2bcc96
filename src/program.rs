// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ties the parser to the rest of the crate: turns a pattern string into a
//! ready-to-run `Program`, adding the implicit unanchored-search prefix the
//! parser itself never builds.

use crate::error::Error;
use crate::inst::{EmptyLook, Inst};
use crate::literal::LeadingByte;
use crate::parser;

pub type Pc = usize;

/// A compiled pattern: its instructions, the pc an engine should start
/// running from, and a few facts about the program engines use to search
/// faster without changing what they find.
#[derive(Clone, Debug)]
pub struct Program {
    insts: Vec<Inst>,
    start: Pc,
    anchored_begin: bool,
    num_captures: usize,
    leading_byte: Option<LeadingByte>,
}

impl Program {
    /// Parses `pattern` and wires up the implicit search prefix.
    ///
    /// Unless the pattern's very first instruction (right after the
    /// implicit `Save { slot: 0 }`) is `EmptyLook::StartText` — i.e. the
    /// whole pattern is anchored with a literal `^` outside `(?m)` — the
    /// program is prefixed with a lazy `.*?`: a `Split` that prefers
    /// entering the real program right away (so the leftmost match wins)
    /// and falls back to consuming one more code point and trying again.
    /// This lets `find_at` run a single pass over the input rather than
    /// looping over candidate start positions itself (see `DESIGN.md`'s
    /// open-question resolution on this point).
    pub fn compile(
        pattern: &str,
        case_insensitive: bool,
        multi_line: bool,
        size_limit: usize,
    ) -> Result<Program, Error> {
        let (insts, ngroups) = parser::parse(pattern, case_insensitive, multi_line, size_limit)?;
        let mut insts = insts;

        let body_start = match insts[0] {
            Inst::Save { goto, .. } => goto,
            _ => unreachable!("parser::parse always opens with Save{{slot: 0, ..}}"),
        };
        let anchored_begin =
            matches!(insts.get(body_start), Some(Inst::EmptyLook { look: EmptyLook::StartText, .. }));

        let leading_byte = LeadingByte::extract(&insts, body_start);

        let start = if anchored_begin {
            0
        } else {
            let split_pc = insts.len();
            let any_pc = split_pc + 1;
            insts.push(Inst::Split { pref: 0, sec: any_pc });
            insts.push(Inst::AnyChar { goto: split_pc });
            split_pc
        };

        Ok(Program { insts, start, anchored_begin, num_captures: ngroups, leading_byte })
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn start(&self) -> Pc {
        self.start
    }

    /// True iff the pattern can only ever match starting at byte offset 0
    /// of the haystack (a literal `^` outside `(?m)`, with nothing above it
    /// in an alternation).
    pub fn anchored_begin(&self) -> bool {
        self.anchored_begin
    }

    /// Total number of capture groups, including the implicit whole-match
    /// group 0 (multiply by two for the slot count).
    pub fn num_captures(&self) -> usize {
        self.num_captures
    }

    pub fn leading_byte(&self) -> Option<&LeadingByte> {
        self.leading_byte.as_ref()
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    /// True if the program contains a `LookAround` instruction, which the
    /// lockstep engine cannot execute (see `src/nfa.rs`). `Engine::Auto`
    /// consults this to force the backtracker regardless of size.
    pub fn requires_backtracking(&self) -> bool {
        self.insts.iter().any(|inst| matches!(inst, Inst::LookAround { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_pattern_has_no_search_prefix() {
        let prog = Program::compile("^abc", false, false, 1 << 20).unwrap();
        assert!(prog.anchored_begin());
        assert_eq!(prog.start(), 0);
    }

    #[test]
    fn unanchored_pattern_gets_a_search_prefix() {
        let prog = Program::compile("abc", false, false, 1 << 20).unwrap();
        assert!(!prog.anchored_begin());
        match prog.insts()[prog.start()] {
            Inst::Split { pref: 0, .. } => {}
            ref other => panic!("expected Split{{pref: 0, ..}}, got {:?}", other),
        }
    }

    #[test]
    fn multiline_caret_is_not_treated_as_anchored() {
        let prog = Program::compile("^abc", false, true, 1 << 20).unwrap();
        assert!(!prog.anchored_begin());
    }

    #[test]
    fn num_captures_counts_the_implicit_whole_match_group() {
        let prog = Program::compile("(a)(b)", false, false, 1 << 20).unwrap();
        assert_eq!(prog.num_captures(), 3);
    }

    #[test]
    fn leading_byte_extracted_for_plain_ascii_literal_start() {
        let prog = Program::compile("xyz", false, false, 1 << 20).unwrap();
        assert!(prog.leading_byte().is_some());
    }

    #[test]
    fn lookaround_programs_require_backtracking() {
        let prog = Program::compile("a(?=b)", false, false, 1 << 20).unwrap();
        assert!(prog.requires_backtracking());
        let prog = Program::compile("ab", false, false, 1 << 20).unwrap();
        assert!(!prog.requires_backtracking());
    }
}
