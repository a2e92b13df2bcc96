// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `Regex`, the crate's façade, analogous to the teacher's `Executor` in
//! `exec.rs`: owns a compiled `Program` and a matching-engine preference,
//! and dispatches searches to `src/nfa.rs` or `src/backtrack.rs`.

use std::rc::Rc;

use crate::backtrack;
use crate::builder::{self, Engine, RegexBuilder};
use crate::captures::{Captures, Match};
use crate::error::Error;
use crate::matches::{CaptureMatches, Matches};
use crate::nfa;
use crate::program::Program;

#[derive(Clone, Debug)]
pub struct Regex {
    prog: Rc<Program>,
    engine: Engine,
    backtrack_stack_limit: usize,
}

impl Regex {
    /// Compiles `pattern` with default flags and resource limits. Use
    /// `RegexBuilder` for case-insensitivity, multi-line mode, or an
    /// explicit engine choice.
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        RegexBuilder::new(pattern).build()
    }

    pub(crate) fn from_parts(prog: Rc<Program>, engine: Engine, backtrack_stack_limit: usize) -> Regex {
        Regex { prog, engine, backtrack_stack_limit }
    }

    /// The pattern's capture group count, including the implicit whole-
    /// match group 0.
    pub fn captures_len(&self) -> usize {
        self.prog.num_captures()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.find_at(text, 0)
    }

    /// Like `find`, but starts the search at byte offset `start` instead of
    /// 0. `^`/`StartText` assertions still only match at absolute offset 0
    /// of `text`, not at `start` (see `DESIGN.md`'s open-question
    /// resolution 3).
    ///
    /// A backtrack recursion limit hit while searching is treated as no
    /// match here, same as the teacher's `find` never panicking on valid
    /// input; use `try_find_at` to distinguish "no match" from "gave up".
    pub fn find_at<'t>(&self, text: &'t str, start: usize) -> Option<Match<'t>> {
        let slots = self.try_search(text, start).ok()??;
        Some(Match::new(text, slots[0]?, slots[1]?))
    }

    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.captures_at(text, 0)
    }

    /// See `find_at`'s note on the backtrack recursion limit: a limit hit
    /// here is reported as no captures rather than a panic.
    pub fn captures_at<'t>(&self, text: &'t str, start: usize) -> Option<Captures<'t>> {
        let slots = self.try_search(text, start).ok()??;
        Some(Captures::new(text, slots))
    }

    /// Fallible form of `find_at`: surfaces `Error::LookaroundUnsupported`
    /// (only reachable by forcing `Engine::Lockstep` on a lookaround
    /// pattern) and `Error::BacktrackLimitExceeded` instead of panicking.
    pub fn try_find_at<'t>(&self, text: &'t str, start: usize) -> Result<Option<Match<'t>>, Error> {
        Ok(match self.try_search(text, start)? {
            Some(slots) => Some(Match::new(text, slots[0].unwrap(), slots[1].unwrap())),
            None => None,
        })
    }

    pub fn try_captures_at<'t>(&self, text: &'t str, start: usize) -> Result<Option<Captures<'t>>, Error> {
        Ok(self.try_search(text, start)?.map(|slots| Captures::new(text, slots)))
    }

    fn try_search(&self, text: &str, start: usize) -> Result<Option<Vec<Option<usize>>>, Error> {
        match builder::choose_engine(&self.prog, self.engine, text.len()) {
            Engine::Lockstep => nfa::exec(&self.prog, text, start),
            Engine::Backtrack => backtrack::exec(&self.prog, text, start, self.backtrack_stack_limit),
            Engine::Auto => unreachable!("choose_engine never returns Auto"),
        }
    }

    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches::new(self, text)
    }

    pub fn captures_iter<'r, 't>(&'r self, text: &'t str) -> CaptureMatches<'r, 't> {
        CaptureMatches::new(self, text)
    }

    /// Splits `text` on every match, the way `str::split` splits on a
    /// pattern, yielding the non-matching pieces in order.
    pub fn split<'r, 't>(&'r self, text: &'t str) -> Split<'r, 't> {
        Split { text, last: 0, matches: self.find_iter(text), finished: false }
    }

    /// Replaces every non-overlapping match with the result of calling
    /// `replacement` on its `Captures`.
    pub fn replace_all<F>(&self, text: &str, mut replacement: F) -> String
    where
        F: FnMut(&Captures) -> String,
    {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.captures_iter(text) {
            let m = caps.whole_match();
            out.push_str(&text[last..m.start()]);
            out.push_str(&replacement(&caps));
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }

    /// Like `replace_all`, but stops after the first match.
    pub fn replace<F>(&self, text: &str, mut replacement: F) -> String
    where
        F: FnMut(&Captures) -> String,
    {
        match self.captures(text) {
            None => text.to_string(),
            Some(caps) => {
                let m = caps.whole_match();
                let mut out = String::with_capacity(text.len());
                out.push_str(&text[..m.start()]);
                out.push_str(&replacement(&caps));
                out.push_str(&text[m.end()..]);
                out
            }
        }
    }
}

/// Iterator over the substrings of a haystack not covered by any match,
/// produced by `Regex::split`.
pub struct Split<'r, 't> {
    text: &'t str,
    last: usize,
    matches: Matches<'r, 't>,
    finished: bool,
}

impl<'r, 't> Iterator for Split<'r, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        if self.finished {
            return None;
        }
        match self.matches.next() {
            Some(m) => {
                let piece = &self.text[self.last..m.start()];
                self.last = m.end();
                Some(piece)
            }
            None => {
                self.finished = true;
                Some(&self.text[self.last..])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Engine;

    #[test]
    fn is_match_basic() {
        let re = Regex::new("a+b").unwrap();
        assert!(re.is_match("xxaaab"));
        assert!(!re.is_match("xxaaa"));
    }

    #[test]
    fn captures_len_includes_group_zero() {
        let re = Regex::new("(a)(b)?").unwrap();
        assert_eq!(re.captures_len(), 3);
    }

    #[test]
    fn lookaround_matches_via_auto_engine() {
        let re = Regex::new("foo(?=bar)").unwrap();
        assert_eq!(re.find("foobar").map(|m| m.as_str()), Some("foo"));
        assert!(!re.is_match("foobaz"));
    }

    #[test]
    fn split_yields_pieces_between_matches() {
        let re = Regex::new(",").unwrap();
        let pieces: Vec<&str> = re.split("a,b,,c").collect();
        assert_eq!(pieces, vec!["a", "b", "", "c"]);
    }

    #[test]
    fn replace_all_rewrites_every_match() {
        let re = Regex::new("(a)(b)").unwrap();
        let out = re.replace_all("ab xx ab", |caps: &Captures| format!("{}{}", &caps[2], &caps[1]));
        assert_eq!(out, "ba xx ba");
    }

    #[test]
    fn replace_only_rewrites_the_first_match() {
        let re = Regex::new("a+").unwrap();
        let out = re.replace("aa b aaa", |_: &Captures| "X".to_string());
        assert_eq!(out, "X b aaa");
    }

    #[test]
    fn forcing_lockstep_on_a_lookaround_pattern_surfaces_an_error() {
        let re = RegexBuilder::new("a(?=b)").engine(Engine::Lockstep).build().unwrap();
        assert_eq!(re.try_find_at("ab", 0), Err(Error::LookaroundUnsupported));
    }

    #[test]
    fn hitting_the_backtrack_limit_is_a_no_match_not_a_panic() {
        let re = RegexBuilder::new("(a|a)*c")
            .backtrack_stack_limit(50)
            .build()
            .unwrap();
        assert!(!re.is_match("aaaaaaaa"));
        assert!(re.find("aaaaaaaa").is_none());
        assert!(re.captures("aaaaaaaa").is_none());
        assert_eq!(
            re.try_find_at("aaaaaaaa", 0),
            Err(Error::BacktrackLimitExceeded)
        );
    }
}
