// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Iterators over successive non-overlapping matches. Both `Matches` and
//! `CaptureMatches` share the same zero-width-advance rule: after a match
//! that consumed no input, the next search starts one code point later
//! instead of at the same offset, or the iterator would spin forever on
//! patterns like `a*` against `"bbb"`.

use crate::captures::{Captures, Match};
use crate::regex::Regex;

/// An iterator over every non-overlapping match of a regex in a haystack.
pub struct Matches<'r, 't> {
    re: &'r Regex,
    text: &'t str,
    pos: Option<usize>,
}

impl<'r, 't> Matches<'r, 't> {
    pub(crate) fn new(re: &'r Regex, text: &'t str) -> Matches<'r, 't> {
        Matches { re, text, pos: Some(0) }
    }
}

impl<'r, 't> Iterator for Matches<'r, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        let start = self.pos?;
        if start > self.text.len() {
            self.pos = None;
            return None;
        }
        match self.re.find_at(self.text, start) {
            Some(m) => {
                self.pos = Some(next_search_start(self.text, m.start(), m.end()));
                Some(m)
            }
            None => {
                self.pos = None;
                None
            }
        }
    }
}

/// An iterator over every non-overlapping match's captures.
pub struct CaptureMatches<'r, 't> {
    re: &'r Regex,
    text: &'t str,
    pos: Option<usize>,
}

impl<'r, 't> CaptureMatches<'r, 't> {
    pub(crate) fn new(re: &'r Regex, text: &'t str) -> CaptureMatches<'r, 't> {
        CaptureMatches { re, text, pos: Some(0) }
    }
}

impl<'r, 't> Iterator for CaptureMatches<'r, 't> {
    type Item = Captures<'t>;

    fn next(&mut self) -> Option<Captures<'t>> {
        let start = self.pos?;
        if start > self.text.len() {
            self.pos = None;
            return None;
        }
        match self.re.captures_at(self.text, start) {
            Some(caps) => {
                let m = caps.whole_match();
                self.pos = Some(next_search_start(self.text, m.start(), m.end()));
                Some(caps)
            }
            None => {
                self.pos = None;
                None
            }
        }
    }
}

/// Where the next search should start after a match ending at `end`: right
/// there, unless the match was empty (`start == end`), in which case one
/// code point further so the iterator can't get stuck reporting the same
/// empty match forever.
fn next_search_start(text: &str, start: usize, end: usize) -> usize {
    if start != end {
        return end;
    }
    match text[end..].chars().next() {
        Some(c) => end + c.len_utf8(),
        None => end + 1,
    }
}
