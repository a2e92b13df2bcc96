// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `Match` and `Captures`: the view types both engines' raw `Vec<Option<usize>>`
//! capture-slot buffers turn into. Slot `2*i`/`2*i+1` is group `i`'s
//! start/end byte offset, group 0 being the whole match, exactly as both
//! `nfa.rs` and `backtrack.rs` fill them in.

use std::ops::Index;

/// A single match: the substring found and the byte range it occupies in
/// the original text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    pub(crate) fn new(text: &'t str, start: usize, end: usize) -> Match<'t> {
        Match { text, start, end }
    }

    /// The byte offset of the start of this match.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The byte offset of the end of this match.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The byte range `start()..end()`.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// The text this match covers.
    pub fn as_str(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    /// The text before this match.
    pub fn pre(&self) -> &'t str {
        &self.text[..self.start]
    }

    /// The text after this match.
    pub fn post(&self) -> &'t str {
        &self.text[self.end..]
    }
}

/// The capture groups matched by a single search, indexed by group number
/// (group 0 is always the whole match).
#[derive(Clone, Debug)]
pub struct Captures<'t> {
    text: &'t str,
    slots: Vec<Option<usize>>,
}

impl<'t> Captures<'t> {
    pub(crate) fn new(text: &'t str, slots: Vec<Option<usize>>) -> Captures<'t> {
        Captures { text, slots }
    }

    /// The match for capture group `i`, or `None` if that group didn't
    /// participate in the match (e.g. it's in a branch of an alternation
    /// that wasn't taken).
    pub fn get(&self, i: usize) -> Option<Match<'t>> {
        let start = *self.slots.get(2 * i)?;
        let end = *self.slots.get(2 * i + 1)?;
        Some(Match::new(self.text, start?, end?))
    }

    /// Total number of capture groups, including the implicit group 0.
    pub fn len(&self) -> usize {
        self.slots.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole match, equivalent to `get(0).unwrap()`.
    pub fn whole_match(&self) -> Match<'t> {
        self.get(0).expect("group 0 always participates in a match")
    }

    pub fn iter(&self) -> CapturesIter<'_, 't> {
        CapturesIter { caps: self, i: 0 }
    }
}

impl<'t> Index<usize> for Captures<'t> {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        self.get(i)
            .map(|m| m.as_str())
            .unwrap_or_else(|| panic!("no group at index {}", i))
    }
}

/// Iterates over every capture group's `Option<Match>` in order, including
/// groups that didn't participate in the match.
pub struct CapturesIter<'c, 't> {
    caps: &'c Captures<'t>,
    i: usize,
}

impl<'c, 't> Iterator for CapturesIter<'c, 't> {
    type Item = Option<Match<'t>>;

    fn next(&mut self) -> Option<Option<Match<'t>>> {
        if self.i >= self.caps.len() {
            return None;
        }
        let m = self.caps.get(self.i);
        self.i += 1;
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_match_reads_slots_zero_and_one() {
        let caps = Captures::new("abcdef", vec![Some(1), Some(4)]);
        assert_eq!(caps.whole_match().as_str(), "bcd");
        assert_eq!(caps.whole_match().pre(), "a");
        assert_eq!(caps.whole_match().post(), "ef");
    }

    #[test]
    fn group_that_did_not_participate_is_none() {
        let caps = Captures::new("ab", vec![Some(0), Some(2), None, None]);
        assert!(caps.get(1).is_none());
        assert_eq!(caps.len(), 2);
    }

    #[test]
    fn indexing_by_group_number_returns_its_substring() {
        let caps = Captures::new("2024-01-02", vec![Some(0), Some(10), Some(0), Some(4), Some(5), Some(7)]);
        assert_eq!(&caps[1], "2024");
        assert_eq!(&caps[2], "01");
    }
}
