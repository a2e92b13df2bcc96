// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/*!
A regular expression engine built directly on a Thompson-NFA bytecode.

A pattern string is compiled straight to a flat sequence of instructions
(no separate AST/HIR stage) by [`Regex::new`], then matched by one of two
engines: a lockstep (Pike's VM) simulator that finds a leftmost-first match
in a single `O(nm)` pass but cannot execute lookaround, and a recursive
backtracker that can run anything the parser accepts but has no guard
against pathological blowup beyond its configured recursion depth. The
default [`RegexBuilder::engine`] choice is `Engine::Auto`, which picks
whichever of the two the pattern and input size call for.

```
use regex_vm::Regex;

let re = Regex::new(r"(?i)(\w+)@(\w+\.\w+)").unwrap();
let caps = re.captures("contact: Alice@Example.com").unwrap();
assert_eq!(&caps[1], "Alice");
assert_eq!(&caps[2], "Example.com");
```
*/

mod backtrack;
mod builder;
mod cache;
mod captures;
mod char;
mod error;
mod input;
mod inst;
mod literal;
mod matches;
mod nfa;
mod parser;
mod program;
mod regex;
mod span;
mod state;

pub use crate::builder::{Engine, RegexBuilder};
pub use crate::captures::{Captures, CapturesIter, Match};
pub use crate::error::{Error, ErrorKind};
pub use crate::matches::{CaptureMatches, Matches};
pub use crate::regex::{Regex, Split};

#[cfg(test)]
mod tests {
    use crate::{Engine, Regex, RegexBuilder};

    #[test]
    fn email_like_pattern_captures_user_and_domain() {
        let re = Regex::new(r"([\w.]+)@([\w-]+\.\w+)").unwrap();
        let caps = re.captures("reach me at jane.doe@example.org today").unwrap();
        assert_eq!(&caps[1], "jane.doe");
        assert_eq!(&caps[2], "example.org");
    }

    #[test]
    fn anchored_pattern_fails_when_not_at_start() {
        let re = Regex::new("^abc").unwrap();
        assert!(!re.is_match("xabc"));
        assert!(re.is_match("abcx"));
    }

    #[test]
    fn multiline_mode_anchors_at_each_line() {
        let re = RegexBuilder::new("^b").multi_line(true).build().unwrap();
        assert_eq!(re.find_iter("a\nb\nc").map(|m| m.start()).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn non_ascii_text_is_matched_by_code_point() {
        let re = Regex::new(r"\w+").unwrap();
        assert_eq!(re.find("héllo").unwrap().as_str(), "héllo");
    }

    #[test]
    fn both_engines_agree_on_a_greedy_vs_lazy_pattern() {
        let greedy = RegexBuilder::new("a.*b").engine(Engine::Lockstep).build().unwrap();
        let backtrack = RegexBuilder::new("a.*b").engine(Engine::Backtrack).build().unwrap();
        assert_eq!(
            greedy.find("axxbxxb").map(|m| m.as_str()),
            backtrack.find("axxbxxb").map(|m| m.as_str())
        );
    }

    #[test]
    fn lookaround_regression_capture_groups_stay_correct() {
        let re = Regex::new(r"(\d+)(?=px)").unwrap();
        let caps = re.captures("width: 640px").unwrap();
        assert_eq!(&caps[1], "640");
    }

    #[test]
    fn a_group_inside_an_untaken_alternative_does_not_participate() {
        let re = Regex::new(r"(a(.*))?(b)").unwrap();
        let caps = re.captures("b").unwrap();
        assert_eq!(caps.whole_match().as_str(), "b");
        assert!(caps.get(1).is_none());
        assert!(caps.get(2).is_none());
        assert_eq!(caps.get(3).map(|m| m.as_str()), Some("b"));

        let caps = re.captures("ab").unwrap();
        assert_eq!(caps.whole_match().as_str(), "ab");
        assert_eq!(caps.get(1).map(|m| m.as_str()), Some("a"));
        assert_eq!(caps.get(2).map(|m| m.as_str()), Some(""));
        assert_eq!(caps.get(3).map(|m| m.as_str()), Some("b"));
    }
}
