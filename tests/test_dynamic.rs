// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Exercises the normal code path: `Engine::Auto`, which picks whichever
//! engine the pattern and input call for on its own. Engine-specific
//! behavior (forcing lockstep or backtrack) lives in
//! `test_lockstep.rs`/`test_backtrack.rs`.

use rand::Rng;
use regex_vm::{Engine, Regex, RegexBuilder};

#[test]
fn literal_concatenation() {
    let re = Regex::new("abcd").unwrap();
    assert_eq!(re.find("xxabcdxx").map(|m| m.as_str()), Some("abcd"));
}

#[test]
fn alternation_picks_leftmost_branch_at_leftmost_position() {
    let re = Regex::new("abc|a").unwrap();
    assert_eq!(re.find("xabcx").map(|m| m.as_str()), Some("abc"));
}

#[test]
fn greedy_and_lazy_star_differ() {
    let greedy = Regex::new("<.*>").unwrap();
    let lazy = Regex::new("<.*?>").unwrap();
    let text = "<a><b>";
    assert_eq!(greedy.find(text).map(|m| m.as_str()), Some("<a><b>"));
    assert_eq!(lazy.find(text).map(|m| m.as_str()), Some("<a>"));
}

#[test]
fn counted_repetition_bounds_match_length() {
    let re = Regex::new(r"a{2,3}").unwrap();
    assert_eq!(re.find("aaaa").map(|m| m.as_str()), Some("aaa"));
    assert!(!Regex::new(r"^a{2,3}$").unwrap().is_match("a"));
}

#[test]
fn counted_repetition_reuses_capture_group_across_copies() {
    let re = Regex::new(r"(a|b){3}").unwrap();
    let caps = re.captures("aba").unwrap();
    assert_eq!(&caps[1], "a");
    assert_eq!(re.captures_len(), 2);
}

#[test]
fn character_classes_and_negation() {
    let re = Regex::new(r"[^0-9]+").unwrap();
    assert_eq!(re.find("123abc456").map(|m| m.as_str()), Some("abc"));
}

#[test]
fn shorthand_classes_d_w_s_and_their_negations() {
    assert!(Regex::new(r"^\d+$").unwrap().is_match("1234"));
    assert!(!Regex::new(r"^\D+$").unwrap().is_match("1234"));
    assert!(Regex::new(r"^\w+$").unwrap().is_match("abc_123"));
    assert!(Regex::new(r"^\s+$").unwrap().is_match("  \t"));
}

#[test]
fn case_insensitive_flag_folds_ascii_letters() {
    let re = RegexBuilder::new("HELLO").case_insensitive(true).build().unwrap();
    assert!(re.is_match("well, hello there"));
}

#[test]
fn anchors_restrict_match_position() {
    let re = Regex::new(r"^\d+$").unwrap();
    assert!(re.is_match("42"));
    assert!(!re.is_match("42 "));
    assert!(!re.is_match(" 42"));
}

#[test]
fn word_boundary_separates_identifiers() {
    let re = Regex::new(r"\bcat\b").unwrap();
    assert!(re.is_match("a cat sat"));
    assert!(!re.is_match("concatenate"));
}

#[test]
fn multiline_flag_anchors_per_line() {
    let re = RegexBuilder::new(r"^\w+$").multi_line(true).build().unwrap();
    let found: Vec<&str> = re.find_iter("foo\nbar\nbaz").map(|m| m.as_str()).collect();
    assert_eq!(found, vec!["foo", "bar", "baz"]);
}

#[test]
fn find_iter_reports_every_non_overlapping_match() {
    let re = Regex::new(r"\d+").unwrap();
    let found: Vec<&str> = re.find_iter("ab12cd345ef6").map(|m| m.as_str()).collect();
    assert_eq!(found, vec!["12", "345", "6"]);
}

#[test]
fn split_on_a_simple_delimiter() {
    let re = Regex::new(r",\s*").unwrap();
    let pieces: Vec<&str> = re.split("a, b,c ,  d").collect();
    assert_eq!(pieces, vec!["a", "b", "c ", " d"]);
}

#[test]
fn replace_all_with_capture_reference() {
    let re = Regex::new(r"(\w+)@(\w+)").unwrap();
    let out = re.replace_all("send to alice@wonderland, reply to bob@builder", |caps: &regex_vm::Captures| {
        format!("{}[at]{}", &caps[1], &caps[2])
    });
    assert_eq!(out, "send to alice[at]wonderland, reply to bob[at]builder");
}

#[test]
fn email_like_pattern_end_to_end() {
    let re = Regex::new(r"^[\w.+-]+@[\w-]+\.[a-zA-Z]{2,}$").unwrap();
    assert!(re.is_match("first.last+tag@sub-domain.example.com"));
    assert!(!re.is_match("not an email"));
}

#[test]
fn non_ascii_code_points_count_as_one_match_unit() {
    let re = Regex::new(r".").unwrap();
    assert_eq!(re.find("é").map(|m| m.as_str()), Some("é"));
}

/// Differential fuzz test: the lockstep and backtracking engines are two
/// independent implementations of the same semantics, so for patterns
/// neither of them refuses (no lookaround) they must find exactly the same
/// match on any input. Random small alphabets keep most generated strings
/// within striking distance of the generated patterns instead of missing
/// every time.
#[test]
fn lockstep_and_backtrack_agree_on_random_patterns() {
    let mut rng = rand::thread_rng();
    let atoms = ["a", "b", "ab", ".", "a*", "a+", "a?", "a{1,2}", "(a|b)", "(ab)+"];
    for _ in 0..200 {
        let piece_count = rng.gen_range(1..4);
        let pattern: String = (0..piece_count).map(|_| atoms[rng.gen_range(0..atoms.len())]).collect();
        let haystack: String = (0..rng.gen_range(0..8))
            .map(|_| if rng.gen_bool(0.5) { 'a' } else { 'b' })
            .collect();

        let lockstep = match RegexBuilder::new(&pattern).engine(Engine::Lockstep).build() {
            Ok(re) => re,
            Err(_) => continue,
        };
        let backtrack = RegexBuilder::new(&pattern).engine(Engine::Backtrack).build().unwrap();

        let a = lockstep.try_find_at(&haystack, 0).unwrap();
        let b = backtrack.try_find_at(&haystack, 0).unwrap();
        assert_eq!(
            a.map(|m| m.range()),
            b.map(|m| m.range()),
            "pattern {:?} disagreed on haystack {:?}",
            pattern,
            haystack
        );
    }
}
