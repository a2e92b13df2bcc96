// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A single last-request memo: compiling the same pattern string (with the
//! same flags) twice in a row returns a functionally equivalent `Program`
//! without re-running the parser. Not part of the semantic contract — a
//! cache miss and a fresh compile are always observably identical to a
//! caller, this just skips the work for the once-per-factory case
//! `RegexBuilder::build` is normally used in (a single literal pattern
//! built in a loop instead of hoisted out).
//!
//! This is a much smaller thing than the teacher's `Pool<NfaThreads>`/
//! `Pool<BackMachine>` reuse pools in `program.rs`, which recycle an
//! engine's *scratch* (thread lists, capture buffers) across calls to the
//! same already-compiled program. Those live in `src/nfa.rs`/
//! `src/backtrack.rs` as ordinary `Vec` allocations made fresh per `exec`
//! call instead, since this rewrite's capture slots are small and
//! generation-counter dedup already avoids the teacher's swap-buffer
//! bookkeeping; the one piece of the teacher's reuse discipline kept here
//! is reuse of the *compiled program itself*, one slot, keyed by equality
//! rather than identity.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Error;
use crate::program::Program;

#[derive(Clone, PartialEq, Eq)]
struct CacheKey {
    pattern: String,
    case_insensitive: bool,
    multi_line: bool,
    size_limit: usize,
}

thread_local! {
    static CACHE: RefCell<Option<(CacheKey, Rc<Program>)>> = RefCell::new(None);
}

/// Returns a compiled program for `pattern`, reusing the previous compile
/// if it was built from an identical `(pattern, case_insensitive,
/// multi_line, size_limit)` tuple.
pub fn compile(
    pattern: &str,
    case_insensitive: bool,
    multi_line: bool,
    size_limit: usize,
) -> Result<Rc<Program>, Error> {
    let key = CacheKey {
        pattern: pattern.to_string(),
        case_insensitive,
        multi_line,
        size_limit,
    };
    CACHE.with(|cell| {
        if let Some((cached_key, prog)) = &*cell.borrow() {
            if *cached_key == key {
                return Ok(prog.clone());
            }
        }
        let prog = Rc::new(Program::compile(pattern, case_insensitive, multi_line, size_limit)?);
        *cell.borrow_mut() = Some((key, prog.clone()));
        Ok(prog)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeating_the_same_pattern_hits_the_cache() {
        let a = compile("a+b", false, false, 1 << 20).unwrap();
        let b = compile("a+b", false, false, 1 << 20).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn a_different_pattern_misses_the_cache() {
        let a = compile("a+b", false, false, 1 << 20).unwrap();
        let b = compile("a+c", false, false, 1 << 20).unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
    }
}
