// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `RegexBuilder` and the `Engine` choice, generalized from the teacher's
//! `exec.rs::MatchEngine` (`Automatic`/`Backtrack`/`Nfa`/`Literals`) — the
//! `Literals` variant has no counterpart here since this crate's
//! `src/literal.rs` is a search-loop accelerant consulted by both engines,
//! not a third standalone engine.

use std::rc::Rc;

use crate::cache;
use crate::error::Error;
use crate::program::Program;
use crate::regex::Regex;

/// Default ceiling on compiled instruction count (`Program::compile`
/// rejects anything larger with `Error::CompiledTooBig`).
const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Default recursion depth the backtracker is allowed, generous but finite,
/// in the spirit of `fancy-regex`'s `MAX_STACK`.
const DEFAULT_BACKTRACK_STACK_LIMIT: usize = 1_000_000;

/// Which matching engine a `Regex` should run a search with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Engine {
    /// Pick `Backtrack` when the pattern needs lookaround or both the
    /// program and input are small; `Lockstep` otherwise.
    Auto,
    /// The single-pass Thompson-NFA simulation (`src/nfa.rs`). Cannot run
    /// patterns containing lookaround.
    Lockstep,
    /// The recursive backtracker (`src/backtrack.rs`). Supports lookaround;
    /// worst-case exponential on pathological patterns.
    Backtrack,
}

/// Above this many states, `Auto` stops preferring the backtracker even for
/// small input, mirroring the teacher's `backtrack::should_exec` heuristic.
const AUTO_MAX_BACKTRACK_STATES: usize = 1_000;
/// Above this many bytes of input, ditto.
const AUTO_MAX_BACKTRACK_INPUT: usize = 1 << 13;

pub(crate) fn choose_engine(prog: &Program, preference: Engine, text_len: usize) -> Engine {
    match preference {
        Engine::Lockstep | Engine::Backtrack => preference,
        Engine::Auto => {
            if prog.requires_backtracking() {
                Engine::Backtrack
            } else if prog.len() <= AUTO_MAX_BACKTRACK_STATES && text_len <= AUTO_MAX_BACKTRACK_INPUT {
                Engine::Backtrack
            } else {
                Engine::Lockstep
            }
        }
    }
}

/// Builds a `Regex` with non-default flags or resource limits.
#[derive(Clone, Debug)]
pub struct RegexBuilder {
    pattern: String,
    case_insensitive: bool,
    multi_line: bool,
    size_limit: usize,
    backtrack_stack_limit: usize,
    engine: Engine,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            pattern: pattern.to_string(),
            case_insensitive: false,
            multi_line: false,
            size_limit: DEFAULT_SIZE_LIMIT,
            backtrack_stack_limit: DEFAULT_BACKTRACK_STACK_LIMIT,
            engine: Engine::Auto,
        }
    }

    /// Sets the default case-insensitivity flag the parser starts with.
    /// Inline `(?i)`/`(?-i)` groups still override this locally.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut RegexBuilder {
        self.case_insensitive = yes;
        self
    }

    /// Sets the default multi-line flag, likewise overridable by inline
    /// `(?m)`/`(?-m)` groups.
    pub fn multi_line(&mut self, yes: bool) -> &mut RegexBuilder {
        self.multi_line = yes;
        self
    }

    /// Rejects patterns whose compiled instruction count (in bytes, as
    /// `insts.len() * size_of::<Inst>()`) exceeds `bytes`.
    pub fn size_limit(&mut self, bytes: usize) -> &mut RegexBuilder {
        self.size_limit = bytes;
        self
    }

    /// Bounds the backtracking engine's recursion depth; exceeding it
    /// returns `Error::BacktrackLimitExceeded` from a search instead of
    /// overflowing the stack.
    pub fn backtrack_stack_limit(&mut self, limit: usize) -> &mut RegexBuilder {
        self.backtrack_stack_limit = limit;
        self
    }

    /// Forces a specific matching engine instead of `Engine::Auto`.
    pub fn engine(&mut self, engine: Engine) -> &mut RegexBuilder {
        self.engine = engine;
        self
    }

    pub fn build(&self) -> Result<Regex, Error> {
        let prog: Rc<Program> =
            cache::compile(&self.pattern, self.case_insensitive, self.multi_line, self.size_limit)?;
        Ok(Regex::from_parts(prog, self.engine, self.backtrack_stack_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_flag_affects_matching() {
        let re = RegexBuilder::new("abc").case_insensitive(true).build().unwrap();
        assert!(re.is_match("ABC"));
    }

    #[test]
    fn size_limit_rejects_oversized_programs() {
        let err = RegexBuilder::new("a{1,10000}").size_limit(16).build();
        assert!(err.is_err());
    }

    #[test]
    fn auto_forces_backtrack_when_lookaround_is_present() {
        let prog = Program::compile("a(?=b)", false, false, 1 << 20).unwrap();
        assert_eq!(choose_engine(&prog, Engine::Auto, 2), Engine::Backtrack);
    }

    #[test]
    fn explicit_lockstep_choice_is_honored_even_with_lookaround() {
        let prog = Program::compile("a(?=b)", false, false, 1 << 20).unwrap();
        assert_eq!(choose_engine(&prog, Engine::Lockstep, 2), Engine::Lockstep);
    }
}
