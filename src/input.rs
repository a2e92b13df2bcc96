// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A thin position abstraction over `&str` shared by both engines.
//!
//! Unlike the teacher crate, which offers parallel `CharInput`/`ByteInput`
//! readers selected per-program (see `DESIGN.md`'s "Dropped teacher
//! dependencies"), this crate matches over `char` exclusively: there is no
//! byte-oriented program variant, only byte *offsets* as the reported
//! position unit, which `&str` indices give for free.

use crate::char::Char;

/// A decoded position in a `&str`: the byte offset, the character starting
/// there (if any), and that character's UTF-8 width.
#[derive(Clone, Copy, Debug)]
pub struct At {
    pos: usize,
    c: Char,
    len: usize,
}

impl At {
    /// The byte offset of this position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The character starting at this position, or none at the end of the
    /// input.
    pub fn char(&self) -> Char {
        self.c
    }

    /// The byte offset of the position right after this character (or
    /// `pos` unchanged if there is no character here).
    pub fn next_pos(&self) -> usize {
        self.pos + self.len
    }

    /// True iff there is no character here (i.e. this is the end of the
    /// input).
    pub fn is_end(&self) -> bool {
        self.c.is_none()
    }
}

/// A `&str` paired with the position-decoding operations the engines need.
#[derive(Clone, Copy, Debug)]
pub struct Input<'t> {
    text: &'t str,
}

impl<'t> Input<'t> {
    pub fn new(text: &'t str) -> Input<'t> {
        Input { text }
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Decode the position at byte offset `i`. `i` must land on a char
    /// boundary (true for every offset this crate ever passes in: `0`,
    /// `At::next_pos()` of a previous call, or a caller-supplied `start`
    /// which we validate in `Regex::find_at`).
    pub fn at(&self, i: usize) -> At {
        let c: Char = self.text[i..].chars().next().into();
        let len = c.len_utf8();
        At { pos: i, c, len }
    }

    /// The character immediately before `at`, or none if `at` is byte
    /// offset `0` of the *whole* haystack (not of a `find_at` search
    /// window — see `EmptyLook::StartText` and the open-question
    /// resolution in `DESIGN.md`).
    pub fn previous_char(&self, at: At) -> Char {
        self.text[..at.pos()].chars().next_back().into()
    }

    /// The character at `at`, or none at the end of input. Equivalent to
    /// `at.char()`; kept as a method on `Input` so lookaround reverse
    /// stepping (`char_boundary_back`) and forward decoding read
    /// symmetrically.
    pub fn next_char(&self, at: At) -> Char {
        at.char()
    }

    /// Step back `n` code points from byte offset `pos`. Returns `None` if
    /// fewer than `n` code points precede `pos` (a fixed-length lookbehind
    /// whose distance doesn't fit can never match there).
    pub fn step_back(&self, pos: usize, n: usize) -> Option<usize> {
        let mut p = pos;
        for _ in 0..n {
            if p == 0 {
                return None;
            }
            let prev = self.text[..p].chars().next_back()?;
            p -= prev.len_utf8();
        }
        Some(p)
    }
}
