// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A recursive-descent parser that lowers a pattern string directly to
//! `Inst`s — no separate AST/HIR stage.
//!
//! Every production builds a `Frag`: the pc of its entry instruction, plus a
//! list of dangling `Out` references (`goto`/`pref`/`sec` fields still
//! pointing at a placeholder) that the caller patches to whatever comes
//! next once that's known. Because `Inst`s reference each other by `Vec`
//! index rather than by physical byte offset, a `Split`'s branches can
//! target instructions placed anywhere in the vector — earlier, later, or
//! (for a quantifier's loop-back edge) itself. That's what lets this parser
//! avoid the offset-fixup scan: nothing is ever inserted before an already-
//! emitted instruction, so no existing reference ever needs to shift. This
//! is the "labels, resolved in a final pass" strategy `DESIGN.md` and
//! `SPEC_FULL.md` §B call out as the rewrite's choice over a byte-offset
//! fixup scan.
//!
//! Counted repetition (`{m,n}`) needs `n` independent copies of its atom's
//! instructions (so each copy gets its own `Split`/`Char` pcs — this crate
//! has no loop-counter opcode), but the atom is parsed only once in the
//! source text. Extra copies are produced by resetting the character
//! cursor back to the atom's start and re-running `parse_atom`. Capture
//! group numbers must stay stable across those re-parses (a repeated
//! `(a){2,3}` must always write slots 2/3, never allocate new ones), so
//! `group_seq`/`group_cursor` record the order groups were numbered on the
//! first pass and replay that order instead of reallocating on a re-parse.

use std::mem::size_of;

use crate::error::{Error, ErrorKind};
use crate::inst::{EmptyLook, Inst};
use crate::span::SpanSet;

type Pc = usize;

/// Placeholder target used for fields not yet known. Every placeholder must
/// be patched before the program is handed to an engine; `debug_assert_resolved`
/// checks that invariant in tests.
const PLACEHOLDER: Pc = usize::MAX;

/// A dangling reference to a field of some not-yet-fully-wired instruction.
#[derive(Clone, Copy, Debug)]
enum Out {
    Goto(Pc),
    Pref(Pc),
    Sec(Pc),
}

/// A compiled subexpression: its entry pc, and the outgoing edges that
/// still need to be pointed at "whatever comes after this fragment".
#[derive(Clone, Debug)]
struct Frag {
    start: Pc,
    outs: Vec<Out>,
}

enum ClassItem {
    Char(u32),
    Span(SpanSet),
}

struct Parser {
    chars: Vec<(usize, char)>,
    pattern_len: usize,
    pos: usize,
    insts: Vec<Inst>,
    ngroups: usize,
    group_seq: Vec<usize>,
    group_cursor: Option<usize>,
    case_insensitive: bool,
    multi_line: bool,
}

/// Parses `pattern` into a flat instruction vector (no implicit search
/// prefix — `Program::compile` adds that) plus the total number of capture
/// groups, including the implicit whole-match group 0.
pub fn parse(
    pattern: &str,
    case_insensitive: bool,
    multi_line: bool,
    size_limit: usize,
) -> Result<(Vec<Inst>, usize), Error> {
    let mut p = Parser {
        chars: pattern.char_indices().collect(),
        pattern_len: pattern.len(),
        pos: 0,
        insts: Vec::new(),
        ngroups: 1,
        group_seq: Vec::new(),
        group_cursor: None,
        case_insensitive,
        multi_line,
    };
    let save0 = p.emit(Inst::Save { slot: 0, goto: PLACEHOLDER });
    let (body, _lens) = p.parse_alt()?;
    p.patch(&[Out::Goto(save0)], body.start);
    if let Some(c) = p.peek() {
        let _ = c;
        return Err(Error::Syntax(ErrorKind::UnopenedGroup, p.byte_pos()));
    }
    let save1 = p.emit(Inst::Save { slot: 1, goto: PLACEHOLDER });
    p.patch(&body.outs, save1);
    let m = p.emit(Inst::Match);
    p.patch(&[Out::Goto(save1)], m);

    if p.insts.len() * size_of::<Inst>() > size_limit {
        return Err(Error::CompiledTooBig(size_limit));
    }
    debug_assert!(p.insts.iter().all(is_resolved), "unpatched placeholder left in program");
    Ok((p.insts, p.ngroups))
}

fn is_resolved(inst: &Inst) -> bool {
    match *inst {
        Inst::Char { goto, .. }
        | Inst::IChar { goto, .. }
        | Inst::AnyChar { goto }
        | Inst::CharRange { goto, .. }
        | Inst::ICharRange { goto, .. }
        | Inst::CharBitmap { goto, .. }
        | Inst::Save { goto, .. }
        | Inst::Jump { goto }
        | Inst::EmptyLook { goto, .. }
        | Inst::LookAround { goto, .. } => goto != PLACEHOLDER,
        Inst::Split { pref, sec } => pref != PLACEHOLDER && sec != PLACEHOLDER,
        Inst::Match => true,
    }
}

impl Parser {
    // -- low-level cursor ---------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|&(_, c)| c)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat_if(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn byte_pos(&self) -> usize {
        self.chars.get(self.pos).map(|&(b, _)| b).unwrap_or(self.pattern_len)
    }

    fn parse_number(&mut self) -> Option<usize> {
        let mut n: Option<usize> = None;
        while let Some(c) = self.peek() {
            match c.to_digit(10) {
                Some(d) => {
                    n = Some(n.unwrap_or(0) * 10 + d as usize);
                    self.bump();
                }
                None => break,
            }
        }
        n
    }

    // -- instruction emission ------------------------------------------

    fn emit(&mut self, inst: Inst) -> Pc {
        self.insts.push(inst);
        self.insts.len() - 1
    }

    fn patch(&mut self, outs: &[Out], target: Pc) {
        for &out in outs {
            match out {
                Out::Goto(pc) => match &mut self.insts[pc] {
                    Inst::Char { goto, .. }
                    | Inst::IChar { goto, .. }
                    | Inst::AnyChar { goto }
                    | Inst::CharRange { goto, .. }
                    | Inst::ICharRange { goto, .. }
                    | Inst::CharBitmap { goto, .. }
                    | Inst::Save { goto, .. }
                    | Inst::Jump { goto }
                    | Inst::EmptyLook { goto, .. }
                    | Inst::LookAround { goto, .. } => *goto = target,
                    _ => unreachable!("Out::Goto patch on an instruction with no goto field"),
                },
                Out::Pref(pc) => match &mut self.insts[pc] {
                    Inst::Split { pref, .. } => *pref = target,
                    _ => unreachable!("Out::Pref patch on a non-Split instruction"),
                },
                Out::Sec(pc) => match &mut self.insts[pc] {
                    Inst::Split { sec, .. } => *sec = target,
                    _ => unreachable!("Out::Sec patch on a non-Split instruction"),
                },
            }
        }
    }

    fn empty_frag(&mut self) -> Frag {
        let pc = self.emit(Inst::Jump { goto: PLACEHOLDER });
        Frag { start: pc, outs: vec![Out::Goto(pc)] }
    }

    fn concat(&mut self, a: Frag, b: Frag) -> Frag {
        self.patch(&a.outs, b.start);
        Frag { start: a.start, outs: b.outs }
    }

    /// Builds a right-associated chain of `Split`s so that branch `i` is
    /// tried before branch `i+1` (leftmost-first), with no intermediate
    /// `Jump`: every branch's own dangling exits are simply included in the
    /// combined `outs`, to be patched straight to whatever follows the
    /// whole alternation.
    fn alternate(&mut self, mut branches: Vec<Frag>) -> Frag {
        assert!(!branches.is_empty());
        if branches.len() == 1 {
            return branches.pop().unwrap();
        }
        let mut iter = branches.into_iter().rev();
        let mut acc = iter.next().unwrap();
        for b in iter {
            let split_pc = self.emit(Inst::Split { pref: b.start, sec: acc.start });
            let mut outs = b.outs;
            outs.extend(acc.outs);
            acc = Frag { start: split_pc, outs };
        }
        acc
    }

    fn star(&mut self, atom: Frag, greedy: bool) -> Frag {
        let split_pc = self.emit(Inst::Split { pref: PLACEHOLDER, sec: PLACEHOLDER });
        self.patch(&atom.outs, split_pc);
        if greedy {
            self.patch(&[Out::Pref(split_pc)], atom.start);
            Frag { start: split_pc, outs: vec![Out::Sec(split_pc)] }
        } else {
            self.patch(&[Out::Sec(split_pc)], atom.start);
            Frag { start: split_pc, outs: vec![Out::Pref(split_pc)] }
        }
    }

    fn plus(&mut self, atom: Frag, greedy: bool) -> Frag {
        let split_pc = self.emit(Inst::Split { pref: PLACEHOLDER, sec: PLACEHOLDER });
        self.patch(&atom.outs, split_pc);
        if greedy {
            self.patch(&[Out::Pref(split_pc)], atom.start);
            Frag { start: atom.start, outs: vec![Out::Sec(split_pc)] }
        } else {
            self.patch(&[Out::Sec(split_pc)], atom.start);
            Frag { start: atom.start, outs: vec![Out::Pref(split_pc)] }
        }
    }

    fn question(&mut self, atom: Frag, greedy: bool) -> Frag {
        let split_pc = self.emit(Inst::Split { pref: PLACEHOLDER, sec: PLACEHOLDER });
        let mut outs = atom.outs;
        if greedy {
            self.patch(&[Out::Pref(split_pc)], atom.start);
            outs.push(Out::Sec(split_pc));
        } else {
            self.patch(&[Out::Sec(split_pc)], atom.start);
            outs.push(Out::Pref(split_pc));
        }
        Frag { start: split_pc, outs }
    }

    fn lookaround_frag(&mut self, ahead: bool, positive: bool, distance: usize, body: Frag) -> Frag {
        let body_end = self.emit(Inst::Match);
        self.patch(&body.outs, body_end);
        let la = self.emit(Inst::LookAround {
            body: body.start,
            ahead,
            positive,
            distance,
            goto: PLACEHOLDER,
        });
        Frag { start: la, outs: vec![Out::Goto(la)] }
    }

    fn literal_char_frag(&mut self, c: char) -> (Frag, Option<usize>) {
        let pc = if self.case_insensitive && c.is_ascii_alphabetic() {
            self.emit(Inst::IChar { c: ascii_lower(c), goto: PLACEHOLDER })
        } else {
            self.emit(Inst::Char { c, goto: PLACEHOLDER })
        };
        (Frag { start: pc, outs: vec![Out::Goto(pc)] }, Some(1))
    }

    fn class_frag(&mut self, set: SpanSet) -> (Frag, Option<usize>) {
        let set = if self.case_insensitive { set.to_ascii_lower() } else { set };
        if set.fits_ascii_bitmap() {
            let bitmap = set.to_ascii_bitmap();
            let pc = self.emit(Inst::CharBitmap { bitmap, goto: PLACEHOLDER });
            (Frag { start: pc, outs: vec![Out::Goto(pc)] }, Some(1))
        } else {
            let ranges = set.to_char_ranges();
            let frags: Vec<Frag> = ranges
                .into_iter()
                .map(|(lo, hi)| {
                    if lo == hi {
                        let pc = self.emit(Inst::Char { c: lo, goto: PLACEHOLDER });
                        Frag { start: pc, outs: vec![Out::Goto(pc)] }
                    } else {
                        let pc = self.emit(Inst::CharRange { lo, hi, goto: PLACEHOLDER });
                        Frag { start: pc, outs: vec![Out::Goto(pc)] }
                    }
                })
                .collect();
            (self.alternate(frags), Some(1))
        }
    }

    // -- grammar ---------------------------------------------------------

    fn parse_alt(&mut self) -> Result<(Frag, Vec<Option<usize>>), Error> {
        let mut frags = Vec::new();
        let mut lens = Vec::new();
        loop {
            let (frag, len) = self.parse_concat()?;
            frags.push(frag);
            lens.push(len);
            if self.eat_if('|') {
                continue;
            }
            break;
        }
        Ok((self.alternate(frags), lens))
    }

    fn parse_concat(&mut self) -> Result<(Frag, Option<usize>), Error> {
        let mut frag: Option<Frag> = None;
        let mut len: Option<usize> = Some(0);
        loop {
            match self.peek() {
                None | Some('|') | Some(')') => break,
                _ => {}
            }
            let (rep_frag, rep_len) = self.parse_rep()?;
            frag = Some(match frag {
                None => rep_frag,
                Some(f) => self.concat(f, rep_frag),
            });
            len = match (len, rep_len) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            };
        }
        let frag = match frag {
            Some(f) => f,
            None => self.empty_frag(),
        };
        Ok((frag, len))
    }

    fn reject_double_quantifier(&mut self) -> Result<(), Error> {
        if matches!(self.peek(), Some('*') | Some('+') | Some('?') | Some('{')) {
            Err(Error::Syntax(ErrorKind::RepeatedRepetition, self.byte_pos()))
        } else {
            Ok(())
        }
    }

    fn parse_rep(&mut self) -> Result<(Frag, Option<usize>), Error> {
        if matches!(self.peek(), Some('*') | Some('+') | Some('?')) {
            return Err(Error::Syntax(ErrorKind::RepeatedRepetition, self.byte_pos()));
        }
        let group_seq_start = self.group_seq.len();
        let atom_start = self.pos;
        let (atom_frag, atom_len) = self.parse_atom()?;
        match self.peek() {
            Some('*') => {
                self.bump();
                let lazy = self.eat_if('?');
                self.reject_double_quantifier()?;
                Ok((self.star(atom_frag, !lazy), None))
            }
            Some('+') => {
                self.bump();
                let lazy = self.eat_if('?');
                self.reject_double_quantifier()?;
                Ok((self.plus(atom_frag, !lazy), None))
            }
            Some('?') => {
                self.bump();
                let lazy = self.eat_if('?');
                self.reject_double_quantifier()?;
                Ok((self.question(atom_frag, !lazy), None))
            }
            Some('{') => {
                let (min, max, lazy) = self.parse_counting_braces()?;
                let resume_pos = self.pos;
                self.reject_double_quantifier()?;
                self.build_counted(
                    atom_frag,
                    atom_len,
                    atom_start,
                    resume_pos,
                    group_seq_start,
                    min,
                    max,
                    !lazy,
                )
            }
            _ => Ok((atom_frag, atom_len)),
        }
    }

    fn parse_counting_braces(&mut self) -> Result<(usize, Option<usize>, bool), Error> {
        let open_pos = self.byte_pos();
        self.bump(); // '{'
        let min = match self.parse_number() {
            Some(n) => n,
            None => return Err(Error::Syntax(ErrorKind::CountingMissingMin, open_pos)),
        };
        let max = if self.eat_if(',') {
            if self.peek() == Some('}') {
                None
            } else {
                match self.parse_number() {
                    Some(n) => Some(n),
                    None => return Err(Error::Syntax(ErrorKind::UnclosedCounting, open_pos)),
                }
            }
        } else {
            Some(min)
        };
        if !self.eat_if('}') {
            return Err(Error::Syntax(ErrorKind::UnclosedCounting, open_pos));
        }
        if let Some(n) = max {
            if n < min {
                return Err(Error::Syntax(ErrorKind::CountingMinExceedsMax, open_pos));
            }
        }
        let lazy = self.eat_if('?');
        Ok((min, max, lazy))
    }

    fn reparse_copy(
        &mut self,
        atom_start: usize,
        resume_pos: usize,
        group_seq_start: usize,
    ) -> Result<(Frag, Option<usize>), Error> {
        self.pos = atom_start;
        let saved_cursor = self.group_cursor.take();
        self.group_cursor = Some(group_seq_start);
        let result = self.parse_atom();
        self.group_cursor = saved_cursor;
        self.pos = resume_pos;
        result
    }

    fn build_optional_tail(
        &mut self,
        atom_start: usize,
        resume_pos: usize,
        group_seq_start: usize,
        remaining: usize,
        greedy: bool,
    ) -> Result<Frag, Error> {
        if remaining == 0 {
            return Ok(self.empty_frag());
        }
        let (copy, _len) = self.reparse_copy(atom_start, resume_pos, group_seq_start)?;
        let tail =
            self.build_optional_tail(atom_start, resume_pos, group_seq_start, remaining - 1, greedy)?;
        let body = self.concat(copy, tail);
        Ok(self.question(body, greedy))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_counted(
        &mut self,
        first_copy: Frag,
        first_len: Option<usize>,
        atom_start: usize,
        resume_pos: usize,
        group_seq_start: usize,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    ) -> Result<(Frag, Option<usize>), Error> {
        if max == Some(0) {
            // first_copy was already emitted by parse_atom before we knew the
            // count was 0; it's dead code now, but its outs are still
            // dangling placeholders that parse()'s is_resolved check would
            // trip on, so patch them to the empty frag we actually return.
            let empty = self.empty_frag();
            self.patch(&first_copy.outs, empty.start);
            return Ok((empty, Some(0)));
        }
        if min == 0 {
            return match max {
                None => Ok((self.star(first_copy, greedy), None)),
                Some(n) => {
                    let tail =
                        self.build_optional_tail(atom_start, resume_pos, group_seq_start, n - 1, greedy)?;
                    let body = self.concat(first_copy, tail);
                    Ok((self.question(body, greedy), None))
                }
            };
        }
        let mut frag = first_copy;
        let mut len = first_len;
        for _ in 1..min {
            let (copy, l) = self.reparse_copy(atom_start, resume_pos, group_seq_start)?;
            frag = self.concat(frag, copy);
            len = match (len, l) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            };
        }
        match max {
            None => {
                let (star_atom, _) = self.reparse_copy(atom_start, resume_pos, group_seq_start)?;
                let star = self.star(star_atom, greedy);
                Ok((self.concat(frag, star), None))
            }
            Some(n) => {
                let extra = n - min;
                if extra == 0 {
                    Ok((frag, len))
                } else {
                    let tail = self.build_optional_tail(
                        atom_start,
                        resume_pos,
                        group_seq_start,
                        extra,
                        greedy,
                    )?;
                    Ok((self.concat(frag, tail), None))
                }
            }
        }
    }

    fn alloc_group(&mut self) -> usize {
        match self.group_cursor {
            Some(i) => {
                self.group_cursor = Some(i + 1);
                self.group_seq[i]
            }
            None => {
                let idx = self.ngroups;
                self.ngroups += 1;
                self.group_seq.push(idx);
                idx
            }
        }
    }

    fn parse_atom(&mut self) -> Result<(Frag, Option<usize>), Error> {
        match self.peek() {
            Some('(') => self.parse_group(),
            Some('[') => self.parse_class(),
            Some('.') => {
                self.bump();
                let pc = self.emit(Inst::AnyChar { goto: PLACEHOLDER });
                Ok((Frag { start: pc, outs: vec![Out::Goto(pc)] }, Some(1)))
            }
            Some('\\') => {
                self.bump();
                self.parse_escape()
            }
            Some('^') => {
                self.bump();
                let look = if self.multi_line { EmptyLook::StartLine } else { EmptyLook::StartText };
                let pc = self.emit(Inst::EmptyLook { look, goto: PLACEHOLDER });
                Ok((Frag { start: pc, outs: vec![Out::Goto(pc)] }, Some(0)))
            }
            Some('$') => {
                self.bump();
                let look = if self.multi_line { EmptyLook::EndLine } else { EmptyLook::EndText };
                let pc = self.emit(Inst::EmptyLook { look, goto: PLACEHOLDER });
                Ok((Frag { start: pc, outs: vec![Out::Goto(pc)] }, Some(0)))
            }
            Some(c) => {
                self.bump();
                Ok(self.literal_char_frag(c))
            }
            None => unreachable!("parse_atom called with nothing left to parse"),
        }
    }

    fn parse_escape(&mut self) -> Result<(Frag, Option<usize>), Error> {
        let pos = self.byte_pos();
        let c = match self.peek() {
            Some(c) => c,
            None => return Err(Error::Syntax(ErrorKind::TrailingBackslash, pos)),
        };
        self.bump();
        Ok(match c {
            'd' => self.class_frag(digit_set()),
            'D' => self.class_frag(digit_set().negate()),
            'w' => self.class_frag(word_set()),
            'W' => self.class_frag(word_set().negate()),
            's' => self.class_frag(space_set()),
            'b' => {
                let pc = self.emit(Inst::EmptyLook { look: EmptyLook::WordBoundary, goto: PLACEHOLDER });
                (Frag { start: pc, outs: vec![Out::Goto(pc)] }, Some(0))
            }
            'B' => {
                let pc =
                    self.emit(Inst::EmptyLook { look: EmptyLook::NotWordBoundary, goto: PLACEHOLDER });
                (Frag { start: pc, outs: vec![Out::Goto(pc)] }, Some(0))
            }
            'a' => self.literal_char_frag('\u{07}'),
            'f' => self.literal_char_frag('\u{0C}'),
            't' => self.literal_char_frag('\t'),
            'n' => self.literal_char_frag('\n'),
            'r' => self.literal_char_frag('\r'),
            'v' => self.literal_char_frag('\u{0B}'),
            other => self.literal_char_frag(other),
        })
    }

    fn parse_class(&mut self) -> Result<(Frag, Option<usize>), Error> {
        let open_pos = self.byte_pos();
        self.bump(); // '['
        let negate = self.eat_if('^');
        let mut set = SpanSet::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(Error::Syntax(ErrorKind::UnclosedClass, open_pos)),
                Some(']') if !first => {
                    self.bump();
                    break;
                }
                _ => {}
            }
            first = false;
            let item = self.parse_class_item(open_pos)?;
            match item {
                ClassItem::Span(s) => set.union(&s),
                ClassItem::Char(lo) => {
                    let is_range = self.peek() == Some('-')
                        && self.peek_at(1).is_some()
                        && self.peek_at(1) != Some(']');
                    if is_range {
                        self.bump(); // '-'
                        match self.parse_class_item(open_pos)? {
                            ClassItem::Char(hi) => set.add(lo.min(hi), lo.max(hi)),
                            ClassItem::Span(_) => {
                                return Err(Error::Syntax(ErrorKind::UnclosedClass, open_pos))
                            }
                        }
                    } else {
                        set.add(lo, lo);
                    }
                }
            }
        }
        let set = if negate { set.negate() } else { set };
        Ok(self.class_frag(set))
    }

    fn parse_class_item(&mut self, open_pos: usize) -> Result<ClassItem, Error> {
        match self.peek() {
            None => Err(Error::Syntax(ErrorKind::UnclosedClass, open_pos)),
            Some('\\') => {
                self.bump();
                let c = match self.peek() {
                    Some(c) => c,
                    None => return Err(Error::Syntax(ErrorKind::TrailingBackslash, self.byte_pos())),
                };
                self.bump();
                Ok(match c {
                    'd' => ClassItem::Span(digit_set()),
                    'D' => ClassItem::Span(digit_set().negate()),
                    'w' => ClassItem::Span(word_set()),
                    'W' => ClassItem::Span(word_set().negate()),
                    's' => ClassItem::Span(space_set()),
                    'a' => ClassItem::Char(0x07),
                    'f' => ClassItem::Char(0x0C),
                    't' => ClassItem::Char(0x09),
                    'n' => ClassItem::Char(0x0A),
                    'r' => ClassItem::Char(0x0D),
                    'v' => ClassItem::Char(0x0B),
                    other => ClassItem::Char(other as u32),
                })
            }
            Some(c) => {
                self.bump();
                Ok(ClassItem::Char(c as u32))
            }
        }
    }

    fn parse_group(&mut self) -> Result<(Frag, Option<usize>), Error> {
        let open_pos = self.byte_pos();
        self.bump(); // '('
        if !self.eat_if('?') {
            let idx = self.alloc_group();
            let saved = (self.case_insensitive, self.multi_line);
            let (body, lens) = self.parse_alt()?;
            if !self.eat_if(')') {
                return Err(Error::Syntax(ErrorKind::UnclosedGroup, open_pos));
            }
            self.case_insensitive = saved.0;
            self.multi_line = saved.1;
            let save_open = self.emit(Inst::Save { slot: 2 * idx, goto: PLACEHOLDER });
            self.patch(&[Out::Goto(save_open)], body.start);
            let save_close = self.emit(Inst::Save { slot: 2 * idx + 1, goto: PLACEHOLDER });
            self.patch(&body.outs, save_close);
            let frag = Frag { start: save_open, outs: vec![Out::Goto(save_close)] };
            return Ok((frag, collapse(&lens)));
        }

        match self.peek() {
            Some(':') => {
                self.bump();
                let saved = (self.case_insensitive, self.multi_line);
                let (body, lens) = self.parse_alt()?;
                if !self.eat_if(')') {
                    return Err(Error::Syntax(ErrorKind::UnclosedGroup, open_pos));
                }
                self.case_insensitive = saved.0;
                self.multi_line = saved.1;
                Ok((body, collapse(&lens)))
            }
            Some('=') | Some('!') => {
                let positive = self.peek() == Some('=');
                self.bump();
                let (body, _lens) = self.parse_alt()?;
                if !self.eat_if(')') {
                    return Err(Error::Syntax(ErrorKind::UnclosedGroup, open_pos));
                }
                Ok((self.lookaround_frag(true, positive, 0, body), Some(0)))
            }
            Some('<') => {
                self.bump();
                let positive = match self.peek() {
                    Some('=') => true,
                    Some('!') => false,
                    _ => return Err(Error::Syntax(ErrorKind::InvalidLookaroundIntroducer, open_pos)),
                };
                self.bump();
                let (body, lens) = self.parse_alt()?;
                if !self.eat_if(')') {
                    return Err(Error::Syntax(ErrorKind::UnclosedGroup, open_pos));
                }
                if lens.iter().any(Option::is_none) {
                    return Err(Error::Syntax(ErrorKind::LookbehindNotFixedLength, open_pos));
                }
                let first = lens[0].unwrap();
                if !lens.iter().all(|&l| l == Some(first)) {
                    return Err(Error::Syntax(ErrorKind::LookbehindAlternativesDisagree, open_pos));
                }
                Ok((self.lookaround_frag(false, positive, first, body), Some(0)))
            }
            Some('i') | Some('m') | Some('-') => {
                let mut negate = false;
                let mut set_ci: Option<bool> = None;
                let mut set_ml: Option<bool> = None;
                loop {
                    match self.peek() {
                        Some('-') => {
                            negate = true;
                            self.bump();
                        }
                        Some('i') => {
                            set_ci = Some(!negate);
                            self.bump();
                        }
                        Some('m') => {
                            set_ml = Some(!negate);
                            self.bump();
                        }
                        Some(':') => {
                            self.bump();
                            let saved = (self.case_insensitive, self.multi_line);
                            if let Some(v) = set_ci {
                                self.case_insensitive = v;
                            }
                            if let Some(v) = set_ml {
                                self.multi_line = v;
                            }
                            let (body, lens) = self.parse_alt()?;
                            if !self.eat_if(')') {
                                return Err(Error::Syntax(ErrorKind::UnclosedGroup, open_pos));
                            }
                            self.case_insensitive = saved.0;
                            self.multi_line = saved.1;
                            return Ok((body, collapse(&lens)));
                        }
                        Some(')') => {
                            self.bump();
                            if let Some(v) = set_ci {
                                self.case_insensitive = v;
                            }
                            if let Some(v) = set_ml {
                                self.multi_line = v;
                            }
                            return Ok((self.empty_frag(), Some(0)));
                        }
                        _ => return Err(Error::Syntax(ErrorKind::UnrecognizedFlag, self.byte_pos())),
                    }
                }
            }
            _ => Err(Error::Syntax(ErrorKind::InvalidLookaroundIntroducer, open_pos)),
        }
    }
}

fn collapse(lens: &[Option<usize>]) -> Option<usize> {
    if lens.len() == 1 {
        return lens[0];
    }
    if lens.iter().any(Option::is_none) {
        return None;
    }
    let first = lens[0].unwrap();
    if lens.iter().all(|&l| l == Some(first)) {
        Some(first)
    } else {
        None
    }
}

pub(crate) fn ascii_lower(c: char) -> char {
    if c.is_ascii() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

fn digit_set() -> SpanSet {
    let mut s = SpanSet::new();
    s.add('0' as u32, '9' as u32);
    s
}

fn word_set() -> SpanSet {
    let mut s = SpanSet::new();
    s.add('a' as u32, 'z' as u32);
    s.add('A' as u32, 'Z' as u32);
    s.add('0' as u32, '9' as u32);
    s.add('_' as u32, '_' as u32);
    s
}

fn space_set() -> SpanSet {
    let mut s = SpanSet::new();
    s.add(0x09, 0x0D); // \t \n \v \f \r
    s.add(' ' as u32, ' ' as u32);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> Vec<Inst> {
        parse(pattern, false, false, 1 << 20).unwrap().0
    }

    #[test]
    fn literal_concat_compiles() {
        let insts = compile("ab");
        assert!(insts.iter().any(|i| matches!(i, Inst::Char { c: 'a', .. })));
        assert!(insts.iter().any(|i| matches!(i, Inst::Char { c: 'b', .. })));
    }

    #[test]
    fn unclosed_group_is_an_error() {
        let err = parse("(a", false, false, 1 << 20).unwrap_err();
        assert_eq!(err, Error::Syntax(ErrorKind::UnclosedGroup, 0));
    }

    #[test]
    fn unopened_group_is_an_error() {
        let err = parse("a)", false, false, 1 << 20).unwrap_err();
        assert_eq!(err, Error::Syntax(ErrorKind::UnopenedGroup, 1));
    }

    #[test]
    fn counting_min_exceeds_max_is_an_error() {
        let err = parse("a{3,1}", false, false, 1 << 20).unwrap_err();
        assert_eq!(err, Error::Syntax(ErrorKind::CountingMinExceedsMax, 1));
    }

    #[test]
    fn non_fixed_length_lookbehind_is_an_error() {
        let err = parse("(?<=a*)b", false, false, 1 << 20).unwrap_err();
        assert_eq!(err, Error::Syntax(ErrorKind::LookbehindNotFixedLength, 0));
    }

    #[test]
    fn disagreeing_lookbehind_alternatives_is_an_error() {
        let err = parse("(?<=a|bb)c", false, false, 1 << 20).unwrap_err();
        assert_eq!(err, Error::Syntax(ErrorKind::LookbehindAlternativesDisagree, 0));
    }

    #[test]
    fn zero_count_repetition_leaves_no_unpatched_placeholder() {
        let (insts, ngroups) = parse("a{0}", false, false, 1 << 20).unwrap();
        assert!(insts.iter().all(is_resolved));
        assert_eq!(ngroups, 1);
        assert!(!insts.iter().any(|i| matches!(i, Inst::Char { c: 'a', .. })));
    }

    #[test]
    fn zero_count_repetition_of_a_group_leaves_no_unpatched_placeholder() {
        let (insts, ngroups) = parse("(a){0,0}", false, false, 1 << 20).unwrap();
        assert!(insts.iter().all(is_resolved));
        assert_eq!(ngroups, 2);
    }

    #[test]
    fn counted_repetition_reuses_capture_slots_across_copies() {
        let (insts, ngroups) = parse("(a){2,3}", false, false, 1 << 20).unwrap();
        assert_eq!(ngroups, 2); // group 0 (whole match) + group 1
        let slots: Vec<usize> = insts
            .iter()
            .filter_map(|i| match i {
                Inst::Save { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        // Every Save for the user group uses slot 2 or 3, never 4/5/...
        assert!(slots.iter().all(|&s| s <= 3));
        assert!(slots.contains(&2) && slots.contains(&3));
    }

    #[test]
    fn double_quantifier_is_rejected() {
        let err = parse("a**", false, false, 1 << 20).unwrap_err();
        assert_eq!(err, Error::Syntax(ErrorKind::RepeatedRepetition, 2));
    }
}
