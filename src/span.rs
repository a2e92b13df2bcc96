// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A small ordered set of inclusive code-point ranges, used while parsing
//! character classes (`[...]`, `\d`, `\D`, ...). Kept sorted, merged and
//! non-touching so that negation (via subtraction from the full code-point
//! range) and union stay cheap and the resulting ranges compile directly to
//! `Inst::CharRange`/`Inst::ICharRange`.
//!
//! Ranges are tracked as `u32` code points rather than `char` internally
//! because subtraction/negation routinely needs to step one past the top of
//! the valid `char` range (`0x10FFFF`) or one below the bottom (`0`), and
//! `char` arithmetic can't represent that without special-casing every call
//! site.

pub const MIN_CODEPOINT: u32 = 0;
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Surrogate code points are not valid Rust `char`s. Any span that would
/// straddle the surrogate gap is split in two when it is finally turned into
/// `char` ranges (see `to_char_ranges`), so this module's internal `u32`
/// arithmetic never needs to special-case the gap itself.
const SURROGATE_LO: u32 = 0xD800;
const SURROGATE_HI: u32 = 0xDFFF;

/// A sorted, merged, non-overlapping, non-touching set of inclusive
/// `[lo, hi]` code-point ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpanSet {
    ranges: Vec<(u32, u32)>,
}

impl SpanSet {
    pub fn new() -> SpanSet {
        SpanSet { ranges: Vec::new() }
    }

    /// The full range of valid code points, `[0, 0x10FFFF]`.
    pub fn full() -> SpanSet {
        let mut s = SpanSet::new();
        s.add(MIN_CODEPOINT, MAX_CODEPOINT);
        s
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Add `[lo, hi]`, merging with any range it overlaps or touches
    /// (`lo == prev_hi + 1`).
    pub fn add(&mut self, lo: u32, hi: u32) {
        assert!(lo <= hi);
        let mut new_lo = lo;
        let mut new_hi = hi;
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        let mut placed = false;
        for &(rlo, rhi) in &self.ranges {
            if touches(new_lo, new_hi, rlo, rhi) {
                new_lo = new_lo.min(rlo);
                new_hi = new_hi.max(rhi);
            } else if rhi < new_lo {
                out.push((rlo, rhi));
            } else {
                if !placed {
                    out.push((new_lo, new_hi));
                    placed = true;
                }
                out.push((rlo, rhi));
            }
        }
        if !placed {
            out.push((new_lo, new_hi));
        }
        self.ranges = out;
    }

    /// Subtract `[lo, hi]` from the set, splitting a covering range into
    /// (up to) two pieces or truncating one side.
    pub fn sub(&mut self, lo: u32, hi: u32) {
        assert!(lo <= hi);
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        for &(rlo, rhi) in &self.ranges {
            if hi < rlo || rhi < lo {
                out.push((rlo, rhi));
                continue;
            }
            if rlo < lo {
                // `lo > MIN_CODEPOINT` here because rlo < lo and rlo >= 0.
                out.push((rlo, lo - 1));
            }
            if rhi > hi {
                // `hi < MAX_CODEPOINT`'s guard matters only when hi ==
                // u32::MAX, which never happens since hi <= MAX_CODEPOINT.
                out.push((hi + 1, rhi));
            }
        }
        self.ranges = out;
    }

    pub fn union(&mut self, other: &SpanSet) {
        for &(lo, hi) in &other.ranges {
            self.add(lo, hi);
        }
    }

    /// The complement of this set within `[0, 0x10FFFF]`.
    pub fn negate(&self) -> SpanSet {
        let mut full = SpanSet::full();
        for &(lo, hi) in &self.ranges {
            full.sub(lo, hi);
        }
        full
    }

    /// Lower every range endpoint to its ASCII-lowercase equivalent and
    /// re-merge. Used for `(?i)` classes kept small enough to stay as
    /// explicit ranges (anything outside ASCII keeps its original case,
    /// matching this crate's ASCII-only case folding, see `src/char.rs`).
    pub fn to_ascii_lower(&self) -> SpanSet {
        let mut out = SpanSet::new();
        for &(lo, hi) in &self.ranges {
            out.add(lo, hi);
            // Only the overlap with the ASCII alphabetic ranges needs a
            // folded counterpart; folding the whole range would smear
            // unrelated code points together.
            let (alo, ahi) = (lo.max('A' as u32), hi.min('Z' as u32));
            if alo <= ahi {
                out.add(alo + 32, ahi + 32);
            }
            let (alo, ahi) = (lo.max('a' as u32), hi.min('z' as u32));
            if alo <= ahi {
                out.add(alo - 32, ahi - 32);
            }
        }
        out
    }

    /// Render as `char` ranges, splitting any range that straddles the
    /// UTF-16 surrogate gap (`0xD800..=0xDFFF`, not valid `char` values).
    pub fn to_char_ranges(&self) -> Vec<(char, char)> {
        let mut out = Vec::with_capacity(self.ranges.len());
        for &(lo, hi) in &self.ranges {
            if hi < SURROGATE_LO || lo > SURROGATE_HI {
                out.push((cp(lo), cp(hi)));
            } else {
                if lo < SURROGATE_LO {
                    out.push((cp(lo), cp(SURROGATE_LO - 1)));
                }
                if hi > SURROGATE_HI {
                    out.push((cp(SURROGATE_HI + 1), cp(hi)));
                }
            }
        }
        out
    }

    /// True iff every range fits in `[0, 127]`, i.e. this class can be
    /// compiled to a single `Inst::CharBitmap` instead of a `Split` chain.
    pub fn fits_ascii_bitmap(&self) -> bool {
        self.ranges.iter().all(|&(_, hi)| hi < 128)
    }

    /// A 128-bit bitmap of which ASCII code points are in this set.
    /// Panics if `fits_ascii_bitmap` is false.
    pub fn to_ascii_bitmap(&self) -> u128 {
        let mut bits: u128 = 0;
        for &(lo, hi) in &self.ranges {
            assert!(hi < 128, "range exceeds ASCII bitmap");
            for c in lo..=hi {
                bits |= 1 << c;
            }
        }
        bits
    }
}

fn cp(v: u32) -> char {
    char::from_u32(v).expect("code point range endpoint must be a valid char")
}

/// True iff `[alo, ahi]` and `[blo, bhi]` overlap or are adjacent (one's
/// `hi + 1` equals the other's `lo`), guarding the `+1`/`-1` against
/// underflow/overflow at the ends of the code-point range.
fn touches(alo: u32, ahi: u32, blo: u32, bhi: u32) -> bool {
    if ahi < blo {
        ahi.checked_add(1).map_or(false, |succ| succ >= blo)
    } else if bhi < alo {
        bhi.checked_add(1).map_or(false, |succ| succ >= alo)
    } else {
        true
    }
}
