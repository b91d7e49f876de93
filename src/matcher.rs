use std::borrow::Cow;

use crate::errors::{MotifError, Result};
use crate::sequence::Region;

/// A family of motifs that can be tested at a fixed position.
///
/// Implementations compare symbols case-insensitively and must never report a
/// zero-length match.
pub trait MotifPattern {
    fn name(&self) -> &'static str;

    /// Length of the match anchored at `pos`, if one starts there.
    fn match_at(&self, seq: &[u8], pos: usize) -> Option<usize>;
}

/// A matched span together with the literal text it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub region: Region,
    pub text: &'a [u8],
}

impl<'a> Match<'a> {
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn as_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }
}

/// Left-to-right, non-overlapping scan of one pattern over one sequence.
pub struct Matches<'p, 's, P: ?Sized> {
    pattern: &'p P,
    seq: &'s [u8],
    pos: usize,
}

impl<'s, P: MotifPattern + ?Sized> Iterator for Matches<'_, 's, P> {
    type Item = Match<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.seq.len() {
            let start = self.pos;
            match self.pattern.match_at(self.seq, start) {
                Some(len) if len > 0 => {
                    let end = start + len;
                    self.pos = end;
                    return Some(Match {
                        region: Region::new(start, end),
                        text: &self.seq[start..end],
                    });
                }
                _ => self.pos += 1,
            }
        }
        None
    }
}

/// Lazily iterate the non-overlapping matches of `pattern` in `seq`.
/// Scanning resumes at the end of each reported match.
pub fn find_iter<'p, 's, P: MotifPattern + ?Sized>(
    pattern: &'p P,
    seq: &'s [u8],
) -> Result<Matches<'p, 's, P>> {
    if seq.is_empty() {
        return Err(MotifError::EmptyInput);
    }
    Ok(Matches { pattern, seq, pos: 0 })
}

/// First match of `pattern` in `seq`, if any.
pub fn find_first<'s, P: MotifPattern + ?Sized>(pattern: &P, seq: &'s [u8]) -> Option<Match<'s>> {
    find_iter(pattern, seq).ok()?.next()
}

/// Case-insensitive symbol equality.
#[inline]
pub(crate) fn same_base(a: u8, b: u8) -> bool {
    a.eq_ignore_ascii_case(&b)
}

/// Case-insensitive membership of `base` in `set` (given in upper case).
#[inline]
pub(crate) fn base_in(base: u8, set: &[u8]) -> bool {
    set.contains(&base.to_ascii_uppercase())
}
