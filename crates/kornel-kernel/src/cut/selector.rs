//! Selector lists: `1,3-5,7-` compiled to a gap list.
//!
//! The gap list alternates skip and take counts, starting with a skip
//! (which may be zero). `INFINITE` in a take position means "to the end of
//! the record"; in a skip position it ends the selection.

use super::CutError;

/// Open-ended count.
pub const INFINITE: usize = usize::MAX;

/// A compiled selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    gaps: Vec<usize>,
}

/// Zero-based `start` and optional `len` (`None` = open-ended).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Range {
    start: usize,
    len: Option<usize>,
}

impl Range {
    fn end(&self) -> usize {
        match self.len {
            Some(len) => self.start.saturating_add(len),
            None => INFINITE,
        }
    }
}

impl Selector {
    /// Parse and compile a list.
    pub fn parse(list: &str) -> Result<Self, CutError> {
        let mut ranges = Vec::new();
        for token in list.split([' ', '\t', ',']).filter(|t| !t.is_empty()) {
            ranges.push(parse_range(token)?);
        }
        if ranges.is_empty() {
            return Err(CutError::EmptyList);
        }
        Ok(Self { gaps: gapify(merge(ranges)) })
    }

    /// The skip/take sequence.
    pub fn gaps(&self) -> &[usize] {
        &self.gaps
    }

    /// Gap at `index`, `INFINITE` past the end.
    #[inline]
    pub fn gap(&self, index: usize) -> usize {
        self.gaps.get(index).copied().unwrap_or(INFINITE)
    }

    /// True when the first unit is selected.
    pub fn starts_taking(&self) -> bool {
        self.gap(0) == 0
    }
}

fn parse_position(text: &str, token: &str) -> Result<usize, CutError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CutError::BadList(token.to_string()));
    }
    text.parse().map_err(|_| CutError::BadList(token.to_string()))
}

fn parse_range(token: &str) -> Result<Range, CutError> {
    let Some((lo, hi)) = token.split_once('-') else {
        let n = parse_position(token, token)?;
        if n == 0 {
            return Err(CutError::BadList(token.to_string()));
        }
        return Ok(Range { start: n - 1, len: Some(1) });
    };
    match (lo.is_empty(), hi.is_empty()) {
        (true, true) => Err(CutError::BadList(token.to_string())),
        // -N
        (true, false) => {
            let n = parse_position(hi, token)?;
            if n == 0 {
                return Err(CutError::BadList(token.to_string()));
            }
            Ok(Range { start: 0, len: Some(n) })
        }
        // N-
        (false, true) => {
            let n = parse_position(lo, token)?;
            if n == 0 {
                return Err(CutError::BadList(token.to_string()));
            }
            Ok(Range { start: n - 1, len: None })
        }
        (false, false) => {
            let n = parse_position(lo, token)?;
            let m = parse_position(hi, token)?;
            if n == 0 {
                return Err(CutError::BadList(token.to_string()));
            }
            // N-0 is the same as N-
            if m == 0 {
                return Ok(Range { start: n - 1, len: None });
            }
            if m < n {
                return Err(CutError::InvalidRange(token.to_string()));
            }
            Ok(Range { start: n - 1, len: Some(m - n + 1) })
        }
    }
}

/// Sort by start and collapse overlapping or adjacent ranges.
fn merge(mut ranges: Vec<Range>) -> Vec<(usize, usize)> {
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for range in ranges {
        let end = range.end();
        match merged.last_mut() {
            Some((_, last_end)) if range.start <= *last_end => {
                *last_end = (*last_end).max(end);
            }
            _ => merged.push((range.start, end)),
        }
    }
    merged
}

fn gapify(merged: Vec<(usize, usize)>) -> Vec<usize> {
    let mut gaps = Vec::with_capacity(merged.len() * 2 + 1);
    let mut cursor = 0;
    for (start, end) in merged {
        gaps.push(start - cursor);
        if end == INFINITE {
            gaps.push(INFINITE);
            return gaps;
        }
        gaps.push(end - start);
        cursor = end;
    }
    gaps.push(INFINITE);
    gaps
}
