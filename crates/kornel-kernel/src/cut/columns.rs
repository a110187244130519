//! Byte and character extraction.
//!
//! The line delimiter is not part of the record body: positions count only
//! the record's own bytes or characters, and the delimiter is written once
//! after each record unless `-N` is given.

use std::io::{self, BufRead, Read, Write};

use tracing::trace;

use super::mbchar::unit_len;
use super::selector::{INFINITE, Selector};
use super::{CutMode, Cutter};

/// Read the next record body into `record`: a fixed block under `reclen`,
/// else everything up to (not including) the line delimiter. Returns false
/// at end of input.
fn next_record<R: BufRead>(input: &mut R, cutter: &Cutter, record: &mut Vec<u8>) -> io::Result<bool> {
    record.clear();
    if cutter.options.reclen > 0 {
        input.take(cutter.options.reclen as u64).read_to_end(record)?;
        return Ok(!record.is_empty());
    }
    let delim = cutter.options.line_delim.as_bytes();
    let Some(&last) = delim.last() else {
        return Ok(false);
    };
    loop {
        let n = input.read_until(last, record)?;
        if n == 0 {
            // end of input, possibly after an unterminated record
            return Ok(!record.is_empty());
        }
        if record.ends_with(delim) {
            record.truncate(record.len() - delim.len());
            return Ok(true);
        }
        if record.last() != Some(&last) {
            return Ok(true);
        }
    }
}

/// Extract columns from every record of `input`.
pub(super) fn cut_columns<R: Read, W: Write>(cutter: &Cutter, input: R, out: &mut W) -> io::Result<()> {
    let mut input = io::BufReader::with_capacity(cutter.options.read_buffer, input);
    let mut record = Vec::new();
    while next_record(&mut input, cutter, &mut record)? {
        cut_record(cutter, &record, out)?;
    }
    Ok(())
}

/// Absolute `[start, end)` unit ranges selected within a record of `len` units.
fn takes(selector: &Selector, len: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut pos = 0usize;
    let mut index = 0;
    std::iter::from_fn(move || {
        let skip = selector.gap(index);
        if skip == INFINITE {
            return None;
        }
        pos = pos.saturating_add(skip);
        if pos >= len {
            return None;
        }
        let take = selector.gap(index + 1);
        let start = pos;
        pos = if take == INFINITE { len } else { pos.saturating_add(take).min(len) };
        index += 2;
        Some((start, pos))
    })
}

/// Walk the gap list over one record body.
fn cut_record<W: Write>(cutter: &Cutter, record: &[u8], out: &mut W) -> io::Result<()> {
    let opts = &cutter.options;
    let multibyte = opts.locale.is_multibyte();

    if opts.mode == CutMode::Chars && multibyte {
        // character offsets of each unit start, plus the record end
        let mut bounds = Vec::with_capacity(record.len() + 1);
        let mut at = 0;
        while at < record.len() {
            bounds.push(at);
            at += unit_len(&record[at..], true);
        }
        let units = bounds.len();
        bounds.push(record.len());
        for (start, end) in takes(&cutter.selector, units) {
            out.write_all(&record[bounds[start]..bounds[end]])?;
        }
    } else if opts.mode == CutMode::Bytes && opts.nosplit && multibyte {
        // a character is written only when every byte of it is selected
        let mut at = 0;
        for (start, end) in takes(&cutter.selector, record.len()) {
            while at < start {
                at += unit_len(&record[at..], true);
            }
            let run = at;
            while at < end {
                let len = unit_len(&record[at..], true);
                if at + len > end {
                    break;
                }
                at += len;
            }
            out.write_all(&record[run..at])?;
        }
    } else {
        for (start, end) in takes(&cutter.selector, record.len()) {
            out.write_all(&record[start..end])?;
        }
    }

    trace!(len = record.len(), "column record done");
    if !opts.no_newline {
        out.write_all(opts.line_delim.as_bytes())?;
    }
    Ok(())
}
