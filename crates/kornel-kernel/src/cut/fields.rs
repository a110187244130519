//! Delimiter-separated field extraction.
//!
//! Input is scanned in chunks of `read_buffer` bytes. Selected runs are
//! written straight from the chunk. A record that has not shown a word
//! delimiter yet is spilled to the scratch buffer at each chunk boundary,
//! because only its end decides whether it is printed whole or suppressed.

use std::io::{self, Read, Write};

use memchr::memchr2;
use tracing::{debug, trace};

use super::Cutter;
use super::delim::ByteClass;
use super::mbchar::{Decoded, MAX_CHAR_LEN, decode};
use super::selector::INFINITE;

/// Per-record scanner state. Positions index the current chunk.
struct FieldScan<'c, W> {
    cutter: &'c Cutter,
    scratch: &'c mut Option<Vec<u8>>,
    out: &'c mut W,
    /// Index into the gap list.
    gap: usize,
    /// Fields left in the current gap.
    remaining: usize,
    taking: bool,
    /// No word delimiter seen yet.
    nodelim: bool,
    /// Nothing written for this record yet.
    empty: bool,
    /// Record bytes were consumed in an earlier chunk.
    dirty: bool,
    /// Record start in this chunk.
    start: usize,
    /// Start of the open take run in this chunk.
    run: usize,
}

impl<'c, W: Write> FieldScan<'c, W> {
    fn new(cutter: &'c Cutter, scratch: &'c mut Option<Vec<u8>>, out: &'c mut W) -> Self {
        let mut scan = Self {
            cutter,
            scratch,
            out,
            gap: 0,
            remaining: 0,
            taking: false,
            nodelim: true,
            empty: true,
            dirty: false,
            start: 0,
            run: 0,
        };
        scan.reset(0);
        scan
    }

    fn reset(&mut self, at: usize) {
        let selector = &self.cutter.selector;
        self.start = at;
        self.run = at;
        self.nodelim = true;
        self.empty = true;
        self.dirty = false;
        self.gap = 0;
        self.remaining = selector.gap(0);
        self.taking = false;
        if self.remaining == 0 {
            self.gap = 1;
            self.remaining = selector.gap(1);
            self.taking = true;
        }
        if let Some(scratch) = self.scratch.as_mut() {
            scratch.clear();
        }
    }

    /// Word delimiter occupying `buf[at..at + len]`.
    fn word(&mut self, buf: &[u8], at: usize, len: usize) -> io::Result<()> {
        if self.nodelim {
            self.nodelim = false;
            if let Some(scratch) = self.scratch.as_mut() {
                if self.taking && !scratch.is_empty() {
                    trace!(bytes = scratch.len(), "replaying scratch into first field");
                    self.out.write_all(scratch)?;
                }
                scratch.clear();
            }
        }
        if self.remaining != INFINITE {
            self.remaining -= 1;
        }
        if self.remaining > 0 {
            return Ok(());
        }
        self.gap += 1;
        if self.taking {
            self.out.write_all(&buf[self.run..at])?;
            self.empty = false;
            self.taking = false;
        } else {
            // keep the delimiter between selected fields, never before the first
            self.run = if self.empty { at + len } else { at };
            self.taking = true;
        }
        self.remaining = self.cutter.selector.gap(self.gap);
        Ok(())
    }

    /// Line delimiter occupying `buf[at..at + len]`.
    fn line(&mut self, buf: &[u8], at: usize, len: usize) -> io::Result<()> {
        let end = at + len;
        self.finish_record(buf, at, &buf[at..end])?;
        self.reset(end);
        Ok(())
    }

    /// Write whatever the record still owes, ending with `terminator`.
    fn finish_record(&mut self, buf: &[u8], at: usize, terminator: &[u8]) -> io::Result<()> {
        if self.nodelim {
            if self.cutter.options.suppress {
                trace!("suppressing undelimited record");
                return Ok(());
            }
            if let Some(scratch) = self.scratch.as_ref()
                && !scratch.is_empty()
            {
                trace!(bytes = scratch.len(), "replaying scratch for undelimited record");
                self.out.write_all(scratch)?;
            }
            self.out.write_all(&buf[self.start..at])?;
        } else if self.taking {
            self.out.write_all(&buf[self.run..at])?;
        }
        self.out.write_all(terminator)
    }

    /// Scan `buf`, returning how far it got. Scanning stops short only at a
    /// multibyte character cut off by the chunk end, unless `eof`.
    fn scan(&mut self, buf: &[u8], eof: bool) -> io::Result<usize> {
        let cutter = self.cutter;
        let options = &cutter.options;
        if let (Some(w), Some(l)) = (options.word_delim.single_byte(), options.line_delim.single_byte()) {
            let mut i = 0;
            while let Some(offset) = memchr2(w, l, &buf[i..]) {
                let at = i + offset;
                if buf[at] == l {
                    self.line(buf, at, 1)?;
                } else {
                    self.word(buf, at, 1)?;
                }
                i = at + 1;
            }
            return Ok(buf.len());
        }

        let word = options.word_delim.ch();
        let line = options.line_delim.ch();
        let mut i = 0;
        while i < buf.len() {
            match cutter.classes.class(buf[i]) {
                ByteClass::Ordinary => i += 1,
                ByteClass::Word => {
                    self.word(buf, i, 1)?;
                    i += 1;
                }
                ByteClass::Line => {
                    self.line(buf, i, 1)?;
                    i += 1;
                }
                ByteClass::Wide => match decode(&buf[i..]) {
                    Decoded::Char { ch, len } => {
                        if ch == line {
                            self.line(buf, i, len)?;
                        } else if ch == word {
                            self.word(buf, i, len)?;
                        }
                        i += len;
                    }
                    Decoded::Invalid => i += 1,
                    Decoded::Incomplete if !eof => {
                        trace!(at = i, "character straddles chunk boundary");
                        return Ok(i);
                    }
                    Decoded::Incomplete => i += 1,
                },
            }
        }
        Ok(buf.len())
    }

    /// End of a chunk at `buf.len()` with the record still open.
    fn spill(&mut self, buf: &[u8]) -> io::Result<()> {
        let limit = buf.len();
        if self.start < limit {
            if self.nodelim {
                if !self.cutter.options.suppress || self.taking {
                    let scratch = self.scratch.get_or_insert_with(|| {
                        debug!("allocating cut scratch buffer");
                        Vec::new()
                    });
                    scratch.extend_from_slice(&buf[self.start..limit]);
                }
            } else if self.taking {
                self.out.write_all(&buf[self.run..limit])?;
            }
            self.dirty = true;
        }
        self.start = 0;
        self.run = 0;
        Ok(())
    }

    /// End of input: a record without its terminator still gets one.
    fn eof(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.dirty || self.start < buf.len() {
            let cutter = self.cutter;
            self.finish_record(buf, buf.len(), cutter.options.line_delim.as_bytes())?;
            self.reset(buf.len());
        }
        Ok(())
    }
}

fn read_some<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match input.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Extract fields from every record of `input`.
pub(super) fn cut_fields<R: Read, W: Write>(
    cutter: &Cutter,
    scratch: &mut Option<Vec<u8>>,
    mut input: R,
    out: &mut W,
) -> io::Result<()> {
    let chunk = cutter.options.read_buffer.max(1);
    let mut buf = vec![0u8; chunk + MAX_CHAR_LEN];
    let mut carry = 0;
    let mut scan = FieldScan::new(cutter, scratch, out);
    loop {
        let n = read_some(&mut input, &mut buf[carry..carry + chunk])?;
        let filled = carry + n;
        if n == 0 {
            scan.scan(&buf[..filled], true)?;
            return scan.eof(&buf[..filled]);
        }
        let limit = scan.scan(&buf[..filled], false)?;
        scan.spill(&buf[..limit])?;
        buf.copy_within(limit..filled, 0);
        carry = filled - limit;
    }
}
