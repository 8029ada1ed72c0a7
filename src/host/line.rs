//! Newline-delimited line assembler.
//!
//! The assembler accumulates incoming bytes into a fixed buffer and
//! yields complete lines, however the bytes were split across
//! `Transport::read` calls.  A trailing `\r` is stripped so
//! `\r\n` hosts work unchanged.
//!
//! A line longer than the buffer is discarded up to its terminator; the
//! assembler then resynchronises on the next line.

use heapless::Vec;
use log::warn;

/// Longest accepted command line, terminator excluded.
pub const MAX_LINE_LEN: usize = 64;

pub struct LineAssembler {
    buf: Vec<u8, MAX_LINE_LEN>,
    /// Set while skipping the remainder of an oversized line.
    discarding: bool,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
        }
    }

    /// Feed bytes into the assembler, calling `on_line` once per complete,
    /// non-empty line.  Returns the number of lines delivered.
    pub fn feed(&mut self, data: &[u8], mut on_line: impl FnMut(&[u8])) -> usize {
        let mut lines = 0;
        for &byte in data {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else {
                    let line = match self.buf.split_last() {
                        Some((b'\r', head)) => head,
                        _ => &self.buf[..],
                    };
                    if !line.is_empty() {
                        on_line(line);
                        lines += 1;
                    }
                }
                self.buf.clear();
                continue;
            }

            if self.discarding {
                continue;
            }
            if self.buf.push(byte).is_err() {
                warn!("Host link: line exceeds {MAX_LINE_LEN} bytes, discarding");
                self.buf.clear();
                self.discarding = true;
            }
        }
        lines
    }

    /// Bytes held for an unterminated line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial line (e.g. after the link buffers were cleared).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}
