//! Command protocol handler.
//!
//! Drains whatever the transport has buffered, assembles lines, parses
//! each into a [`Command`] and applies it to the shared target state.
//! Nothing is acknowledged to the host: unknown prefixes are ignored and
//! malformed payloads are logged and discarded.

use log::{debug, warn};

use crate::app::commands::{Command, ParseError};
use crate::app::ports::Millis;
use crate::error::CommsError;
use crate::shared::SharedState;

use super::line::LineAssembler;
use super::transport::Transport;

/// Bytes pulled from the transport per read.
const RX_CHUNK: usize = 64;

/// Reads per tick; bounds the tick's work against a flooding host.
const MAX_READS_PER_TICK: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerStats {
    pub applied: u32,
    pub unknown: u32,
    pub malformed: u32,
}

#[derive(Default)]
pub struct CommandHandler {
    lines: LineAssembler,
    stats: HandlerStats,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process every complete line currently available.  Never waits for
    /// a terminator; partial lines carry over to the next call.
    ///
    /// Returns the number of lines seen.
    pub fn poll(
        &mut self,
        now: Millis,
        transport: &mut impl Transport,
        shared: &SharedState,
    ) -> Result<usize, CommsError> {
        let mut buf = [0u8; RX_CHUNK];
        let mut seen = 0;
        for _ in 0..MAX_READS_PER_TICK {
            let n = transport.read(&mut buf)?;
            if n == 0 {
                break;
            }
            let stats = &mut self.stats;
            seen += self.lines.feed(&buf[..n], |line| {
                match parse_line(line) {
                    Ok(cmd) => {
                        apply(cmd, now, shared);
                        stats.applied += 1;
                    }
                    Err(ParseError::UnknownCommand) => {
                        debug!("Host: ignoring unknown line {:?}", String::from_utf8_lossy(line));
                        stats.unknown += 1;
                    }
                    Err(ParseError::Malformed) => {
                        warn!("Host: malformed command {:?}", String::from_utf8_lossy(line));
                        stats.malformed += 1;
                    }
                }
            });
        }
        Ok(seen)
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.lines.reset();
    }

    pub fn stats(&self) -> HandlerStats {
        self.stats
    }
}

fn parse_line(line: &[u8]) -> Result<Command, ParseError> {
    let text = core::str::from_utf8(line).map_err(|_| ParseError::UnknownCommand)?;
    Command::parse(text)
}

/// Apply one command to the shared target state.
pub fn apply(cmd: Command, now: Millis, shared: &SharedState) {
    match cmd {
        Command::SetHeaterEnable(on) => shared.set_heater_target(on),
        Command::SetSmokerRate(rate) => shared.set_smoker_rate_target(rate),
        Command::SetSessionActive(active) => {
            shared.set_cooking(active, now);
        }
    }
}
