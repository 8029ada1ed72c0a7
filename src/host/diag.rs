//! Free-form diagnostic lines on the host link.
//!
//! Diagnostic lines start with `#` so a receiver expecting telemetry can
//! skip them without trying to parse them.  Like telemetry they are
//! dropped, never blocked on, when the output buffer is full.

use core::fmt::{self, Write as _};

use heapless::String;

use crate::error::CommsError;

use super::transport::{Transport, write_all_or_drop};

/// Longest diagnostic line, prefix and terminator included.
pub const MAX_DIAG_LEN: usize = 512;

pub const DIAG_PREFIX: &str = "# ";

/// Write `# <msg>\n`.  Returns `Ok(false)` if the line was dropped,
/// either for lack of output space or because it was too long.
pub fn write_diagnostic(
    transport: &mut impl Transport,
    msg: &dyn fmt::Display,
) -> Result<bool, CommsError> {
    let mut line: String<MAX_DIAG_LEN> = String::new();
    if writeln!(line, "{DIAG_PREFIX}{msg}").is_err() {
        return Ok(false);
    }
    write_all_or_drop(transport, line.as_bytes())
}

pub fn is_diagnostic(line: &[u8]) -> bool {
    line.first() == Some(&b'#')
}
