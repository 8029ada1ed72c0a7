//! Transport abstraction — the byte stream to the supervising host.
//!
//! Concrete implementations:
//! - UART0 / USB-serial on the ESP32-S3 ([`crate::adapters::serial`])
//! - in-memory loopback in the integration tests
//!
//! Every operation is non-blocking: the communication task must never
//! stall its tick on the link.

use crate::error::CommsError;

/// Byte-oriented, non-blocking host link.
pub trait Transport {
    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns 0 if no data is available.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CommsError>;

    /// Queue `data` for transmission.
    /// Returns the number of bytes actually accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, CommsError>;

    /// Push queued output towards the wire without waiting for it.
    fn flush(&mut self) -> Result<(), CommsError>;

    /// Free space in the output buffer, in bytes.
    fn writable(&self) -> usize;

    /// Empty the input and output buffers.  Input is discarded; output is
    /// either discarded or, where the hardware cannot drop queued bytes,
    /// allowed to drain first.
    fn clear(&mut self) -> Result<(), CommsError>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

/// Write `data` only if the whole of it fits in the output buffer.
///
/// Returns `Ok(false)` when the data was dropped for lack of space.
pub fn write_all_or_drop(t: &mut impl Transport, data: &[u8]) -> Result<bool, CommsError> {
    if t.writable() < data.len() {
        return Ok(false);
    }
    let n = t.write(data)?;
    if n < data.len() {
        return Err(CommsError::Overflow);
    }
    Ok(true)
}

/// A null transport that discards all writes and never reads.
/// Stands in for the host link when the UART cannot be opened.
pub struct NullTransport;

impl Transport for NullTransport {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, CommsError> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, CommsError> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), CommsError> {
        Ok(())
    }

    fn writable(&self) -> usize {
        usize::MAX
    }

    fn clear(&mut self) -> Result<(), CommsError> {
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }
}
