//! UART host link.
//!
//! Wraps an ESP-IDF `UartDriver` (UART0, routed to the USB bridge) as a
//! non-blocking [`Transport`]: reads use a zero timeout and writes are
//! only attempted when the TX ring buffer has room.  The driver has no
//! call that discards queued TX bytes, so [`Transport::clear`] lets the
//! ring buffer drain (bounded by [`TX_DRAIN_MS`]) before dropping RX.

use esp_idf_hal::delay::{NON_BLOCK, TickType};
use esp_idf_hal::uart::UartDriver;
use esp_idf_svc::sys::{esp, uart_get_tx_buffer_free_size};
use log::debug;

use crate::error::CommsError;
use crate::host::transport::Transport;

/// Longest wait for the TX ring buffer to empty during a clear.  At
/// 115200 baud 1 KiB drains in about 90 ms.
pub const TX_DRAIN_MS: u64 = 100;

pub struct UartTransport<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartTransport<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

fn io(e: esp_idf_svc::sys::EspError) -> CommsError {
    CommsError::Io(e.code())
}

impl Transport for UartTransport<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CommsError> {
        if !self.available() {
            return Ok(0);
        }
        self.uart.read(buf, NON_BLOCK).map_err(io)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, CommsError> {
        self.uart.write(data).map_err(io)
    }

    fn flush(&mut self) -> Result<(), CommsError> {
        // The driver drains its ring buffer in the background.
        Ok(())
    }

    fn writable(&self) -> usize {
        let mut free: usize = 0;
        match esp!(unsafe { uart_get_tx_buffer_free_size(self.uart.port(), &mut free) }) {
            Ok(()) => free,
            Err(_) => 0,
        }
    }

    fn clear(&mut self) -> Result<(), CommsError> {
        if let Err(e) = self.uart.wait_tx_done(TickType::new_millis(TX_DRAIN_MS).ticks()) {
            debug!("UART: TX not drained within {TX_DRAIN_MS} ms ({e})");
        }
        self.uart.clear_rx().map_err(io)
    }

    fn available(&self) -> bool {
        self.uart.remaining_read().is_ok_and(|n| n > 0)
    }
}
