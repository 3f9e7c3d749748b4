// Transport boundary to the shared addressable bus.
//
// Every device on the bus is reached by address; a transaction is either a
// command write (one or two bytes) or a request for a fixed number of
// response bytes. Settle waits are part of the transport because the
// platform owns the clock.

use std::time::Duration;

/// Error types for bus communication
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timeout waiting for device 0x{addr:02X}")]
    Timeout { addr: u8 },

    #[error("short response from device 0x{addr:02X}: expected {expected} bytes, got {got}")]
    ShortResponse {
        addr: u8,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, BusError>;

/// Byte-level access to one shared bus plus the platform's time primitives.
///
/// `now` is monotonic time since the transport was created. `delay` is a
/// bounded blocking wait; it exists for hardware settle times only, never
/// as a polling mechanism.
pub trait Transport {
    /// Send a single command byte to the addressed device.
    fn write_command(&mut self, addr: u8, command: u8) -> Result<()>;

    /// Send a command byte followed by one value byte.
    fn write_register(&mut self, addr: u8, command: u8, value: u8) -> Result<()>;

    /// Request `buf.len()` response bytes from the addressed device.
    fn request(&mut self, addr: u8, buf: &mut [u8]) -> Result<()>;

    fn now(&self) -> Duration;

    fn delay(&mut self, duration: Duration);
}
