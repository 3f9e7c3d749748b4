// Bus layer
//
// Provides:
// - The `Transport` trait the motor drivers talk through
// - A serial-attached bridge implementation for real hardware
// - Error types shared by everything touching the bus

mod serial;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use serial::{SerialBridge, DEFAULT_BAUDRATE, DEFAULT_TIMEOUT_MS};
pub use transport::{BusError, Result, Transport};
