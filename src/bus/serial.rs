// Serial bridge to the addressable bus.
//
// The bus itself hangs off a USB serial adapter that forwards framed
// transactions to the addressed device.
// Frame format: [0xA5, Addr, WriteLen, ReadLen, Payload..., Checksum]
// Response format: [Count, Bytes...] where Count must equal ReadLen.

use serialport::{self, SerialPort};
use std::io::{Read, Write};
use std::time::{Duration, Instant};
use tracing::debug;

use super::transport::{BusError, Result, Transport};

/// Default serial configuration for the bus bridge
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Frame start byte
const HEADER: u8 = 0xA5;

/// Serial-attached bridge to the motor bus
pub struct SerialBridge {
    port: Box<dyn SerialPort>,
    opened_at: Instant,
}

impl SerialBridge {
    /// Open a new connection to the bus bridge
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self {
            port,
            opened_at: Instant::now(),
        })
    }

    /// Calculate checksum for a frame (excluding header)
    fn checksum(data: &[u8]) -> u8 {
        let sum: u16 = data.iter().map(|&b| b as u16).sum();
        (!sum & 0xFF) as u8
    }

    /// Build a frame with header and checksum
    fn build_frame(addr: u8, payload: &[u8], read_len: u8) -> Vec<u8> {
        let mut frame = Vec::with_capacity(5 + payload.len());

        frame.push(HEADER);
        frame.push(addr);
        frame.push(payload.len() as u8);
        frame.push(read_len);
        frame.extend_from_slice(payload);

        // Checksum over addr, lengths, payload
        let checksum = Self::checksum(&frame[1..]);
        frame.push(checksum);

        frame
    }

    /// Send one frame and read back the requested response bytes
    fn transact(&mut self, addr: u8, payload: &[u8], response: &mut [u8]) -> Result<()> {
        let frame = Self::build_frame(addr, payload, response.len() as u8);
        debug!(
            "Bus transaction to 0x{:02X}: write {:02X?}, read {}",
            addr,
            payload,
            response.len()
        );

        self.port.write_all(&frame)?;
        self.port.flush()?;

        if response.is_empty() {
            return Ok(());
        }

        let mut count = [0u8; 1];
        self.port.read_exact(&mut count).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                BusError::Timeout { addr }
            } else {
                BusError::Io(e)
            }
        })?;

        if count[0] as usize != response.len() {
            return Err(BusError::ShortResponse {
                addr,
                expected: response.len(),
                got: count[0] as usize,
            });
        }

        self.port.read_exact(response).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                BusError::Timeout { addr }
            } else {
                BusError::Io(e)
            }
        })?;

        Ok(())
    }
}

impl Transport for SerialBridge {
    fn write_command(&mut self, addr: u8, command: u8) -> Result<()> {
        self.transact(addr, &[command], &mut [])
    }

    fn write_register(&mut self, addr: u8, command: u8, value: u8) -> Result<()> {
        self.transact(addr, &[command, value], &mut [])
    }

    fn request(&mut self, addr: u8, buf: &mut [u8]) -> Result<()> {
        self.transact(addr, &[], buf)
    }

    fn now(&self) -> Duration {
        self.opened_at.elapsed()
    }

    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
