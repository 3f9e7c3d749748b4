// DC expansion controller protocol.
//
// One controller chip drives two motor channels and sits at a fixed bus
// address. After a reset it needs a full second before it accepts anything
// but the enable command.

use std::time::Duration;
use tracing::debug;

use crate::bus::{Result, Transport};

/// Command bytes understood by the expansion controller
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Command {
    Reset = 0x27,
    Enable = 0x25,
    ReadVoltage = 0x53, // 2 bytes back, big-endian, volts * 100

    SetPowerCh1 = 0x40, // 1 byte, signed
    SetPowerCh2 = 0x41,

    ReadCurrentCh1 = 0x54, // 2 bytes back, big-endian signed, mA
    ReadCurrentCh2 = 0x55,

    ReadPositionCh1 = 0x49, // 4 bytes back, big-endian tick count
    ReadPositionCh2 = 0x4A,

    ResetPositionCh1 = 0x4C,
    ResetPositionCh2 = 0x4D,
}

/// Time the controller needs between reset and the first real command
pub const RESET_SETTLE: Duration = Duration::from_millis(1000);

/// Settle time after a power write or position reset
pub const COMMAND_SETTLE: Duration = Duration::from_millis(1);

/// One physical expansion controller on the bus.
///
/// Owns the transport; up to two `DcMotor`s share a controller through an
/// `Rc<RefCell<_>>` handle (the whole system is single-threaded). No command
/// other than reset/enable may be issued before `enable` has completed its
/// settle wait.
pub struct ExpansionController {
    transport: Box<dyn Transport>,
    address: u8,
    enabled: bool,
    reset_at: Option<Duration>,
}

impl ExpansionController {
    pub fn new(transport: Box<dyn Transport>, address: u8) -> Self {
        Self {
            transport,
            address,
            enabled: false,
            reset_at: None,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Issue the hardware reset and record when it happened. The controller
    /// is not usable until `enable` runs.
    pub fn begin(&mut self) -> Result<()> {
        debug!("Resetting expansion controller 0x{:02X}", self.address);
        self.transport.write_command(self.address, Command::Reset as u8)?;
        self.reset_at = Some(self.transport.now());
        Ok(())
    }

    /// Enable the controller, blocking out the remainder of the settle time
    /// since `begin`. Idempotent: a second call returns immediately.
    pub fn enable(&mut self) -> Result<()> {
        if self.enabled {
            return Ok(());
        }

        let since_reset = match self.reset_at {
            Some(at) => self.transport.now().saturating_sub(at),
            None => Duration::ZERO,
        };
        if since_reset < RESET_SETTLE {
            self.transport.delay(RESET_SETTLE - since_reset);
        }

        debug!("Enabling expansion controller 0x{:02X}", self.address);
        self.transport.write_command(self.address, Command::Enable as u8)?;
        self.enabled = true;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Read the supply voltage in volts. One bus transaction per call.
    pub fn read_voltage(&mut self) -> Result<f32> {
        self.transport
            .write_command(self.address, Command::ReadVoltage as u8)?;

        let mut buf = [0u8; 2];
        self.transport.request(self.address, &mut buf)?;

        Ok(u16::from_be_bytes(buf) as f32 / 100.0)
    }

    // Low-level access for the motor channels.

    pub(crate) fn write_command(&mut self, command: Command) -> Result<()> {
        self.transport.write_command(self.address, command as u8)
    }

    pub(crate) fn write_register(&mut self, command: Command, value: u8) -> Result<()> {
        self.transport
            .write_register(self.address, command as u8, value)
    }

    pub(crate) fn request(&mut self, buf: &mut [u8]) -> Result<()> {
        self.transport.request(self.address, buf)
    }

    pub(crate) fn settle(&mut self) {
        self.transport.delay(COMMAND_SETTLE);
    }
}
