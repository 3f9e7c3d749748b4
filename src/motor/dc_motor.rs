// One motor channel on a DC expansion controller.
//
// Power is commanded as a signed 8-bit percentage on the wire; position
// comes back as a raw 32-bit big-endian tick count that we rebase with a
// software offset.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::Result;

use super::expansion::{Command, ExpansionController};

/// Wire value meaning "actively hold position" instead of coasting
pub const BRAKE_POWER: i8 = 0x7D;

/// Motor channel on the expansion controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    One,
    Two,
}

impl Channel {
    fn set_power(self) -> Command {
        match self {
            Channel::One => Command::SetPowerCh1,
            Channel::Two => Command::SetPowerCh2,
        }
    }

    fn read_current(self) -> Command {
        match self {
            Channel::One => Command::ReadCurrentCh1,
            Channel::Two => Command::ReadCurrentCh2,
        }
    }

    fn read_position(self) -> Command {
        match self {
            Channel::One => Command::ReadPositionCh1,
            Channel::Two => Command::ReadPositionCh2,
        }
    }

    fn reset_position(self) -> Command {
        match self {
            Channel::One => Command::ResetPositionCh1,
            Channel::Two => Command::ResetPositionCh2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroPowerBehavior {
    Float,
    #[default]
    Brake,
}

/// Driver for one motor channel.
///
/// The controller handle is shared with the sibling channel; callers must
/// not construct two drivers on the same channel of one controller.
pub struct DcMotor {
    expansion: Rc<RefCell<ExpansionController>>,
    channel: Channel,
    motor_direction: Direction,
    encoder_direction: Direction,
    zero_power: ZeroPowerBehavior,
    max_power: f32,
    last_wire_power: i8,
    last_power: f32,
    encoder_offset: i32,
}

impl DcMotor {
    pub fn new(expansion: Rc<RefCell<ExpansionController>>, channel: Channel) -> Self {
        Self {
            expansion,
            channel,
            motor_direction: Direction::default(),
            encoder_direction: Direction::default(),
            zero_power: ZeroPowerBehavior::default(),
            max_power: 1.0,
            last_wire_power: 0,
            last_power: 0.0,
            encoder_offset: 0,
        }
    }

    /// Make sure the controller is enabled, then zero the encoder baseline.
    pub fn begin(&mut self) -> Result<()> {
        {
            let mut expansion = self.expansion.borrow_mut();
            if !expansion.is_enabled() {
                expansion.enable()?;
            }
        }
        self.write_reset_encoder()
    }

    pub fn set_max_power(&mut self, max_power: f32) {
        self.max_power = max_power;
    }

    pub fn set_zero_power_behavior(&mut self, behavior: ZeroPowerBehavior) {
        self.zero_power = behavior;
    }

    /// Set motor and encoder direction together
    pub fn set_direction(&mut self, direction: Direction) {
        self.motor_direction = direction;
        self.encoder_direction = direction;
    }

    pub fn set_motor_direction(&mut self, direction: Direction) {
        self.motor_direction = direction;
    }

    pub fn set_encoder_direction(&mut self, direction: Direction) {
        self.encoder_direction = direction;
    }

    /// Last requested float power, before clamping. Readback only; the wire
    /// value may differ.
    pub fn power(&self) -> f32 {
        self.last_power
    }

    /// Command motor power in [-1, 1].
    ///
    /// The wire value is clamped to +/-100 * max_power and rounded to a
    /// signed byte; a zero under brake behavior becomes the brake value.
    /// Nothing is transmitted when the wire value matches the last one sent,
    /// which saves the bus transaction and the per-write settle time.
    pub fn write_power(&mut self, power: f32) -> Result<()> {
        self.last_power = power;

        let limit = 100.0 * self.max_power;
        let scale = match self.motor_direction {
            Direction::Forward => 100.0,
            Direction::Reverse => -100.0,
        };
        let mut wire = (power * scale).clamp(-limit, limit).round() as i8;

        if wire == 0 && self.zero_power == ZeroPowerBehavior::Brake {
            wire = BRAKE_POWER;
        }

        if wire != self.last_wire_power {
            let mut expansion = self.expansion.borrow_mut();
            expansion.write_register(self.channel.set_power(), wire as u8)?;
            expansion.settle();
            drop(expansion);
            self.last_wire_power = wire;
        }

        Ok(())
    }

    /// Command a target voltage by scaling against the measured supply
    /// voltage. Costs one extra bus read per call.
    pub fn write_voltage(&mut self, voltage: f32) -> Result<()> {
        let supply = self.expansion.borrow_mut().read_voltage()?;
        self.write_power(voltage / supply)
    }

    fn read_raw_position(&self) -> Result<i32> {
        let mut expansion = self.expansion.borrow_mut();
        expansion.write_command(self.channel.read_position())?;

        let mut buf = [0u8; 4];
        expansion.request(&mut buf)?;

        let ticks = u32::from_be_bytes(buf) as i32;
        Ok(match self.encoder_direction {
            Direction::Forward => ticks,
            Direction::Reverse => ticks.wrapping_neg(),
        })
    }

    /// Encoder position relative to the last reset. Every call is a fresh
    /// bus transaction; read once per control tick.
    pub fn read_current_position(&self) -> Result<i32> {
        Ok(self.read_raw_position()?.wrapping_sub(self.encoder_offset))
    }

    /// Hardware reset of the tick counter. Authoritative but incurs the
    /// settle delay.
    pub fn write_reset_encoder(&mut self) -> Result<()> {
        {
            let mut expansion = self.expansion.borrow_mut();
            expansion.write_command(self.channel.reset_position())?;
            expansion.settle();
        }
        self.encoder_offset = 0;
        Ok(())
    }

    /// Rebase the position to zero without touching hardware. Cheaper than
    /// `write_reset_encoder` when rebasing mid-sequence.
    pub fn software_encoder_reset(&mut self) -> Result<()> {
        self.encoder_offset = self.read_raw_position()?;
        Ok(())
    }

    /// Motor current in amperes, signed per motor direction
    pub fn read_current(&self) -> Result<f32> {
        let mut expansion = self.expansion.borrow_mut();
        expansion.write_command(self.channel.read_current())?;

        let mut buf = [0u8; 2];
        expansion.request(&mut buf)?;
        drop(expansion);

        let raw = i16::from_be_bytes(buf);
        let signed = match self.motor_direction {
            Direction::Forward => raw,
            Direction::Reverse => raw.wrapping_neg(),
        };
        Ok(signed as f32 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::{BusWrite, FakeBus};

    fn motor(bus: &FakeBus) -> DcMotor {
        let expansion = Rc::new(RefCell::new(ExpansionController::new(
            Box::new(bus.clone()),
            0x10,
        )));
        DcMotor::new(expansion, Channel::One)
    }

    fn power_writes(bus: &FakeBus) -> Vec<u8> {
        bus.writes()
            .into_iter()
            .filter_map(|w| match w {
                BusWrite::Register {
                    command, value, ..
                } if command == Command::SetPowerCh1 as u8 => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_power_write_is_deduplicated() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);

        motor.write_power(0.5).unwrap();
        motor.write_power(0.5).unwrap();
        // Different float, same wire value after rounding
        motor.write_power(0.501).unwrap();

        assert_eq!(power_writes(&bus), vec![50]);
        // Readback still tracks the raw request
        assert_eq!(motor.power(), 0.501);

        motor.write_power(0.6).unwrap();
        assert_eq!(power_writes(&bus), vec![50, 60]);
    }

    #[test]
    fn test_each_transmitted_write_incurs_settle_delay() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);

        motor.write_power(0.5).unwrap();
        motor.write_power(0.5).unwrap();
        motor.write_power(0.7).unwrap();

        assert_eq!(bus.delays().len(), 2);
    }

    #[test]
    fn test_power_clamped_to_max_power() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);
        motor.set_max_power(0.5);

        motor.write_power(1.0).unwrap();
        motor.write_power(-1.0).unwrap();

        assert_eq!(power_writes(&bus), vec![50, (-50i8) as u8]);
        assert_eq!(motor.power(), -1.0);
    }

    #[test]
    fn test_reversed_motor_negates_power() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);
        motor.set_motor_direction(Direction::Reverse);

        motor.write_power(0.3).unwrap();

        assert_eq!(power_writes(&bus), vec![(-30i8) as u8]);
    }

    #[test]
    fn test_zero_power_sends_brake_value_under_brake_behavior() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);

        motor.write_power(0.0).unwrap();

        assert_eq!(power_writes(&bus), vec![BRAKE_POWER as u8]);
    }

    #[test]
    fn test_zero_power_under_float_behavior_matches_initial_state() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);
        motor.set_zero_power_behavior(ZeroPowerBehavior::Float);

        // Wire state starts at numeric zero, so this is suppressed
        motor.write_power(0.0).unwrap();
        assert!(power_writes(&bus).is_empty());

        motor.write_power(0.3).unwrap();
        motor.write_power(0.0).unwrap();
        assert_eq!(power_writes(&bus), vec![30, 0]);
    }

    #[test]
    fn test_position_decodes_big_endian_ticks() {
        let bus = FakeBus::new();
        let motor = motor(&bus);

        bus.push_response(&[0x00, 0x00, 0x01, 0x2C]); // 300
        assert_eq!(motor.read_current_position().unwrap(), 300);
    }

    #[test]
    fn test_position_with_reversed_encoder_and_offset() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);
        motor.set_encoder_direction(Direction::Reverse);

        // Raw -50 reads as +50 after direction, establishing offset 50
        bus.push_response(&[0xFF, 0xFF, 0xFF, 0xCE]);
        motor.software_encoder_reset().unwrap();

        // Raw 300 -> -300 after direction, minus offset 50 -> -350
        bus.push_response(&[0x00, 0x00, 0x01, 0x2C]);
        assert_eq!(motor.read_current_position().unwrap(), -350);
    }

    #[test]
    fn test_hardware_encoder_reset_zeroes_offset() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);

        bus.push_response(&[0x00, 0x00, 0x00, 0x64]); // 100
        motor.software_encoder_reset().unwrap();

        motor.write_reset_encoder().unwrap();
        assert_eq!(bus.command_count(Command::ResetPositionCh1 as u8), 1);
        assert_eq!(bus.delays().len(), 1);

        bus.push_response(&[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(motor.read_current_position().unwrap(), 0);
    }

    #[test]
    fn test_software_reset_rebases_without_hardware_traffic() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);

        bus.push_response(&[0x00, 0x00, 0x02, 0x00]); // 512
        motor.software_encoder_reset().unwrap();
        assert_eq!(bus.command_count(Command::ResetPositionCh1 as u8), 0);

        bus.push_response(&[0x00, 0x00, 0x02, 0x00]);
        assert_eq!(motor.read_current_position().unwrap(), 0);
    }

    #[test]
    fn test_current_decodes_signed_milliamps() {
        let bus = FakeBus::new();
        let motor = motor(&bus);

        bus.push_response(&[0xFF, 0x38]); // -200 mA
        assert_eq!(motor.read_current().unwrap(), -0.2);
    }

    #[test]
    fn test_current_sign_follows_motor_direction() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);
        motor.set_motor_direction(Direction::Reverse);

        bus.push_response(&[0xFF, 0x38]);
        assert_eq!(motor.read_current().unwrap(), 0.2);
    }

    #[test]
    fn test_write_voltage_scales_by_supply() {
        let bus = FakeBus::new();
        let mut motor = motor(&bus);

        bus.push_response(&[0x04, 0xB0]); // 12.00 V supply
        motor.write_voltage(6.0).unwrap();

        assert_eq!(power_writes(&bus), vec![50]);
        assert_eq!(motor.power(), 0.5);
    }

    #[test]
    fn test_channel_two_uses_its_own_commands() {
        let bus = FakeBus::new();
        let expansion = Rc::new(RefCell::new(ExpansionController::new(
            Box::new(bus.clone()),
            0x10,
        )));
        let mut motor = DcMotor::new(expansion, Channel::Two);

        motor.write_power(0.25).unwrap();
        bus.push_response(&[0x00, 0x00, 0x00, 0x0A]);
        motor.read_current_position().unwrap();

        assert_eq!(bus.command_count(Command::SetPowerCh2 as u8), 1);
        assert_eq!(bus.command_count(Command::ReadPositionCh2 as u8), 1);
    }
}
