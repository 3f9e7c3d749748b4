// Motor actuation layer
//
// Provides:
// - The expansion controller lifecycle (reset, settle, enable) and protocol
// - The per-channel DC motor driver (power, encoder, current)

mod dc_motor;
mod expansion;

pub use dc_motor::{BRAKE_POWER, Channel, DcMotor, Direction, ZeroPowerBehavior};
pub use expansion::{COMMAND_SETTLE, Command, ExpansionController, RESET_SETTLE};
