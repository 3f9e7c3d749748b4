// Actuation and maneuver sequencing for a two-wheel drivetrain
//
// Provides:
// - Register protocol driver for the DC expansion controller and its motors
// - PD-regulated maneuver state machines and the trajectory engine
// - The control loop runtime that drives one maneuver at a time

pub mod bus;
pub mod config;
pub mod control;
pub mod motor;
pub mod runtime;
