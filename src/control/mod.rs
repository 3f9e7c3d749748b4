// Control layer
//
// Provides:
// - The PD regulator shared by the maneuvers
// - The maneuver lifecycle contract and the straight-drive maneuver
// - The trajectory engine that sequences maneuvers one at a time

mod drive;
mod engine;
mod maneuver;
mod pd;

pub use drive::DriveStraight;
pub use engine::TrajectoryEngine;
pub use maneuver::Maneuver;
pub use pd::PdRegulator;
