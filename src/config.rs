// Loop timing, bus defaults, and the drive configuration file format.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

// Control loop frequency
pub const LOOP_HZ: u64 = 50;

// A maneuver running longer than this gets a stall warning (log-only; a
// stuck maneuver is not aborted)
pub const STALL_WARNING: Duration = Duration::from_secs(10);

// Serial port of the bus bridge
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

// Bus address of the drivetrain expansion controller
pub const DEFAULT_EXPANSION_ADDRESS: u8 = 0x10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One step of the pre-planned trajectory
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrajectoryStep {
    DriveStraight { target_ticks: i32 },
}

/// Drive parameters and the trajectory, loaded once at startup. The
/// trajectory is fixed for the whole run; there is no re-planning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub port: String,
    pub expansion_address: u8,
    pub kp: f32,
    pub kd: f32,
    pub max_power: f32,
    pub cruise_power: f32,
    pub trajectory: Vec<TrajectoryStep>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            expansion_address: DEFAULT_EXPANSION_ADDRESS,
            kp: 0.1,
            kd: 0.1,
            max_power: 1.0,
            cruise_power: 0.6,
            trajectory: vec![TrajectoryStep::DriveStraight { target_ticks: 4000 }],
        }
    }
}

impl DriveConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
