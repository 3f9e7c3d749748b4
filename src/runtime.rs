// 50 Hz control loop around the trajectory engine.
//
// Builds the hardware stack from the configuration, runs the trajectory to
// completion, then stops the motors. A maneuver that never completes stalls
// the run; that is only warned about, never aborted, since runs are
// supervised.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tokio::time::interval;
use tracing::{info, warn};

use crate::bus::SerialBridge;
use crate::config::{DriveConfig, LOOP_HZ, STALL_WARNING, TrajectoryStep};
use crate::control::{DriveStraight, PdRegulator, TrajectoryEngine};
use crate::motor::{Channel, DcMotor, Direction, ExpansionController};

pub async fn run(config: DriveConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening bus bridge on {}", config.port);
    let bridge = SerialBridge::open(&config.port)?;

    let expansion = Rc::new(RefCell::new(ExpansionController::new(
        Box::new(bridge),
        config.expansion_address,
    )));
    expansion.borrow_mut().begin()?;

    let left = Rc::new(RefCell::new(DcMotor::new(expansion.clone(), Channel::One)));
    let right = Rc::new(RefCell::new(DcMotor::new(expansion, Channel::Two)));

    // The right encoder is mounted mirrored, so forward counts down on it
    right.borrow_mut().set_encoder_direction(Direction::Reverse);

    for motor in [&left, &right] {
        let mut motor = motor.borrow_mut();
        motor.set_max_power(config.max_power);
        motor.begin()?;
    }

    let pd = Rc::new(RefCell::new(PdRegulator::new(config.kp, config.kd)));
    let mut engine = TrajectoryEngine::new();
    for step in &config.trajectory {
        match step {
            TrajectoryStep::DriveStraight { target_ticks } => {
                engine.enqueue(Box::new(DriveStraight::new(
                    left.clone(),
                    right.clone(),
                    pd.clone(),
                    *target_ticks,
                    config.cruise_power,
                )));
            }
        }
    }
    info!("Trajectory loaded: {} maneuvers", engine.len());

    engine.start()?;

    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));
    let mut maneuver_started = Instant::now();
    let mut stall_warned = false;

    info!("Runtime started: {}Hz control loop", LOOP_HZ);

    while !engine.is_idle() {
        tick.tick().await;

        let before = engine.len();
        engine.update()?;

        if engine.len() < before {
            info!("Maneuver complete, {} remaining", engine.len());
            maneuver_started = Instant::now();
            stall_warned = false;
        } else if !stall_warned && maneuver_started.elapsed() > STALL_WARNING {
            warn!(
                "Maneuver still running after {:?}, trajectory may be stalled",
                maneuver_started.elapsed()
            );
            stall_warned = true;
        }
    }

    info!("Trajectory complete, stopping motors");
    left.borrow_mut().write_power(0.0)?;
    right.borrow_mut().write_power(0.0)?;

    Ok(())
}
