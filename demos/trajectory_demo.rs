// Trajectory demo: run a short out-and-back drive under PD control.
//
// IMPORTANT: run bus_probe first to verify communication.
// This WILL move the robot. Wheels off the ground for the first try.
//
// Usage: cargo run --example trajectory_demo -- [port]

use std::io::{self, Write};

use drivetrain_runtime::config::{DriveConfig, TrajectoryStep};

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().eq_ignore_ascii_case("y")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyACM0".to_string());

    println!("Trajectory demo: drive 1000 ticks forward, then back.");
    println!("Serial port: {}", port);
    println!();

    if !confirm("Has bus_probe verified the controller responds?") {
        println!("Please run: cargo run --example bus_probe -- {}", port);
        return Ok(());
    }
    if !confirm("Ready to move (wheels clear or area clear)?") {
        return Ok(());
    }

    let config = DriveConfig {
        port,
        cruise_power: 0.3, // gentle for a demo
        trajectory: vec![
            TrajectoryStep::DriveStraight { target_ticks: 1000 },
            TrajectoryStep::DriveStraight { target_ticks: -1000 },
        ],
        ..DriveConfig::default()
    };

    drivetrain_runtime::runtime::run(config).await
}
