// Bus probe: bring up the expansion controller and read every sensor once.
//
// No power is ever commanded - safe to run with wheels on the ground.
//
// Usage: cargo run --example bus_probe -- [port]

use std::cell::RefCell;
use std::rc::Rc;

use drivetrain_runtime::bus::SerialBridge;
use drivetrain_runtime::config::DEFAULT_EXPANSION_ADDRESS;
use drivetrain_runtime::motor::{Channel, DcMotor, ExpansionController};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyACM0".to_string());

    println!("Drivetrain bus probe (no motion commands)");
    println!("Serial port: {}", port);
    println!();

    println!("Step 1: Opening bus bridge...");
    let bridge = SerialBridge::open(&port)?;
    println!("  ok");

    println!("Step 2: Resetting expansion controller...");
    let expansion = Rc::new(RefCell::new(ExpansionController::new(
        Box::new(bridge),
        DEFAULT_EXPANSION_ADDRESS,
    )));
    expansion.borrow_mut().begin()?;
    println!("  reset sent, waiting out settle time...");
    expansion.borrow_mut().enable()?;
    println!("  enabled");

    println!("Step 3: Reading supply voltage...");
    let volts = expansion.borrow_mut().read_voltage()?;
    println!("  {:.2} V", volts);

    println!("Step 4: Reading both motor channels...");
    for (name, channel) in [("ch1", Channel::One), ("ch2", Channel::Two)] {
        let motor = DcMotor::new(expansion.clone(), channel);
        let position = motor.read_current_position()?;
        let current = motor.read_current()?;
        println!("  {}: position={} ticks, current={:.3} A", name, position, current);
    }

    println!();
    println!("Probe complete.");
    Ok(())
}
