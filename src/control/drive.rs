// Straight-line drive maneuver.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::Result;
use crate::motor::DcMotor;

use super::maneuver::Maneuver;
use super::pd::PdRegulator;

/// Completion window around the target, in encoder ticks
const POSITION_TOLERANCE: i32 = 15;

/// Drive both wheels a target encoder distance under PD regulation.
///
/// The encoders are rebased in software at start, so targets are always
/// relative to where the previous maneuver left the robot.
pub struct DriveStraight {
    left: Rc<RefCell<DcMotor>>,
    right: Rc<RefCell<DcMotor>>,
    pd: Rc<RefCell<PdRegulator>>,
    target_ticks: i32,
    cruise_power: f32,
}

impl DriveStraight {
    pub fn new(
        left: Rc<RefCell<DcMotor>>,
        right: Rc<RefCell<DcMotor>>,
        pd: Rc<RefCell<PdRegulator>>,
        target_ticks: i32,
        cruise_power: f32,
    ) -> Self {
        Self {
            left,
            right,
            pd,
            target_ticks,
            cruise_power,
        }
    }
}

impl Maneuver for DriveStraight {
    fn reset_pd(&mut self) {
        self.pd.borrow_mut().reset();
    }

    fn start(&mut self) -> Result<()> {
        // Software rebase: a hardware reset here would cost two settle
        // delays between every pair of maneuvers.
        self.left.borrow_mut().software_encoder_reset()?;
        self.right.borrow_mut().software_encoder_reset()?;
        Ok(())
    }

    fn execute(&mut self) -> Result<bool> {
        let left_pos = self.left.borrow().read_current_position()?;
        let right_pos = self.right.borrow().read_current_position()?;
        let travelled = (left_pos + right_pos) / 2;

        let error = self.target_ticks - travelled;
        if error.abs() <= POSITION_TOLERANCE {
            self.left.borrow_mut().write_power(0.0)?;
            self.right.borrow_mut().write_power(0.0)?;
            return Ok(true);
        }

        let correction = self.pd.borrow_mut().compute(error as f32);
        let power = correction.clamp(-self.cruise_power, self.cruise_power);

        self.left.borrow_mut().write_power(power)?;
        self.right.borrow_mut().write_power(power)?;
        Ok(false)
    }
}
