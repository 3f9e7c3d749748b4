// Proportional-derivative regulator.
//
// The only state carried between calls is the previous error sample. It
// must be discarded (via `reset`) whenever a new maneuver takes over, or
// the derivative term spikes on the leftover error of the previous one.

/// PD controller over a numeric error signal.
///
/// No integral term and no internal output clamping; valid output ranges
/// differ per maneuver, so clamping is the caller's job.
pub struct PdRegulator {
    kp: f32,
    kd: f32,
    previous_error: Option<f32>,
}

impl PdRegulator {
    pub fn new(kp: f32, kd: f32) -> Self {
        Self {
            kp,
            kd,
            previous_error: None,
        }
    }

    /// Drop the retained previous-error sample
    pub fn reset(&mut self) {
        self.previous_error = None;
    }

    /// Compute `kp*error + kd*(error - previous_error)` and retain `error`.
    /// The derivative term contributes nothing on the first sample after a
    /// reset.
    pub fn compute(&mut self, error: f32) -> f32 {
        let derivative = match self.previous_error {
            Some(previous) => error - previous,
            None => 0.0,
        };
        self.previous_error = Some(error);
        self.kp * error + self.kd * derivative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_pure_proportional() {
        let mut pd = PdRegulator::new(0.5, 10.0);
        assert_eq!(pd.compute(8.0), 0.5 * 8.0);
    }

    #[test]
    fn test_derivative_tracks_error_change() {
        let mut pd = PdRegulator::new(0.5, 2.0);
        pd.compute(8.0);
        // kp*6 + kd*(6 - 8)
        assert_eq!(pd.compute(6.0), 0.5 * 6.0 + 2.0 * -2.0);
    }

    #[test]
    fn test_reset_discards_previous_error() {
        let mut pd = PdRegulator::new(0.5, 2.0);
        pd.compute(8.0);
        pd.reset();
        assert_eq!(pd.compute(6.0), 0.5 * 6.0);
    }
}
