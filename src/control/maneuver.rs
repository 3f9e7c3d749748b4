// Lifecycle contract for one discrete robot motion behavior.

use crate::bus::Result;

/// One maneuver in the trajectory: a start/execute/complete state machine.
///
/// The engine calls `reset_pd` then `start` exactly once when the maneuver
/// becomes head of the queue, then polls `execute` every control tick until
/// it returns `true`. `execute` must not block: it represents one tick of
/// the control loop, not a drive-until-done operation.
pub trait Maneuver {
    /// Discard regulator state carried over from the previous maneuver
    fn reset_pd(&mut self);

    fn start(&mut self) -> Result<()>;

    /// Run one control tick. Returns `true` when the maneuver is complete.
    fn execute(&mut self) -> Result<bool>;
}
