// Trajectory execution engine.
//
// Owns the maneuver queue and drives exactly one maneuver at a time. The
// queue is populated once at build time; there is no runtime enqueue path.

use std::collections::VecDeque;

use tracing::debug;

use crate::bus::Result;

use super::maneuver::Maneuver;

/// FIFO of maneuvers, front = active or next to activate.
///
/// An empty queue means the engine is idle and every tick is a no-op. A
/// maneuver that never reports completion stalls the trajectory forever;
/// the engine does not detect that (the runtime loop logs a warning).
#[derive(Default)]
pub struct TrajectoryEngine {
    trajectory: VecDeque<Box<dyn Maneuver>>,
}

impl TrajectoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build-time composition only: enqueue before `start`
    pub fn enqueue(&mut self, maneuver: Box<dyn Maneuver>) {
        self.trajectory.push_back(maneuver);
    }

    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    pub fn is_idle(&self) -> bool {
        self.trajectory.is_empty()
    }

    /// Reset and start the front maneuver. Calling this while a maneuver is
    /// already running aborts it and restarts it from scratch; this is a
    /// restart, not a resume.
    pub fn start(&mut self) -> Result<()> {
        if let Some(front) = self.trajectory.front_mut() {
            front.reset_pd();
            front.start()?;
        }
        Ok(())
    }

    /// Run one control tick.
    ///
    /// When the front maneuver reports completion it is dequeued and
    /// dropped, and the next one is reset and started within this same
    /// call, so no tick is lost between maneuvers.
    pub fn update(&mut self) -> Result<()> {
        let Some(front) = self.trajectory.front_mut() else {
            return Ok(());
        };

        if front.execute()? {
            self.trajectory.pop_front();
            debug!("Maneuver complete, {} queued", self.trajectory.len());

            if let Some(next) = self.trajectory.front_mut() {
                next.reset_pd();
                next.start()?;
            }
        }

        Ok(())
    }
}
