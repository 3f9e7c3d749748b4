// Scripted in-memory transport for driver tests.
//
// Records every write in order, serves queued response bytes, and keeps a
// manually advanced clock. `delay` advances the clock by the requested
// amount so settle waits are observable without real sleeping.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use super::transport::{BusError, Result, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusWrite {
    Command { addr: u8, command: u8 },
    Register { addr: u8, command: u8, value: u8 },
}

#[derive(Default)]
struct Inner {
    writes: Vec<BusWrite>,
    responses: VecDeque<Vec<u8>>,
    delays: Vec<Duration>,
    now: Duration,
}

/// Cloneable handle to one fake bus; clones share state, so a test can keep
/// a handle after boxing the transport into a driver.
#[derive(Clone, Default)]
pub struct FakeBus {
    inner: Rc<RefCell<Inner>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, bytes: &[u8]) {
        self.inner.borrow_mut().responses.push_back(bytes.to_vec());
    }

    pub fn writes(&self) -> Vec<BusWrite> {
        self.inner.borrow().writes.clone()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.inner.borrow().delays.clone()
    }

    pub fn set_now(&self, now: Duration) {
        self.inner.borrow_mut().now = now;
    }

    /// Count of writes carrying the given command byte
    pub fn command_count(&self, command: u8) -> usize {
        self.inner
            .borrow()
            .writes
            .iter()
            .filter(|w| match w {
                BusWrite::Command { command: c, .. } => *c == command,
                BusWrite::Register { command: c, .. } => *c == command,
            })
            .count()
    }
}

impl Transport for FakeBus {
    fn write_command(&mut self, addr: u8, command: u8) -> Result<()> {
        self.inner
            .borrow_mut()
            .writes
            .push(BusWrite::Command { addr, command });
        Ok(())
    }

    fn write_register(&mut self, addr: u8, command: u8, value: u8) -> Result<()> {
        self.inner
            .borrow_mut()
            .writes
            .push(BusWrite::Register {
                addr,
                command,
                value,
            });
        Ok(())
    }

    fn request(&mut self, addr: u8, buf: &mut [u8]) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let response = inner
            .responses
            .pop_front()
            .ok_or(BusError::Timeout { addr })?;

        if response.len() != buf.len() {
            return Err(BusError::ShortResponse {
                addr,
                expected: buf.len(),
                got: response.len(),
            });
        }

        buf.copy_from_slice(&response);
        Ok(())
    }

    fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    fn delay(&mut self, duration: Duration) {
        let mut inner = self.inner.borrow_mut();
        inner.delays.push(duration);
        inner.now += duration;
    }
}
