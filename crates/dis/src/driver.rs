use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use crate::clock::{Clock, SystemClock};
use crate::entity::EntityState;
use crate::session::DisSession;
use crate::transport::DatagramTransport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub ticks: u32,
    pub sent: u32,
    pub failed: u32,
}

/// Calls [`DisSession::tick`] at a fixed rate.
///
/// Deadlines are measured from the first tick, so a slow tick shortens the
/// next sleep instead of shifting every later tick. Tick errors are logged and
/// counted; the loop carries on.
pub struct SimulationLoop<C: Clock = SystemClock> {
    interval: Duration,
    clock: C,
    running: Arc<AtomicBool>,
}

impl<C: Clock> SimulationLoop<C> {
    pub fn new(interval: Duration, clock: C) -> Self {
        Self {
            interval,
            clock,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Clearing the flag ends the current `run` before its next tick.
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Ticks `ticks` times, or until stopped when `ticks` is `None`.
    ///
    /// `step` receives the tick index and returns the entity number and the
    /// state to publish.
    pub fn run<T, S, F>(
        &self,
        session: &mut DisSession<T, S>,
        ticks: Option<u32>,
        mut step: F,
    ) -> LoopReport
    where
        T: DatagramTransport,
        S: Clock,
        F: FnMut(u32) -> (u16, EntityState),
    {
        let mut report = LoopReport::default();
        let start = self.clock.now();

        let mut index = 0u32;
        while ticks.is_none_or(|limit| index < limit) && self.running.load(Ordering::SeqCst) {
            if index > 0 {
                self.sleep_until(start + self.interval * index);
                if !self.running.load(Ordering::SeqCst) {
                    break;
                }
            }

            let (entity_id, state) = step(index);
            match session.tick(entity_id, state) {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    log::warn!("tick {} for entity {} failed: {}", index, entity_id, e);
                    report.failed += 1;
                }
            }
            report.ticks += 1;
            index = index.saturating_add(1);
        }

        report
    }

    fn sleep_until(&self, deadline: SystemTime) {
        if let Ok(remaining) = deadline.duration_since(self.clock.now()) {
            self.clock.sleep(remaining);
        }
    }
}
