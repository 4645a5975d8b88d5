//! Quota on successfully processed datasets.
//!
//! A single synchronized counter shared across workers. Only `Success`
//! outcomes consume quota; skipped datasets never do. The parallel driver
//! dispatches at most `remaining()` units per wave, so the final count can
//! never exceed the maximum and no increment is lost to a race.

use parking_lot::Mutex;

pub struct QuotaController {
    max: usize,
    done: Mutex<usize>,
}

impl QuotaController {
    pub fn new(max: usize) -> Self {
        Self { max, done: Mutex::new(0) }
    }

    /// Successful datasets recorded so far.
    pub fn done(&self) -> usize {
        *self.done.lock()
    }

    /// Slots still open before the quota is reached.
    pub fn remaining(&self) -> usize {
        self.max.saturating_sub(*self.done.lock())
    }

    /// True once the quota is reached: benign stop, not an error.
    pub fn reached(&self) -> bool {
        self.remaining() == 0
    }

    /// Record one successful dataset.
    pub fn record_success(&self) {
        let mut done = self.done.lock();
        *done += 1;
        debug_assert!(*done <= self.max, "quota overshoot: {} > {}", *done, self.max);
    }
}
