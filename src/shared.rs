//! Interrupt-safe lamp array access.
//!
//! USB stacks usually deliver reports from an interrupt handler while the
//! tick runs in the main loop. Both go through a critical section, so a
//! report and a tick never interleave.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Instant;

use crate::OutputDriver;
use crate::lamp_array::LampArray;
use crate::protocol::ReportEffects;
use crate::scheduler::TickResult;

/// A [`LampArray`] shared between interrupt and thread context
pub struct SharedLampArray<O: OutputDriver, const N: usize> {
    inner: Mutex<RefCell<LampArray<O, N>>>,
}

impl<O: OutputDriver, const N: usize> SharedLampArray<O, N> {
    /// Wrap a lamp array. Usable in `static` items.
    pub const fn new(array: LampArray<O, N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(array)),
        }
    }

    /// Run `f` with exclusive access to the lamp array
    ///
    /// `f` must not call back into the same shared array.
    pub fn with<R>(&self, f: impl FnOnce(&mut LampArray<O, N>) -> R) -> R {
        critical_section::with(|cs| {
            let mut array = self.inner.borrow(cs).borrow_mut();
            f(&mut array)
        })
    }

    /// See [`LampArray::on_get_report`]
    pub fn on_get_report(&self, report_id: u8, buf: &mut [u8]) -> usize {
        self.with(|array| array.on_get_report(report_id, buf))
    }

    /// See [`LampArray::on_set_report`]
    pub fn on_set_report(&self, report_id: u8, payload: &[u8]) -> ReportEffects {
        self.with(|array| array.on_set_report(report_id, payload))
    }

    /// See [`LampArray::tick`]
    pub fn tick(&self, now: Instant) -> TickResult {
        self.with(|array| array.tick(now))
    }

    /// See [`LampArray::suspend`]
    pub fn suspend(&self) -> Result<(), O::Error> {
        self.with(LampArray::suspend)
    }
}
