//! Lamp array - the main orchestrator
//!
//! Owns the lamp store, the attribute provider, the flush scheduler and the
//! output driver. USB report callbacks, the periodic tick and the suspend
//! notification all go through this type.

use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::OutputDriver;
use crate::attributes::AttributeProvider;
use crate::config::LampArrayConfig;
use crate::protocol::{ReportEffects, apply_update};
use crate::report::{
    LampUpdate, ReportBuffer, ReportId, encode_array_attributes, encode_lamp_attributes,
};
use crate::scheduler::{ControlFlags, ControlMode, ControlState, FlushScheduler, TickResult};
use crate::store::LampStore;

/// HID lamp array with N lamps
pub struct LampArray<O: OutputDriver, const N: usize> {
    // External dependencies
    output: O,

    // Internal state
    store: LampStore<N>,
    attributes: AttributeProvider<N>,
    scheduler: FlushScheduler,
}

impl<O: OutputDriver, const N: usize> LampArray<O, N> {
    /// Create a lamp array in autonomous mode with every lamp off
    pub const fn new(output: O, config: &LampArrayConfig<N>) -> Self {
        Self {
            output,
            store: LampStore::new(),
            attributes: AttributeProvider::new(config),
            scheduler: FlushScheduler::with_tick_period(config.tick_period),
        }
    }

    /// Answer a get-report
    ///
    /// Returns `None` for reports the host cannot read. Reading the lamp
    /// attributes response advances the enumeration cursor.
    pub fn get_report(&mut self, report_id: u8) -> Option<ReportBuffer> {
        let encoded = match ReportId::from_raw(report_id)? {
            ReportId::LampArrayAttributes => {
                ReportBuffer::from_slice(&encode_array_attributes(&self.attributes.describe_array()))
            }
            ReportId::LampAttributesResponse => {
                let attributes = self.attributes.next_lamp_attributes();
                ReportBuffer::from_slice(&encode_lamp_attributes(&attributes))
            }
            _ => return None,
        };
        encoded.ok()
    }

    /// Transport get-report callback
    ///
    /// Writes the payload into `buf` and returns its length, 0 when the
    /// report is unknown or `buf` is too small. The cursor only advances
    /// when the response fits.
    pub fn on_get_report(&mut self, report_id: u8, buf: &mut [u8]) -> usize {
        let Some(size) = ReportId::from_raw(report_id).map(ReportId::payload_size) else {
            return 0;
        };
        if buf.len() < size {
            return 0;
        }
        let Some(report) = self.get_report(report_id) else {
            return 0;
        };
        buf[..report.len()].copy_from_slice(&report);
        report.len()
    }

    /// Transport set-report callback
    ///
    /// Malformed or unknown reports are dropped without effects.
    pub fn on_set_report(&mut self, report_id: u8, payload: &[u8]) -> ReportEffects {
        match LampUpdate::decode(report_id, payload) {
            Ok(update) => self.apply(&update),
            #[cfg_attr(not(feature = "esp32-log"), allow(unused_variables))]
            Err(err) => {
                #[cfg(feature = "esp32-log")]
                println!("[LampArray.on_set_report] dropped report: {:?}", err);
                ReportEffects::default()
            }
        }
    }

    /// Apply an already decoded update
    pub fn apply(&mut self, update: &LampUpdate) -> ReportEffects {
        apply_update(
            update,
            &mut self.store,
            &mut self.attributes,
            self.scheduler.control_mut(),
        )
    }

    /// Run one scheduler step, see [`FlushScheduler::tick`]
    pub fn tick(&mut self, now: Instant) -> TickResult {
        self.scheduler.tick(now, &mut self.store, &mut self.output)
    }

    /// USB suspend notification
    ///
    /// Blanks the lamps right away, regardless of the control state. The
    /// caller may enter its low-power wait afterwards. If the blank frame
    /// cannot be written it stays pending and the error is returned.
    pub fn suspend(&mut self) -> Result<(), O::Error> {
        self.store.clear_all(&mut self.output)?;
        self.scheduler.control_mut().mark_cleared();
        #[cfg(feature = "esp32-log")]
        println!("[LampArray.suspend] lamps cleared");
        Ok(())
    }

    pub const fn store(&self) -> &LampStore<N> {
        &self.store
    }

    pub const fn attributes(&self) -> &AttributeProvider<N> {
        &self.attributes
    }

    pub const fn control(&self) -> &ControlFlags {
        self.scheduler.control()
    }

    pub const fn mode(&self) -> ControlMode {
        self.scheduler.control().mode()
    }

    pub const fn control_state(&self) -> ControlState {
        self.scheduler.control().state()
    }

    /// Get a reference to the output driver.
    pub const fn output(&self) -> &O {
        &self.output
    }

    /// Get a mutable reference to the output driver.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}
