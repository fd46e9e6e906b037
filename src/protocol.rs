//! Update protocol handler
//!
//! Applies decoded set-reports to the lamp store, the attribute provider
//! and the control flags. Nothing here touches the output driver: colors are
//! staged and the scheduler decides when they are committed.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::attributes::AttributeProvider;
use crate::report::{LampUpdate, MultiUpdate, RangeUpdate};
use crate::scheduler::{ControlFlags, ControlMode};
use crate::store::LampStore;

/// Side effects of one report, for the caller to observe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportEffects {
    /// Number of lamps whose staged color changed
    pub changed_lamps: u16,
    /// The report closed an update batch
    pub batch_complete: bool,
    /// New control mode, if the report switched it
    pub control_mode: Option<ControlMode>,
}

impl ReportEffects {
    /// Check if the report changed anything the scheduler cares about
    pub const fn has_effects(&self) -> bool {
        self.changed_lamps > 0 || self.batch_complete || self.control_mode.is_some()
    }
}

/// Apply one decoded update
///
/// Unknown lamp ids are skipped; the rest of the report still applies.
pub fn apply_update<const N: usize>(
    update: &LampUpdate,
    store: &mut LampStore<N>,
    attributes: &mut AttributeProvider<N>,
    control: &mut ControlFlags,
) -> ReportEffects {
    let mut effects = ReportEffects::default();

    match update {
        LampUpdate::RequestAttributes(id) => {
            attributes.request_lamp(*id);
        }
        LampUpdate::Multi(multi) => {
            effects.changed_lamps = apply_multi(multi, store);
            effects.batch_complete = multi.flags.is_complete();
        }
        LampUpdate::Range(range) => {
            effects.changed_lamps = apply_range(range, store);
            effects.batch_complete = range.flags.is_complete();
        }
        LampUpdate::Control { autonomous } => {
            let mode = ControlMode::from_autonomous(*autonomous);
            if control.set_mode(mode) {
                #[cfg(feature = "esp32-log")]
                println!("[apply_update] control mode switched to {:?}", mode);
                effects.control_mode = Some(mode);
            }
        }
    }

    if effects.batch_complete {
        control.mark_batch_complete();
    }

    effects
}

fn apply_multi<const N: usize>(update: &MultiUpdate, store: &mut LampStore<N>) -> u16 {
    let mut changed = 0;
    for (id, color) in &update.lamps {
        if store.set_if_changed(*id, color.rgb()) {
            changed += 1;
        }
    }
    changed
}

/// Ranges must satisfy `start <= end < N`, anything else is ignored whole
fn apply_range<const N: usize>(update: &RangeUpdate, store: &mut LampStore<N>) -> u16 {
    if update.start > update.end || usize::from(update.end) >= N {
        #[cfg(feature = "esp32-log")]
        println!(
            "[apply_range] ignoring range {}..={}",
            update.start, update.end
        );
        return 0;
    }

    let color = update.color.rgb();
    let mut changed = 0;
    for id in update.start..=update.end {
        if store.set_if_changed(id, color) {
            changed += 1;
        }
    }
    changed
}
