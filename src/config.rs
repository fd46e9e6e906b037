use embassy_time::Duration;

use crate::descriptor::{BoundingBox, LampArrayKind, LampInfo};

/// Minimal update interval advertised to the host (~30 FPS)
pub const DEFAULT_MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(33);

/// Scheduler tick period, matches the HID endpoint poll interval
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(2);

/// Configuration for the lamp array
///
/// N is the number of lamps in the array
#[derive(Debug, Clone)]
pub struct LampArrayConfig<const N: usize> {
    pub bounding_box: BoundingBox,
    pub kind: LampArrayKind,
    pub min_update_interval: Duration,
    pub tick_period: Duration,
    /// Per-lamp metadata, indexed by lamp id
    pub lamps: [LampInfo; N],
}

impl<const N: usize> LampArrayConfig<N> {
    /// Create a configuration where every lamp shares the same metadata
    pub const fn uniform(bounding_box: BoundingBox, kind: LampArrayKind, info: LampInfo) -> Self {
        Self {
            bounding_box,
            kind,
            min_update_interval: DEFAULT_MIN_UPDATE_INTERVAL,
            tick_period: DEFAULT_TICK_PERIOD,
            lamps: [info; N],
        }
    }

    pub const fn with_min_update_interval(mut self, interval: Duration) -> Self {
        self.min_update_interval = interval;
        self
    }

    pub const fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }
}
