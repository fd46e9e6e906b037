//! Control mode and flush scheduling.
//!
//! Report handlers only stage colors and raise flags. Hardware writes happen
//! here, on a periodic tick: a completed host batch is committed on the next
//! tick, and entering autonomous mode blanks the array once. The caller is
//! responsible for sleeping between ticks.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::OutputDriver;
use crate::config::DEFAULT_TICK_PERIOD;
use crate::store::LampStore;

/// Who owns the lamps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMode {
    /// Device-local lighting, host writes are not guaranteed to be shown
    Autonomous,
    /// The host drives every lamp
    Host,
}

impl ControlMode {
    pub const fn from_autonomous(autonomous: bool) -> Self {
        if autonomous { Self::Autonomous } else { Self::Host }
    }

    pub const fn is_autonomous(self) -> bool {
        matches!(self, Self::Autonomous)
    }
}

/// Observable state of the control state machine
///
/// The autonomous states do not reflect a completed batch: updates
/// received before the host takes control stay staged, and the batch is
/// committed on the first tick after the switch to [`ControlMode::Host`].
/// Use [`ControlFlags::is_batch_complete`] to observe such a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    /// Autonomous, the blank frame has not been written yet
    AutonomousIdle,
    /// Autonomous and blanked, ticks do nothing
    AutonomousJustCleared,
    /// Host controlled, a completed batch waits for the next tick
    HostBatchPending,
    /// Host controlled, nothing to commit
    HostBatchSettled,
}

/// Flags shared between the report handler and the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFlags {
    autonomous: bool,
    cleared: bool,
    batch_complete: bool,
}

impl ControlFlags {
    /// Autonomous, not yet cleared, no batch
    pub const fn new() -> Self {
        Self {
            autonomous: true,
            cleared: false,
            batch_complete: false,
        }
    }

    /// Switch the control mode
    ///
    /// Returns `true` if the mode changed. Handing control back to the
    /// device re-arms the blanking tick.
    pub fn set_mode(&mut self, mode: ControlMode) -> bool {
        let autonomous = mode.is_autonomous();
        if self.autonomous == autonomous {
            return false;
        }
        if autonomous {
            self.cleared = false;
        }
        self.autonomous = autonomous;
        true
    }

    /// Host signalled the last report of an update batch
    pub fn mark_batch_complete(&mut self) {
        self.batch_complete = true;
    }

    pub(crate) fn mark_cleared(&mut self) {
        self.cleared = true;
    }

    pub const fn mode(&self) -> ControlMode {
        ControlMode::from_autonomous(self.autonomous)
    }

    pub const fn is_batch_complete(&self) -> bool {
        self.batch_complete
    }

    /// Whether the array was blanked since entering autonomous mode
    pub const fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub const fn state(&self) -> ControlState {
        match (self.autonomous, self.cleared, self.batch_complete) {
            (true, false, _) => ControlState::AutonomousIdle,
            (true, true, _) => ControlState::AutonomousJustCleared,
            (false, _, true) => ControlState::HostBatchPending,
            (false, _, false) => ControlState::HostBatchSettled,
        }
    }
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// What a tick did to the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Nothing to do
    Idle,
    /// Completed batch written to the driver
    Flushed,
    /// Completed batch had no changes, nothing written
    BatchSettled,
    /// Array blanked after entering autonomous mode
    Cleared,
    /// Driver write failed, the frame stays pending and is retried next tick
    WriteFailed,
}

/// Result of a tick operation.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    pub action: TickAction,
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (may be zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Tick-driven state machine deciding when the staged frame hits the hardware
#[derive(Debug, Clone)]
pub struct FlushScheduler {
    control: ControlFlags,
    next_tick: Instant,
    tick_period: Duration,
}

impl FlushScheduler {
    pub const fn new() -> Self {
        Self::with_tick_period(DEFAULT_TICK_PERIOD)
    }

    pub const fn with_tick_period(tick_period: Duration) -> Self {
        Self {
            control: ControlFlags::new(),
            next_tick: Instant::from_millis(0),
            tick_period,
        }
    }

    pub const fn control(&self) -> &ControlFlags {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut ControlFlags {
        &mut self.control
    }

    pub const fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Advance the state machine and return timing information.
    ///
    /// The caller is responsible for waiting `sleep_duration` before
    /// calling `tick` again.
    pub fn tick<O: OutputDriver, const N: usize>(
        &mut self,
        now: Instant,
        store: &mut LampStore<N>,
        output: &mut O,
    ) -> TickResult {
        let action = self.step(store, output);

        // Drift correction: skip the backlog after long stalls
        let max_drift = self.tick_period * 2;
        if now > self.next_tick + max_drift {
            self.next_tick = now;
        }
        self.next_tick += self.tick_period;

        let sleep_duration = if self.next_tick > now {
            self.next_tick - now
        } else {
            Duration::from_millis(0)
        };

        TickResult {
            action,
            next_deadline: self.next_tick,
            sleep_duration,
        }
    }

    fn step<O: OutputDriver, const N: usize>(
        &mut self,
        store: &mut LampStore<N>,
        output: &mut O,
    ) -> TickAction {
        let control = &mut self.control;

        if control.batch_complete && !control.autonomous {
            return match store.flush(output) {
                Ok(true) => {
                    control.batch_complete = false;
                    control.cleared = false;
                    #[cfg(feature = "esp32-log")]
                    println!("[FlushScheduler.tick] batch committed");
                    TickAction::Flushed
                }
                Ok(false) => {
                    control.batch_complete = false;
                    TickAction::BatchSettled
                }
                Err(_) => {
                    #[cfg(feature = "esp32-log")]
                    println!("[FlushScheduler.tick] batch write failed");
                    TickAction::WriteFailed
                }
            };
        }

        if control.autonomous && !control.cleared {
            if store.clear_all(output).is_err() {
                #[cfg(feature = "esp32-log")]
                println!("[FlushScheduler.tick] clear write failed");
                return TickAction::WriteFailed;
            }
            control.cleared = true;
            #[cfg(feature = "esp32-log")]
            println!("[FlushScheduler.tick] autonomous mode, lamps cleared");
            return TickAction::Cleared;
        }

        TickAction::Idle
    }
}

impl Default for FlushScheduler {
    fn default() -> Self {
        Self::new()
    }
}
