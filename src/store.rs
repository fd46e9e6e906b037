//! Lamp store
//!
//! Holds the staged color of every lamp. Writes land here immediately;
//! the output driver only sees them once the frame is flushed.

use crate::OutputDriver;
use crate::color::{BLACK, Rgb};
use crate::descriptor::LampId;

/// Staged frame plus the "needs flush" flag
#[derive(Debug, Clone)]
pub struct LampStore<const N: usize> {
    frame: [Rgb; N],
    needs_flush: bool,
}

impl<const N: usize> LampStore<N> {
    /// Create a store with every lamp off
    pub const fn new() -> Self {
        Self {
            frame: [BLACK; N],
            needs_flush: false,
        }
    }

    /// Staged color of a lamp, `None` for unknown ids
    pub fn get(&self, id: LampId) -> Option<Rgb> {
        self.frame.get(usize::from(id)).copied()
    }

    /// Stage a color for a lamp
    ///
    /// Returns `true` if the staged color changed. Unchanged colors and
    /// unknown ids leave the frame and the flush flag untouched.
    pub fn set_if_changed(&mut self, id: LampId, color: Rgb) -> bool {
        let Some(slot) = self.frame.get_mut(usize::from(id)) else {
            return false;
        };
        if *slot == color {
            return false;
        }

        *slot = color;
        self.needs_flush = true;
        true
    }

    /// Write the staged frame to the driver if anything changed
    ///
    /// Returns `Ok(true)` if the driver was written. A failed write keeps
    /// the frame pending.
    pub fn flush<O: OutputDriver>(&mut self, output: &mut O) -> Result<bool, O::Error> {
        if !self.needs_flush {
            return Ok(false);
        }
        output.write(&self.frame)?;
        self.needs_flush = false;
        Ok(true)
    }

    /// Switch every lamp off and write the blank frame
    ///
    /// The write is unconditional: the hardware may show anything after
    /// autonomous mode or a suspend. A failed write leaves the blank frame
    /// pending.
    pub fn clear_all<O: OutputDriver>(&mut self, output: &mut O) -> Result<(), O::Error> {
        self.frame = [BLACK; N];
        self.needs_flush = true;
        output.write(&self.frame)?;
        self.needs_flush = false;
        Ok(())
    }

    pub const fn needs_flush(&self) -> bool {
        self.needs_flush
    }

    /// The staged frame, indexed by lamp id
    pub fn frame(&self) -> &[Rgb] {
        &self.frame
    }
}

impl<const N: usize> Default for LampStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
