//! Attribute provider
//!
//! Answers the capability query and walks the lamp table for the host.
//! The host selects a starting lamp with an attributes request and then
//! reads attribute responses one by one; every read advances the cursor
//! and wraps back to the first lamp after the last one.

use crate::config::LampArrayConfig;
use crate::descriptor::{ArrayDescriptor, LampAttributes, LampId, LampInfo};

/// Static array facts plus the enumeration cursor
#[derive(Debug, Clone)]
pub struct AttributeProvider<const N: usize> {
    descriptor: ArrayDescriptor,
    lamps: [LampInfo; N],
    cursor: LampId,
}

impl<const N: usize> AttributeProvider<N> {
    /// Lamp count as reported to the host
    ///
    /// Fails to compile for empty arrays or arrays that do not fit a lamp id.
    #[allow(clippy::cast_possible_truncation)]
    pub const LAMP_COUNT: u16 = {
        assert!(N > 0, "lamp array must contain at least one lamp");
        assert!(N <= LampId::MAX as usize, "lamp count must fit a lamp id");
        N as u16
    };

    pub const fn new(config: &LampArrayConfig<N>) -> Self {
        Self {
            descriptor: ArrayDescriptor {
                lamp_count: Self::LAMP_COUNT,
                bounding_box: config.bounding_box,
                kind: config.kind,
                min_update_interval: config.min_update_interval,
            },
            lamps: config.lamps,
            cursor: 0,
        }
    }

    /// Returns the array descriptor. No side effects.
    pub const fn describe_array(&self) -> ArrayDescriptor {
        self.descriptor
    }

    /// Select the lamp reported by the next attributes read
    ///
    /// Unknown ids restart the enumeration from the first lamp.
    pub fn request_lamp(&mut self, id: LampId) {
        self.cursor = if usize::from(id) < N { id } else { 0 };
    }

    /// Returns attributes of the lamp under the cursor and advances it
    pub fn next_lamp_attributes(&mut self) -> LampAttributes {
        let lamp_id = self.cursor;
        let info = self.lamps[usize::from(lamp_id)];

        let next = (usize::from(lamp_id) + 1) % N;
        self.cursor = LampId::try_from(next).unwrap_or(0);

        LampAttributes { lamp_id, info }
    }

    /// Lamp that will be reported by the next attributes read
    pub const fn cursor(&self) -> LampId {
        self.cursor
    }

    /// Metadata of a lamp, `None` for unknown ids
    pub fn lamp(&self, id: LampId) -> Option<&LampInfo> {
        self.lamps.get(usize::from(id))
    }
}
