#![no_std]

pub mod attributes;
pub mod color;
pub mod config;
pub mod descriptor;
pub mod driver;
pub mod lamp_array;
pub mod protocol;
pub mod report;
pub mod scheduler;
pub mod shared;
pub mod store;

pub use attributes::AttributeProvider;
pub use config::LampArrayConfig;
pub use descriptor::{
    ArrayDescriptor, BoundingBox, LampArrayKind, LampAttributes, LampId, LampInfo, LampPurposes,
    Position, millimeters,
};
pub use driver::SmartLedsOutput;
pub use lamp_array::LampArray;
pub use protocol::ReportEffects;
pub use report::{LampUpdate, ReportError, ReportId, UpdateFlags};
pub use scheduler::{
    ControlFlags, ControlMode, ControlState, FlushScheduler, TickAction, TickResult,
};
pub use shared::SharedLampArray;
pub use store::LampStore;

pub use color::{LampColor, Rgb};
pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// The lamp array is generic over this trait.
pub trait OutputDriver {
    type Error;

    /// Write colors to the LED strip
    fn write(&mut self, colors: &[Rgb]) -> Result<(), Self::Error>;
}
