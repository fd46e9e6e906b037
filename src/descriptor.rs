//! Static description of the lamp array
//!
//! Everything in this module is fixed at startup: the array descriptor
//! answered to the capability query and the physical metadata of every lamp.

use core::ops::BitOr;

use embassy_time::Duration;

/// Lamp identity, an index in `[0, LampCount)`
pub type LampId = u16;

const LAMP_ARRAY_KIND_UNDEFINED: u32 = 0;
const LAMP_ARRAY_KIND_KEYBOARD: u32 = 1;
const LAMP_ARRAY_KIND_MOUSE: u32 = 2;
const LAMP_ARRAY_KIND_GAME_CONTROLLER: u32 = 3;
const LAMP_ARRAY_KIND_PERIPHERAL: u32 = 4;
const LAMP_ARRAY_KIND_SCENE: u32 = 5;
const LAMP_ARRAY_KIND_NOTIFICATION: u32 = 6;
const LAMP_ARRAY_KIND_CHASSIS: u32 = 7;
const LAMP_ARRAY_KIND_WEARABLE: u32 = 8;
const LAMP_ARRAY_KIND_FURNITURE: u32 = 9;
const LAMP_ARRAY_KIND_ART: u32 = 10;

/// Converts millimeters to the micrometers used by the lamp array reports
pub const fn millimeters(value: u32) -> u32 {
    value * 1000
}

/// Kind of device the lamp array belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum LampArrayKind {
    Undefined = LAMP_ARRAY_KIND_UNDEFINED,
    Keyboard = LAMP_ARRAY_KIND_KEYBOARD,
    Mouse = LAMP_ARRAY_KIND_MOUSE,
    GameController = LAMP_ARRAY_KIND_GAME_CONTROLLER,
    Peripheral = LAMP_ARRAY_KIND_PERIPHERAL,
    Scene = LAMP_ARRAY_KIND_SCENE,
    Notification = LAMP_ARRAY_KIND_NOTIFICATION,
    Chassis = LAMP_ARRAY_KIND_CHASSIS,
    Wearable = LAMP_ARRAY_KIND_WEARABLE,
    Furniture = LAMP_ARRAY_KIND_FURNITURE,
    Art = LAMP_ARRAY_KIND_ART,
}

impl LampArrayKind {
    pub fn from_raw(value: u32) -> Option<Self> {
        Some(match value {
            LAMP_ARRAY_KIND_UNDEFINED => Self::Undefined,
            LAMP_ARRAY_KIND_KEYBOARD => Self::Keyboard,
            LAMP_ARRAY_KIND_MOUSE => Self::Mouse,
            LAMP_ARRAY_KIND_GAME_CONTROLLER => Self::GameController,
            LAMP_ARRAY_KIND_PERIPHERAL => Self::Peripheral,
            LAMP_ARRAY_KIND_SCENE => Self::Scene,
            LAMP_ARRAY_KIND_NOTIFICATION => Self::Notification,
            LAMP_ARRAY_KIND_CHASSIS => Self::Chassis,
            LAMP_ARRAY_KIND_WEARABLE => Self::Wearable,
            LAMP_ARRAY_KIND_FURNITURE => Self::Furniture,
            LAMP_ARRAY_KIND_ART => Self::Art,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

/// Bitmask of what a lamp is used for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LampPurposes(u32);

impl LampPurposes {
    pub const CONTROL: Self = Self(0x01);
    pub const ACCENT: Self = Self(0x02);
    pub const BRANDING: Self = Self(0x04);
    pub const STATUS: Self = Self(0x08);
    pub const ILLUMINATION: Self = Self(0x10);
    pub const PRESENTATION: Self = Self(0x20);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LampPurposes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Lamp position relative to the bounding box origin, in micrometers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Position {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Size of the whole array, in micrometers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl BoundingBox {
    /// Create a bounding box from dimensions in millimeters
    pub const fn from_millimeters(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width: millimeters(width),
            height: millimeters(height),
            depth: millimeters(depth),
        }
    }
}

/// Physical metadata of a single lamp
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LampInfo {
    pub position: Position,
    /// Time from a flush until the lamp shows the new color
    pub update_latency: Duration,
    pub purposes: LampPurposes,
    pub red_levels: u8,
    pub green_levels: u8,
    pub blue_levels: u8,
    pub intensity_levels: u8,
    pub programmable: bool,
    /// HID usage the lamp is bound to, 0 when unbound
    pub input_binding: u8,
}

impl LampInfo {
    /// Programmable accent lamp with 8-bit color channels
    pub const ACCENT_RGB: Self = Self {
        position: Position::new(0, 0, 0),
        update_latency: Duration::from_millis(4),
        purposes: LampPurposes::ACCENT,
        red_levels: 0xFF,
        green_levels: 0xFF,
        blue_levels: 0xFF,
        intensity_levels: 0x01,
        programmable: true,
        input_binding: 0,
    };

    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub const fn with_purposes(mut self, purposes: LampPurposes) -> Self {
        self.purposes = purposes;
        self
    }
}

impl Default for LampInfo {
    fn default() -> Self {
        Self::ACCENT_RGB
    }
}

/// Attributes answered for one step of the lamp enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LampAttributes {
    pub lamp_id: LampId,
    pub info: LampInfo,
}

/// Answer to the capability query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayDescriptor {
    pub lamp_count: u16,
    pub bounding_box: BoundingBox,
    pub kind: LampArrayKind,
    /// Minimal time the host should wait between two update batches
    pub min_update_interval: Duration,
}
