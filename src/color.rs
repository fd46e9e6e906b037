use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Lamp that is switched off
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Color of a single lamp as carried by update reports
///
/// The intensity channel is decoded for completeness, but lamps
/// store raw RGB values only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LampColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub intensity: u8,
}

impl LampColor {
    pub const fn new(red: u8, green: u8, blue: u8, intensity: u8) -> Self {
        Self {
            red,
            green,
            blue,
            intensity,
        }
    }

    /// Raw channel values as stored in the lamp frame
    pub const fn rgb(self) -> Rgb {
        Rgb {
            r: self.red,
            g: self.green,
            b: self.blue,
        }
    }

    pub(crate) const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    pub(crate) const fn to_bytes(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.intensity]
    }
}

impl From<Rgb> for LampColor {
    fn from(color: Rgb) -> Self {
        Self::new(color.r, color.g, color.b, 0)
    }
}
