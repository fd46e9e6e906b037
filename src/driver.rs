use smart_leds::SmartLedsWrite;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::OutputDriver;
use crate::color::Rgb;

/// Output driver for any `smart-leds` writer
pub struct SmartLedsOutput<W> {
    writer: W,
}

impl<W> SmartLedsOutput<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub const fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> OutputDriver for SmartLedsOutput<W>
where
    W: SmartLedsWrite<Color = Rgb>,
{
    type Error = W::Error;

    fn write(&mut self, colors: &[Rgb]) -> Result<(), Self::Error> {
        let result = self.writer.write(colors.iter().copied());
        #[cfg(feature = "esp32-log")]
        if result.is_err() {
            println!(
                "[SmartLedsOutput.write] driver rejected {} lamps",
                colors.len()
            );
        }
        result
    }
}
