#![allow(dead_code)]

use myrtio_lamp_array::{
    BoundingBox, LampArray, LampArrayConfig, LampArrayKind, LampInfo, OutputDriver, Position, Rgb,
    millimeters,
};

/// Output driver that keeps every written frame
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub frames: Vec<Vec<Rgb>>,
}

impl RecordingDriver {
    pub fn writes(&self) -> usize {
        self.frames.len()
    }

    pub fn last_frame(&self) -> Option<&[Rgb]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl OutputDriver for RecordingDriver {
    type Error = core::convert::Infallible;

    fn write(&mut self, colors: &[Rgb]) -> Result<(), Self::Error> {
        self.frames.push(colors.to_vec());
        Ok(())
    }
}

/// Output driver that fails until `healthy` is set
#[derive(Debug, Default)]
pub struct FlakyDriver {
    pub healthy: bool,
    pub attempts: usize,
    pub frames: Vec<Vec<Rgb>>,
}

impl OutputDriver for FlakyDriver {
    type Error = ();

    fn write(&mut self, colors: &[Rgb]) -> Result<(), Self::Error> {
        self.attempts += 1;
        if !self.healthy {
            return Err(());
        }
        self.frames.push(colors.to_vec());
        Ok(())
    }
}

/// Eight accent lamps in a row, 10 mm apart
pub fn strip_config() -> LampArrayConfig<8> {
    let mut config = LampArrayConfig::uniform(
        BoundingBox::from_millimeters(80, 10, 2),
        LampArrayKind::Peripheral,
        LampInfo::default(),
    );
    for (index, lamp) in config.lamps.iter_mut().enumerate() {
        let x = millimeters(5 + 10 * index as u32);
        *lamp = lamp.with_position(Position::new(x, millimeters(5), 0));
    }
    config
}

pub fn strip() -> LampArray<RecordingDriver, 8> {
    LampArray::new(RecordingDriver::default(), &strip_config())
}

/// Multi update payload (report id 4)
pub fn multi_payload(flags: u8, lamps: &[(u16, [u8; 4])]) -> [u8; 50] {
    let mut payload = [0; 50];
    payload[0] = lamps.len() as u8;
    payload[1] = flags;
    for (slot, (id, color)) in lamps.iter().enumerate() {
        payload[2 + slot * 2..4 + slot * 2].copy_from_slice(&id.to_le_bytes());
        payload[18 + slot * 4..22 + slot * 4].copy_from_slice(color);
    }
    payload
}

/// Range update payload (report id 5)
pub fn range_payload(flags: u8, start: u16, end: u16, color: [u8; 4]) -> [u8; 9] {
    let mut payload = [0; 9];
    payload[0] = flags;
    payload[1..3].copy_from_slice(&start.to_le_bytes());
    payload[3..5].copy_from_slice(&end.to_le_bytes());
    payload[5..9].copy_from_slice(&color);
    payload
}
