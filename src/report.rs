//! LampArray report codec
//!
//! Report layouts follow the HID LampArray report set. Payloads never
//! include the report id byte and all multi-byte fields are little-endian.
//!
//! | Id | Report                | Direction | Size |
//! |----|-----------------------|-----------|------|
//! | 1  | Lamp array attributes | get       | 22   |
//! | 2  | Lamp attributes request | set     | 2    |
//! | 3  | Lamp attributes response | get    | 28   |
//! | 4  | Lamp multi update     | set       | 50   |
//! | 5  | Lamp range update     | set       | 9    |
//! | 6  | Lamp array control    | set       | 1    |

use heapless::Vec;

use crate::color::LampColor;
use crate::descriptor::{ArrayDescriptor, LampAttributes, LampId};

const REPORT_ID_LAMP_ARRAY_ATTRIBUTES: u8 = 1;
const REPORT_ID_LAMP_ATTRIBUTES_REQUEST: u8 = 2;
const REPORT_ID_LAMP_ATTRIBUTES_RESPONSE: u8 = 3;
const REPORT_ID_LAMP_MULTI_UPDATE: u8 = 4;
const REPORT_ID_LAMP_RANGE_UPDATE: u8 = 5;
const REPORT_ID_LAMP_ARRAY_CONTROL: u8 = 6;

pub const LAMP_ARRAY_ATTRIBUTES_SIZE: usize = 22;
pub const LAMP_ATTRIBUTES_REQUEST_SIZE: usize = 2;
pub const LAMP_ATTRIBUTES_RESPONSE_SIZE: usize = 28;
pub const LAMP_MULTI_UPDATE_SIZE: usize = 50;
pub const LAMP_RANGE_UPDATE_SIZE: usize = 9;
pub const LAMP_ARRAY_CONTROL_SIZE: usize = 1;

/// Maximum number of lamps carried by one multi update report
pub const MAX_MULTI_UPDATE_LAMPS: usize = 8;

/// Largest report payload, a full-speed interrupt packet
pub const MAX_REPORT_SIZE: usize = 64;

/// Encoded get-report payload
pub type ReportBuffer = Vec<u8, MAX_REPORT_SIZE>;

/// Known report ids
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ReportId {
    LampArrayAttributes = REPORT_ID_LAMP_ARRAY_ATTRIBUTES,
    LampAttributesRequest = REPORT_ID_LAMP_ATTRIBUTES_REQUEST,
    LampAttributesResponse = REPORT_ID_LAMP_ATTRIBUTES_RESPONSE,
    LampMultiUpdate = REPORT_ID_LAMP_MULTI_UPDATE,
    LampRangeUpdate = REPORT_ID_LAMP_RANGE_UPDATE,
    LampArrayControl = REPORT_ID_LAMP_ARRAY_CONTROL,
}

impl ReportId {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            REPORT_ID_LAMP_ARRAY_ATTRIBUTES => Self::LampArrayAttributes,
            REPORT_ID_LAMP_ATTRIBUTES_REQUEST => Self::LampAttributesRequest,
            REPORT_ID_LAMP_ATTRIBUTES_RESPONSE => Self::LampAttributesResponse,
            REPORT_ID_LAMP_MULTI_UPDATE => Self::LampMultiUpdate,
            REPORT_ID_LAMP_RANGE_UPDATE => Self::LampRangeUpdate,
            REPORT_ID_LAMP_ARRAY_CONTROL => Self::LampArrayControl,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Fixed payload size of the report
    pub const fn payload_size(self) -> usize {
        match self {
            Self::LampArrayAttributes => LAMP_ARRAY_ATTRIBUTES_SIZE,
            Self::LampAttributesRequest => LAMP_ATTRIBUTES_REQUEST_SIZE,
            Self::LampAttributesResponse => LAMP_ATTRIBUTES_RESPONSE_SIZE,
            Self::LampMultiUpdate => LAMP_MULTI_UPDATE_SIZE,
            Self::LampRangeUpdate => LAMP_RANGE_UPDATE_SIZE,
            Self::LampArrayControl => LAMP_ARRAY_CONTROL_SIZE,
        }
    }
}

/// Reasons a report payload is dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportError {
    /// The id is not part of the LampArray report set
    UnknownReport(u8),
    /// The report exists but cannot be written by the host
    NotWritable(ReportId),
    /// Payload is shorter than the report layout
    Truncated { expected: usize, actual: usize },
}

/// Flags attached to multi and range updates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct UpdateFlags(u8);

impl UpdateFlags {
    /// Last report of an update batch
    pub const COMPLETE: Self = Self(0x01);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_complete(self) -> bool {
        self.0 & Self::COMPLETE.0 != 0
    }
}

/// Colors for up to [`MAX_MULTI_UPDATE_LAMPS`] individual lamps
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiUpdate {
    pub flags: UpdateFlags,
    pub lamps: Vec<(LampId, LampColor), MAX_MULTI_UPDATE_LAMPS>,
}

/// One color for an inclusive range of lamps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeUpdate {
    pub flags: UpdateFlags,
    pub start: LampId,
    pub end: LampId,
    pub color: LampColor,
}

/// Decoded set-report
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LampUpdate {
    /// Select the lamp for the next attributes response
    RequestAttributes(LampId),
    /// Set individual lamps
    Multi(MultiUpdate),
    /// Set a range of lamps to the same color
    Range(RangeUpdate),
    /// Hand lamp control to the device (`true`) or to the host (`false`)
    Control { autonomous: bool },
}

impl LampUpdate {
    /// Decode a set-report payload
    ///
    /// Bytes past the report layout are ignored.
    pub fn decode(report_id: u8, payload: &[u8]) -> Result<Self, ReportError> {
        let id = ReportId::from_raw(report_id).ok_or(ReportError::UnknownReport(report_id))?;
        let mut reader = ReportReader::new(payload, id.payload_size())?;

        Ok(match id {
            ReportId::LampAttributesRequest => Self::RequestAttributes(reader.read_u16()),
            ReportId::LampMultiUpdate => Self::Multi(Self::decode_multi(&mut reader)),
            ReportId::LampRangeUpdate => Self::Range(RangeUpdate {
                flags: UpdateFlags::from_bits(reader.read_u8()),
                start: reader.read_u16(),
                end: reader.read_u16(),
                color: reader.read_color(),
            }),
            ReportId::LampArrayControl => Self::Control {
                autonomous: reader.read_u8() != 0,
            },
            ReportId::LampArrayAttributes | ReportId::LampAttributesResponse => {
                return Err(ReportError::NotWritable(id));
            }
        })
    }

    fn decode_multi(reader: &mut ReportReader<'_>) -> MultiUpdate {
        // Counts above the report capacity are capped rather than rejected
        let count = usize::from(reader.read_u8()).min(MAX_MULTI_UPDATE_LAMPS);
        let flags = UpdateFlags::from_bits(reader.read_u8());

        let ids: [LampId; MAX_MULTI_UPDATE_LAMPS] = core::array::from_fn(|_| reader.read_u16());
        let colors: [LampColor; MAX_MULTI_UPDATE_LAMPS] =
            core::array::from_fn(|_| reader.read_color());

        MultiUpdate {
            flags,
            lamps: ids.into_iter().zip(colors).take(count).collect(),
        }
    }
}

/// Encode the lamp array attributes report (id 1)
pub fn encode_array_attributes(descriptor: &ArrayDescriptor) -> [u8; LAMP_ARRAY_ATTRIBUTES_SIZE] {
    let mut buf = [0; LAMP_ARRAY_ATTRIBUTES_SIZE];
    let mut writer = ReportWriter::new(&mut buf);
    writer.write_u16(descriptor.lamp_count);
    writer.write_u32(descriptor.bounding_box.width);
    writer.write_u32(descriptor.bounding_box.height);
    writer.write_u32(descriptor.bounding_box.depth);
    writer.write_u32(descriptor.kind.as_raw());
    writer.write_u32(saturating_micros(descriptor.min_update_interval));
    buf
}

/// Encode the lamp attributes response report (id 3)
pub fn encode_lamp_attributes(
    attributes: &LampAttributes,
) -> [u8; LAMP_ATTRIBUTES_RESPONSE_SIZE] {
    let info = &attributes.info;
    let mut buf = [0; LAMP_ATTRIBUTES_RESPONSE_SIZE];
    let mut writer = ReportWriter::new(&mut buf);
    writer.write_u16(attributes.lamp_id);
    writer.write_u32(info.position.x);
    writer.write_u32(info.position.y);
    writer.write_u32(info.position.z);
    writer.write_u32(saturating_micros(info.update_latency));
    writer.write_u32(info.purposes.bits());
    writer.write(&[
        info.red_levels,
        info.green_levels,
        info.blue_levels,
        info.intensity_levels,
        u8::from(info.programmable),
        info.input_binding,
    ]);
    buf
}

/// Encode a multi update report (id 4), unused slots are zeroed
pub fn encode_multi_update(update: &MultiUpdate) -> [u8; LAMP_MULTI_UPDATE_SIZE] {
    let mut buf = [0; LAMP_MULTI_UPDATE_SIZE];
    let mut ids = [0; MAX_MULTI_UPDATE_LAMPS];
    let mut colors = [LampColor::default(); MAX_MULTI_UPDATE_LAMPS];
    for (slot, (id, color)) in update.lamps.iter().enumerate() {
        ids[slot] = *id;
        colors[slot] = *color;
    }

    let count = u8::try_from(update.lamps.len()).unwrap_or(u8::MAX);
    let mut writer = ReportWriter::new(&mut buf);
    writer.write(&[count, update.flags.bits()]);
    for id in ids {
        writer.write_u16(id);
    }
    for color in colors {
        writer.write(&color.to_bytes());
    }
    buf
}

/// Encode a range update report (id 5)
pub fn encode_range_update(update: &RangeUpdate) -> [u8; LAMP_RANGE_UPDATE_SIZE] {
    let mut buf = [0; LAMP_RANGE_UPDATE_SIZE];
    let mut writer = ReportWriter::new(&mut buf);
    writer.write(&[update.flags.bits()]);
    writer.write_u16(update.start);
    writer.write_u16(update.end);
    writer.write(&update.color.to_bytes());
    buf
}

fn saturating_micros(duration: embassy_time::Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}

/// Sequential reader over a payload whose length was checked up front
struct ReportReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReportReader<'a> {
    fn new(data: &'a [u8], expected: usize) -> Result<Self, ReportError> {
        if data.len() < expected {
            return Err(ReportError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: &data[..expected],
            pos: 0,
        })
    }

    fn take<const SIZE: usize>(&mut self) -> [u8; SIZE] {
        let mut bytes = [0; SIZE];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + SIZE]);
        self.pos += SIZE;
        bytes
    }

    fn read_u8(&mut self) -> u8 {
        let [value] = self.take::<1>();
        value
    }

    fn read_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn read_color(&mut self) -> LampColor {
        LampColor::from_bytes(self.take())
    }
}

/// Sequential writer into a fixed report buffer
struct ReportWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ReportWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn write(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    fn write_u16(&mut self, value: u16) {
        self.write(&value.to_le_bytes());
    }

    fn write_u32(&mut self, value: u32) {
        self.write(&value.to_le_bytes());
    }
}
