//! Fixed header and blockette sections, marshaled through the schema
//! tables in [`crate::schema`].
//!
//! Parse and compose are mirrors: both walk the section's field table in
//! order, so the byte layout lives in exactly one place. Field values are
//! routed to struct fields by a closed match on the schema name; an
//! unmatched name is a defensive [`MseedError::UnknownField`] and means
//! the table and the match fell out of sync.

use crate::primitive;
use crate::schema::{
    self, Field, FieldKind, BLOCKETTE_1000, BLOCKETTE_1001, BLOCKETTE_SECTION_LEN,
    FIXED_HEADER, FIXED_SECTION_LEN,
};
use crate::time::BTime;
use crate::types::ByteOrder;
use crate::{MseedError, Result};

/// The 48-byte fixed data header of a miniSEED v2 record.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedHeader {
    pub sequence_number: String,
    pub quality: char,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub network: String,
    pub start_time: BTime,
    pub sample_count: u16,
    pub sample_rate_factor: i16,
    pub sample_rate_multiplier: i16,
    pub activity_flags: u8,
    pub io_clock_flags: u8,
    pub quality_flags: u8,
    pub blockette_count: u8,
    pub time_correction: i32,
    /// Offset of the data section from the record start.
    pub data_offset: u16,
    /// Offset of the first blockette; always 48 in a valid record.
    pub section_end: u16,
}

impl Default for FixedHeader {
    fn default() -> Self {
        Self {
            sequence_number: "000001".into(),
            quality: 'D',
            station: String::new(),
            location: String::new(),
            channel: String::new(),
            network: String::new(),
            start_time: BTime::epoch(),
            sample_count: 0,
            sample_rate_factor: 0,
            sample_rate_multiplier: 0,
            activity_flags: 0,
            io_clock_flags: 0,
            quality_flags: 0,
            blockette_count: 0,
            time_correction: 0,
            data_offset: 64,
            section_end: FIXED_SECTION_LEN as u16,
        }
    }
}

impl FixedHeader {
    /// Parse a fixed header from a 48-byte span.
    pub fn parse(buffer: &[u8], order: ByteOrder) -> Result<Self> {
        if buffer.len() < FIXED_SECTION_LEN {
            return Err(MseedError::RecordTooShort {
                expected: FIXED_SECTION_LEN,
                actual: buffer.len(),
            });
        }

        let mut header = Self::default();
        let mut offset = 0;
        for field in FIXED_HEADER {
            let span = &buffer[offset..offset + field.width];
            offset += field.width;

            match field.kind {
                FieldKind::Reserved => {}
                FieldKind::Int => {
                    let value = primitive::read_int(span, field.width, order)?;
                    header.set_int(field.name, value)?;
                }
                FieldKind::Str => {
                    let value = primitive::read_str(span);
                    header.set_str(field.name, &value)?;
                }
                FieldKind::Time => {
                    header.start_time = primitive::read_btime(span, order)?;
                }
            }
        }
        Ok(header)
    }

    /// Compose this header into its 48-byte wire form.
    pub fn compose(&self, order: ByteOrder) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(FIXED_SECTION_LEN);
        for field in FIXED_HEADER {
            match field.kind {
                FieldKind::Reserved => bytes.push(b' '),
                FieldKind::Int => {
                    let value = self.get_int(field.name)?;
                    bytes.extend(primitive::write_int(value, field.width, order)?);
                }
                FieldKind::Str => {
                    let value = self.get_str(field.name)?;
                    bytes.extend(primitive::write_str(&value, field.width, b' '));
                }
                FieldKind::Time => {
                    bytes.extend(primitive::write_btime(&self.start_time, order));
                }
            }
        }
        Ok(bytes)
    }

    fn set_int(&mut self, name: &'static str, value: i32) -> Result<()> {
        match name {
            "sample_count" => self.sample_count = value as u16,
            "sample_rate_factor" => self.sample_rate_factor = value as i16,
            "sample_rate_multiplier" => self.sample_rate_multiplier = value as i16,
            "activity_flags" => self.activity_flags = value as u8,
            "io_clock_flags" => self.io_clock_flags = value as u8,
            "data_quality_flags" => self.quality_flags = value as u8,
            "blockette_count" => self.blockette_count = value as u8,
            "time_correction" => self.time_correction = value,
            "data_offset" => self.data_offset = value as u16,
            "section_end" => self.section_end = value as u16,
            other => return Err(MseedError::UnknownField(other)),
        }
        Ok(())
    }

    fn set_str(&mut self, name: &'static str, value: &str) -> Result<()> {
        match name {
            "sequence_number" => self.sequence_number = value.to_string(),
            "data_quality" => self.quality = value.chars().next().unwrap_or(' '),
            "station" => self.station = value.trim().to_string(),
            "location" => self.location = value.trim().to_string(),
            "channel" => self.channel = value.trim().to_string(),
            "network" => self.network = value.trim().to_string(),
            other => return Err(MseedError::UnknownField(other)),
        }
        Ok(())
    }

    fn get_int(&self, name: &'static str) -> Result<i32> {
        Ok(match name {
            "sample_count" => self.sample_count as i32,
            "sample_rate_factor" => self.sample_rate_factor as i32,
            "sample_rate_multiplier" => self.sample_rate_multiplier as i32,
            "activity_flags" => self.activity_flags as i32,
            "io_clock_flags" => self.io_clock_flags as i32,
            "data_quality_flags" => self.quality_flags as i32,
            "blockette_count" => self.blockette_count as i32,
            "time_correction" => self.time_correction,
            "data_offset" => self.data_offset as i32,
            "section_end" => self.section_end as i32,
            other => return Err(MseedError::UnknownField(other)),
        })
    }

    fn get_str(&self, name: &'static str) -> Result<String> {
        Ok(match name {
            "sequence_number" => self.sequence_number.clone(),
            "data_quality" => self.quality.to_string(),
            "station" => self.station.clone(),
            "location" => self.location.clone(),
            "channel" => self.channel.clone(),
            "network" => self.network.clone(),
            other => return Err(MseedError::UnknownField(other)),
        })
    }

    /// Decode the sample rate in Hz from the factor/multiplier pair.
    pub fn sample_rate(&self) -> f64 {
        let f = self.sample_rate_factor as f64;
        let m = self.sample_rate_multiplier as f64;
        if self.sample_rate_factor == 0 || self.sample_rate_multiplier == 0 {
            return 0.0;
        }
        match (self.sample_rate_factor > 0, self.sample_rate_multiplier > 0) {
            (true, true) => f * m,
            (true, false) => -f / m,
            (false, true) => -m / f,
            (false, false) => 1.0 / (f * m),
        }
    }
}

/// A parsed blockette section. Only the data-record blockettes 1000 and
/// 1001 are modeled; any other type code fails as
/// [`MseedError::UnsupportedBlockette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blockette {
    B1000 {
        next_blockette: u16,
        encoding: u8,
        byte_order: u8,
        record_length_exp: u8,
    },
    B1001 {
        next_blockette: u16,
        timing_quality: u8,
        microseconds: i8,
        frame_count: u8,
    },
}

impl Blockette {
    /// The blockette's wire type code.
    pub fn type_code(&self) -> u16 {
        match self {
            Self::B1000 { .. } => 1000,
            Self::B1001 { .. } => 1001,
        }
    }

    /// The encoding code, present only on Blockette 1000.
    pub fn encoding_code(&self) -> Option<u8> {
        match self {
            Self::B1000 { encoding, .. } => Some(*encoding),
            Self::B1001 { .. } => None,
        }
    }

    /// The record-length exponent, present only on Blockette 1000.
    pub fn record_length_exp(&self) -> Option<u8> {
        match self {
            Self::B1000 {
                record_length_exp, ..
            } => Some(*record_length_exp),
            Self::B1001 { .. } => None,
        }
    }

    /// Parse a blockette from the span between the fixed header and the
    /// data section. The 2-byte type code at offset 0 selects the schema.
    pub fn parse(buffer: &[u8], order: ByteOrder) -> Result<Self> {
        let code = primitive::read_uint(buffer, 2, order)? as u16;
        let schema = match code {
            1000 => BLOCKETTE_1000,
            1001 => BLOCKETTE_1001,
            other => return Err(MseedError::UnsupportedBlockette(other)),
        };

        let total = schema::section_len(schema);
        if buffer.len() < total {
            return Err(MseedError::RecordTooShort {
                expected: total,
                actual: buffer.len(),
            });
        }

        let mut next_blockette = 0u16;
        let mut encoding = 0u8;
        let mut byte_order = 0u8;
        let mut record_length_exp = 0u8;
        let mut timing_quality = 0u8;
        let mut microseconds = 0i8;
        let mut frame_count = 0u8;

        let mut offset = 2;
        for field in &schema[1..] {
            let span = &buffer[offset..offset + field.width];
            offset += field.width;

            if field.kind == FieldKind::Reserved {
                continue;
            }
            let value = primitive::read_int(span, field.width, order)?;
            match field.name {
                "next_blockette" => next_blockette = value as u16,
                "encoding" => encoding = value as u8,
                "byte_order" => byte_order = value as u8,
                "record_length_exp" => record_length_exp = value as u8,
                "timing_quality" => timing_quality = value as u8,
                "microseconds" => microseconds = value as i8,
                "frame_count" => frame_count = value as u8,
                other => return Err(MseedError::UnknownField(other)),
            }
        }

        Ok(match code {
            1000 => Self::B1000 {
                next_blockette,
                encoding,
                byte_order,
                record_length_exp,
            },
            _ => Self::B1001 {
                next_blockette,
                timing_quality,
                microseconds,
                frame_count,
            },
        })
    }

    /// Compose this blockette into its 16-byte record section,
    /// zero-padding past the schema bytes.
    pub fn compose(&self, order: ByteOrder) -> Result<Vec<u8>> {
        let schema = match self {
            Self::B1000 { .. } => BLOCKETTE_1000,
            Self::B1001 { .. } => BLOCKETTE_1001,
        };

        let mut bytes = Vec::with_capacity(BLOCKETTE_SECTION_LEN);
        for field in schema {
            if field.kind == FieldKind::Reserved {
                bytes.push(0);
                continue;
            }
            let value = self.get_int(field)?;
            bytes.extend(primitive::write_int(value, field.width, order)?);
        }
        bytes.resize(BLOCKETTE_SECTION_LEN, 0);
        Ok(bytes)
    }

    fn get_int(&self, field: &Field) -> Result<i32> {
        let value = match (self, field.name) {
            (_, "blockette_type") => self.type_code() as i32,
            (Self::B1000 { next_blockette, .. }, "next_blockette")
            | (Self::B1001 { next_blockette, .. }, "next_blockette") => *next_blockette as i32,
            (Self::B1000 { encoding, .. }, "encoding") => *encoding as i32,
            (Self::B1000 { byte_order, .. }, "byte_order") => *byte_order as i32,
            (
                Self::B1000 {
                    record_length_exp, ..
                },
                "record_length_exp",
            ) => *record_length_exp as i32,
            (Self::B1001 { timing_quality, .. }, "timing_quality") => *timing_quality as i32,
            (Self::B1001 { microseconds, .. }, "microseconds") => *microseconds as i32,
            (Self::B1001 { frame_count, .. }, "frame_count") => *frame_count as i32,
            (_, other) => return Err(MseedError::UnknownField(other)),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> FixedHeader {
        FixedHeader {
            sequence_number: "000001".into(),
            quality: 'D',
            station: "ANMO".into(),
            location: "00".into(),
            channel: "BHZ".into(),
            network: "IU".into(),
            start_time: BTime {
                year: 2025,
                day: 100,
                hour: 12,
                minute: 30,
                second: 45,
                ticks: 1234,
            },
            sample_count: 400,
            sample_rate_factor: 100,
            sample_rate_multiplier: 1,
            activity_flags: 0,
            io_clock_flags: 0,
            quality_flags: 0,
            blockette_count: 1,
            time_correction: 0,
            data_offset: 64,
            section_end: 48,
        }
    }

    #[test]
    fn test_header_roundtrip_both_orders() {
        let header = sample_header();
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = header.compose(order).unwrap();
            assert_eq!(bytes.len(), FIXED_SECTION_LEN);
            let parsed = FixedHeader::parse(&bytes, order).unwrap();
            assert_eq!(parsed, header, "order {order}");
        }
    }

    #[test]
    fn test_header_known_offsets_big_endian() {
        let header = sample_header();
        let bytes = header.compose(ByteOrder::Big).unwrap();
        assert_eq!(&bytes[0..6], b"000001");
        assert_eq!(bytes[6], b'D');
        assert_eq!(bytes[7], b' '); // reserved pad
        assert_eq!(&bytes[8..13], b"ANMO ");
        assert_eq!(&bytes[30..32], &400u16.to_be_bytes());
        assert_eq!(&bytes[46..48], &48u16.to_be_bytes());
    }

    #[test]
    fn test_header_negative_factor_roundtrip() {
        let mut header = sample_header();
        header.sample_rate_factor = 505;
        header.sample_rate_multiplier = -10;
        let bytes = header.compose(ByteOrder::Big).unwrap();
        let parsed = FixedHeader::parse(&bytes, ByteOrder::Big).unwrap();
        assert_eq!(parsed.sample_rate_multiplier, -10);
        assert!((parsed.sample_rate() - 50.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sample_rate_quadrants() {
        let mut h = sample_header();
        h.sample_rate_factor = 100;
        h.sample_rate_multiplier = 1;
        assert_eq!(h.sample_rate(), 100.0);

        // period encoding: 0.1 Hz as factor -10, multiplier 1
        h.sample_rate_factor = -10;
        h.sample_rate_multiplier = 1;
        assert!((h.sample_rate() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_header_too_short() {
        assert!(matches!(
            FixedHeader::parse(&[0u8; 40], ByteOrder::Big),
            Err(MseedError::RecordTooShort { .. })
        ));
    }

    #[test]
    fn test_blockette_1000_roundtrip() {
        let blockette = Blockette::B1000 {
            next_blockette: 0,
            encoding: 11,
            byte_order: 1,
            record_length_exp: 9,
        };
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = blockette.compose(order).unwrap();
            assert_eq!(bytes.len(), BLOCKETTE_SECTION_LEN);
            // schema bytes then zero padding
            assert!(bytes[8..].iter().all(|&b| b == 0));
            let parsed = Blockette::parse(&bytes, order).unwrap();
            assert_eq!(parsed, blockette);
        }
    }

    #[test]
    fn test_blockette_1001_roundtrip() {
        let blockette = Blockette::B1001 {
            next_blockette: 0,
            timing_quality: 100,
            microseconds: -42,
            frame_count: 7,
        };
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = blockette.compose(order).unwrap();
            let parsed = Blockette::parse(&bytes, order).unwrap();
            assert_eq!(parsed, blockette);
        }
    }

    #[test]
    fn test_unsupported_blockette_type() {
        let bytes = 2000u16.to_be_bytes();
        let mut span = bytes.to_vec();
        span.extend_from_slice(&[0u8; 14]);
        assert!(matches!(
            Blockette::parse(&span, ByteOrder::Big),
            Err(MseedError::UnsupportedBlockette(2000))
        ));
    }

    #[test]
    fn test_blockette_span_too_short() {
        let bytes = 1000u16.to_be_bytes().to_vec();
        assert!(matches!(
            Blockette::parse(&bytes, ByteOrder::Big),
            Err(MseedError::RecordTooShort { .. })
        ));
    }
}
