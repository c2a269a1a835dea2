//! Payload encoding and decoding, dispatched on [`Encoding`].
//!
//! Plain encodings (ASCII text, fixed-width integers, IEEE floats) are
//! simple strides over the primitive codec; Steim1/2 delegate to
//! [`crate::steim`].

use crate::primitive;
use crate::steim;
use crate::types::{ByteOrder, Encoding};
use crate::{MseedError, Result};

/// Decoded sample data. The variant is selected once by the record's
/// encoding code and never mixed within one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// INT16/24/32 and Steim1/2 payloads.
    Int(Vec<i32>),
    /// FLOAT32/64 payloads, widened to f64.
    Float(Vec<f64>),
    /// ASCII payloads. Text carries no sample count.
    Text(String),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Int(v) => v.len(),
            Samples::Float(v) => v.len(),
            Samples::Text(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a payload span into samples.
///
/// `count` is the fixed header's declared sample count; numeric payloads
/// shorter than `count` samples fail, and ASCII payloads ignore it.
pub fn decode_payload(
    buffer: &[u8],
    encoding: Encoding,
    count: usize,
    order: ByteOrder,
) -> Result<Samples> {
    match encoding {
        Encoding::Ascii => {
            let text = primitive::read_str(buffer);
            Ok(Samples::Text(text.trim_end_matches('\0').to_string()))
        }
        Encoding::Int16 => decode_ints(buffer, 2, count, order),
        Encoding::Int24 => decode_ints(buffer, 3, count, order),
        Encoding::Int32 => decode_ints(buffer, 4, count, order),
        Encoding::Float32 => {
            check_len(buffer, count * 4)?;
            let mut samples = Vec::with_capacity(count);
            for i in 0..count {
                samples.push(primitive::read_f32(&buffer[i * 4..i * 4 + 4], order)? as f64);
            }
            Ok(Samples::Float(samples))
        }
        Encoding::Float64 => {
            check_len(buffer, count * 8)?;
            let mut samples = Vec::with_capacity(count);
            for i in 0..count {
                samples.push(primitive::read_f64(&buffer[i * 8..i * 8 + 8], order)?);
            }
            Ok(Samples::Float(samples))
        }
        Encoding::Steim1 => Ok(Samples::Int(steim::decode_steim1(buffer, count, order)?)),
        Encoding::Steim2 => Ok(Samples::Int(steim::decode_steim2(buffer, count, order)?)),
    }
}

fn check_len(buffer: &[u8], needed: usize) -> Result<()> {
    if buffer.len() < needed {
        return Err(MseedError::RecordTooShort {
            expected: needed,
            actual: buffer.len(),
        });
    }
    Ok(())
}

fn decode_ints(buffer: &[u8], width: usize, count: usize, order: ByteOrder) -> Result<Samples> {
    check_len(buffer, count * width)?;
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        samples.push(primitive::read_int(
            &buffer[i * width..(i + 1) * width],
            width,
            order,
        )?);
    }
    Ok(Samples::Int(samples))
}

/// Encode a batch of samples into payload bytes.
///
/// Float encodings widen the integer batch; ASCII joins the values as
/// space-separated decimal text.
pub fn encode_payload(samples: &[i32], encoding: Encoding, order: ByteOrder) -> Result<Vec<u8>> {
    match encoding {
        Encoding::Ascii => {
            let text = samples
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            Ok(text.into_bytes())
        }
        Encoding::Int16 => encode_ints(samples, 2, order),
        Encoding::Int24 => encode_ints(samples, 3, order),
        Encoding::Int32 => encode_ints(samples, 4, order),
        Encoding::Float32 => {
            let mut bytes = Vec::with_capacity(samples.len() * 4);
            for &v in samples {
                bytes.extend(primitive::write_f32(v as f32, order));
            }
            Ok(bytes)
        }
        Encoding::Float64 => {
            let mut bytes = Vec::with_capacity(samples.len() * 8);
            for &v in samples {
                bytes.extend(primitive::write_f64(v as f64, order));
            }
            Ok(bytes)
        }
        Encoding::Steim1 => steim::encode_steim1(samples, order),
        Encoding::Steim2 => steim::encode_steim2(samples, order),
    }
}

fn encode_ints(samples: &[i32], width: usize, order: ByteOrder) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(samples.len() * width);
    for &v in samples {
        bytes.extend(primitive::write_int(v, width, order)?);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_payload_roundtrip_all_widths() {
        let samples = vec![1i32, -2, 300, -40_000, 70_000];
        for (encoding, max) in [
            (Encoding::Int16, 32_767i64),
            (Encoding::Int24, 8_388_607),
            (Encoding::Int32, i32::MAX as i64),
        ] {
            let fitting: Vec<i32> = samples
                .iter()
                .copied()
                .filter(|&v| (v as i64).abs() <= max)
                .collect();
            for order in [ByteOrder::Big, ByteOrder::Little] {
                let bytes = encode_payload(&fitting, encoding, order).unwrap();
                let decoded = decode_payload(&bytes, encoding, fitting.len(), order).unwrap();
                assert_eq!(decoded, Samples::Int(fitting.clone()), "{encoding} {order}");
            }
        }
    }

    #[test]
    fn test_float_payload_roundtrip() {
        let samples = vec![1i32, -2, 3000];
        for encoding in [Encoding::Float32, Encoding::Float64] {
            for order in [ByteOrder::Big, ByteOrder::Little] {
                let bytes = encode_payload(&samples, encoding, order).unwrap();
                let decoded = decode_payload(&bytes, encoding, samples.len(), order).unwrap();
                assert_eq!(
                    decoded,
                    Samples::Float(vec![1.0, -2.0, 3000.0]),
                    "{encoding} {order}"
                );
            }
        }
    }

    #[test]
    fn test_ascii_payload() {
        let bytes = encode_payload(&[1, -2, 3], Encoding::Ascii, ByteOrder::Big).unwrap();
        assert_eq!(bytes, b"1 -2 3");

        // decode ignores the declared count and strips zero padding
        let mut padded = bytes.clone();
        padded.extend_from_slice(&[0u8; 5]);
        let decoded = decode_payload(&padded, Encoding::Ascii, 0, ByteOrder::Big).unwrap();
        assert_eq!(decoded, Samples::Text("1 -2 3".into()));
    }

    #[test]
    fn test_steim_payload_dispatch() {
        let samples: Vec<i32> = (0..40).collect();
        for encoding in [Encoding::Steim1, Encoding::Steim2] {
            let bytes = encode_payload(&samples, encoding, ByteOrder::Big).unwrap();
            assert_eq!(bytes.len() % 64, 0);
            let decoded = decode_payload(&bytes, encoding, samples.len(), ByteOrder::Big).unwrap();
            assert_eq!(decoded, Samples::Int(samples.clone()));
        }
    }

    #[test]
    fn test_short_numeric_payload() {
        let bytes = encode_payload(&[1, 2], Encoding::Int32, ByteOrder::Big).unwrap();
        assert!(matches!(
            decode_payload(&bytes, Encoding::Int32, 3, ByteOrder::Big),
            Err(MseedError::RecordTooShort { .. })
        ));
    }

    #[test]
    fn test_samples_len() {
        assert_eq!(Samples::Int(vec![1, 2, 3]).len(), 3);
        assert_eq!(Samples::Float(vec![1.0]).len(), 1);
        assert_eq!(Samples::Text("1 2 3".into()).len(), 0);
        assert!(Samples::Int(vec![]).is_empty());
    }
}
