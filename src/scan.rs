//! Multi-record stream scanner.
//!
//! Walks a byte buffer in 64-byte steps, accepting a record wherever a
//! fixed header validates (section-end offset 48, known quality code)
//! and its blockette parses. Positions that fail validation are skipped
//! silently, so streams interleaved with padding or foreign blockettes
//! still yield their valid records. Record lengths are inferred from the
//! distance between accepted headers rather than trusted from any single
//! field.

use tracing::{debug, trace};

use crate::data;
use crate::dataset::{Dataset, Payload, Record};
use crate::primitive;
use crate::schema::FIXED_SECTION_LEN;
use crate::section::{Blockette, FixedHeader};
use crate::types::{ByteOrder, Encoding};
use crate::{MseedError, Result};

/// Records are aligned to Steim frame boundaries.
const SCAN_STEP: usize = 64;

/// Detect the stream byte order from the fixed header's trailing
/// section-end offset field at bytes [46..48]: whichever order reads it
/// as 48 wins.
pub fn detect_byte_order(bytes: &[u8]) -> Result<ByteOrder> {
    if bytes.len() < FIXED_SECTION_LEN {
        return Err(MseedError::RecordTooShort {
            expected: FIXED_SECTION_LEN,
            actual: bytes.len(),
        });
    }
    let field = &bytes[46..48];
    for order in [ByteOrder::Big, ByteOrder::Little] {
        if primitive::read_uint(field, 2, order)? as usize == FIXED_SECTION_LEN {
            return Ok(order);
        }
    }
    Err(MseedError::UndetectableByteOrder)
}

struct Candidate {
    start: usize,
    header: FixedHeader,
    blockette: Blockette,
    encoding_code: u8,
}

/// Try to accept a record start at `pos`. Any validation failure means
/// "not a record here", never an error.
fn candidate_at(bytes: &[u8], pos: usize, order: ByteOrder) -> Option<Candidate> {
    let header = FixedHeader::parse(&bytes[pos..pos + FIXED_SECTION_LEN], order).ok()?;
    if header.section_end as usize != FIXED_SECTION_LEN {
        return None;
    }
    if !matches!(header.quality, 'D' | 'R' | 'Q' | 'M') {
        return None;
    }

    let data_offset = header.data_offset as usize;
    if data_offset <= FIXED_SECTION_LEN || pos + data_offset > bytes.len() {
        return None;
    }

    let span = &bytes[pos + FIXED_SECTION_LEN..pos + data_offset];
    let blockette = Blockette::parse(span, order).ok()?;

    // A leading 1001 blockette carries no encoding; it sits in front of
    // the 1000 blockette, whose encoding byte lands at span offset 12
    let encoding_code = match blockette {
        Blockette::B1000 { encoding, .. } => encoding,
        Blockette::B1001 { .. } => *span.get(12)?,
    };

    Some(Candidate {
        start: pos,
        header,
        blockette,
        encoding_code,
    })
}

/// Find the first 64-byte-aligned offset past the stream start whose
/// fixed header carries a valid section-end offset. Used to bound a
/// stream's only accepted record.
fn next_header_boundary(bytes: &[u8], order: ByteOrder) -> Option<usize> {
    let mut pos = SCAN_STEP;
    while pos + FIXED_SECTION_LEN <= bytes.len() {
        if let Ok(header) = FixedHeader::parse(&bytes[pos..pos + FIXED_SECTION_LEN], order) {
            if header.section_end as usize == FIXED_SECTION_LEN {
                return Some(pos);
            }
        }
        pos += SCAN_STEP;
    }
    None
}

/// Scan a full byte stream into a [`Dataset`].
pub fn scan_stream(bytes: &[u8]) -> Result<Dataset> {
    let order = detect_byte_order(bytes)?;
    debug!(%order, len = bytes.len(), "scanning stream");

    let mut candidates = Vec::new();
    let mut pos = 0;
    while pos + FIXED_SECTION_LEN <= bytes.len() {
        match candidate_at(bytes, pos, order) {
            Some(candidate) => candidates.push(candidate),
            None => trace!(pos, "skipping non-record block"),
        }
        pos += SCAN_STEP;
    }

    if candidates.is_empty() {
        return Err(MseedError::NoValidRecords);
    }
    debug!(records = candidates.len(), "scan located record headers");

    // Record extents: each record runs to the next accepted header. The
    // stream's only record runs to the next valid header boundary if one
    // exists, else to the end of the buffer (single-record stream).
    let mut ends = Vec::with_capacity(candidates.len());
    for (i, _) in candidates.iter().enumerate() {
        let end = if i + 1 < candidates.len() {
            candidates[i + 1].start
        } else if i == 0 {
            next_header_boundary(bytes, order).unwrap_or(bytes.len())
        } else {
            bytes.len()
        };
        ends.push(end);
    }

    let mut records = Vec::with_capacity(candidates.len());
    let mut total_samples = 0usize;
    for (candidate, end) in candidates.into_iter().zip(ends) {
        let encoding = Encoding::from_code(candidate.encoding_code)?;
        let payload_start = candidate.start + candidate.header.data_offset as usize;
        if payload_start > end {
            return Err(MseedError::RecordTooShort {
                expected: payload_start - candidate.start,
                actual: end - candidate.start,
            });
        }

        let raw = bytes[payload_start..end].to_vec();
        let count = candidate.header.sample_count as usize;
        let decoded = data::decode_payload(&raw, encoding, count, order)?;

        total_samples += count;
        records.push(Record {
            header: candidate.header,
            blockette: candidate.blockette,
            encoding,
            payload: Payload { raw, decoded },
        });
    }

    // records is non-empty: candidates was checked above
    let encoding = records[0].encoding;
    let start_time = records[0].header.start_time;
    let end_time = records[records.len() - 1].header.start_time;
    Ok(Dataset {
        encoding,
        byte_order: order,
        start_time,
        end_time,
        total_samples,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::AppendOptions;
    use crate::time::BTime;
    use crate::types::WriteMode;

    fn options(seq: &str, day: u16) -> AppendOptions {
        AppendOptions::new()
            .with_nslc("IU", "ANMO", "00", "BHZ")
            .with_sequence_number(seq)
            .with_sample_rate(100.0)
            .with_start_time(BTime {
                year: 2025,
                day,
                ..BTime::epoch()
            })
    }

    fn smooth_samples(n: usize) -> Vec<i32> {
        (0..n as i32).map(|i| 1000 + (i % 7) - 3).collect()
    }

    fn three_record_stream() -> Vec<u8> {
        let mut ds = Dataset::new(Encoding::Steim2, ByteOrder::Big);
        ds.append(&smooth_samples(400), &options("000001", 1)).unwrap();
        ds.append(&smooth_samples(400), &options("000002", 2)).unwrap();
        ds.append(&smooth_samples(400), &options("000003", 3)).unwrap();
        ds.encode(WriteMode::Overwrite, ByteOrder::Big).unwrap()
    }

    #[test]
    fn test_three_records_scanned() {
        let stream = three_record_stream();
        assert_eq!(stream.len(), 3 * 512);

        let ds = Dataset::parse(&stream).unwrap();
        assert_eq!(ds.record_count(), 3);
        assert_eq!(ds.total_samples, 1200);
        assert_eq!(ds.byte_order, ByteOrder::Big);
        assert_eq!(ds.encoding, Encoding::Steim2);
        assert_eq!(ds.start_time.day, 1);
        assert_eq!(ds.end_time.day, 3);
        for record in &ds.records {
            assert_eq!(
                record.payload.decoded,
                crate::data::Samples::Int(smooth_samples(400))
            );
        }
    }

    #[test]
    fn test_too_short_buffer() {
        assert!(matches!(
            Dataset::parse(&[0u8; 40]),
            Err(MseedError::RecordTooShort { .. })
        ));
    }

    #[test]
    fn test_undetectable_byte_order() {
        let mut bytes = vec![0u8; 128];
        bytes[46] = 0xAB;
        bytes[47] = 0xCD;
        assert!(matches!(
            Dataset::parse(&bytes),
            Err(MseedError::UndetectableByteOrder)
        ));
    }

    #[test]
    fn test_byte_order_detection_both_ways() {
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let mut ds = Dataset::new(Encoding::Int32, order);
            ds.append(&smooth_samples(200), &options("000001", 1)).unwrap();
            let stream = ds.encode(WriteMode::Overwrite, order).unwrap();
            assert_eq!(detect_byte_order(&stream).unwrap(), order);

            let parsed = Dataset::parse(&stream).unwrap();
            assert_eq!(parsed.byte_order, order);
            assert_eq!(
                parsed.records[0].payload.decoded,
                crate::data::Samples::Int(smooth_samples(200))
            );
        }
    }

    #[test]
    fn test_single_record_spans_remainder() {
        let mut ds = Dataset::new(Encoding::Steim2, ByteOrder::Big);
        ds.append(&smooth_samples(400), &options("000001", 1)).unwrap();
        let mut stream = ds.encode(WriteMode::Overwrite, ByteOrder::Big).unwrap();
        // Trailing zero frames past the record end must not break the scan
        stream.extend_from_slice(&[0u8; 64]);

        let parsed = Dataset::parse(&stream).unwrap();
        assert_eq!(parsed.record_count(), 1);
        assert_eq!(parsed.records[0].payload.raw.len(), stream.len() - 64);
        assert_eq!(
            parsed.records[0].payload.decoded,
            crate::data::Samples::Int(smooth_samples(400))
        );
    }

    #[test]
    fn test_garbage_between_records_is_skipped() {
        let mut ds = Dataset::new(Encoding::Steim2, ByteOrder::Big);
        ds.append(&smooth_samples(400), &options("000001", 1)).unwrap();
        ds.append(&smooth_samples(400), &options("000002", 2)).unwrap();
        let r1 = ds.records[0].compose(ByteOrder::Big).unwrap();
        let r2 = ds.records[1].compose(ByteOrder::Big).unwrap();

        let mut stream = Vec::new();
        stream.extend_from_slice(&r1);
        stream.extend_from_slice(&[0xAAu8; 128]); // foreign bytes, 64-aligned
        stream.extend_from_slice(&r2);

        let parsed = Dataset::parse(&stream).unwrap();
        assert_eq!(parsed.record_count(), 2);
        assert_eq!(parsed.records[0].header.sequence_number, "000001");
        assert_eq!(parsed.records[1].header.sequence_number, "000002");
        assert_eq!(parsed.total_samples, 800);
    }

    #[test]
    fn test_no_valid_records() {
        // Byte order is detectable but the quality code is invalid
        let mut bytes = vec![0u8; 64];
        bytes[46] = 0;
        bytes[47] = 48;
        assert!(matches!(
            Dataset::parse(&bytes),
            Err(MseedError::NoValidRecords)
        ));
    }

    #[test]
    fn test_unsupported_encoding_is_fatal() {
        let mut ds = Dataset::new(Encoding::Int32, ByteOrder::Big);
        ds.append(&smooth_samples(200), &options("000001", 1)).unwrap();
        let mut stream = ds.encode(WriteMode::Overwrite, ByteOrder::Big).unwrap();
        // Overwrite the Blockette 1000 encoding byte with an unknown code
        stream[52] = 7;

        assert!(matches!(
            Dataset::parse(&stream),
            Err(MseedError::UnsupportedEncoding(7))
        ));
    }

    #[test]
    fn test_leading_1001_blockette_resolves_encoding() {
        // Hand-assemble a record whose blockette chain is 1001 then 1000
        let samples = [10i32, 20, 30, 40];
        let header = FixedHeader {
            sample_count: samples.len() as u16,
            blockette_count: 2,
            ..FixedHeader::default()
        };
        let b1001 = Blockette::B1001 {
            next_blockette: 56,
            timing_quality: 100,
            microseconds: -5,
            frame_count: 0,
        };
        let b1000 = Blockette::B1000 {
            next_blockette: 0,
            encoding: 3,
            byte_order: 1,
            record_length_exp: 8,
        };

        let mut buf = vec![0u8; 256];
        buf[..48].copy_from_slice(&header.compose(ByteOrder::Big).unwrap());
        buf[48..56].copy_from_slice(&b1001.compose(ByteOrder::Big).unwrap()[..8]);
        buf[56..64].copy_from_slice(&b1000.compose(ByteOrder::Big).unwrap()[..8]);
        let payload = crate::data::encode_payload(&samples, Encoding::Int32, ByteOrder::Big).unwrap();
        buf[64..64 + payload.len()].copy_from_slice(&payload);

        let parsed = Dataset::parse(&buf).unwrap();
        assert_eq!(parsed.record_count(), 1);
        assert_eq!(parsed.records[0].blockette, b1001);
        assert_eq!(parsed.records[0].encoding, Encoding::Int32);
        assert_eq!(
            parsed.records[0].payload.decoded,
            crate::data::Samples::Int(samples.to_vec())
        );
    }
}
