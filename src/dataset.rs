//! The [`Dataset`]: an ordered collection of records, plus the record
//! builder ([`Dataset::append`]) and the byte-layout composer
//! ([`Record::compose`], [`Dataset::encode`]).

use std::fmt;

use tracing::debug;

use crate::data::{self, Samples};
use crate::scan;
use crate::schema::{BLOCKETTE_SECTION_LEN, FIXED_SECTION_LEN};
use crate::section::{Blockette, FixedHeader};
use crate::time::BTime;
use crate::types::{ByteOrder, Encoding, WriteMode};
use crate::{MseedError, Result};

/// A record's data section: the raw payload bytes and their decoded form.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub raw: Vec<u8>,
    pub decoded: Samples,
}

/// One miniSEED record: fixed header, blockette, payload.
///
/// Immutable once constructed, whether by [`Dataset::parse`] or
/// [`Dataset::append`]. The `encoding` field is the resolved sample
/// encoding; for records whose leading blockette is a 1001 it comes from
/// the 1000 blockette that follows it in the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub header: FixedHeader,
    pub blockette: Blockette,
    pub encoding: Encoding,
    pub payload: Payload,
}

impl Record {
    /// Serialize this record into its fixed-length frame
    /// (2^record_length_exp bytes): header at offset 0, blockette at 48,
    /// payload at 64.
    ///
    /// Only Blockette-1000 records carry a record length and can be
    /// composed.
    pub fn compose(&self, order: ByteOrder) -> Result<Vec<u8>> {
        let exp = self.blockette.record_length_exp().ok_or_else(|| {
            MseedError::EncodeError("only blockette 1000 records can be composed".into())
        })?;
        if !(8..=30).contains(&exp) {
            return Err(MseedError::EncodeError(format!(
                "record length exponent {exp} out of range (8-30)"
            )));
        }
        let record_len = 1usize << exp;

        let data_start = FIXED_SECTION_LEN + BLOCKETTE_SECTION_LEN;
        if data_start + self.payload.raw.len() > record_len {
            return Err(MseedError::EncodeError(format!(
                "encoded data ({} bytes) exceeds record capacity ({} bytes from offset {})",
                self.payload.raw.len(),
                record_len - data_start,
                data_start,
            )));
        }

        let mut buf = vec![0u8; record_len];
        buf[..FIXED_SECTION_LEN].copy_from_slice(&self.header.compose(order)?);
        buf[FIXED_SECTION_LEN..data_start].copy_from_slice(&self.blockette.compose(order)?);
        buf[data_start..data_start + self.payload.raw.len()].copy_from_slice(&self.payload.raw);
        Ok(buf)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{} | {} | {} samples ({})",
            self.header.network,
            self.header.station,
            self.header.location,
            self.header.channel,
            self.header.start_time,
            self.header.sample_count,
            self.encoding,
        )
    }
}

/// Options for [`Dataset::append`].
#[derive(Debug, Clone)]
pub struct AppendOptions {
    pub sample_rate: f64,
    pub sequence_number: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub network: String,
    pub start_time: BTime,
}

impl AppendOptions {
    pub fn new() -> Self {
        Self {
            sample_rate: 1.0,
            sequence_number: "000001".into(),
            station: String::new(),
            location: String::new(),
            channel: String::new(),
            network: String::new(),
            start_time: BTime::epoch(),
        }
    }

    /// Set network, station, location, and channel codes.
    pub fn with_nslc(mut self, network: &str, station: &str, location: &str, channel: &str) -> Self {
        self.network = network.into();
        self.station = station.into();
        self.location = location.into();
        self.channel = channel.into();
        self
    }

    /// Set the sequence number (6 ASCII characters on the wire).
    pub fn with_sequence_number(mut self, seq: &str) -> Self {
        self.sequence_number = seq.into();
        self
    }

    /// Set the sample rate in Hz.
    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Set the record start time.
    pub fn with_start_time(mut self, time: BTime) -> Self {
        self.start_time = time;
        self
    }
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered collection of miniSEED records sharing one sample encoding
/// and byte order, with summary fields derived from its records.
///
/// A dataset is filled either by [`Dataset::parse`] (which builds the
/// whole collection from a byte stream) or record by record through
/// [`Dataset::append`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub encoding: Encoding,
    pub byte_order: ByteOrder,
    pub records: Vec<Record>,
    pub total_samples: usize,
    pub start_time: BTime,
    pub end_time: BTime,
}

impl Dataset {
    /// Create an empty dataset with the given sample encoding and byte
    /// order for records built through [`Dataset::append`].
    pub fn new(encoding: Encoding, byte_order: ByteOrder) -> Self {
        Self {
            encoding,
            byte_order,
            records: Vec::new(),
            total_samples: 0,
            start_time: BTime::epoch(),
            end_time: BTime::epoch(),
        }
    }

    /// Parse a multi-record byte stream into a dataset, detecting byte
    /// order and per-record frame length. See [`crate::scan`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        scan::scan_stream(bytes)
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Build one record from a batch of samples and append it.
    ///
    /// Fails if a record with the same (sequence number, channel) pair
    /// already exists, or if the batch does not cover more than one
    /// second of data (`samples.len() <= sample_rate`).
    pub fn append(&mut self, samples: &[i32], options: &AppendOptions) -> Result<()> {
        for record in &self.records {
            if record.header.sequence_number == options.sequence_number
                && record.header.channel == options.channel
            {
                return Err(MseedError::DuplicateRecord {
                    sequence: options.sequence_number.clone(),
                    channel: options.channel.clone(),
                });
            }
        }

        if samples.len() as f64 <= options.sample_rate {
            return Err(MseedError::NotEnoughSamples {
                samples: samples.len(),
                rate: options.sample_rate,
            });
        }

        let raw = data::encode_payload(samples, self.encoding, self.byte_order)?;
        let decoded = data::decode_payload(&raw, self.encoding, samples.len(), self.byte_order)?;

        // Smallest power-of-two frame holding header + blockette + payload,
        // floored at 2^8 = 256 bytes
        let total = FIXED_SECTION_LEN + BLOCKETTE_SECTION_LEN + raw.len();
        let record_length_exp = total.next_power_of_two().trailing_zeros().max(8) as u8;

        let (factor, multiplier) = rate_to_factor_multiplier(options.sample_rate);

        let header = FixedHeader {
            sequence_number: options.sequence_number.clone(),
            quality: 'D',
            station: options.station.clone(),
            location: options.location.clone(),
            channel: options.channel.clone(),
            network: options.network.clone(),
            start_time: options.start_time,
            sample_count: samples.len() as u16,
            sample_rate_factor: factor,
            sample_rate_multiplier: multiplier,
            activity_flags: 0,
            io_clock_flags: 0,
            quality_flags: 0,
            blockette_count: 1,
            time_correction: 0,
            data_offset: (FIXED_SECTION_LEN + BLOCKETTE_SECTION_LEN) as u16,
            section_end: FIXED_SECTION_LEN as u16,
        };

        let blockette = Blockette::B1000 {
            next_blockette: 0,
            encoding: self.encoding.to_code(),
            byte_order: self.byte_order.to_flag(),
            record_length_exp,
        };

        debug!(
            samples = samples.len(),
            payload_bytes = raw.len(),
            record_length = 1u32 << record_length_exp,
            "appending record"
        );

        if self.records.is_empty() {
            self.start_time = options.start_time;
        }
        self.end_time = options.start_time;
        self.total_samples += samples.len();
        self.records.push(Record {
            header,
            blockette,
            encoding: self.encoding,
            payload: Payload { raw, decoded },
        });
        Ok(())
    }

    /// Serialize records back to bytes.
    ///
    /// [`WriteMode::Append`] emits only the most recently appended
    /// record, [`WriteMode::Overwrite`] emits all of them. Little-endian
    /// output is refused while any record uses Steim compression.
    pub fn encode(&self, mode: WriteMode, order: ByteOrder) -> Result<Vec<u8>> {
        if order == ByteOrder::Little && self.records.iter().any(|r| r.encoding.is_steim()) {
            return Err(MseedError::SteimByteOrder);
        }

        match mode {
            WriteMode::Append => {
                let last = self
                    .records
                    .last()
                    .ok_or_else(|| MseedError::EncodeError("no records to encode".into()))?;
                last.compose(order)
            }
            WriteMode::Overwrite => {
                let mut bytes = Vec::new();
                for record in &self.records {
                    bytes.extend(record.compose(order)?);
                }
                Ok(bytes)
            }
        }
    }
}

/// Derive the header's (factor, multiplier) pair from a sample rate.
///
/// Integral rates encode directly with multiplier 1; fractional rates
/// scale by 10^f where f is the number of significant fractional decimal
/// digits, with a negative multiplier marking the division.
fn rate_to_factor_multiplier(rate: f64) -> (i16, i16) {
    if rate == rate.floor() {
        (rate as i16, 1)
    } else {
        let digits = fractional_digits(rate);
        let scale = 10f64.powi(digits);
        ((rate * scale).round() as i16, -(scale as i16))
    }
}

fn fractional_digits(rate: f64) -> i32 {
    let text = format!("{rate}");
    match text.split_once('.') {
        Some((_, frac)) => frac.chars().filter(|c| c.is_ascii_digit()).count() as i32,
        None => 0,
    }
}
