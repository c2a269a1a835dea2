//! Error types for miniSEED decoding and encoding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MseedError {
    #[error("record too short: expected at least {expected} bytes, got {actual}")]
    RecordTooShort { expected: usize, actual: usize },

    #[error("byte order not detectable from section-end offset field")]
    UndetectableByteOrder,

    #[error("integer width {0} out of range (1-4 bytes)")]
    InvalidWidth(usize),

    #[error("schema field {0} does not exist")]
    UnknownField(&'static str),

    #[error("unsupported encoding format: {0}")]
    UnsupportedEncoding(u8),

    #[error("blockette type {0} is not supported")]
    UnsupportedBlockette(u16),

    #[error("steim decode error: {0}")]
    SteimDecode(String),

    #[error("steim encoding is big-endian only")]
    SteimByteOrder,

    #[error("steim reverse integration mismatch: xn is {expected}, reconstructed {actual}")]
    SteimXnMismatch { expected: i32, actual: i32 },

    #[error("sample count mismatch: header says {expected}, decoded {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("record with sequence number {sequence} and channel {channel} already exists")]
    DuplicateRecord { sequence: String, channel: String },

    #[error("data length {samples} must be greater than sample rate {rate}")]
    NotEnoughSamples { samples: usize, rate: f64 },

    #[error("no valid records found in stream")]
    NoValidRecords,

    #[error("encode error: {0}")]
    EncodeError(String),
}

pub type Result<T> = std::result::Result<T, MseedError>;
