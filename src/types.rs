//! Shared types: [`ByteOrder`], [`Encoding`], and [`WriteMode`].

use std::fmt;

use crate::{MseedError, Result};

/// Byte order for multi-byte fields in a miniSEED record.
///
/// The wire flag (Blockette 1000 byte-order field) is 0 for
/// least-significant-byte-first, 1 for most-significant-byte-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Convert the raw Blockette 1000 byte-order flag.
    pub fn from_flag(flag: u8) -> Self {
        if flag == 0 { Self::Little } else { Self::Big }
    }

    /// Convert to the raw Blockette 1000 byte-order flag.
    pub fn to_flag(self) -> u8 {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => write!(f, "little-endian"),
            Self::Big => write!(f, "big-endian"),
        }
    }
}

/// Encoding format for sample data in a miniSEED v2 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// ASCII text (code 0).
    Ascii,
    /// 16-bit signed integer (code 1).
    Int16,
    /// 24-bit signed integer (code 2).
    Int24,
    /// 32-bit signed integer (code 3).
    Int32,
    /// 32-bit IEEE float (code 4).
    Float32,
    /// 64-bit IEEE double (code 5).
    Float64,
    /// Steim-1 compressed integers (code 10).
    Steim1,
    /// Steim-2 compressed integers (code 11).
    Steim2,
}

impl Encoding {
    /// Convert a raw encoding code (from Blockette 1000) to an `Encoding`.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Ascii),
            1 => Ok(Self::Int16),
            2 => Ok(Self::Int24),
            3 => Ok(Self::Int32),
            4 => Ok(Self::Float32),
            5 => Ok(Self::Float64),
            10 => Ok(Self::Steim1),
            11 => Ok(Self::Steim2),
            _ => Err(MseedError::UnsupportedEncoding(code)),
        }
    }

    /// Convert to the raw encoding code for Blockette 1000.
    pub fn to_code(self) -> u8 {
        match self {
            Self::Ascii => 0,
            Self::Int16 => 1,
            Self::Int24 => 2,
            Self::Int32 => 3,
            Self::Float32 => 4,
            Self::Float64 => 5,
            Self::Steim1 => 10,
            Self::Steim2 => 11,
        }
    }

    /// True for the Steim differential compression variants.
    pub fn is_steim(self) -> bool {
        matches!(self, Self::Steim1 | Self::Steim2)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascii => write!(f, "ASCII"),
            Self::Int16 => write!(f, "INT16"),
            Self::Int24 => write!(f, "INT24"),
            Self::Int32 => write!(f, "INT32"),
            Self::Float32 => write!(f, "FLOAT32"),
            Self::Float64 => write!(f, "FLOAT64"),
            Self::Steim1 => write!(f, "Steim1"),
            Self::Steim2 => write!(f, "Steim2"),
        }
    }
}

/// Output mode for [`Dataset::encode`](crate::Dataset::encode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Emit only the most recently appended record (code 0).
    Append,
    /// Emit every record in the dataset (code 1).
    Overwrite,
}
