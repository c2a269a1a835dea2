//! Pure Rust miniSEED v2 record codec.
//!
//! Zero `unsafe`, zero C dependencies. Reads and writes miniSEED v2
//! records: the 48-byte fixed header and 1000/1001 blockettes are
//! marshaled through static schema tables, payloads support Steim1/2
//! differential compression plus the plain integer/float/ASCII
//! encodings, and multi-record streams are scanned tolerantly with
//! automatic byte-order and record-length detection.
//!
//! # Building and encoding records
//!
//! ```
//! use mseed2::{AppendOptions, ByteOrder, Dataset, Encoding, WriteMode};
//!
//! let mut dataset = Dataset::new(Encoding::Steim2, ByteOrder::Big);
//! let samples: Vec<i32> = (0..200).collect();
//! let options = AppendOptions::new()
//!     .with_nslc("IU", "ANMO", "00", "BHZ")
//!     .with_sequence_number("000001")
//!     .with_sample_rate(100.0);
//! dataset.append(&samples, &options).unwrap();
//!
//! let bytes = dataset.encode(WriteMode::Overwrite, ByteOrder::Big).unwrap();
//! assert!(bytes.len().is_power_of_two());
//! ```
//!
//! # Parsing a multi-record stream
//!
//! ```
//! use mseed2::{AppendOptions, ByteOrder, Dataset, Encoding, Samples, WriteMode};
//!
//! # let mut dataset = Dataset::new(Encoding::Steim2, ByteOrder::Big);
//! # let samples: Vec<i32> = (0..200).collect();
//! # let opts = AppendOptions::new().with_nslc("IU", "ANMO", "00", "BHZ").with_sample_rate(100.0);
//! # dataset.append(&samples, &opts.clone().with_sequence_number("000001")).unwrap();
//! # dataset.append(&samples, &opts.clone().with_nslc("IU", "ANMO", "00", "BHN").with_sequence_number("000002")).unwrap();
//! # let bytes = dataset.encode(WriteMode::Overwrite, ByteOrder::Big).unwrap();
//! let parsed = Dataset::parse(&bytes).unwrap();
//!
//! assert_eq!(parsed.record_count(), 2);
//! assert_eq!(parsed.total_samples, 400);
//! assert_eq!(parsed.byte_order, ByteOrder::Big);
//! assert_eq!(parsed.records[0].header.channel, "BHZ");
//! assert_eq!(parsed.records[0].payload.decoded, Samples::Int((0..200).collect()));
//! ```

pub mod data;
pub mod dataset;
pub mod error;
pub mod primitive;
pub mod scan;
pub mod schema;
pub mod section;
pub mod steim;
pub mod time;
pub mod types;

pub use data::Samples;
pub use dataset::{AppendOptions, Dataset, Payload, Record};
pub use error::{MseedError, Result};
pub use section::{Blockette, FixedHeader};
pub use time::BTime;
pub use types::{ByteOrder, Encoding, WriteMode};
