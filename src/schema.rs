//! Static field tables driving section parse and compose.
//!
//! Each section of a miniSEED record is described by an ordered list of
//! `(name, kind, width)` entries. The same table drives both directions:
//! parsing walks it consuming exactly `width` bytes per field, composing
//! walks it emitting exactly `width` bytes per field.

/// Logical type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed integer, sign-extended from `width` bytes.
    Int,
    /// Fixed-width padded string.
    Str,
    /// 10-byte BTIME timestamp.
    Time,
    /// Skipped on parse, written as a single pad byte on compose.
    Reserved,
}

/// One entry in a section schema.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub width: usize,
}

const fn field(name: &'static str, kind: FieldKind, width: usize) -> Field {
    Field { name, kind, width }
}

/// Byte length of the fixed header section.
pub const FIXED_SECTION_LEN: usize = 48;

/// Byte length of the blockette section as laid out in a record
/// (schema bytes zero-padded to this width).
pub const BLOCKETTE_SECTION_LEN: usize = 16;

/// Fixed data header, 48 bytes.
pub const FIXED_HEADER: &[Field] = &[
    field("sequence_number", FieldKind::Str, 6),
    field("data_quality", FieldKind::Str, 1),
    field("reserved", FieldKind::Reserved, 1),
    field("station", FieldKind::Str, 5),
    field("location", FieldKind::Str, 2),
    field("channel", FieldKind::Str, 3),
    field("network", FieldKind::Str, 2),
    field("start_time", FieldKind::Time, 10),
    field("sample_count", FieldKind::Int, 2),
    field("sample_rate_factor", FieldKind::Int, 2),
    field("sample_rate_multiplier", FieldKind::Int, 2),
    field("activity_flags", FieldKind::Int, 1),
    field("io_clock_flags", FieldKind::Int, 1),
    field("data_quality_flags", FieldKind::Int, 1),
    field("blockette_count", FieldKind::Int, 1),
    field("time_correction", FieldKind::Int, 4),
    field("data_offset", FieldKind::Int, 2),
    field("section_end", FieldKind::Int, 2),
];

/// Blockette 1000 (data-only SEED blockette), 8 schema bytes.
pub const BLOCKETTE_1000: &[Field] = &[
    field("blockette_type", FieldKind::Int, 2),
    field("next_blockette", FieldKind::Int, 2),
    field("encoding", FieldKind::Int, 1),
    field("byte_order", FieldKind::Int, 1),
    field("record_length_exp", FieldKind::Int, 1),
    field("reserved", FieldKind::Reserved, 1),
];

/// Blockette 1001 (data extension blockette), 8 schema bytes.
pub const BLOCKETTE_1001: &[Field] = &[
    field("blockette_type", FieldKind::Int, 2),
    field("next_blockette", FieldKind::Int, 2),
    field("timing_quality", FieldKind::Int, 1),
    field("microseconds", FieldKind::Int, 1),
    field("reserved", FieldKind::Reserved, 1),
    field("frame_count", FieldKind::Int, 1),
];

/// Total byte width of a schema.
pub fn section_len(schema: &[Field]) -> usize {
    schema.iter().map(|f| f.width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_header_is_48_bytes() {
        assert_eq!(section_len(FIXED_HEADER), FIXED_SECTION_LEN);
    }

    #[test]
    fn test_blockette_schemas_are_8_bytes() {
        assert_eq!(section_len(BLOCKETTE_1000), 8);
        assert_eq!(section_len(BLOCKETTE_1001), 8);
    }

    #[test]
    fn test_field_offsets_match_wire_layout() {
        // Spot-check a few documented offsets by accumulating widths
        let mut offset = 0;
        let mut offsets = std::collections::HashMap::new();
        for f in FIXED_HEADER {
            offsets.insert(f.name, offset);
            offset += f.width;
        }
        assert_eq!(offsets["start_time"], 20);
        assert_eq!(offsets["sample_count"], 30);
        assert_eq!(offsets["data_offset"], 44);
        assert_eq!(offsets["section_end"], 46);
    }
}
