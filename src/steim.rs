//! Steim1 and Steim2 compression and decompression.
//!
//! These are differential integer compression schemes used in seismological
//! data (SEED/miniSEED format). See Appendix B of the SEED Manual v2.4.
//!
//! Both variants are defined in big-endian byte order only; requesting
//! either direction with [`ByteOrder::Little`] is an immediate error.

use crate::primitive::sign_extend;
use crate::types::ByteOrder;
use crate::{MseedError, Result};

const FRAME_SIZE: usize = 64; // 16 x 32-bit words
const WORDS_PER_FRAME: usize = 16;

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn extract_nibble(control_word: u32, word_index: usize) -> u8 {
    let shift = 30 - (word_index * 2);
    ((control_word >> shift) & 0x03) as u8
}

fn check_frame_alignment(data: &[u8]) -> Result<usize> {
    if data.len() % FRAME_SIZE != 0 {
        return Err(MseedError::SteimDecode(format!(
            "data length {} not a multiple of frame size {}",
            data.len(),
            FRAME_SIZE
        )));
    }
    let num_frames = data.len() / FRAME_SIZE;
    if num_frames == 0 {
        return Err(MseedError::SteimDecode("no frames in data".into()));
    }
    Ok(num_frames)
}

fn check_reconstruction(samples: &[i32], num_samples: usize, xn: i32) -> Result<()> {
    if samples.len() != num_samples {
        return Err(MseedError::SampleCountMismatch {
            expected: num_samples,
            actual: samples.len(),
        });
    }
    match samples.last() {
        Some(&last) if last != xn => Err(MseedError::SteimXnMismatch {
            expected: xn,
            actual: last,
        }),
        _ => Ok(()),
    }
}

/// Apply Steim1 diffs using an accumulator, pushing each result into samples.
fn apply_diffs_1(word: u32, nibble: u8, acc: &mut i32, samples: &mut Vec<i32>, num_samples: usize) {
    match nibble {
        0b00 => {} // no data
        0b01 => {
            // four 8-bit signed diffs
            for i in 0..4u32 {
                if samples.len() >= num_samples {
                    break;
                }
                let diff = sign_extend((word >> (24 - i * 8)) & 0xFF, 8);
                *acc = acc.wrapping_add(diff);
                samples.push(*acc);
            }
        }
        0b10 => {
            // two 16-bit signed diffs
            for i in 0..2u32 {
                if samples.len() >= num_samples {
                    break;
                }
                let diff = sign_extend((word >> (16 - i * 16)) & 0xFFFF, 16);
                *acc = acc.wrapping_add(diff);
                samples.push(*acc);
            }
        }
        0b11 => {
            // one 32-bit signed diff
            if samples.len() < num_samples {
                let diff = word as i32;
                *acc = acc.wrapping_add(diff);
                samples.push(*acc);
            }
        }
        _ => unreachable!(),
    }
}

/// Decode Steim1 compressed data into i32 samples.
///
/// `data` must be frame-aligned (multiple of 64 bytes).
/// Frame 0, word 1 = X₀ (forward integration constant / accumulator seed).
/// Frame 0, word 2 = Xₙ (reverse integration constant); the last
/// reconstructed sample must match it or decoding fails.
pub fn decode_steim1(data: &[u8], num_samples: usize, byte_order: ByteOrder) -> Result<Vec<i32>> {
    if byte_order == ByteOrder::Little {
        return Err(MseedError::SteimByteOrder);
    }
    let num_frames = check_frame_alignment(data)?;

    let x0 = read_u32(data, 4) as i32;
    let xn = read_u32(data, 8) as i32;
    let mut acc = x0;
    let mut samples = Vec::with_capacity(num_samples);

    for frame_idx in 0..num_frames {
        let frame_offset = frame_idx * FRAME_SIZE;
        let control_word = read_u32(data, frame_offset);

        for word_idx in 1..WORDS_PER_FRAME {
            if samples.len() >= num_samples {
                break;
            }

            // Skip X₀ and Xₙ words in frame 0
            if frame_idx == 0 && (word_idx == 1 || word_idx == 2) {
                continue;
            }

            let word = read_u32(data, frame_offset + word_idx * 4);
            let nibble = extract_nibble(control_word, word_idx);

            apply_diffs_1(word, nibble, &mut acc, &mut samples, num_samples);
        }
    }

    check_reconstruction(&samples, num_samples, xn)?;
    Ok(samples)
}

/// Decode Steim2 compressed data into i32 samples.
///
/// Extends Steim1 with additional packing formats using "dnib"
/// (bits 31-30 of the data word).
pub fn decode_steim2(data: &[u8], num_samples: usize, byte_order: ByteOrder) -> Result<Vec<i32>> {
    if byte_order == ByteOrder::Little {
        return Err(MseedError::SteimByteOrder);
    }
    let num_frames = check_frame_alignment(data)?;

    let x0 = read_u32(data, 4) as i32;
    let xn = read_u32(data, 8) as i32;
    let mut acc = x0;
    let mut samples = Vec::with_capacity(num_samples);

    for frame_idx in 0..num_frames {
        let frame_offset = frame_idx * FRAME_SIZE;
        let control_word = read_u32(data, frame_offset);

        for word_idx in 1..WORDS_PER_FRAME {
            if samples.len() >= num_samples {
                break;
            }

            if frame_idx == 0 && (word_idx == 1 || word_idx == 2) {
                continue;
            }

            let word = read_u32(data, frame_offset + word_idx * 4);
            let nibble = extract_nibble(control_word, word_idx);

            steim2_apply_diffs(word, nibble, &mut acc, &mut samples, num_samples)?;
        }
    }

    check_reconstruction(&samples, num_samples, xn)?;
    Ok(samples)
}

fn steim2_apply_diffs(
    word: u32,
    nibble: u8,
    acc: &mut i32,
    samples: &mut Vec<i32>,
    num_samples: usize,
) -> Result<()> {
    let dnib = ((word >> 30) & 0x03) as u8;

    match nibble {
        0b00 => {} // no data
        0b01 => {
            // four 8-bit signed diffs (same as Steim1)
            for i in 0..4u32 {
                if samples.len() >= num_samples {
                    break;
                }
                let diff = sign_extend((word >> (24 - i * 8)) & 0xFF, 8);
                *acc = acc.wrapping_add(diff);
                samples.push(*acc);
            }
        }
        0b10 => match dnib {
            0b01 => {
                // one 30-bit diff
                if samples.len() < num_samples {
                    let diff = sign_extend(word & 0x3FFF_FFFF, 30);
                    *acc = acc.wrapping_add(diff);
                    samples.push(*acc);
                }
            }
            0b10 => {
                // two 15-bit diffs
                for i in 0..2u32 {
                    if samples.len() >= num_samples {
                        break;
                    }
                    let diff = sign_extend((word >> (15 - i * 15)) & 0x7FFF, 15);
                    *acc = acc.wrapping_add(diff);
                    samples.push(*acc);
                }
            }
            0b11 => {
                // three 10-bit diffs
                for i in 0..3u32 {
                    if samples.len() >= num_samples {
                        break;
                    }
                    let diff = sign_extend((word >> (20 - i * 10)) & 0x3FF, 10);
                    *acc = acc.wrapping_add(diff);
                    samples.push(*acc);
                }
            }
            _ => {
                return Err(MseedError::SteimDecode(format!(
                    "steim2 nibble=10 invalid dnib={dnib}"
                )));
            }
        },
        0b11 => match dnib {
            0b00 => {
                // five 6-bit diffs
                for i in 0..5u32 {
                    if samples.len() >= num_samples {
                        break;
                    }
                    let diff = sign_extend((word >> (24 - i * 6)) & 0x3F, 6);
                    *acc = acc.wrapping_add(diff);
                    samples.push(*acc);
                }
            }
            0b01 => {
                // six 5-bit diffs
                for i in 0..6u32 {
                    if samples.len() >= num_samples {
                        break;
                    }
                    let diff = sign_extend((word >> (25 - i * 5)) & 0x1F, 5);
                    *acc = acc.wrapping_add(diff);
                    samples.push(*acc);
                }
            }
            0b10 => {
                // seven 4-bit diffs
                for i in 0..7u32 {
                    if samples.len() >= num_samples {
                        break;
                    }
                    let diff = sign_extend((word >> (24 - i * 4)) & 0x0F, 4);
                    *acc = acc.wrapping_add(diff);
                    samples.push(*acc);
                }
            }
            _ => {
                return Err(MseedError::SteimDecode(format!(
                    "steim2 nibble=11 invalid dnib={dnib}"
                )));
            }
        },
        _ => unreachable!(),
    }

    Ok(())
}

/// Build the difference array: d₀ = 0, dᵢ = xᵢ - xᵢ₋₁.
fn diff_array(samples: &[i32]) -> Vec<i32> {
    let mut diffs = Vec::with_capacity(samples.len());
    diffs.push(0i32);
    for i in 1..samples.len() {
        diffs.push(samples[i].wrapping_sub(samples[i - 1]));
    }
    diffs
}

/// Pack diffs into 64-byte frames with the given per-word packer and
/// serialize big-endian. Frame 0 words 1 and 2 carry x₀ and xₙ.
fn pack_frames(
    diffs: &[i32],
    x0: i32,
    xn: i32,
    pack: fn(&[i32]) -> (u32, u8, usize),
) -> Vec<u8> {
    let mut frames: Vec<[u32; WORDS_PER_FRAME]> = Vec::new();
    let mut diff_idx = 0;

    loop {
        let is_first_frame = frames.is_empty();
        let mut frame = [0u32; WORDS_PER_FRAME];
        let mut control: u32 = 0;

        let start_word = if is_first_frame {
            frame[1] = x0 as u32;
            frame[2] = xn as u32;
            3
        } else {
            1
        };

        for word_idx in start_word..WORDS_PER_FRAME {
            if diff_idx >= diffs.len() {
                break;
            }

            let (packed_word, nibble, consumed) = pack(&diffs[diff_idx..]);
            frame[word_idx] = packed_word;
            control |= (nibble as u32) << (30 - word_idx * 2);
            diff_idx += consumed;
        }

        frame[0] = control;
        frames.push(frame);

        if diff_idx >= diffs.len() {
            break;
        }
    }

    let mut output = Vec::with_capacity(frames.len() * FRAME_SIZE);
    for frame in &frames {
        for &word in frame {
            output.extend_from_slice(&word.to_be_bytes());
        }
    }
    output
}

/// Encode i32 samples using Steim1 compression.
pub fn encode_steim1(samples: &[i32], byte_order: ByteOrder) -> Result<Vec<u8>> {
    if byte_order == ByteOrder::Little {
        return Err(MseedError::SteimByteOrder);
    }
    if samples.is_empty() {
        return Err(MseedError::EncodeError("no samples to encode".into()));
    }

    let x0 = samples[0];
    let xn = *samples.last().unwrap();
    let diffs = diff_array(samples);
    Ok(pack_frames(&diffs, x0, xn, steim1_pack_diffs))
}

/// Pack consecutive diffs into a single Steim1 word, widest grouping
/// first. Returns (packed_word, nibble, num_consumed).
fn steim1_pack_diffs(diffs: &[i32]) -> (u32, u8, usize) {
    // Try four 8-bit diffs
    if diffs.len() >= 4 && diffs[..4].iter().all(|&d| (-128..=127).contains(&d)) {
        let word = ((diffs[0] as u8 as u32) << 24)
            | ((diffs[1] as u8 as u32) << 16)
            | ((diffs[2] as u8 as u32) << 8)
            | (diffs[3] as u8 as u32);
        return (word, 0b01, 4);
    }

    // Try two 16-bit diffs
    if diffs.len() >= 2 && diffs[..2].iter().all(|&d| (-32768..=32767).contains(&d)) {
        let word = ((diffs[0] as u16 as u32) << 16) | (diffs[1] as u16 as u32);
        return (word, 0b10, 2);
    }

    // Fallback: one 32-bit diff
    (diffs[0] as u32, 0b11, 1)
}

/// Encode i32 samples using Steim2 compression.
pub fn encode_steim2(samples: &[i32], byte_order: ByteOrder) -> Result<Vec<u8>> {
    if byte_order == ByteOrder::Little {
        return Err(MseedError::SteimByteOrder);
    }
    if samples.is_empty() {
        return Err(MseedError::EncodeError("no samples to encode".into()));
    }

    let x0 = samples[0];
    let xn = *samples.last().unwrap();
    let diffs = diff_array(samples);
    Ok(pack_frames(&diffs, x0, xn, steim2_pack_diffs))
}

/// Pack consecutive diffs into a single Steim2 word, most values per
/// word first. Returns (packed_word, nibble, num_consumed).
fn steim2_pack_diffs(diffs: &[i32]) -> (u32, u8, usize) {
    // Try 7 x 4-bit (fits -8..7), nibble=11, dnib=10
    if diffs.len() >= 7 && diffs[..7].iter().all(|&d| (-8..=7).contains(&d)) {
        let mut word: u32 = 0b10 << 30;
        for (i, &d) in diffs[..7].iter().enumerate() {
            word |= ((d as u32) & 0x0F) << (24 - i * 4);
        }
        return (word, 0b11, 7);
    }

    // Try 6 x 5-bit (fits -16..15), nibble=11, dnib=01
    if diffs.len() >= 6 && diffs[..6].iter().all(|&d| (-16..=15).contains(&d)) {
        let mut word: u32 = 0b01 << 30;
        for (i, &d) in diffs[..6].iter().enumerate() {
            word |= ((d as u32) & 0x1F) << (25 - i * 5);
        }
        return (word, 0b11, 6);
    }

    // Try 5 x 6-bit (fits -32..31), nibble=11, dnib=00
    if diffs.len() >= 5 && diffs[..5].iter().all(|&d| (-32..=31).contains(&d)) {
        let mut word: u32 = 0;
        for (i, &d) in diffs[..5].iter().enumerate() {
            word |= ((d as u32) & 0x3F) << (24 - i * 6);
        }
        return (word, 0b11, 5);
    }

    // Try 4 x 8-bit (fits -128..127), nibble=01
    if diffs.len() >= 4 && diffs[..4].iter().all(|&d| (-128..=127).contains(&d)) {
        let word = ((diffs[0] as u8 as u32) << 24)
            | ((diffs[1] as u8 as u32) << 16)
            | ((diffs[2] as u8 as u32) << 8)
            | (diffs[3] as u8 as u32);
        return (word, 0b01, 4);
    }

    // Try 3 x 10-bit (fits -512..511), nibble=10, dnib=11
    if diffs.len() >= 3 && diffs[..3].iter().all(|&d| (-512..=511).contains(&d)) {
        let mut word: u32 = 0b11 << 30;
        for (i, &d) in diffs[..3].iter().enumerate() {
            word |= ((d as u32) & 0x3FF) << (20 - i * 10);
        }
        return (word, 0b10, 3);
    }

    // Try 2 x 15-bit (fits -16384..16383), nibble=10, dnib=10
    if diffs.len() >= 2 && diffs[..2].iter().all(|&d| (-16384..=16383).contains(&d)) {
        let mut word: u32 = 0b10 << 30;
        for (i, &d) in diffs[..2].iter().enumerate() {
            word |= ((d as u32) & 0x7FFF) << (15 - i * 15);
        }
        return (word, 0b10, 2);
    }

    // Fallback: 1 x 30-bit, nibble=10, dnib=01
    let word = (0b01u32 << 30) | ((diffs[0] as u32) & 0x3FFF_FFFF);
    (word, 0b10, 1)
}
