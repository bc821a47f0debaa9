//! Decoder/reconstructor: parses the header, replays the record stream
//! against R to rebuild T, then validates the trailing CRC-32.

use byteorder::ReadBytesExt;
use fehler::{throw, throws};
use std::convert::TryInto;
use std::io::Cursor;

use crate::error::DecodeError;
use crate::record::{self, Record};
use crate::rle;

const TRAILER_LEN: usize = 4;

/// Decode `patch` against `reference`, reproducing the original target blob.
#[throws(DecodeError)]
pub fn decode(reference: &[u8], patch: &[u8]) -> Vec<u8> {
    if patch.len() < 1 + TRAILER_LEN {
        throw!(DecodeError::TruncatedPatch);
    }

    let block_size_byte = patch[0];
    let block_size = block_size_byte as u32;
    if block_size == 0 || block_size % 8 != 0 {
        throw!(DecodeError::InvalidBlockSize(block_size));
    }
    let block_size = block_size as usize;

    let stream_end = patch.len() - TRAILER_LEN;
    let stream = &patch[1..stream_end];
    let expected_crc = u32::from_be_bytes(
        patch[stream_end..]
            .try_into()
            .expect("trailer slice is exactly 4 bytes"),
    );

    let mut out = Vec::with_capacity(stream.len());
    let mut p = 0usize;
    let mut cursor = Cursor::new(stream);
    let mut saw_partial = false;

    loop {
        let pos_before = cursor.position() as usize;
        if pos_before >= stream.len() {
            break;
        }

        let tag = cursor.read_u8().map_err(|_| DecodeError::TruncatedPatch)?;

        if saw_partial {
            throw!(DecodeError::TrailingData);
        }

        match Record::read(tag, &mut cursor, block_size)? {
            Record::CopySame => {
                append_reference_block(reference, &mut out, p, block_size)?;
                p += block_size;
            }
            Record::CopyRun { n } => {
                for _ in 0..=(n as usize) {
                    append_reference_block(reference, &mut out, p, block_size)?;
                    p += block_size;
                }
            }
            Record::CopyOffset { offset } => {
                append_reference_block(reference, &mut out, offset as usize, block_size)?;
                p += block_size;
            }
            Record::XorRle { payload } => {
                let delta = rle::rle_decode(&payload, block_size)?;
                if p + block_size > reference.len() {
                    throw!(DecodeError::MalformedPatch(
                        "XOR_RLE record reads past the end of the reference blob",
                    ));
                }
                for (r, d) in reference[p..p + block_size].iter().zip(&delta) {
                    out.push(r ^ d);
                }
                p += block_size;
            }
            Record::Raw { data } => {
                out.extend_from_slice(&data);
                p += block_size;
            }
            Record::Partial { data } => {
                out.extend_from_slice(&data);
                p += data.len();
                saw_partial = true;
            }
        }
    }

    let actual_crc = crc32fast::hash(&out);
    if actual_crc != expected_crc {
        throw!(DecodeError::ChecksumMismatch);
    }

    out
}

#[throws(DecodeError)]
fn append_reference_block(reference: &[u8], out: &mut Vec<u8>, offset: usize, block_size: usize) {
    if offset + block_size > reference.len() {
        throw!(DecodeError::MalformedPatch(
            "record reads past the end of the reference blob",
        ));
    }
    out.extend_from_slice(&reference[offset..offset + block_size]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;

    fn roundtrip(reference: &[u8], target: &[u8], block_size: u32) {
        let patch = encode(reference, target, block_size).unwrap();
        let restored = decode(reference, &patch).unwrap();
        assert_eq!(restored, target);
    }

    #[test]
    fn identical_blobs() {
        roundtrip(b"the quick brown fox jumps over the lazy dog", b"the quick brown fox jumps over the lazy dog", 8);
    }

    #[test]
    fn copy_offset_followed_by_position_dependent_record_keeps_cursor_in_sync() {
        // Block 0 of target matches reference block 1 (a cross-offset copy),
        // and block 1 of target matches reference at its *own* position.
        // Decoding the second block must read reference offset 8, not 0 -
        // which only holds if the COPY_OFFSET arm advanced the output cursor.
        let reference = b"AAAAAAAABBBBBBBB".to_vec();
        let target = b"BBBBBBBBBBBBBBBB".to_vec();
        roundtrip(&reference, &target, 8);
    }

    #[test]
    fn minor_revision() {
        let reference = b"firmware version 1.0.0 payload section begins here and continues for a while".to_vec();
        let mut target = reference.clone();
        target[18] = b'1'; // bump a version digit
        target.extend_from_slice(b" plus a tail of new bytes");
        roundtrip(&reference, &target, 16);
    }

    #[test]
    fn empty_target() {
        roundtrip(b"some reference data", b"", 8);
    }

    #[test]
    fn target_shorter_than_one_block() {
        roundtrip(b"0123456789abcdef", b"xy", 16);
    }

    #[test]
    fn s5_checksum_failure_on_flipped_trailer_bit() {
        let reference = vec![1u8; 128];
        let target = vec![2u8; 128];
        let mut patch = encode(&reference, &target, 64).unwrap();
        let last = patch.len() - 1;
        patch[last] ^= 0x01;
        assert_eq!(decode(&reference, &patch), Err(DecodeError::ChecksumMismatch));
    }

    #[test]
    fn s6_unknown_tag() {
        let mut patch = vec![64u8, 0x00];
        patch.extend_from_slice(&crc32fast::hash(&[]).to_be_bytes());
        assert_eq!(decode(&[], &patch), Err(DecodeError::UnknownTag(0x00)));
    }

    #[test]
    fn zero_block_size_header_is_invalid() {
        let patch = vec![0u8, 0, 0, 0, 0];
        assert_eq!(decode(&[], &patch), Err(DecodeError::InvalidBlockSize(0)));
    }

    #[test]
    fn non_multiple_of_eight_block_size_header_is_invalid() {
        let patch = vec![10u8, 0, 0, 0, 0];
        assert_eq!(decode(&[], &patch), Err(DecodeError::InvalidBlockSize(10)));
    }

    #[test]
    fn patch_too_short_is_truncated() {
        assert_eq!(decode(&[], &[64, 0, 0]), Err(DecodeError::TruncatedPatch));
    }

    #[test]
    fn trailing_data_after_partial_is_rejected() {
        // header(64) + PARTIAL(k=1, byte) + extra COPY_SAME tag + crc
        let mut patch = vec![64u8, record::TAG_PARTIAL, 1, b'x', record::TAG_COPY_SAME];
        patch.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(decode(&[], &patch), Err(DecodeError::TrailingData)));
    }

    #[test]
    fn copy_same_past_end_of_reference_is_malformed() {
        let patch = {
            let mut p = vec![8u8, record::TAG_COPY_SAME];
            p.extend_from_slice(&crc32fast::hash(&[0u8; 8]).to_be_bytes());
            p
        };
        assert!(matches!(decode(&[0u8; 4], &patch), Err(DecodeError::MalformedPatch(_))));
    }

    #[test]
    fn rle_underrun_inside_xor_record_is_malformed() {
        let mut patch = vec![8u8, record::TAG_XOR_RLE, 3, 0x7F, b'a', b'b'];
        patch.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(decode(&[0u8; 8], &patch), Err(DecodeError::MalformedPatch(_))));
    }
}
