//! Record kinds: the six ways one block of the target can be reconstructed.
//!
//! Parsed up front into a closed enum so the in-memory representation has
//! no "unknown tag" state — only `Record::read` from raw bytes can fail
//! that way.

use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use fehler::{throw, throws};
use std::io::{Cursor, Read};

use crate::error::DecodeError;
use crate::rle;

pub const TAG_COPY_SAME: u8 = 0x43;
pub const TAG_COPY_RUN: u8 = 0x44;
pub const TAG_COPY_OFFSET: u8 = 0x52;
pub const TAG_XOR_RLE: u8 = 0x58;
pub const TAG_RAW: u8 = 0x49;
pub const TAG_PARTIAL: u8 = 0x50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// B bytes from R at the current output offset.
    CopySame,
    /// `n + 1` consecutive COPY_SAME blocks (n in 1..=255, meaning 2..=256 blocks).
    CopyRun { n: u8 },
    /// B bytes from R at offset `o` (0..=2^24 - 1).
    CopyOffset { offset: u32 },
    /// B bytes: RLE-decode `payload` to a B-byte delta D, output R[same_offset..+B] XOR D.
    XorRle { payload: Vec<u8> },
    /// B literal bytes.
    Raw { data: Vec<u8> },
    /// The final, possibly-short block: `k` literal bytes.
    Partial { data: Vec<u8> },
}

impl Record {
    /// Cost in bytes of this record once serialized, including its tag byte.
    pub fn cost(&self) -> usize {
        match self {
            Record::CopySame => 1,
            Record::CopyRun { .. } => 2,
            Record::CopyOffset { .. } => 4,
            Record::XorRle { payload } => 2 + payload.len(),
            Record::Raw { data } => 1 + data.len(),
            Record::Partial { data } => 2 + data.len(),
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        match self {
            Record::CopySame => {
                out.push(TAG_COPY_SAME);
            }
            Record::CopyRun { n } => {
                out.push(TAG_COPY_RUN);
                out.push(*n);
            }
            Record::CopyOffset { offset } => {
                out.push(TAG_COPY_OFFSET);
                out.write_u24::<BE>(*offset).expect("writing to a Vec never fails");
            }
            Record::XorRle { payload } => {
                out.push(TAG_XOR_RLE);
                out.push(payload.len() as u8);
                out.extend_from_slice(payload);
            }
            Record::Raw { data } => {
                out.push(TAG_RAW);
                out.extend_from_slice(data);
            }
            Record::Partial { data } => {
                out.push(TAG_PARTIAL);
                out.push(data.len() as u8);
                out.extend_from_slice(data);
            }
        }
    }

    /// Read one record from `cursor`, given the already-consumed tag byte and the block size.
    #[throws(DecodeError)]
    pub fn read(tag: u8, cursor: &mut Cursor<&[u8]>, block_size: usize) -> Record {
        match tag {
            TAG_COPY_SAME => Record::CopySame,
            TAG_COPY_RUN => {
                let n = cursor.read_u8().map_err(|_| DecodeError::TruncatedPatch)?;
                Record::CopyRun { n }
            }
            TAG_COPY_OFFSET => {
                let offset = cursor.read_u24::<BE>().map_err(|_| DecodeError::TruncatedPatch)?;
                Record::CopyOffset { offset }
            }
            TAG_XOR_RLE => {
                let len = cursor.read_u8().map_err(|_| DecodeError::TruncatedPatch)? as usize;
                let mut payload = vec![0u8; len];
                cursor.read_exact(&mut payload).map_err(|_| DecodeError::TruncatedPatch)?;
                Record::XorRle { payload }
            }
            TAG_RAW => {
                let mut data = vec![0u8; block_size];
                cursor.read_exact(&mut data).map_err(|_| DecodeError::TruncatedPatch)?;
                Record::Raw { data }
            }
            TAG_PARTIAL => {
                let k = cursor.read_u8().map_err(|_| DecodeError::TruncatedPatch)? as usize;
                let mut data = vec![0u8; k];
                cursor.read_exact(&mut data).map_err(|_| DecodeError::TruncatedPatch)?;
                Record::Partial { data }
            }
            other => throw!(DecodeError::UnknownTag(other)),
        }
    }
}

/// Build an XOR_RLE record for `target` against `reference`, both exactly `block_size` long.
///
/// Returns `None` if the RLE-encoded delta does not beat the RAW cost, or
/// exceeds the one-byte length prefix's range.
pub fn try_xor_rle(reference: &[u8], target: &[u8], block_size: usize) -> Option<Record> {
    debug_assert_eq!(reference.len(), target.len());
    let delta: Vec<u8> = reference.iter().zip(target).map(|(r, t)| r ^ t).collect();
    let payload = rle::rle_encode(&delta);
    if payload.len() > 255 {
        return None;
    }
    if 2 + payload.len() < 1 + block_size {
        Some(Record::XorRle { payload })
    } else {
        None
    }
}
