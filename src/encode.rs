//! Encoder: walks T block by block, consults the reference index, selects
//! the cheapest record, and emits the record stream plus CRC-32 trailer.

use fehler::{throw, throws};

use crate::error::EncodeError;
use crate::index::Index;
use crate::record::{self, Record};

/// Validate a block size against the wire format's constraints: positive,
/// a multiple of 8, and representable in the single header byte (<= 255).
#[throws(EncodeError)]
pub fn validate_block_size(block_size: u32) -> usize {
    if block_size == 0 || block_size % 8 != 0 || block_size > 255 {
        throw!(EncodeError::InvalidBlockSize(block_size));
    }
    block_size as usize
}

/// Encode `target` as a delta patch against `reference`, using the given block size.
#[throws(EncodeError)]
pub fn encode(reference: &[u8], target: &[u8], block_size: u32) -> Vec<u8> {
    let block_size = validate_block_size(block_size)?;

    let index = Index::build(reference, block_size);

    let mut out = Vec::with_capacity(target.len() / 4 + 16);
    out.push(block_size as u8);

    let full_blocks_end = (target.len() / block_size) * block_size;
    let mut p = 0;

    while p < full_blocks_end {
        let record = choose_record(reference, target, &index, p, block_size);
        let advance = match &record {
            Record::CopyRun { n } => (*n as usize + 1) * block_size,
            _ => block_size,
        };
        record.write(&mut out);
        p += advance;
    }

    if p < target.len() {
        let tail = &target[p..];
        Record::Partial { data: tail.to_vec() }.write(&mut out);
    }

    let crc = crc32fast::hash(target);
    out.extend_from_slice(&crc.to_be_bytes());

    out
}

fn same_position_matches(reference: &[u8], target: &[u8], p: usize, block_size: usize) -> bool {
    p + block_size <= reference.len() && reference[p..p + block_size] == target[p..p + block_size]
}

/// Starting at output offset `p`, greedily find the largest run `n` (1..=255) of
/// consecutive same-position-matching blocks beyond the first, per §4.3 step 1a.
/// Returns `n`, where `n == 0` means only the block at `p` itself matches.
fn extend_copy_run(reference: &[u8], target: &[u8], p: usize, block_size: usize) -> u8 {
    let mut n: u8 = 0;
    loop {
        if n == 255 {
            break;
        }
        let next_p = p + (n as usize + 1) * block_size;
        if next_p + block_size > target.len() {
            break;
        }
        if !same_position_matches(reference, target, next_p, block_size) {
            break;
        }
        n += 1;
    }
    n
}

fn choose_record(reference: &[u8], target: &[u8], index: &Index, p: usize, block_size: usize) -> Record {
    let t = &target[p..p + block_size];

    if same_position_matches(reference, target, p, block_size) {
        let n = extend_copy_run(reference, target, p, block_size);
        return if n == 0 {
            Record::CopySame
        } else {
            Record::CopyRun { n }
        };
    }

    let offset_candidate = index
        .lookup(t)
        .filter(|&o| (o as usize) < (1 << 24) && (o as usize) + block_size <= reference.len())
        .map(|o| Record::CopyOffset { offset: o });

    let xor_candidate = if p + block_size <= reference.len() {
        record::try_xor_rle(&reference[p..p + block_size], t, block_size)
    } else {
        None
    };

    let raw = Record::Raw { data: t.to_vec() };

    // Tie-break order: offset < XOR < RAW.
    let mut best = raw;
    if let Some(xor) = xor_candidate {
        if xor.cost() < best.cost() {
            best = xor;
        }
    }
    if let Some(offset) = offset_candidate {
        if offset.cost() <= best.cost() {
            best = offset;
        }
    }
    best
}
