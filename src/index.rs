//! Reference index over R: maps every B-byte slice of R to the earliest
//! offset it occurs at, preferring block-aligned offsets on collision.

use std::collections::HashMap;

pub struct Index {
    block_size: usize,
    offsets: HashMap<Box<[u8]>, u32>,
}

impl Index {
    /// Build an index over `reference`, covering every aligned and unaligned
    /// `block_size`-byte window.
    ///
    /// Pass 1 inserts aligned offsets (multiples of `block_size`) first, so
    /// they win ties; pass 2 fills in keys that never occur at an aligned
    /// offset. Both passes use insert-if-absent, so the earliest offset per
    /// key is always the one retained.
    pub fn build(reference: &[u8], block_size: usize) -> Index {
        let mut offsets: HashMap<Box<[u8]>, u32> = HashMap::new();

        if reference.len() >= block_size {
            let mut aligned = 0;
            while aligned + block_size <= reference.len() {
                offsets
                    .entry(reference[aligned..aligned + block_size].into())
                    .or_insert(aligned as u32);
                aligned += block_size;
            }

            for i in 0..=(reference.len() - block_size) {
                offsets
                    .entry(reference[i..i + block_size].into())
                    .or_insert(i as u32);
            }
        }

        Index { block_size, offsets }
    }

    /// Look up the earliest (aligned-preferring) offset at which `key` occurs in R.
    pub fn lookup(&self, key: &[u8]) -> Option<u32> {
        debug_assert_eq!(key.len(), self.block_size);
        self.offsets.get(key).copied()
    }
}
