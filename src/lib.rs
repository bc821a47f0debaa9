//! Compact binary delta patches between two versions of a blob.
//!
//! Given a reference blob R and a target blob T, [`encode`] produces a patch
//! P such that [`decode`]`(R, P)` reproduces T bit-for-bit. The patch format
//! is self-describing (it carries the block size) and is designed to be
//! small when T is a minor revision of R.
//!
//! The codec is synchronous, pure, and operates on fully-materialized
//! blobs — there is no streaming mode and no cryptographic authentication,
//! only integrity against corruption via a CRC-32 trailer.

#![forbid(unsafe_code)]

pub mod error;
pub mod index;
pub mod record;
pub mod rle;

pub mod decode;
pub mod encode;

pub use decode::decode;
pub use encode::encode;
pub use error::{DecodeError, EncodeError};
