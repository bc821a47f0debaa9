//! Error types for the delta codec.
//!
//! One enum per concern, following the rest of this crate's style: the
//! encoder has a single failure mode, the decoder has several, and the
//! inner RLE codec has its own that gets folded into `DecodeError::MalformedPatch`.

use thiserror::Error;

/// Errors that can occur while encoding a patch.
///
/// The encoder can always fall back to a RAW record, so the only way it
/// can fail at all is an invalid block size.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum EncodeError {
    #[error("block size {0} is invalid: must be a positive multiple of 8 not exceeding 255")]
    InvalidBlockSize(u32),
}

/// Errors that can occur while decoding a patch.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum DecodeError {
    #[error("block size {0} in patch header is invalid: must be a positive multiple of 8 not exceeding 255")]
    InvalidBlockSize(u32),

    #[error("the patch ended before a record could be fully read")]
    TruncatedPatch,

    #[error("record tag 0x{0:02X} is not one of the known record kinds")]
    UnknownTag(u8),

    #[error("patch is malformed: {0}")]
    MalformedPatch(&'static str),

    #[error("bytes remain in the record stream after the PARTIAL record")]
    TrailingData,

    #[error("CRC-32 of the reconstructed output does not match the patch trailer")]
    ChecksumMismatch,
}

/// Errors from the inner run-length codec, folded into `DecodeError::MalformedPatch`
/// wherever an RLE payload is decoded inside a record.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum RleError {
    #[error("RLE segment ran past the end of its input")]
    Underrun,
    #[error("RLE decoded more bytes than the expected output length")]
    Overrun,
    #[error("RLE decoded fewer bytes than the expected output length")]
    ShortOutput,
}

impl From<RleError> for DecodeError {
    fn from(e: RleError) -> DecodeError {
        match e {
            RleError::Underrun => DecodeError::MalformedPatch("RLE payload truncated"),
            RleError::Overrun => DecodeError::MalformedPatch("RLE payload decoded past expected length"),
            RleError::ShortOutput => DecodeError::MalformedPatch("RLE payload decoded short of expected length"),
        }
    }
}
