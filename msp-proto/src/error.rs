//! Error types shared by the codec, parser, and command registry.

use core::fmt::{Display, Formatter};
use std::error::Error;

/// Failure while turning a raw payload into a [`crate::command::MspMessage`].
#[derive(Debug)]
pub enum ParserError {
    /// Payload shorter than the command's declared minimum length.
    PayloadTooShort {
        code: u16,
        min_len: usize,
        got: usize,
    },
    /// No registry entry for this command code.
    UnknownCommand { code: u16 },
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PayloadTooShort { code, min_len, got } => write!(
                f,
                "MSP command {code}: payload too short (need at least {min_len} bytes, got {got})"
            ),
            Self::UnknownCommand { code } => write!(f, "unknown MSP command code {code}"),
        }
    }
}

impl Error for ParserError {}

/// Failure while producing a complete, checksummed frame from a byte stream.
#[derive(Debug)]
pub enum FrameError {
    /// The trailing checksum byte did not match the computed value.
    ChecksumMismatch { code: u16 },
    /// The direction byte was neither `<`, `>`, nor `!`.
    InvalidDirection { byte: u8 },
    /// An MSP v1 error frame (`direction == '!'`) was received.
    ErrorResponse { code: u16 },
    /// The declared payload size exceeds what the frame format allows.
    OversizedLength { declared: usize, max: usize },
    Parse(ParserError),
}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ChecksumMismatch { code } => write!(f, "checksum mismatch decoding MSP command {code}"),
            Self::InvalidDirection { byte } => write!(f, "invalid MSP direction byte {byte:#04x}"),
            Self::ErrorResponse { code } => write!(f, "flight controller returned an MSP error for command {code}"),
            Self::OversizedLength { declared, max } => {
                write!(f, "declared size {declared} exceeds maximum {max}")
            }
            Self::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl Error for FrameError {}

impl From<ParserError> for FrameError {
    fn from(e: ParserError) -> Self {
        Self::Parse(e)
    }
}
