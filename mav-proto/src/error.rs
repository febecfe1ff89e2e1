//! Error types shared by the codec, parser, and registry.

use core::fmt::{Display, Formatter};
use std::error::Error;

/// Failure while turning a raw payload into a [`crate::message::MavMessage`].
#[derive(Debug)]
pub enum ParserError {
    /// No registry entry for this message id.
    UnknownMessage { id: u32 },
    /// An enum-valued field held a value with no corresponding variant.
    InvalidEnum { enum_type: &'static str, value: u32 },
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownMessage { id } => write!(f, "unknown message id {id}"),
            Self::InvalidEnum { enum_type, value } => {
                write!(f, "invalid value {value} for enum {enum_type}")
            }
        }
    }
}

impl Error for ParserError {}

/// Failure while producing a complete, CRC-checked frame from a byte stream.
#[derive(Debug)]
pub enum FrameError {
    /// The final CRC byte(s) did not match the computed checksum.
    CrcMismatch { id: u32 },
    /// `incompat_flags` carried bits this implementation does not understand.
    UnsupportedIncompatFlags { flags: u8 },
    /// The declared payload length exceeds what the frame format allows.
    OversizedLength { declared: usize, max: usize },
    Parse(ParserError),
}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CrcMismatch { id } => write!(f, "CRC mismatch decoding message {id}"),
            Self::UnsupportedIncompatFlags { flags } => {
                write!(f, "unsupported incompat_flags {flags:#04x}")
            }
            Self::OversizedLength { declared, max } => {
                write!(f, "declared length {declared} exceeds maximum {max}")
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
