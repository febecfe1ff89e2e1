//! The `MspPayload`/`Message` traits tie the command registry together
//! behind one enum, mirroring `mav_proto::message`.

use crate::error::ParserError;

/// Implemented once per concrete command payload (`FcVariant`, `Attitude`,
/// ...); `MspMessage::ser`/`parse` dispatch to these.
pub trait MspPayload: Sized {
    const CODE: u16;
    const NAME: &'static str;
    const MIN_LEN: usize;

    /// Write the payload into `buf`, returning the number of bytes written.
    fn ser(&self, buf: &mut [u8]) -> usize;

    /// Parse from a payload of at least `MIN_LEN` bytes.
    fn deser(payload: &[u8]) -> Result<Self, ParserError>;
}

/// The command-wide union of payloads, plus the passthrough `Unknown`
/// variant used for codes with no registry entry.
pub trait Message: Sized {
    fn code(&self) -> u16;
    fn name(&self) -> &'static str;
    fn ser(&self, buf: &mut [u8]) -> usize;
    fn parse(code: u16, payload: &[u8]) -> Result<Self, ParserError>;
}

pub const MAX_PAYLOAD_LEN: usize = 256;
