//! The command registry: MSP command codes, payload layouts, and the
//! `MspMessage` union, mirroring `mav_proto::dialect::common`'s shape but
//! for the commands this workspace actually speaks (spec.md §4.5's MSP
//! identity/telemetry set). Codes and field layouts follow the published
//! Betaflight/iNav MSP protocol for the implemented subset — see
//! DESIGN.md.

use crate::bytes::{Bytes, BytesMut};
use crate::error::ParserError;
use crate::message::{Message, MspPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion {
    pub protocol_version: u8,
    pub api_major: u8,
    pub api_minor: u8,
}

impl MspPayload for ApiVersion {
    const CODE: u16 = 1;
    const NAME: &'static str = "MSP_API_VERSION";
    const MIN_LEN: usize = 3;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u8(self.protocol_version);
        w.put_u8(self.api_major);
        w.put_u8(self.api_minor);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        Ok(Self {
            protocol_version: r.get_u8().unwrap(),
            api_major: r.get_u8().unwrap(),
            api_minor: r.get_u8().unwrap(),
        })
    }
}

/// `MSP_FC_VARIANT`: a 4-character ASCII identifier, e.g. `"INAV"`,
/// `"BTFL"`, `"CLFL"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcVariant {
    pub identifier: [u8; 4],
}

impl FcVariant {
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.identifier)
    }
}

impl MspPayload for FcVariant {
    const CODE: u16 = 2;
    const NAME: &'static str = "MSP_FC_VARIANT";
    const MIN_LEN: usize = 4;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_slice(&self.identifier);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut identifier = [0u8; 4];
        identifier.copy_from_slice(&payload[..4]);
        Ok(Self { identifier })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl MspPayload for FcVersion {
    const CODE: u16 = 3;
    const NAME: &'static str = "MSP_FC_VERSION";
    const MIN_LEN: usize = 3;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u8(self.major);
        w.put_u8(self.minor);
        w.put_u8(self.patch);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        Ok(Self {
            major: r.get_u8().unwrap(),
            minor: r.get_u8().unwrap(),
            patch: r.get_u8().unwrap(),
        })
    }
}

/// `MSP_MODE_RANGES`: a flat list of `(box_id, aux_channel, start_step,
/// end_step)` tuples, one per configured mode range — the table the
/// telemetry aggregator's MSP flight-mode resolution walks (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRange {
    pub box_id: u8,
    pub aux_channel_index: u8,
    pub start_step: u8,
    pub end_step: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRanges {
    pub ranges: Vec<ModeRange>,
}

impl MspPayload for ModeRanges {
    const CODE: u16 = 34;
    const NAME: &'static str = "MSP_MODE_RANGES";
    const MIN_LEN: usize = 0;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        for r in &self.ranges {
            w.put_u8(r.box_id);
            w.put_u8(r.aux_channel_index);
            w.put_u8(r.start_step);
            w.put_u8(r.end_step);
        }
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        let mut ranges = Vec::with_capacity(payload.len() / 4);
        while payload.len() - ranges.len() * 4 >= 4 {
            ranges.push(ModeRange {
                box_id: r.get_u8().unwrap(),
                aux_channel_index: r.get_u8().unwrap(),
                start_step: r.get_u8().unwrap(),
                end_step: r.get_u8().unwrap(),
            });
        }
        Ok(Self { ranges })
    }
}

/// `MSP_BOXIDS`: one byte per active "box" (arming, angle, horizon, ...) in
/// firmware-defined order; index into this list plus the matching
/// `ModeRange` resolves a flight-mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxIds {
    pub ids: Vec<u8>,
}

impl MspPayload for BoxIds {
    const CODE: u16 = 119;
    const NAME: &'static str = "MSP_BOXIDS";
    const MIN_LEN: usize = 0;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_slice(&self.ids);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        Ok(Self { ids: payload.to_vec() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub cycle_time: u16,
    pub i2c_errors: u16,
    pub sensor_flags: u16,
    pub mode_flags: u32,
    pub current_profile: u8,
}

impl MspPayload for Status {
    const CODE: u16 = 101;
    const NAME: &'static str = "MSP_STATUS";
    const MIN_LEN: usize = 11;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.cycle_time);
        w.put_u16_le(self.i2c_errors);
        w.put_u16_le(self.sensor_flags);
        w.put_u32_le(self.mode_flags);
        w.put_u8(self.current_profile);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        Ok(Self {
            cycle_time: r.get_u16_le().unwrap(),
            i2c_errors: r.get_u16_le().unwrap(),
            sensor_flags: r.get_u16_le().unwrap(),
            mode_flags: r.get_u32_le().unwrap(),
            current_profile: r.get_u8().unwrap(),
        })
    }
}

/// `MSP_RC`: one little-endian `u16` pulse width per channel. Channel count
/// is implied by the payload length, not carried as a separate field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rc {
    pub channels: Vec<u16>,
}

impl MspPayload for Rc {
    const CODE: u16 = 105;
    const NAME: &'static str = "MSP_RC";
    const MIN_LEN: usize = 0;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        for &ch in &self.channels {
            w.put_u16_le(ch);
        }
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        let mut channels = Vec::with_capacity(payload.len() / 2);
        while payload.len() - channels.len() * 2 >= 2 {
            channels.push(r.get_u16_le().unwrap());
        }
        Ok(Self { channels })
    }
}

/// `MSP_SET_RAW_RC`: identical wire layout to [`Rc`], sent GCS->FC by the
/// RC-override controller (C9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRawRc {
    pub channels: Vec<u16>,
}

impl MspPayload for SetRawRc {
    const CODE: u16 = 200;
    const NAME: &'static str = "MSP_SET_RAW_RC";
    const MIN_LEN: usize = 0;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        for &ch in &self.channels {
            w.put_u16_le(ch);
        }
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        let mut channels = Vec::with_capacity(payload.len() / 2);
        while payload.len() - channels.len() * 2 >= 2 {
            channels.push(r.get_u16_le().unwrap());
        }
        Ok(Self { channels })
    }
}

/// `MSP_RAW_GPS`: lat/lon in 1e-7 degrees, altitude in meters, speed in
/// cm/s, ground course in decidegrees (spec.md §3's normalization inputs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGps {
    pub fix_type: u8,
    pub num_sat: u8,
    pub lat: i32,
    pub lon: i32,
    pub alt_m: u16,
    pub ground_speed_cm_s: u16,
    pub ground_course_decideg: u16,
}

impl MspPayload for RawGps {
    const CODE: u16 = 106;
    const NAME: &'static str = "MSP_RAW_GPS";
    const MIN_LEN: usize = 16;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u8(self.fix_type);
        w.put_u8(self.num_sat);
        w.put_i32_le(self.lat);
        w.put_i32_le(self.lon);
        w.put_u16_le(self.alt_m);
        w.put_u16_le(self.ground_speed_cm_s);
        w.put_u16_le(self.ground_course_decideg);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        Ok(Self {
            fix_type: r.get_u8().unwrap(),
            num_sat: r.get_u8().unwrap(),
            lat: r.get_i32_le().unwrap(),
            lon: r.get_i32_le().unwrap(),
            alt_m: r.get_u16_le().unwrap(),
            ground_speed_cm_s: r.get_u16_le().unwrap(),
            ground_course_decideg: r.get_u16_le().unwrap(),
        })
    }
}

/// `MSP_ATTITUDE`: roll/pitch in decidegrees, yaw in whole degrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attitude {
    pub roll_decideg: i16,
    pub pitch_decideg: i16,
    pub yaw_deg: i16,
}

impl MspPayload for Attitude {
    const CODE: u16 = 108;
    const NAME: &'static str = "MSP_ATTITUDE";
    const MIN_LEN: usize = 6;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_i16_le(self.roll_decideg);
        w.put_i16_le(self.pitch_decideg);
        w.put_i16_le(self.yaw_deg);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        Ok(Self {
            roll_decideg: r.get_i16_le().unwrap(),
            pitch_decideg: r.get_i16_le().unwrap(),
            yaw_deg: r.get_i16_le().unwrap(),
        })
    }
}

/// `MSP_ALTITUDE`: estimated altitude in centimeters, vario in cm/s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Altitude {
    pub estimated_alt_cm: i32,
    pub vario_cm_s: i16,
}

impl MspPayload for Altitude {
    const CODE: u16 = 109;
    const NAME: &'static str = "MSP_ALTITUDE";
    const MIN_LEN: usize = 6;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_i32_le(self.estimated_alt_cm);
        w.put_i16_le(self.vario_cm_s);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        Ok(Self {
            estimated_alt_cm: r.get_i32_le().unwrap(),
            vario_cm_s: r.get_i16_le().unwrap(),
        })
    }
}

/// `MSP_ANALOG`: battery voltage in 0.1V units, mAh drawn, RSSI (0..1023),
/// and current in 0.01A units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analog {
    pub vbat_decivolts: u8,
    pub mah_drawn: u16,
    pub rssi: u16,
    pub amperage_centiamps: i16,
}

impl MspPayload for Analog {
    const CODE: u16 = 110;
    const NAME: &'static str = "MSP_ANALOG";
    const MIN_LEN: usize = 7;

    fn ser(&self, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u8(self.vbat_decivolts);
        w.put_u16_le(self.mah_drawn);
        w.put_u16_le(self.rssi);
        w.put_i16_le(self.amperage_centiamps);
        w.len()
    }

    fn deser(payload: &[u8]) -> Result<Self, ParserError> {
        let mut r = Bytes::new(payload);
        Ok(Self {
            vbat_decivolts: r.get_u8().unwrap(),
            mah_drawn: r.get_u16_le().unwrap(),
            rssi: r.get_u16_le().unwrap(),
            amperage_centiamps: r.get_i16_le().unwrap(),
        })
    }
}

/// The command-wide union, plus the passthrough `Unknown` variant used for
/// codes with no registry entry (same rationale as
/// `mav_proto::dialect::common::MavMessage::Unknown`).
#[derive(Debug, Clone, PartialEq)]
pub enum MspMessage {
    ApiVersion(ApiVersion),
    FcVariant(FcVariant),
    FcVersion(FcVersion),
    ModeRanges(ModeRanges),
    BoxIds(BoxIds),
    Status(Status),
    Rc(Rc),
    SetRawRc(SetRawRc),
    RawGps(RawGps),
    Attitude(Attitude),
    Altitude(Altitude),
    Analog(Analog),
    Unknown { code: u16, payload: Vec<u8> },
}

macro_rules! dispatch_registry {
    ($macro_name:ident) => {
        $macro_name!(
            ApiVersion, FcVariant, FcVersion, ModeRanges, BoxIds, Status, Rc, SetRawRc, RawGps,
            Attitude, Altitude, Analog
        );
    };
}

impl Message for MspMessage {
    fn code(&self) -> u16 {
        match self {
            Self::ApiVersion(_) => ApiVersion::CODE,
            Self::FcVariant(_) => FcVariant::CODE,
            Self::FcVersion(_) => FcVersion::CODE,
            Self::ModeRanges(_) => ModeRanges::CODE,
            Self::BoxIds(_) => BoxIds::CODE,
            Self::Status(_) => Status::CODE,
            Self::Rc(_) => Rc::CODE,
            Self::SetRawRc(_) => SetRawRc::CODE,
            Self::RawGps(_) => RawGps::CODE,
            Self::Attitude(_) => Attitude::CODE,
            Self::Altitude(_) => Altitude::CODE,
            Self::Analog(_) => Analog::CODE,
            Self::Unknown { code, .. } => *code,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::ApiVersion(_) => ApiVersion::NAME,
            Self::FcVariant(_) => FcVariant::NAME,
            Self::FcVersion(_) => FcVersion::NAME,
            Self::ModeRanges(_) => ModeRanges::NAME,
            Self::BoxIds(_) => BoxIds::NAME,
            Self::Status(_) => Status::NAME,
            Self::Rc(_) => Rc::NAME,
            Self::SetRawRc(_) => SetRawRc::NAME,
            Self::RawGps(_) => RawGps::NAME,
            Self::Attitude(_) => Attitude::NAME,
            Self::Altitude(_) => Altitude::NAME,
            Self::Analog(_) => Analog::NAME,
            Self::Unknown { .. } => "UNKNOWN",
        }
    }

    fn ser(&self, buf: &mut [u8]) -> usize {
        match self {
            Self::ApiVersion(m) => m.ser(buf),
            Self::FcVariant(m) => m.ser(buf),
            Self::FcVersion(m) => m.ser(buf),
            Self::ModeRanges(m) => m.ser(buf),
            Self::BoxIds(m) => m.ser(buf),
            Self::Status(m) => m.ser(buf),
            Self::Rc(m) => m.ser(buf),
            Self::SetRawRc(m) => m.ser(buf),
            Self::RawGps(m) => m.ser(buf),
            Self::Attitude(m) => m.ser(buf),
            Self::Altitude(m) => m.ser(buf),
            Self::Analog(m) => m.ser(buf),
            Self::Unknown { payload, .. } => {
                buf[..payload.len()].copy_from_slice(payload);
                payload.len()
            }
        }
    }

    fn parse(code: u16, payload: &[u8]) -> Result<Self, ParserError> {
        macro_rules! try_parse {
            ($($variant:ident),+) => {
                match code {
                    $(code if code == $variant::CODE => {
                        if payload.len() < $variant::MIN_LEN {
                            return Err(ParserError::PayloadTooShort {
                                code,
                                min_len: $variant::MIN_LEN,
                                got: payload.len(),
                            });
                        }
                        Ok(Self::$variant($variant::deser(payload)?))
                    })+
                    _ => Ok(Self::Unknown { code, payload: payload.to_vec() }),
                }
            };
        }
        dispatch_registry!(try_parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attitude_roundtrips_through_ser_deser() {
        let att = Attitude {
            roll_decideg: 15,
            pitch_decideg: -42,
            yaw_deg: 180,
        };
        let mut buf = [0u8; 6];
        let n = att.ser(&mut buf);
        assert_eq!(Attitude::deser(&buf[..n]).unwrap(), att);
    }

    #[test]
    fn rc_channel_count_is_implied_by_payload_length() {
        let rc = Rc {
            channels: vec![1500, 1500, 1000, 1500, 1800, 1200],
        };
        let mut buf = [0u8; 12];
        let n = rc.ser(&mut buf);
        assert_eq!(n, 12);
        assert_eq!(Rc::deser(&buf[..n]).unwrap(), rc);
    }

    #[test]
    fn fc_variant_reports_its_ascii_identifier() {
        let v = FcVariant {
            identifier: *b"INAV",
        };
        assert_eq!(v.as_str(), "INAV");
    }

    #[test]
    fn unknown_command_round_trips_its_raw_payload() {
        let payload = vec![9, 8, 7];
        let msg = MspMessage::parse(9999, &payload).unwrap();
        assert!(matches!(msg, MspMessage::Unknown { code: 9999, .. }));
        let mut buf = [0u8; 3];
        let n = msg.ser(&mut buf);
        assert_eq!(&buf[..n], &payload[..]);
    }

    #[test]
    fn mode_ranges_parses_a_flat_tuple_list() {
        let payload = [0u8, 0, 0, 0, 1, 1, 10, 20];
        let ranges = ModeRanges::deser(&payload).unwrap();
        assert_eq!(ranges.ranges.len(), 2);
        assert_eq!(ranges.ranges[1].start_step, 10);
    }
}
