//! Messages and enums from the `common` MAVLink dialect. Field layout,
//! `MIN_LEN`/`MAX_LEN`, and `CRC_EXTRA` for each message follow the
//! published dialect definition; fields are written in canonical wire order
//! (descending by primitive size, ties broken by declaration order) exactly
//! as `mavlink-bindgen` would emit them.

use crate::bytes::{Bytes, BytesMut};
use crate::error::ParserError;
use crate::message::{zero_extend, MavlinkVersion, Message, MessageData};

// ---------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------

macro_rules! mav_enum {
    ($name:ident { $($variant:ident = $val:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u32)]
        pub enum $name {
            $($variant = $val),+
        }

        impl $name {
            pub fn from_u32(v: u32) -> Result<Self, ParserError> {
                match v {
                    $($val => Ok(Self::$variant),)+
                    _ => Err(ParserError::InvalidEnum { enum_type: stringify!($name), value: v }),
                }
            }

            pub fn as_u32(self) -> u32 {
                self as u32
            }
        }
    };
}

mav_enum!(MavType {
    Generic = 0,
    FixedWing = 1,
    Quadrotor = 2,
    Helicopter = 4,
    GroundRover = 10,
    SurfaceBoat = 11,
    Submarine = 12,
    Hexarotor = 13,
    Octorotor = 14,
});

mav_enum!(MavAutopilot {
    Generic = 0,
    Ardupilotmega = 3,
    Px4 = 12,
    Invalid = 8,
});

mav_enum!(MavState {
    Uninit = 0,
    Boot = 1,
    Calibrating = 2,
    Standby = 3,
    Active = 4,
    Critical = 5,
    Emergency = 6,
    Poweroff = 7,
    FlightTermination = 8,
});

bitflags::bitflags! {
    /// `MAV_MODE_FLAG`: `base_mode` in `HEARTBEAT`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MavModeFlag: u8 {
        const CUSTOM_MODE_ENABLED = 0x01;
        const TEST_ENABLED = 0x02;
        const AUTO_ENABLED = 0x04;
        const GUIDED_ENABLED = 0x08;
        const STABILIZE_ENABLED = 0x10;
        const HIL_ENABLED = 0x20;
        const MANUAL_INPUT_ENABLED = 0x40;
        const SAFETY_ARMED = 0x80;
    }
}

mav_enum!(CoordinateFrame {
    Global = 0,
    LocalNed = 1,
    Mission = 2,
    GlobalRelativeAlt = 3,
    LocalEnu = 4,
    GlobalInt = 5,
    GlobalRelativeAltInt = 6,
});

mav_enum!(MissionResult {
    Accepted = 0,
    ErrorGeneric = 1,
    Unsupported = 3,
    NoSpace = 4,
    Invalid = 5,
    InvalidSequence = 9,
    DenyDuringFlight = 11,
});

mav_enum!(MavResult {
    Accepted = 0,
    TemporarilyRejected = 1,
    Denied = 2,
    Unsupported = 3,
    Failed = 4,
    InProgress = 5,
});

mav_enum!(MavMissionType {
    Mission = 0,
    Fence = 1,
    Rally = 2,
});

mav_enum!(MavBatteryFunction {
    Unknown = 0,
    All = 1,
    Propulsion = 2,
    Avionics = 3,
});

mav_enum!(MavBatteryType {
    Unknown = 0,
    Lipo = 1,
    Lifi = 2,
    Lion = 3,
});

mav_enum!(GpsFixType {
    NoGps = 0,
    NoFix = 1,
    Fix2d = 2,
    Fix3d = 3,
    Dgps = 4,
    Rtk = 6,
});

/// `MAV_CMD`: left as an opaque numeric id, the way the mission/command
/// microservices treat it — consumers match on a handful of well-known
/// values, everything else passes through unexamined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MavCmd(pub u16);

impl MavCmd {
    pub const NAV_WAYPOINT: MavCmd = MavCmd(16);
    pub const NAV_LOITER_UNLIM: MavCmd = MavCmd(17);
    pub const NAV_RETURN_TO_LAUNCH: MavCmd = MavCmd(20);
    pub const NAV_LAND: MavCmd = MavCmd(21);
    pub const NAV_TAKEOFF: MavCmd = MavCmd(22);
    pub const DO_SET_MODE: MavCmd = MavCmd(176);
    pub const COMPONENT_ARM_DISARM: MavCmd = MavCmd(400);
    pub const MISSION_START: MavCmd = MavCmd(300);
    pub const REQUEST_MESSAGE: MavCmd = MavCmd(512);
}

// ---------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Heartbeat {
    pub custom_mode: u32,
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub system_status: u8,
    pub mavlink_version: u8,
}

impl MessageData for Heartbeat {
    const ID: u32 = 0;
    const NAME: &'static str = "HEARTBEAT";
    const EXTRA_CRC: u8 = 50;
    const MIN_LEN: usize = 9;
    const MAX_LEN: usize = 9;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u32_le(self.custom_mode);
        w.put_u8(self.mav_type);
        w.put_u8(self.autopilot);
        w.put_u8(self.base_mode);
        w.put_u8(self.system_status);
        w.put_u8(self.mavlink_version);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            custom_mode: r.get_u32_le().unwrap(),
            mav_type: r.get_u8().unwrap(),
            autopilot: r.get_u8().unwrap(),
            base_mode: r.get_u8().unwrap(),
            system_status: r.get_u8().unwrap(),
            mavlink_version: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SysStatus {
    pub onboard_control_sensors_present: u32,
    pub onboard_control_sensors_enabled: u32,
    pub onboard_control_sensors_health: u32,
    pub load: u16,
    pub voltage_battery: u16,
    pub current_battery: i16,
    pub drop_rate_comm: u16,
    pub errors_comm: u16,
    pub errors_count1: u16,
    pub errors_count2: u16,
    pub errors_count3: u16,
    pub errors_count4: u16,
    pub battery_remaining: i8,
}

impl MessageData for SysStatus {
    const ID: u32 = 1;
    const NAME: &'static str = "SYS_STATUS";
    const EXTRA_CRC: u8 = 124;
    const MIN_LEN: usize = 31;
    const MAX_LEN: usize = 31;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u32_le(self.onboard_control_sensors_present);
        w.put_u32_le(self.onboard_control_sensors_enabled);
        w.put_u32_le(self.onboard_control_sensors_health);
        w.put_u16_le(self.load);
        w.put_u16_le(self.voltage_battery);
        w.put_i16_le(self.current_battery);
        w.put_u16_le(self.drop_rate_comm);
        w.put_u16_le(self.errors_comm);
        w.put_u16_le(self.errors_count1);
        w.put_u16_le(self.errors_count2);
        w.put_u16_le(self.errors_count3);
        w.put_u16_le(self.errors_count4);
        w.put_i8(self.battery_remaining);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            onboard_control_sensors_present: r.get_u32_le().unwrap(),
            onboard_control_sensors_enabled: r.get_u32_le().unwrap(),
            onboard_control_sensors_health: r.get_u32_le().unwrap(),
            load: r.get_u16_le().unwrap(),
            voltage_battery: r.get_u16_le().unwrap(),
            current_battery: r.get_i16_le().unwrap(),
            drop_rate_comm: r.get_u16_le().unwrap(),
            errors_comm: r.get_u16_le().unwrap(),
            errors_count1: r.get_u16_le().unwrap(),
            errors_count2: r.get_u16_le().unwrap(),
            errors_count3: r.get_u16_le().unwrap(),
            errors_count4: r.get_u16_le().unwrap(),
            battery_remaining: r.get_i8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemTime {
    pub time_unix_usec: u64,
    pub time_boot_ms: u32,
}

impl MessageData for SystemTime {
    const ID: u32 = 2;
    const NAME: &'static str = "SYSTEM_TIME";
    const EXTRA_CRC: u8 = 137;
    const MIN_LEN: usize = 12;
    const MAX_LEN: usize = 12;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u64_le(self.time_unix_usec);
        w.put_u32_le(self.time_boot_ms);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            time_unix_usec: r.get_u64_le().unwrap(),
            time_boot_ms: r.get_u32_le().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ping {
    pub time_usec: u64,
    pub seq: u32,
    pub target_system: u8,
    pub target_component: u8,
}

impl MessageData for Ping {
    const ID: u32 = 4;
    const NAME: &'static str = "PING";
    const EXTRA_CRC: u8 = 237;
    const MIN_LEN: usize = 14;
    const MAX_LEN: usize = 14;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u64_le(self.time_usec);
        w.put_u32_le(self.seq);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            time_usec: r.get_u64_le().unwrap(),
            seq: r.get_u32_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamRequestRead {
    pub param_index: i16,
    pub param_id: [u8; 16],
    pub target_system: u8,
    pub target_component: u8,
}

impl MessageData for ParamRequestRead {
    const ID: u32 = 20;
    const NAME: &'static str = "PARAM_REQUEST_READ";
    const EXTRA_CRC: u8 = 214;
    const MIN_LEN: usize = 20;
    const MAX_LEN: usize = 20;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_i16_le(self.param_index);
        w.put_slice(&self.param_id);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            param_index: r.get_i16_le().unwrap(),
            param_id: r.get_array::<16>().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamRequestList {
    pub target_system: u8,
    pub target_component: u8,
}

impl MessageData for ParamRequestList {
    const ID: u32 = 21;
    const NAME: &'static str = "PARAM_REQUEST_LIST";
    const EXTRA_CRC: u8 = 159;
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 2;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamValue {
    pub param_value: f32,
    pub param_count: u16,
    pub param_index: u16,
    pub param_id: [u8; 16],
    pub param_type: u8,
}

impl MessageData for ParamValue {
    const ID: u32 = 22;
    const NAME: &'static str = "PARAM_VALUE";
    const EXTRA_CRC: u8 = 220;
    const MIN_LEN: usize = 25;
    const MAX_LEN: usize = 25;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_f32_le(self.param_value);
        w.put_u16_le(self.param_count);
        w.put_u16_le(self.param_index);
        w.put_slice(&self.param_id);
        w.put_u8(self.param_type);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            param_value: r.get_f32_le().unwrap(),
            param_count: r.get_u16_le().unwrap(),
            param_index: r.get_u16_le().unwrap(),
            param_id: r.get_array::<16>().unwrap(),
            param_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    pub param_value: f32,
    pub target_system: u8,
    pub target_component: u8,
    pub param_id: [u8; 16],
    pub param_type: u8,
}

impl MessageData for ParamSet {
    const ID: u32 = 23;
    const NAME: &'static str = "PARAM_SET";
    const EXTRA_CRC: u8 = 168;
    const MIN_LEN: usize = 23;
    const MAX_LEN: usize = 23;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_f32_le(self.param_value);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.put_slice(&self.param_id);
        w.put_u8(self.param_type);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            param_value: r.get_f32_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            param_id: r.get_array::<16>().unwrap(),
            param_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpsRawInt {
    pub time_usec: u64,
    pub lat: i32,
    pub lon: i32,
    pub alt: i32,
    pub eph: u16,
    pub epv: u16,
    pub vel: u16,
    pub cog: u16,
    pub fix_type: u8,
    pub satellites_visible: u8,
}

impl MessageData for GpsRawInt {
    const ID: u32 = 24;
    const NAME: &'static str = "GPS_RAW_INT";
    const EXTRA_CRC: u8 = 24;
    const MIN_LEN: usize = 30;
    const MAX_LEN: usize = 30;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u64_le(self.time_usec);
        w.put_i32_le(self.lat);
        w.put_i32_le(self.lon);
        w.put_i32_le(self.alt);
        w.put_u16_le(self.eph);
        w.put_u16_le(self.epv);
        w.put_u16_le(self.vel);
        w.put_u16_le(self.cog);
        w.put_u8(self.fix_type);
        w.put_u8(self.satellites_visible);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            time_usec: r.get_u64_le().unwrap(),
            lat: r.get_i32_le().unwrap(),
            lon: r.get_i32_le().unwrap(),
            alt: r.get_i32_le().unwrap(),
            eph: r.get_u16_le().unwrap(),
            epv: r.get_u16_le().unwrap(),
            vel: r.get_u16_le().unwrap(),
            cog: r.get_u16_le().unwrap(),
            fix_type: r.get_u8().unwrap(),
            satellites_visible: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attitude {
    pub time_boot_ms: u32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub rollspeed: f32,
    pub pitchspeed: f32,
    pub yawspeed: f32,
}

impl MessageData for Attitude {
    const ID: u32 = 30;
    const NAME: &'static str = "ATTITUDE";
    const EXTRA_CRC: u8 = 39;
    const MIN_LEN: usize = 28;
    const MAX_LEN: usize = 28;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u32_le(self.time_boot_ms);
        w.put_f32_le(self.roll);
        w.put_f32_le(self.pitch);
        w.put_f32_le(self.yaw);
        w.put_f32_le(self.rollspeed);
        w.put_f32_le(self.pitchspeed);
        w.put_f32_le(self.yawspeed);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            time_boot_ms: r.get_u32_le().unwrap(),
            roll: r.get_f32_le().unwrap(),
            pitch: r.get_f32_le().unwrap(),
            yaw: r.get_f32_le().unwrap(),
            rollspeed: r.get_f32_le().unwrap(),
            pitchspeed: r.get_f32_le().unwrap(),
            yawspeed: r.get_f32_le().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalPositionInt {
    pub time_boot_ms: u32,
    pub lat: i32,
    pub lon: i32,
    pub alt: i32,
    pub relative_alt: i32,
    pub vx: i16,
    pub vy: i16,
    pub vz: i16,
    pub hdg: u16,
}

impl MessageData for GlobalPositionInt {
    const ID: u32 = 33;
    const NAME: &'static str = "GLOBAL_POSITION_INT";
    const EXTRA_CRC: u8 = 104;
    const MIN_LEN: usize = 28;
    const MAX_LEN: usize = 28;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u32_le(self.time_boot_ms);
        w.put_i32_le(self.lat);
        w.put_i32_le(self.lon);
        w.put_i32_le(self.alt);
        w.put_i32_le(self.relative_alt);
        w.put_i16_le(self.vx);
        w.put_i16_le(self.vy);
        w.put_i16_le(self.vz);
        w.put_u16_le(self.hdg);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            time_boot_ms: r.get_u32_le().unwrap(),
            lat: r.get_i32_le().unwrap(),
            lon: r.get_i32_le().unwrap(),
            alt: r.get_i32_le().unwrap(),
            relative_alt: r.get_i32_le().unwrap(),
            vx: r.get_i16_le().unwrap(),
            vy: r.get_i16_le().unwrap(),
            vz: r.get_i16_le().unwrap(),
            hdg: r.get_u16_le().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RcChannels {
    pub time_boot_ms: u32,
    pub chan_raw: [u16; 18],
    pub chancount: u8,
    pub rssi: u8,
}

impl MessageData for RcChannels {
    const ID: u32 = 65;
    const NAME: &'static str = "RC_CHANNELS";
    const EXTRA_CRC: u8 = 118;
    const MIN_LEN: usize = 42;
    const MAX_LEN: usize = 42;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u32_le(self.time_boot_ms);
        for v in self.chan_raw {
            w.put_u16_le(v);
        }
        w.put_u8(self.chancount);
        w.put_u8(self.rssi);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        let time_boot_ms = r.get_u32_le().unwrap();
        let mut chan_raw = [0u16; 18];
        for c in &mut chan_raw {
            *c = r.get_u16_le().unwrap();
        }
        Ok(Self {
            time_boot_ms,
            chan_raw,
            chancount: r.get_u8().unwrap(),
            rssi: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDataStream {
    pub req_message_rate: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub req_stream_id: u8,
    pub start_stop: u8,
}

impl MessageData for RequestDataStream {
    const ID: u32 = 66;
    const NAME: &'static str = "REQUEST_DATA_STREAM";
    const EXTRA_CRC: u8 = 148;
    const MIN_LEN: usize = 6;
    const MAX_LEN: usize = 6;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.req_message_rate);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.put_u8(self.req_stream_id);
        w.put_u8(self.start_stop);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            req_message_rate: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            req_stream_id: r.get_u8().unwrap(),
            start_stop: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VfrHud {
    pub airspeed: f32,
    pub groundspeed: f32,
    pub alt: f32,
    pub climb: f32,
    pub heading: i16,
    pub throttle: u16,
}

impl MessageData for VfrHud {
    const ID: u32 = 74;
    const NAME: &'static str = "VFR_HUD";
    const EXTRA_CRC: u8 = 20;
    const MIN_LEN: usize = 20;
    const MAX_LEN: usize = 20;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_f32_le(self.airspeed);
        w.put_f32_le(self.groundspeed);
        w.put_f32_le(self.alt);
        w.put_f32_le(self.climb);
        w.put_i16_le(self.heading);
        w.put_u16_le(self.throttle);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            airspeed: r.get_f32_le().unwrap(),
            groundspeed: r.get_f32_le().unwrap(),
            alt: r.get_f32_le().unwrap(),
            climb: r.get_f32_le().unwrap(),
            heading: r.get_i16_le().unwrap(),
            throttle: r.get_u16_le().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandInt {
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub x: i32,
    pub y: i32,
    pub z: f32,
    pub command: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub frame: u8,
    pub current: u8,
    pub autocontinue: u8,
}

impl MessageData for CommandInt {
    const ID: u32 = 75;
    const NAME: &'static str = "COMMAND_INT";
    const EXTRA_CRC: u8 = 158;
    const MIN_LEN: usize = 35;
    const MAX_LEN: usize = 35;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_f32_le(self.param1);
        w.put_f32_le(self.param2);
        w.put_f32_le(self.param3);
        w.put_f32_le(self.param4);
        w.put_i32_le(self.x);
        w.put_i32_le(self.y);
        w.put_f32_le(self.z);
        w.put_u16_le(self.command);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.put_u8(self.frame);
        w.put_u8(self.current);
        w.put_u8(self.autocontinue);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            param1: r.get_f32_le().unwrap(),
            param2: r.get_f32_le().unwrap(),
            param3: r.get_f32_le().unwrap(),
            param4: r.get_f32_le().unwrap(),
            x: r.get_i32_le().unwrap(),
            y: r.get_i32_le().unwrap(),
            z: r.get_f32_le().unwrap(),
            command: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            frame: r.get_u8().unwrap(),
            current: r.get_u8().unwrap(),
            autocontinue: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandLong {
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub param5: f32,
    pub param6: f32,
    pub param7: f32,
    pub command: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub confirmation: u8,
}

impl MessageData for CommandLong {
    const ID: u32 = 76;
    const NAME: &'static str = "COMMAND_LONG";
    const EXTRA_CRC: u8 = 152;
    const MIN_LEN: usize = 33;
    const MAX_LEN: usize = 33;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_f32_le(self.param1);
        w.put_f32_le(self.param2);
        w.put_f32_le(self.param3);
        w.put_f32_le(self.param4);
        w.put_f32_le(self.param5);
        w.put_f32_le(self.param6);
        w.put_f32_le(self.param7);
        w.put_u16_le(self.command);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.put_u8(self.confirmation);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            param1: r.get_f32_le().unwrap(),
            param2: r.get_f32_le().unwrap(),
            param3: r.get_f32_le().unwrap(),
            param4: r.get_f32_le().unwrap(),
            param5: r.get_f32_le().unwrap(),
            param6: r.get_f32_le().unwrap(),
            param7: r.get_f32_le().unwrap(),
            command: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            confirmation: r.get_u8().unwrap(),
        })
    }
}

/// `progress` is a v2 extension field: present on the wire only when the
/// sender writes v2 and doesn't trim it as trailing zero (microservices
/// that use it, like mission upload's in-progress acks, always set it
/// nonzero). Absent payloads deserialize it as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandAck {
    pub command: u16,
    pub result: u8,
    pub progress: u8,
}

impl MessageData for CommandAck {
    const ID: u32 = 77;
    const NAME: &'static str = "COMMAND_ACK";
    const EXTRA_CRC: u8 = 143;
    const MIN_LEN: usize = 3;
    const MAX_LEN: usize = 4;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.command);
        w.put_u8(self.result);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.progress);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            command: r.get_u16_le().unwrap(),
            result: r.get_u8().unwrap(),
            progress: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionItemInt {
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub x: i32,
    pub y: i32,
    pub z: f32,
    pub seq: u16,
    pub command: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub frame: u8,
    pub current: u8,
    pub autocontinue: u8,
    pub mission_type: u8,
}

impl MessageData for MissionItemInt {
    const ID: u32 = 73;
    const NAME: &'static str = "MISSION_ITEM_INT";
    const EXTRA_CRC: u8 = 38;
    const MIN_LEN: usize = 37;
    const MAX_LEN: usize = 38;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_f32_le(self.param1);
        w.put_f32_le(self.param2);
        w.put_f32_le(self.param3);
        w.put_f32_le(self.param4);
        w.put_i32_le(self.x);
        w.put_i32_le(self.y);
        w.put_f32_le(self.z);
        w.put_u16_le(self.seq);
        w.put_u16_le(self.command);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.put_u8(self.frame);
        w.put_u8(self.current);
        w.put_u8(self.autocontinue);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.mission_type);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            param1: r.get_f32_le().unwrap(),
            param2: r.get_f32_le().unwrap(),
            param3: r.get_f32_le().unwrap(),
            param4: r.get_f32_le().unwrap(),
            x: r.get_i32_le().unwrap(),
            y: r.get_i32_le().unwrap(),
            z: r.get_f32_le().unwrap(),
            seq: r.get_u16_le().unwrap(),
            command: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            frame: r.get_u8().unwrap(),
            current: r.get_u8().unwrap(),
            autocontinue: r.get_u8().unwrap(),
            mission_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionItem {
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub seq: u16,
    pub command: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub frame: u8,
    pub current: u8,
    pub autocontinue: u8,
    pub mission_type: u8,
}

impl MessageData for MissionItem {
    const ID: u32 = 39;
    const NAME: &'static str = "MISSION_ITEM";
    const EXTRA_CRC: u8 = 254;
    const MIN_LEN: usize = 37;
    const MAX_LEN: usize = 38;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_f32_le(self.param1);
        w.put_f32_le(self.param2);
        w.put_f32_le(self.param3);
        w.put_f32_le(self.param4);
        w.put_f32_le(self.x);
        w.put_f32_le(self.y);
        w.put_f32_le(self.z);
        w.put_u16_le(self.seq);
        w.put_u16_le(self.command);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.put_u8(self.frame);
        w.put_u8(self.current);
        w.put_u8(self.autocontinue);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.mission_type);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            param1: r.get_f32_le().unwrap(),
            param2: r.get_f32_le().unwrap(),
            param3: r.get_f32_le().unwrap(),
            param4: r.get_f32_le().unwrap(),
            x: r.get_f32_le().unwrap(),
            y: r.get_f32_le().unwrap(),
            z: r.get_f32_le().unwrap(),
            seq: r.get_u16_le().unwrap(),
            command: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            frame: r.get_u8().unwrap(),
            current: r.get_u8().unwrap(),
            autocontinue: r.get_u8().unwrap(),
            mission_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionRequest {
    pub seq: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub mission_type: u8,
}

impl MessageData for MissionRequest {
    const ID: u32 = 40;
    const NAME: &'static str = "MISSION_REQUEST";
    const EXTRA_CRC: u8 = 230;
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 5;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.seq);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.mission_type);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            seq: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            mission_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionRequestInt {
    pub seq: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub mission_type: u8,
}

impl MessageData for MissionRequestInt {
    const ID: u32 = 51;
    const NAME: &'static str = "MISSION_REQUEST_INT";
    const EXTRA_CRC: u8 = 196;
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 5;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.seq);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.mission_type);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            seq: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            mission_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionSetCurrent {
    pub seq: u16,
    pub target_system: u8,
    pub target_component: u8,
}

impl MessageData for MissionSetCurrent {
    const ID: u32 = 41;
    const NAME: &'static str = "MISSION_SET_CURRENT";
    const EXTRA_CRC: u8 = 28;
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 4;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.seq);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            seq: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionCurrent {
    pub seq: u16,
}

impl MessageData for MissionCurrent {
    const ID: u32 = 42;
    const NAME: &'static str = "MISSION_CURRENT";
    const EXTRA_CRC: u8 = 28;
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 2;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.seq);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            seq: r.get_u16_le().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionRequestList {
    pub target_system: u8,
    pub target_component: u8,
    pub mission_type: u8,
}

impl MessageData for MissionRequestList {
    const ID: u32 = 43;
    const NAME: &'static str = "MISSION_REQUEST_LIST";
    const EXTRA_CRC: u8 = 132;
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 3;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.mission_type);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            mission_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionCount {
    pub count: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub mission_type: u8,
}

impl MessageData for MissionCount {
    const ID: u32 = 44;
    const NAME: &'static str = "MISSION_COUNT";
    const EXTRA_CRC: u8 = 221;
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 5;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.count);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.mission_type);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            count: r.get_u16_le().unwrap(),
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            mission_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionClearAll {
    pub target_system: u8,
    pub target_component: u8,
    pub mission_type: u8,
}

impl MessageData for MissionClearAll {
    const ID: u32 = 45;
    const NAME: &'static str = "MISSION_CLEAR_ALL";
    const EXTRA_CRC: u8 = 232;
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 3;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.mission_type);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            mission_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionItemReached {
    pub seq: u16,
}

impl MessageData for MissionItemReached {
    const ID: u32 = 46;
    const NAME: &'static str = "MISSION_ITEM_REACHED";
    const EXTRA_CRC: u8 = 11;
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 2;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u16_le(self.seq);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            seq: r.get_u16_le().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionAck {
    pub target_system: u8,
    pub target_component: u8,
    pub mission_result: u8,
    pub mission_type: u8,
}

impl MessageData for MissionAck {
    const ID: u32 = 47;
    const NAME: &'static str = "MISSION_ACK";
    const EXTRA_CRC: u8 = 153;
    const MIN_LEN: usize = 3;
    const MAX_LEN: usize = 4;

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.put_u8(self.mission_result);
        if version == MavlinkVersion::V2 {
            w.put_u8(self.mission_type);
        }
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
            mission_result: r.get_u8().unwrap(),
            mission_type: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RcChannelsOverride {
    pub chan_raw: [u16; 8],
    pub target_system: u8,
    pub target_component: u8,
}

impl MessageData for RcChannelsOverride {
    const ID: u32 = 70;
    const NAME: &'static str = "RC_CHANNELS_OVERRIDE";
    const EXTRA_CRC: u8 = 124;
    const MIN_LEN: usize = 18;
    const MAX_LEN: usize = 18;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        for v in self.chan_raw {
            w.put_u16_le(v);
        }
        w.put_u8(self.target_system);
        w.put_u8(self.target_component);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        let mut chan_raw = [0u16; 8];
        for c in &mut chan_raw {
            *c = r.get_u16_le().unwrap();
        }
        Ok(Self {
            chan_raw,
            target_system: r.get_u8().unwrap(),
            target_component: r.get_u8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageInterval {
    pub interval_us: i32,
    pub message_id: u16,
}

impl MessageData for MessageInterval {
    const ID: u32 = 244;
    const NAME: &'static str = "MESSAGE_INTERVAL";
    const EXTRA_CRC: u8 = 95;
    const MIN_LEN: usize = 6;
    const MAX_LEN: usize = 6;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_i32_le(self.interval_us);
        w.put_u16_le(self.message_id);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            interval_us: r.get_i32_le().unwrap(),
            message_id: r.get_u16_le().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutopilotVersion {
    pub capabilities: u64,
    pub uid: u64,
    pub flight_sw_version: u32,
    pub middleware_sw_version: u32,
    pub os_sw_version: u32,
    pub board_version: u32,
    pub vendor_id: u16,
    pub product_id: u16,
    pub flight_custom_version: [u8; 8],
    pub middleware_custom_version: [u8; 8],
    pub os_custom_version: [u8; 8],
}

impl MessageData for AutopilotVersion {
    const ID: u32 = 148;
    const NAME: &'static str = "AUTOPILOT_VERSION";
    const EXTRA_CRC: u8 = 178;
    const MIN_LEN: usize = 60;
    const MAX_LEN: usize = 60;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_u64_le(self.capabilities);
        w.put_u64_le(self.uid);
        w.put_u32_le(self.flight_sw_version);
        w.put_u32_le(self.middleware_sw_version);
        w.put_u32_le(self.os_sw_version);
        w.put_u32_le(self.board_version);
        w.put_u16_le(self.vendor_id);
        w.put_u16_le(self.product_id);
        w.put_slice(&self.flight_custom_version);
        w.put_slice(&self.middleware_custom_version);
        w.put_slice(&self.os_custom_version);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        Ok(Self {
            capabilities: r.get_u64_le().unwrap(),
            uid: r.get_u64_le().unwrap(),
            flight_sw_version: r.get_u32_le().unwrap(),
            middleware_sw_version: r.get_u32_le().unwrap(),
            os_sw_version: r.get_u32_le().unwrap(),
            board_version: r.get_u32_le().unwrap(),
            vendor_id: r.get_u16_le().unwrap(),
            product_id: r.get_u16_le().unwrap(),
            flight_custom_version: r.get_array::<8>().unwrap(),
            middleware_custom_version: r.get_array::<8>().unwrap(),
            os_custom_version: r.get_array::<8>().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryStatus {
    pub current_consumed: i32,
    pub energy_consumed: i32,
    pub temperature: i16,
    pub voltages: [u16; 10],
    pub current_battery: i16,
    pub id: u8,
    pub battery_function: u8,
    pub battery_type: u8,
    pub battery_remaining: i8,
}

impl MessageData for BatteryStatus {
    const ID: u32 = 147;
    const NAME: &'static str = "BATTERY_STATUS";
    const EXTRA_CRC: u8 = 154;
    const MIN_LEN: usize = 36;
    const MAX_LEN: usize = 36;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_i32_le(self.current_consumed);
        w.put_i32_le(self.energy_consumed);
        w.put_i16_le(self.temperature);
        for v in self.voltages {
            w.put_u16_le(v);
        }
        w.put_i16_le(self.current_battery);
        w.put_u8(self.id);
        w.put_u8(self.battery_function);
        w.put_u8(self.battery_type);
        w.put_i8(self.battery_remaining);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        let current_consumed = r.get_i32_le().unwrap();
        let energy_consumed = r.get_i32_le().unwrap();
        let temperature = r.get_i16_le().unwrap();
        let mut voltages = [0u16; 10];
        for v in &mut voltages {
            *v = r.get_u16_le().unwrap();
        }
        Ok(Self {
            current_consumed,
            energy_consumed,
            temperature,
            voltages,
            current_battery: r.get_i16_le().unwrap(),
            id: r.get_u8().unwrap(),
            battery_function: r.get_u8().unwrap(),
            battery_type: r.get_u8().unwrap(),
            battery_remaining: r.get_i8().unwrap(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomePosition {
    pub latitude: i32,
    pub longitude: i32,
    pub altitude: i32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub q: [f32; 4],
    pub approach_x: f32,
    pub approach_y: f32,
    pub approach_z: f32,
}

impl MessageData for HomePosition {
    const ID: u32 = 242;
    const NAME: &'static str = "HOME_POSITION";
    const EXTRA_CRC: u8 = 104;
    const MIN_LEN: usize = 52;
    const MAX_LEN: usize = 52;

    fn ser(&self, _version: MavlinkVersion, buf: &mut [u8]) -> usize {
        let mut w = BytesMut::new(buf);
        w.put_i32_le(self.latitude);
        w.put_i32_le(self.longitude);
        w.put_i32_le(self.altitude);
        w.put_f32_le(self.x);
        w.put_f32_le(self.y);
        w.put_f32_le(self.z);
        for v in self.q {
            w.put_f32_le(v);
        }
        w.put_f32_le(self.approach_x);
        w.put_f32_le(self.approach_y);
        w.put_f32_le(self.approach_z);
        w.len()
    }

    fn deser(_version: MavlinkVersion, payload: &[u8]) -> Result<Self, ParserError> {
        let buf = zero_extend::<{ Self::MAX_LEN }>(payload);
        let mut r = Bytes::new(&buf);
        let latitude = r.get_i32_le().unwrap();
        let longitude = r.get_i32_le().unwrap();
        let altitude = r.get_i32_le().unwrap();
        let x = r.get_f32_le().unwrap();
        let y = r.get_f32_le().unwrap();
        let z = r.get_f32_le().unwrap();
        let mut q = [0f32; 4];
        for v in &mut q {
            *v = r.get_f32_le().unwrap();
        }
        Ok(Self {
            latitude,
            longitude,
            altitude,
            x,
            y,
            z,
            q,
            approach_x: r.get_f32_le().unwrap(),
            approach_y: r.get_f32_le().unwrap(),
            approach_z: r.get_f32_le().unwrap(),
        })
    }
}

// ---------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------

/// The dialect union. `Unknown` carries the raw payload through for ids
/// outside the registry (§4.1) so a caller can still log or forward it.
#[derive(Debug, Clone, PartialEq)]
pub enum MavMessage {
    Heartbeat(Heartbeat),
    SysStatus(SysStatus),
    SystemTime(SystemTime),
    Ping(Ping),
    ParamRequestRead(ParamRequestRead),
    ParamRequestList(ParamRequestList),
    ParamValue(ParamValue),
    ParamSet(ParamSet),
    GpsRawInt(GpsRawInt),
    Attitude(Attitude),
    GlobalPositionInt(GlobalPositionInt),
    RcChannels(RcChannels),
    RequestDataStream(RequestDataStream),
    VfrHud(VfrHud),
    CommandInt(CommandInt),
    CommandLong(CommandLong),
    CommandAck(CommandAck),
    MissionItem(MissionItem),
    MissionItemInt(MissionItemInt),
    MissionRequest(MissionRequest),
    MissionRequestInt(MissionRequestInt),
    MissionSetCurrent(MissionSetCurrent),
    MissionCurrent(MissionCurrent),
    MissionRequestList(MissionRequestList),
    MissionCount(MissionCount),
    MissionClearAll(MissionClearAll),
    MissionItemReached(MissionItemReached),
    MissionAck(MissionAck),
    RcChannelsOverride(RcChannelsOverride),
    MessageInterval(MessageInterval),
    AutopilotVersion(AutopilotVersion),
    BatteryStatus(BatteryStatus),
    HomePosition(HomePosition),
    Unknown { id: u32, payload: Vec<u8> },
}

macro_rules! dispatch_registry {
    ($macro_name:ident) => {
        $macro_name!(
            Heartbeat, SysStatus, SystemTime, Ping, ParamRequestRead, ParamRequestList,
            ParamValue, ParamSet, GpsRawInt, Attitude, GlobalPositionInt, RcChannels,
            RequestDataStream, VfrHud, CommandInt, CommandLong, CommandAck, MissionItem,
            MissionItemInt, MissionRequest, MissionRequestInt, MissionSetCurrent,
            MissionCurrent, MissionRequestList, MissionCount, MissionClearAll,
            MissionItemReached, MissionAck, RcChannelsOverride, MessageInterval,
            AutopilotVersion, BatteryStatus, HomePosition
        );
    };
}

impl Message for MavMessage {
    fn message_id(&self) -> u32 {
        match self {
            Self::Heartbeat(_) => Heartbeat::ID,
            Self::SysStatus(_) => SysStatus::ID,
            Self::SystemTime(_) => SystemTime::ID,
            Self::Ping(_) => Ping::ID,
            Self::ParamRequestRead(_) => ParamRequestRead::ID,
            Self::ParamRequestList(_) => ParamRequestList::ID,
            Self::ParamValue(_) => ParamValue::ID,
            Self::ParamSet(_) => ParamSet::ID,
            Self::GpsRawInt(_) => GpsRawInt::ID,
            Self::Attitude(_) => Attitude::ID,
            Self::GlobalPositionInt(_) => GlobalPositionInt::ID,
            Self::RcChannels(_) => RcChannels::ID,
            Self::RequestDataStream(_) => RequestDataStream::ID,
            Self::VfrHud(_) => VfrHud::ID,
            Self::CommandInt(_) => CommandInt::ID,
            Self::CommandLong(_) => CommandLong::ID,
            Self::CommandAck(_) => CommandAck::ID,
            Self::MissionItem(_) => MissionItem::ID,
            Self::MissionItemInt(_) => MissionItemInt::ID,
            Self::MissionRequest(_) => MissionRequest::ID,
            Self::MissionRequestInt(_) => MissionRequestInt::ID,
            Self::MissionSetCurrent(_) => MissionSetCurrent::ID,
            Self::MissionCurrent(_) => MissionCurrent::ID,
            Self::MissionRequestList(_) => MissionRequestList::ID,
            Self::MissionCount(_) => MissionCount::ID,
            Self::MissionClearAll(_) => MissionClearAll::ID,
            Self::MissionItemReached(_) => MissionItemReached::ID,
            Self::MissionAck(_) => MissionAck::ID,
            Self::RcChannelsOverride(_) => RcChannelsOverride::ID,
            Self::MessageInterval(_) => MessageInterval::ID,
            Self::AutopilotVersion(_) => AutopilotVersion::ID,
            Self::BatteryStatus(_) => BatteryStatus::ID,
            Self::HomePosition(_) => HomePosition::ID,
            Self::Unknown { id, .. } => *id,
        }
    }

    fn message_name(&self) -> &'static str {
        match self {
            Self::Heartbeat(_) => Heartbeat::NAME,
            Self::SysStatus(_) => SysStatus::NAME,
            Self::SystemTime(_) => SystemTime::NAME,
            Self::Ping(_) => Ping::NAME,
            Self::ParamRequestRead(_) => ParamRequestRead::NAME,
            Self::ParamRequestList(_) => ParamRequestList::NAME,
            Self::ParamValue(_) => ParamValue::NAME,
            Self::ParamSet(_) => ParamSet::NAME,
            Self::GpsRawInt(_) => GpsRawInt::NAME,
            Self::Attitude(_) => Attitude::NAME,
            Self::GlobalPositionInt(_) => GlobalPositionInt::NAME,
            Self::RcChannels(_) => RcChannels::NAME,
            Self::RequestDataStream(_) => RequestDataStream::NAME,
            Self::VfrHud(_) => VfrHud::NAME,
            Self::CommandInt(_) => CommandInt::NAME,
            Self::CommandLong(_) => CommandLong::NAME,
            Self::CommandAck(_) => CommandAck::NAME,
            Self::MissionItem(_) => MissionItem::NAME,
            Self::MissionItemInt(_) => MissionItemInt::NAME,
            Self::MissionRequest(_) => MissionRequest::NAME,
            Self::MissionRequestInt(_) => MissionRequestInt::NAME,
            Self::MissionSetCurrent(_) => MissionSetCurrent::NAME,
            Self::MissionCurrent(_) => MissionCurrent::NAME,
            Self::MissionRequestList(_) => MissionRequestList::NAME,
            Self::MissionCount(_) => MissionCount::NAME,
            Self::MissionClearAll(_) => MissionClearAll::NAME,
            Self::MissionItemReached(_) => MissionItemReached::NAME,
            Self::MissionAck(_) => MissionAck::NAME,
            Self::RcChannelsOverride(_) => RcChannelsOverride::NAME,
            Self::MessageInterval(_) => MessageInterval::NAME,
            Self::AutopilotVersion(_) => AutopilotVersion::NAME,
            Self::BatteryStatus(_) => BatteryStatus::NAME,
            Self::HomePosition(_) => HomePosition::NAME,
            Self::Unknown { .. } => "UNKNOWN",
        }
    }

    fn ser(&self, version: MavlinkVersion, buf: &mut [u8]) -> usize {
        match self {
            Self::Heartbeat(m) => m.ser(version, buf),
            Self::SysStatus(m) => m.ser(version, buf),
            Self::SystemTime(m) => m.ser(version, buf),
            Self::Ping(m) => m.ser(version, buf),
            Self::ParamRequestRead(m) => m.ser(version, buf),
            Self::ParamRequestList(m) => m.ser(version, buf),
            Self::ParamValue(m) => m.ser(version, buf),
            Self::ParamSet(m) => m.ser(version, buf),
            Self::GpsRawInt(m) => m.ser(version, buf),
            Self::Attitude(m) => m.ser(version, buf),
            Self::GlobalPositionInt(m) => m.ser(version, buf),
            Self::RcChannels(m) => m.ser(version, buf),
            Self::RequestDataStream(m) => m.ser(version, buf),
            Self::VfrHud(m) => m.ser(version, buf),
            Self::CommandInt(m) => m.ser(version, buf),
            Self::CommandLong(m) => m.ser(version, buf),
            Self::CommandAck(m) => m.ser(version, buf),
            Self::MissionItem(m) => m.ser(version, buf),
            Self::MissionItemInt(m) => m.ser(version, buf),
            Self::MissionRequest(m) => m.ser(version, buf),
            Self::MissionRequestInt(m) => m.ser(version, buf),
            Self::MissionSetCurrent(m) => m.ser(version, buf),
            Self::MissionCurrent(m) => m.ser(version, buf),
            Self::MissionRequestList(m) => m.ser(version, buf),
            Self::MissionCount(m) => m.ser(version, buf),
            Self::MissionClearAll(m) => m.ser(version, buf),
            Self::MissionItemReached(m) => m.ser(version, buf),
            Self::MissionAck(m) => m.ser(version, buf),
            Self::RcChannelsOverride(m) => m.ser(version, buf),
            Self::MessageInterval(m) => m.ser(version, buf),
            Self::AutopilotVersion(m) => m.ser(version, buf),
            Self::BatteryStatus(m) => m.ser(version, buf),
            Self::HomePosition(m) => m.ser(version, buf),
            Self::Unknown { payload, .. } => {
                buf[..payload.len()].copy_from_slice(payload);
                payload.len()
            }
        }
    }

    fn parse(version: MavlinkVersion, id: u32, payload: &[u8]) -> Result<Self, ParserError> {
        // No minimum-length guard here: a v2 sender is free to truncate any
        // trailing run of zero bytes (spec.md P2), including down to an
        // empty payload, so `payload.len() < MIN_LEN` is a legitimate v2
        // frame, not an error. `deser` below zero-extends up to `MAX_LEN`
        // (`Bytes::zero_extend`) the same way for v1 and v2 (P5).
        macro_rules! try_parse {
            ($($variant:ident),+) => {
                match id {
                    $(id if id == $variant::ID => {
                        Ok(Self::$variant($variant::deser(version, payload)?))
                    })+
                    _ => Ok(Self::Unknown { id, payload: payload.to_vec() }),
                }
            };
        }
        dispatch_registry!(try_parse)
    }

    fn extra_crc(id: u32) -> Option<u8> {
        macro_rules! try_crc {
            ($($variant:ident),+) => {
                match id {
                    $(id if id == $variant::ID => Some($variant::EXTRA_CRC),)+
                    _ => None,
                }
            };
        }
        dispatch_registry!(try_crc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_roundtrips_through_ser_deser() {
        let hb = Heartbeat {
            custom_mode: 42,
            mav_type: MavType::Quadrotor.as_u32() as u8,
            autopilot: MavAutopilot::Ardupilotmega.as_u32() as u8,
            base_mode: (MavModeFlag::SAFETY_ARMED | MavModeFlag::STABILIZE_ENABLED).bits(),
            system_status: MavState::Active.as_u32() as u8,
            mavlink_version: 3,
        };
        let mut buf = [0u8; Heartbeat::MAX_LEN];
        let n = hb.ser(MavlinkVersion::V2, &mut buf);
        let back = Heartbeat::deser(MavlinkVersion::V2, &buf[..n]).unwrap();
        assert_eq!(hb, back);
    }

    #[test]
    fn command_ack_progress_is_zero_when_absent_from_v1_payload() {
        let payload = [1u8, 0, 0]; // command=1, result=0, no progress byte
        let ack = CommandAck::deser(MavlinkVersion::V1, &payload).unwrap();
        assert_eq!(ack.progress, 0);
    }

    #[test]
    fn mission_item_int_trims_extension_byte_under_v1() {
        let item = MissionItemInt {
            param1: 0.0,
            param2: 0.0,
            param3: 0.0,
            param4: 0.0,
            x: 473_000_000,
            y: -122_000_000,
            z: 50.0,
            seq: 3,
            command: MavCmd::NAV_WAYPOINT.0,
            target_system: 1,
            target_component: 1,
            frame: CoordinateFrame::GlobalRelativeAltInt.as_u32() as u8,
            current: 0,
            autocontinue: 1,
            mission_type: MavMissionType::Mission.as_u32() as u8,
        };
        let mut buf = [0u8; MissionItemInt::MAX_LEN];
        let n = item.ser(MavlinkVersion::V1, &mut buf);
        assert_eq!(n, MissionItemInt::MIN_LEN);
    }

    #[test]
    fn unknown_message_round_trips_its_raw_payload() {
        let payload = vec![1, 2, 3, 4];
        let msg = MavMessage::parse(MavlinkVersion::V2, 9999, &payload).unwrap();
        assert!(matches!(msg, MavMessage::Unknown { id: 9999, .. }));
        assert_eq!(MavMessage::extra_crc(9999), None);
        let mut buf = [0u8; 4];
        let n = msg.ser(MavlinkVersion::V2, &mut buf);
        assert_eq!(&buf[..n], &payload[..]);
    }
}
