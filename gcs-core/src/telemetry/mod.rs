//! Telemetry aggregator (C8): projects decoded frames from either protocol
//! into one [`VehicleState`] snapshot, tracking a last-update timestamp per
//! category and applying the cross-protocol normalization rules of
//! spec.md §4.7 (angles to degrees, `*_INT` coordinates to degrees,
//! altitudes to meters).

pub mod modes;

use std::time::Instant;

use mav_proto::dialect::common::{MavAutopilot, MavMessage, MavModeFlag, MavType};
use msp_proto::commands::MspMessage;

/// Which slice of [`VehicleState`] a projection touched; used both for the
/// per-category timestamp and for the coalesced `TelemetryUpdated` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryCategory {
    Identity,
    Attitude,
    Position,
    Gps,
    Battery,
    VfrHud,
    Flight,
    RcChannels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutopilotKind {
    ArduPilot,
    Px4,
    Inav,
    Betaflight,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleKind {
    Quadrotor,
    Hexarotor,
    Octorotor,
    Helicopter,
    FixedWing,
    GroundRover,
    SurfaceBoat,
    Submarine,
    Unknown,
}

#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub system_id: u8,
    pub component_id: u8,
    pub autopilot_kind: Option<AutopilotKind>,
    pub firmware_variant: Option<String>,
    pub firmware_version: Option<String>,
    pub vehicle_kind: Option<VehicleKind>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Attitude {
    pub roll_deg: f32,
    pub pitch_deg: f32,
    pub yaw_deg: f32,
    pub rollspeed_dps: f32,
    pub pitchspeed_dps: f32,
    pub yawspeed_dps: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_msl_m: f32,
    pub alt_rel_home_m: f32,
    pub vx_m_s: f32,
    pub vy_m_s: f32,
    pub vz_m_s: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Gps {
    pub fix_kind: u8,
    pub satellites: u8,
    pub hdop: f32,
    pub raw_lat_deg: f64,
    pub raw_lon_deg: f64,
    pub raw_alt_m: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Battery {
    pub voltage_v: f32,
    pub current_a: f32,
    pub remaining_pct: Option<i8>,
    pub cell_voltage_v: Option<f32>,
    pub cell_count: Option<u8>,
    pub mah_drawn: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VfrHud {
    pub airspeed_m_s: f32,
    pub groundspeed_m_s: f32,
    pub heading_deg: i16,
    pub throttle_pct: u16,
    pub climb_m_s: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Flight {
    pub mode: Option<String>,
    pub armed: bool,
    pub is_flying: bool,
    pub arming_disable_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RcChannels {
    pub pulses: Vec<u16>,
    pub count: u8,
    pub rssi: u8,
}

#[derive(Debug, Clone, Default)]
pub struct VehicleState {
    pub identity: Identity,
    pub attitude: Attitude,
    pub position: Position,
    pub gps: Gps,
    pub battery: Battery,
    pub vfr_hud: VfrHud,
    pub flight: Flight,
    pub rc_channels: RcChannels,
}

/// Last-update instants per category, `None` until the first projection.
#[derive(Debug, Default)]
pub struct Freshness {
    identity: Option<Instant>,
    attitude: Option<Instant>,
    position: Option<Instant>,
    gps: Option<Instant>,
    battery: Option<Instant>,
    vfr_hud: Option<Instant>,
    flight: Option<Instant>,
    rc_channels: Option<Instant>,
}

impl Freshness {
    pub fn last_update(&self, category: TelemetryCategory) -> Option<Instant> {
        match category {
            TelemetryCategory::Identity => self.identity,
            TelemetryCategory::Attitude => self.attitude,
            TelemetryCategory::Position => self.position,
            TelemetryCategory::Gps => self.gps,
            TelemetryCategory::Battery => self.battery,
            TelemetryCategory::VfrHud => self.vfr_hud,
            TelemetryCategory::Flight => self.flight,
            TelemetryCategory::RcChannels => self.rc_channels,
        }
    }

    fn touch(&mut self, category: TelemetryCategory, now: Instant) {
        let slot = match category {
            TelemetryCategory::Identity => &mut self.identity,
            TelemetryCategory::Attitude => &mut self.attitude,
            TelemetryCategory::Position => &mut self.position,
            TelemetryCategory::Gps => &mut self.gps,
            TelemetryCategory::Battery => &mut self.battery,
            TelemetryCategory::VfrHud => &mut self.vfr_hud,
            TelemetryCategory::Flight => &mut self.flight,
            TelemetryCategory::RcChannels => &mut self.rc_channels,
        };
        *slot = Some(now);
    }
}

/// Owns the snapshot and its freshness bookkeeping; the session dispatcher
/// is the sole writer (invariant: "mutated only by the session dispatcher").
#[derive(Debug, Default)]
pub struct Aggregator {
    pub state: VehicleState,
    pub freshness: Freshness,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to a blank snapshot (explicit reset path, invariant 4).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn apply_mavlink(&mut self, sys_id: u8, comp_id: u8, msg: &MavMessage, now: Instant) -> Option<TelemetryCategory> {
        match msg {
            MavMessage::Heartbeat(hb) => {
                if self.state.identity.autopilot_kind.is_none() {
                    self.state.identity.system_id = sys_id;
                    self.state.identity.component_id = comp_id;
                    self.state.identity.autopilot_kind = Some(match MavAutopilot::from_u32(hb.autopilot as u32) {
                        Ok(MavAutopilot::Ardupilotmega) => AutopilotKind::ArduPilot,
                        Ok(MavAutopilot::Px4) => AutopilotKind::Px4,
                        _ => AutopilotKind::Unknown,
                    });
                    self.state.identity.vehicle_kind = Some(match MavType::from_u32(hb.mav_type as u32) {
                        Ok(MavType::Quadrotor) => VehicleKind::Quadrotor,
                        Ok(MavType::Hexarotor) => VehicleKind::Hexarotor,
                        Ok(MavType::Octorotor) => VehicleKind::Octorotor,
                        Ok(MavType::Helicopter) => VehicleKind::Helicopter,
                        Ok(MavType::FixedWing) => VehicleKind::FixedWing,
                        Ok(MavType::GroundRover) => VehicleKind::GroundRover,
                        Ok(MavType::SurfaceBoat) => VehicleKind::SurfaceBoat,
                        Ok(MavType::Submarine) => VehicleKind::Submarine,
                        _ => VehicleKind::Unknown,
                    });
                    self.freshness.touch(TelemetryCategory::Identity, now);
                }
                self.state.flight.armed = MavModeFlag::from_bits_truncate(hb.base_mode).contains(MavModeFlag::SAFETY_ARMED);
                self.state.flight.mode = Some(match self.state.identity.autopilot_kind {
                    Some(AutopilotKind::ArduPilot) => modes::arducopter_mode_name(hb.custom_mode).to_string(),
                    Some(AutopilotKind::Px4) => modes::px4_mode_name(hb.custom_mode).to_string(),
                    _ => format!("MODE_{}", hb.custom_mode),
                });
                self.freshness.touch(TelemetryCategory::Flight, now);
                Some(TelemetryCategory::Flight)
            }
            MavMessage::Attitude(a) => {
                self.state.attitude = Attitude {
                    roll_deg: a.roll.to_degrees(),
                    pitch_deg: a.pitch.to_degrees(),
                    yaw_deg: a.yaw.to_degrees(),
                    rollspeed_dps: a.rollspeed.to_degrees(),
                    pitchspeed_dps: a.pitchspeed.to_degrees(),
                    yawspeed_dps: a.yawspeed.to_degrees(),
                };
                self.freshness.touch(TelemetryCategory::Attitude, now);
                Some(TelemetryCategory::Attitude)
            }
            MavMessage::GlobalPositionInt(p) => {
                self.state.position = Position {
                    lat_deg: p.lat as f64 * 1e-7,
                    lon_deg: p.lon as f64 * 1e-7,
                    alt_msl_m: p.alt as f32 / 1000.0,
                    alt_rel_home_m: p.relative_alt as f32 / 1000.0,
                    vx_m_s: p.vx as f32 / 100.0,
                    vy_m_s: p.vy as f32 / 100.0,
                    vz_m_s: p.vz as f32 / 100.0,
                };
                self.freshness.touch(TelemetryCategory::Position, now);
                Some(TelemetryCategory::Position)
            }
            MavMessage::GpsRawInt(g) => {
                self.state.gps = Gps {
                    fix_kind: g.fix_type,
                    satellites: g.satellites_visible,
                    hdop: g.eph as f32 / 100.0,
                    raw_lat_deg: g.lat as f64 * 1e-7,
                    raw_lon_deg: g.lon as f64 * 1e-7,
                    raw_alt_m: g.alt as f32 / 1000.0,
                };
                self.freshness.touch(TelemetryCategory::Gps, now);
                Some(TelemetryCategory::Gps)
            }
            MavMessage::SysStatus(s) => {
                self.state.battery.voltage_v = s.voltage_battery as f32 / 1000.0;
                self.state.battery.current_a = if s.current_battery < 0 {
                    0.0
                } else {
                    s.current_battery as f32 / 100.0
                };
                self.state.battery.remaining_pct = if s.battery_remaining < 0 {
                    None
                } else {
                    Some(s.battery_remaining)
                };
                self.freshness.touch(TelemetryCategory::Battery, now);
                Some(TelemetryCategory::Battery)
            }
            MavMessage::BatteryStatus(b) => {
                self.state.battery.mah_drawn = if b.current_consumed < 0 {
                    None
                } else {
                    Some(b.current_consumed)
                };
                let present: Vec<u16> = b.voltages.iter().copied().filter(|&v| v != u16::MAX).collect();
                if !present.is_empty() {
                    self.state.battery.cell_count = Some(present.len() as u8);
                    self.state.battery.cell_voltage_v = Some(present[0] as f32 / 1000.0);
                }
                self.freshness.touch(TelemetryCategory::Battery, now);
                Some(TelemetryCategory::Battery)
            }
            MavMessage::VfrHud(v) => {
                self.state.vfr_hud = VfrHud {
                    airspeed_m_s: v.airspeed,
                    groundspeed_m_s: v.groundspeed,
                    heading_deg: v.heading,
                    throttle_pct: v.throttle,
                    climb_m_s: v.climb,
                };
                self.freshness.touch(TelemetryCategory::VfrHud, now);
                Some(TelemetryCategory::VfrHud)
            }
            MavMessage::RcChannels(rc) => {
                self.state.rc_channels = RcChannels {
                    pulses: rc.chan_raw[..rc.chancount.min(18) as usize].to_vec(),
                    count: rc.chancount,
                    rssi: rc.rssi,
                };
                self.freshness.touch(TelemetryCategory::RcChannels, now);
                Some(TelemetryCategory::RcChannels)
            }
            _ => None,
        }
    }

    pub fn apply_msp(&mut self, msg: &MspMessage, now: Instant) -> Option<TelemetryCategory> {
        match msg {
            MspMessage::FcVariant(v) => {
                self.state.identity.firmware_variant = Some(v.as_str().into_owned());
                self.state.identity.autopilot_kind = Some(match v.as_str().as_ref() {
                    "INAV" => AutopilotKind::Inav,
                    "BTFL" | "CLFL" => AutopilotKind::Betaflight,
                    _ => AutopilotKind::Unknown,
                });
                self.freshness.touch(TelemetryCategory::Identity, now);
                Some(TelemetryCategory::Identity)
            }
            MspMessage::FcVersion(v) => {
                self.state.identity.firmware_version = Some(format!("{}.{}.{}", v.major, v.minor, v.patch));
                self.freshness.touch(TelemetryCategory::Identity, now);
                Some(TelemetryCategory::Identity)
            }
            MspMessage::Attitude(a) => {
                self.state.attitude.roll_deg = a.roll_decideg as f32 / 10.0;
                self.state.attitude.pitch_deg = a.pitch_decideg as f32 / 10.0;
                self.state.attitude.yaw_deg = a.yaw_deg as f32;
                self.freshness.touch(TelemetryCategory::Attitude, now);
                Some(TelemetryCategory::Attitude)
            }
            MspMessage::RawGps(g) => {
                self.state.gps = Gps {
                    fix_kind: g.fix_type,
                    satellites: g.num_sat,
                    hdop: 0.0,
                    raw_lat_deg: g.lat as f64 * 1e-7,
                    raw_lon_deg: g.lon as f64 * 1e-7,
                    raw_alt_m: g.alt_m as f32,
                };
                self.state.position.lat_deg = self.state.gps.raw_lat_deg;
                self.state.position.lon_deg = self.state.gps.raw_lon_deg;
                self.freshness.touch(TelemetryCategory::Gps, now);
                Some(TelemetryCategory::Gps)
            }
            MspMessage::Altitude(a) => {
                self.state.position.alt_msl_m = a.estimated_alt_cm as f32 / 100.0;
                self.freshness.touch(TelemetryCategory::Position, now);
                Some(TelemetryCategory::Position)
            }
            MspMessage::Analog(a) => {
                self.state.battery.voltage_v = a.vbat_decivolts as f32 / 10.0;
                self.state.battery.current_a = a.amperage_centiamps as f32 / 100.0;
                self.state.battery.mah_drawn = Some(a.mah_drawn as i32);
                self.freshness.touch(TelemetryCategory::Battery, now);
                Some(TelemetryCategory::Battery)
            }
            MspMessage::Rc(rc) => {
                self.state.rc_channels = RcChannels {
                    pulses: rc.channels.clone(),
                    count: rc.channels.len() as u8,
                    rssi: 0,
                };
                self.freshness.touch(TelemetryCategory::RcChannels, now);
                Some(TelemetryCategory::RcChannels)
            }
            _ => None,
        }
    }
}

/// Coalescing window for `TelemetryUpdated` emission (spec.md §4.7).
pub const COALESCE_WINDOW: std::time::Duration = std::time::Duration::from_millis(10);

#[cfg(test)]
mod tests {
    use super::*;
    use mav_proto::dialect::common::Heartbeat;

    #[test]
    fn heartbeat_resolves_identity_once_and_keeps_it_on_replay() {
        let mut agg = Aggregator::new();
        let now = Instant::now();
        let hb1 = MavMessage::Heartbeat(Heartbeat {
            custom_mode: 4,
            mav_type: MavType::Quadrotor.as_u32() as u8,
            autopilot: MavAutopilot::Ardupilotmega.as_u32() as u8,
            base_mode: MavModeFlag::SAFETY_ARMED.bits(),
            system_status: 4,
            mavlink_version: 3,
        });
        agg.apply_mavlink(1, 1, &hb1, now);
        assert_eq!(agg.state.identity.system_id, 1);
        assert!(agg.state.flight.armed);
        assert_eq!(agg.state.flight.mode.as_deref(), Some("GUIDED"));

        let hb2 = MavMessage::Heartbeat(Heartbeat {
            custom_mode: 6,
            mav_type: MavType::FixedWing.as_u32() as u8,
            autopilot: MavAutopilot::Px4.as_u32() as u8,
            base_mode: 0,
            system_status: 4,
            mavlink_version: 3,
        });
        agg.apply_mavlink(9, 9, &hb2, now);
        // identity locked on first resolution (invariant 4)
        assert_eq!(agg.state.identity.system_id, 1);
        assert!(!agg.state.flight.armed);
    }

    #[test]
    fn attitude_normalizes_radians_to_degrees() {
        let mut agg = Aggregator::new();
        let msg = MavMessage::Attitude(mav_proto::dialect::common::Attitude {
            time_boot_ms: 0,
            roll: std::f32::consts::PI,
            pitch: 0.0,
            yaw: 0.0,
            rollspeed: 0.0,
            pitchspeed: 0.0,
            yawspeed: 0.0,
        });
        agg.apply_mavlink(1, 1, &msg, Instant::now());
        assert!((agg.state.attitude.roll_deg - 180.0).abs() < 0.01);
    }

    #[test]
    fn msp_attitude_normalizes_decidegrees_to_degrees() {
        let mut agg = Aggregator::new();
        let msg = MspMessage::Attitude(msp_proto::commands::Attitude {
            roll_decideg: 450,
            pitch_decideg: 0,
            yaw_deg: 90,
        });
        agg.apply_msp(&msg, Instant::now());
        assert!((agg.state.attitude.roll_deg - 45.0).abs() < 0.01);
    }
}
