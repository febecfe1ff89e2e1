//! RC-override controller (C9): a periodic simulated-RC packet generator
//! used to drive a SITL-connected flight controller (spec.md §4.8). Pure
//! state; the session dispatcher owns the 50 Hz tick and the safety gate
//! (connected-only, cease-on-disconnect).

use std::time::Duration;

use mav_proto::dialect::common::{MavMessage, RcChannelsOverride};
use msp_proto::commands::{MspMessage, SetRawRc};

pub const TICK_PERIOD: Duration = Duration::from_millis(20); // 50 Hz
pub const CHANNEL_COUNT: usize = 8;
const CENTER: u16 = 1500;
const THROTTLE_MIN: u16 = 1000;
/// Channel 3 (0-indexed: 2) carries throttle by MAVLink/MSP convention.
const THROTTLE_CHANNEL_INDEX: usize = 2;

/// Per-channel pulse widths plus an armed-for-transmission flag. Centered
/// sticks with a zeroed throttle are the default until a caller overrides
/// them (spec.md §4.8).
pub struct RcOverride {
    channels: Vec<u16>,
    active: bool,
}

impl RcOverride {
    pub fn new() -> Self {
        let mut channels = vec![CENTER; CHANNEL_COUNT];
        channels[THROTTLE_CHANNEL_INDEX] = THROTTLE_MIN;
        Self { channels, active: false }
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    /// Cease transmission. Called both for a user-initiated stop and
    /// whenever the session leaves `Connected` (spec.md §4.8 safety rule).
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_channel(&mut self, index: usize, value: u16) {
        if let Some(slot) = self.channels.get_mut(index) {
            *slot = value;
        }
    }

    pub fn to_mavlink(&self, target_system: u8, target_component: u8) -> MavMessage {
        let mut chan_raw = [0u16; 8];
        for (slot, &v) in chan_raw.iter_mut().zip(self.channels.iter()) {
            *slot = v;
        }
        MavMessage::RcChannelsOverride(RcChannelsOverride { chan_raw, target_system, target_component })
    }

    pub fn to_msp(&self) -> MspMessage {
        MspMessage::SetRawRc(SetRawRc { channels: self.channels.clone() })
    }
}

impl Default for RcOverride {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_centered_with_zero_throttle() {
        let rc = RcOverride::new();
        assert!(!rc.is_active());
        let MavMessage::RcChannelsOverride(msg) = rc.to_mavlink(1, 1) else {
            panic!("expected RcChannelsOverride");
        };
        assert_eq!(msg.chan_raw[0], CENTER);
        assert_eq!(msg.chan_raw[THROTTLE_CHANNEL_INDEX], THROTTLE_MIN);
    }

    #[test]
    fn set_channel_is_reflected_in_the_next_encode() {
        let mut rc = RcOverride::new();
        rc.set_channel(0, 1800);
        let MavMessage::RcChannelsOverride(msg) = rc.to_mavlink(1, 1) else {
            panic!("expected RcChannelsOverride");
        };
        assert_eq!(msg.chan_raw[0], 1800);
    }
}
