//! Transport configuration: a plain enum the caller constructs directly,
//! mirroring the teacher's `ConnectionAddress`/`*Connectable` family
//! (`connectable.rs`) but without its string-parsing mini-DSL — the
//! embedding UI already has a structured settings form (SPEC_FULL.md §3).

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Serial {
        path: String,
        baud: u32,
    },
    Tcp {
        host: String,
        port: u16,
    },
    Udp {
        local_port: u16,
        remote_host: Option<String>,
        remote_port: Option<u16>,
    },
}

impl TransportConfig {
    pub fn auto_reconnect(&self) -> bool {
        true
    }
}

/// The reconnect backoff schedule shared by every transport: 500ms, 1s,
/// 2s, 4s, capped at 4s (spec.md §4.3).
pub const RECONNECT_BACKOFF: &[Duration] = &[
    Duration::from_millis(500),
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

pub fn backoff_for_attempt(attempt: u32) -> Duration {
    let idx = (attempt as usize).min(RECONNECT_BACKOFF.len() - 1);
    RECONNECT_BACKOFF[idx]
}

/// Which protocol a link speaks. Session/link layers are generic over
/// either, but a given link only ever carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    MavLink,
    Msp,
}

/// Telemetry stream-rate profile requested on connect (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateProfile {
    Slow,
    Normal,
    Fast,
}

impl RateProfile {
    /// Hz requested for the common telemetry stream groups
    /// (`REQUEST_DATA_STREAM`/`MESSAGE_INTERVAL`).
    pub fn hz(self) -> u16 {
        match self {
            RateProfile::Slow => 2,
            RateProfile::Normal => 4,
            RateProfile::Fast => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_caps_at_the_final_entry() {
        assert_eq!(backoff_for_attempt(0), Duration::from_millis(500));
        assert_eq!(backoff_for_attempt(3), Duration::from_secs(4));
        assert_eq!(backoff_for_attempt(100), Duration::from_secs(4));
    }
}
