//! Mission/fence/rally transfer (spec.md §4.6.2): upload and download over
//! the `MISSION_COUNT` / `MISSION_REQUEST_INT` / `MISSION_ITEM_INT` /
//! `MISSION_ACK` handshake, discriminated by `mission_type`. Only the
//! unified `_INT` microservice is implemented — the legacy per-point
//! fallback is explicitly optional (spec.md §4.6.2) and out of scope here.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use mav_proto::dialect::common::{
    MavMessage, MavMissionType, MissionAck, MissionCount, MissionItemInt, MissionRequestInt, MissionRequestList, MissionResult,
};

use super::PollAction;

const ITEM_RETRY_DELAY: Duration = Duration::from_secs(1);
const ITEM_MAX_RETRIES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Counting,
    Transferring,
    Acking,
    Done,
    Failed,
}

/// GCS-facing mission item shape (spec.md §3's `MissionItem`), independent
/// of the wire message so callers don't build `MissionItemInt` by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionItemSpec {
    pub seq: u16,
    pub command: u16,
    pub frame: u8,
    pub current: u8,
    pub autocontinue: u8,
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub latitude_e7: i32,
    pub longitude_e7: i32,
    pub altitude: f32,
}

impl MissionItemSpec {
    fn to_item_int(&self, target_system: u8, target_component: u8, mission_type: MavMissionType) -> MissionItemInt {
        MissionItemInt {
            param1: self.param1,
            param2: self.param2,
            param3: self.param3,
            param4: self.param4,
            x: self.latitude_e7,
            y: self.longitude_e7,
            z: self.altitude,
            seq: self.seq,
            command: self.command,
            target_system,
            target_component,
            frame: self.frame,
            current: self.current,
            autocontinue: self.autocontinue,
            mission_type: mission_type.as_u32() as u8,
        }
    }

    fn from_item_int(item: &MissionItemInt) -> Self {
        Self {
            seq: item.seq,
            command: item.command,
            frame: item.frame,
            current: item.current,
            autocontinue: item.autocontinue,
            param1: item.param1,
            param2: item.param2,
            param3: item.param3,
            param4: item.param4,
            latitude_e7: item.x,
            longitude_e7: item.y,
            altitude: item.z,
        }
    }
}

pub enum MissionOutcome {
    Completed,
    Failed(u8),
}

/// Upload state machine: `{Counting, Transferring, Acking, Done, Failed}`.
pub struct MissionUpload {
    items: Vec<MissionItemSpec>,
    mission_type: MavMissionType,
    phase: Phase,
    retry_count: u32,
    deadline: Instant,
    last_seq_sent: Option<u16>,
}

impl MissionUpload {
    pub fn start(now: Instant, items: Vec<MissionItemSpec>, mission_type: MavMissionType, target_system: u8, target_component: u8) -> (Self, MavMessage) {
        let count = items.len() as u16;
        let state = Self {
            items,
            mission_type,
            phase: Phase::Counting,
            retry_count: 0,
            deadline: now + ITEM_RETRY_DELAY,
            last_seq_sent: None,
        };
        let msg = MavMessage::MissionCount(MissionCount {
            count,
            target_system,
            target_component,
            mission_type: mission_type.as_u32() as u8,
        });
        (state, msg)
    }

    /// A `MISSION_REQUEST_INT{seq}` arrived (or `MISSION_REQUEST`, mapped
    /// upstream to the same seq). Resending the same seq twice is
    /// idempotent (spec.md S3): the item for that seq is simply resent.
    pub fn on_mission_request(&mut self, seq: u16, now: Instant, target_system: u8, target_component: u8) -> Option<MavMessage> {
        if !matches!(self.phase, Phase::Counting | Phase::Transferring) {
            return None;
        }
        let item = self.items.iter().find(|i| i.seq == seq)?;
        self.phase = Phase::Transferring;
        self.retry_count = 0;
        self.deadline = now + ITEM_RETRY_DELAY;
        self.last_seq_sent = Some(seq);
        Some(MavMessage::MissionItemInt(item.to_item_int(target_system, target_component, self.mission_type)))
    }

    pub fn on_mission_ack(&mut self, mission_result: u8) -> MissionOutcome {
        if mission_result == MissionResult::Accepted.as_u32() as u8 {
            self.phase = Phase::Done;
            MissionOutcome::Completed
        } else {
            self.phase = Phase::Failed;
            MissionOutcome::Failed(mission_result)
        }
    }

    pub fn poll(&mut self, now: Instant, target_system: u8, target_component: u8) -> Option<PollAction> {
        if self.phase != Phase::Transferring || now < self.deadline {
            return None;
        }
        if self.retry_count >= ITEM_MAX_RETRIES {
            self.phase = Phase::Failed;
            return Some(PollAction::TimedOut);
        }
        let seq = self.last_seq_sent?;
        let item = self.items.iter().find(|i| i.seq == seq)?;
        self.retry_count += 1;
        self.deadline = now + ITEM_RETRY_DELAY;
        Some(PollAction::Send(MavMessage::MissionItemInt(item.to_item_int(target_system, target_component, self.mission_type))))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        (self.phase == Phase::Transferring).then_some(self.deadline)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Done | Phase::Failed)
    }

    pub fn total(&self) -> u16 {
        self.items.len() as u16
    }
}

pub enum DownloadStep {
    RequestNext(MavMessage),
    SendAck(MavMessage),
    None,
}

/// Download state machine: the symmetric protocol (spec.md §4.6.2).
pub struct MissionDownload {
    mission_type: MavMissionType,
    phase: Phase,
    total: Option<u16>,
    items: BTreeMap<u16, MissionItemSpec>,
    retry_count: u32,
    deadline: Instant,
    pending_seq: u16,
}

impl MissionDownload {
    pub fn start(now: Instant, mission_type: MavMissionType, target_system: u8, target_component: u8) -> (Self, MavMessage) {
        let state = Self {
            mission_type,
            phase: Phase::Counting,
            total: None,
            items: BTreeMap::new(),
            retry_count: 0,
            deadline: now + ITEM_RETRY_DELAY,
            pending_seq: 0,
        };
        let msg = MavMessage::MissionRequestList(MissionRequestList {
            target_system,
            target_component,
            mission_type: mission_type.as_u32() as u8,
        });
        (state, msg)
    }

    pub fn on_mission_count(&mut self, count: u16, now: Instant, target_system: u8, target_component: u8) -> DownloadStep {
        if self.phase != Phase::Counting {
            return DownloadStep::None;
        }
        self.total = Some(count);
        if count == 0 {
            self.phase = Phase::Done;
            return DownloadStep::None;
        }
        self.phase = Phase::Transferring;
        self.pending_seq = 0;
        self.retry_count = 0;
        self.deadline = now + ITEM_RETRY_DELAY;
        DownloadStep::RequestNext(request_item(0, self.mission_type, target_system, target_component))
    }

    pub fn on_mission_item(&mut self, item: &MissionItemInt, now: Instant, target_system: u8, target_component: u8) -> DownloadStep {
        if self.phase != Phase::Transferring || item.seq != self.pending_seq {
            return DownloadStep::None;
        }
        self.items.insert(item.seq, MissionItemSpec::from_item_int(item));
        let total = self.total.unwrap_or(0);
        let next_seq = item.seq + 1;
        if next_seq >= total {
            self.phase = Phase::Acking;
            let ack = MavMessage::MissionAck(MissionAck {
                target_system,
                target_component,
                mission_result: MissionResult::Accepted.as_u32() as u8,
                mission_type: self.mission_type.as_u32() as u8,
            });
            self.phase = Phase::Done;
            return DownloadStep::SendAck(ack);
        }
        self.pending_seq = next_seq;
        self.retry_count = 0;
        self.deadline = now + ITEM_RETRY_DELAY;
        DownloadStep::RequestNext(request_item(next_seq, self.mission_type, target_system, target_component))
    }

    pub fn poll(&mut self, now: Instant, target_system: u8, target_component: u8) -> Option<PollAction> {
        if self.phase != Phase::Transferring || now < self.deadline {
            return None;
        }
        if self.retry_count >= ITEM_MAX_RETRIES {
            self.phase = Phase::Failed;
            return Some(PollAction::TimedOut);
        }
        self.retry_count += 1;
        self.deadline = now + ITEM_RETRY_DELAY;
        Some(PollAction::Send(request_item(self.pending_seq, self.mission_type, target_system, target_component)))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        (self.phase == Phase::Transferring).then_some(self.deadline)
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Done | Phase::Failed)
    }

    pub fn total(&self) -> Option<u16> {
        self.total
    }

    pub fn into_items(self) -> Vec<MissionItemSpec> {
        self.items.into_values().collect()
    }
}

fn request_item(seq: u16, mission_type: MavMissionType, target_system: u8, target_component: u8) -> MavMessage {
    MavMessage::MissionRequestInt(MissionRequestInt {
        seq,
        target_system,
        target_component,
        mission_type: mission_type.as_u32() as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(seq: u16) -> MissionItemSpec {
        MissionItemSpec {
            seq,
            command: 16,
            frame: 6,
            current: 0,
            autocontinue: 1,
            param1: 0.0,
            param2: 0.0,
            param3: 0.0,
            param4: 0.0,
            latitude_e7: 377_749_000 + seq as i32,
            longitude_e7: -1_224_194_000,
            altitude: 50.0,
        }
    }

    #[test]
    fn upload_resends_same_seq_idempotently_then_completes() {
        let now = Instant::now();
        let items = vec![item(0), item(1), item(2)];
        let (mut up, _count_msg) = MissionUpload::start(now, items, MavMissionType::Mission, 1, 1);
        let first = up.on_mission_request(0, now, 1, 1);
        let repeat = up.on_mission_request(0, now, 1, 1);
        assert_eq!(first, repeat);
        up.on_mission_request(1, now, 1, 1);
        up.on_mission_request(2, now, 1, 1);
        let outcome = up.on_mission_ack(MissionResult::Accepted.as_u32() as u8);
        assert!(matches!(outcome, MissionOutcome::Completed));
        assert!(up.is_terminal());
    }

    #[test]
    fn download_requests_sequentially_and_acks_on_completion() {
        let now = Instant::now();
        let (mut dl, _) = MissionDownload::start(now, MavMissionType::Mission, 1, 1);
        let DownloadStep::RequestNext(_) = dl.on_mission_count(2, now, 1, 1) else {
            panic!("expected a request for seq 0");
        };
        let item0 = item(0).to_item_int(1, 1, MavMissionType::Mission);
        let DownloadStep::RequestNext(_) = dl.on_mission_item(&item0, now, 1, 1) else {
            panic!("expected a request for seq 1");
        };
        let item1 = item(1).to_item_int(1, 1, MavMissionType::Mission);
        let DownloadStep::SendAck(_) = dl.on_mission_item(&item1, now, 1, 1) else {
            panic!("expected a final ack");
        };
        assert!(dl.is_done());
        assert_eq!(dl.into_items().len(), 2);
    }
}
