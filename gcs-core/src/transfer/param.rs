//! Parameter download/set (spec.md §4.6.1). Download bulk-reads via
//! `PARAM_REQUEST_LIST`, then patches any index the initial burst missed;
//! set issues `PARAM_SET` and waits for the matching echo.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use mav_proto::dialect::common::{MavMessage, ParamRequestList, ParamRequestRead, ParamSet, ParamValue};

use super::PollAction;

const RETRY_DELAYS: [Duration; 3] = [Duration::from_millis(100), Duration::from_millis(250), Duration::from_millis(500)];
const BULK_QUIET_WINDOW: Duration = Duration::from_millis(250);
const SET_RETRY_DELAY: Duration = Duration::from_millis(500);
const SET_MAX_RETRIES: u32 = 3;

pub fn param_id_to_string(raw: &[u8; 16]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(16);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

pub fn string_to_param_id(name: &str) -> [u8; 16] {
    let mut out = [0u8; 16];
    let bytes = name.as_bytes();
    let n = bytes.len().min(16);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

#[derive(Debug, Clone)]
pub struct ParamEntry {
    pub name: String,
    pub value: f32,
    pub type_code: u8,
    pub index: u16,
    pub total_count: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Bulk,
    Patching,
    Done,
}

pub enum ParamOutcome {
    Progress { seen: u32, total: u32 },
    Completed,
    None,
}

/// Download state machine: {Idle, Bulk, Patching, Done} per spec.md §4.5
/// state-machine summary (download starts directly in `Bulk`).
pub struct ParamDownload {
    phase: Phase,
    entries: BTreeMap<u16, ParamEntry>,
    total: Option<u16>,
    quiet_until: Instant,
    retry_index: Option<u16>,
    retry_count: u32,
    retry_deadline: Option<Instant>,
}

impl ParamDownload {
    pub fn start(now: Instant, target_system: u8, target_component: u8) -> (Self, MavMessage) {
        let state = Self {
            phase: Phase::Bulk,
            entries: BTreeMap::new(),
            total: None,
            quiet_until: now + BULK_QUIET_WINDOW,
            retry_index: None,
            retry_count: 0,
            retry_deadline: None,
        };
        (state, MavMessage::ParamRequestList(ParamRequestList { target_system, target_component }))
    }

    pub fn on_param_value(&mut self, pv: &ParamValue, now: Instant) -> ParamOutcome {
        if self.phase == Phase::Done {
            return ParamOutcome::None;
        }
        let index = pv.param_index;
        self.entries.insert(
            index,
            ParamEntry {
                name: param_id_to_string(&pv.param_id),
                value: pv.param_value,
                type_code: pv.param_type,
                index,
                total_count: pv.param_count,
            },
        );
        self.total = Some(pv.param_count);
        if self.phase == Phase::Bulk {
            self.quiet_until = now + BULK_QUIET_WINDOW;
        }
        if self.phase == Phase::Patching && self.retry_index == Some(index) {
            self.retry_index = None;
            self.retry_deadline = None;
            self.retry_count = 0;
            self.advance_patching(now);
        }
        self.check_completion()
    }

    /// Index currently tracked in `entries` but not yet seen, if any.
    fn find_missing(&self) -> Option<u16> {
        let total = self.total?;
        (0..total).find(|i| !self.entries.contains_key(i))
    }

    /// While `Patching`, scan for the next missing index (if any) and begin
    /// its own retry schedule. Called whenever the currently-tracked index
    /// resolves — without this, a second missing index is never requested
    /// once the first is patched, since `retry_index`/`retry_deadline` both
    /// go back to `None` and `next_deadline()` stops waking the poll loop
    /// (spec.md §4.6.1 requires patching *any* missing entries, not just
    /// one).
    fn advance_patching(&mut self, now: Instant) {
        if let Some(idx) = self.find_missing() {
            self.begin_retry(idx, now);
        }
    }

    fn check_completion(&mut self) -> ParamOutcome {
        let Some(total) = self.total else { return ParamOutcome::None };
        let seen = self.entries.len() as u32;
        if seen == total as u32 {
            self.phase = Phase::Done;
            return ParamOutcome::Completed;
        }
        ParamOutcome::Progress { seen, total: total as u32 }
    }

    /// Called when `next_deadline()` elapses: advances Bulk→Patching once
    /// the quiet window passes, or retries/fails the currently-missing
    /// index.
    pub fn poll(&mut self, now: Instant, target_system: u8, target_component: u8) -> Option<PollAction> {
        match self.phase {
            Phase::Bulk => {
                if now < self.quiet_until {
                    return None;
                }
                self.total?; // still waiting to learn the count from any reply
                match self.find_missing() {
                    Some(idx) => {
                        self.phase = Phase::Patching;
                        self.begin_retry(idx, now);
                        Some(PollAction::Send(request_read(idx, target_system, target_component)))
                    }
                    None => {
                        self.phase = Phase::Done;
                        Some(PollAction::Done)
                    }
                }
            }
            Phase::Patching => {
                let idx = self.retry_index?;
                if now < self.retry_deadline? {
                    return None;
                }
                if self.retry_count as usize >= RETRY_DELAYS.len() {
                    self.phase = Phase::Done;
                    return Some(PollAction::Failed(idx));
                }
                self.begin_retry(idx, now);
                Some(PollAction::Send(request_read(idx, target_system, target_component)))
            }
            Phase::Done => None,
        }
    }

    fn begin_retry(&mut self, idx: u16, now: Instant) {
        self.retry_index = Some(idx);
        self.retry_deadline = Some(now + RETRY_DELAYS[self.retry_count as usize]);
        self.retry_count += 1;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Bulk => Some(self.quiet_until),
            Phase::Patching => self.retry_deadline,
            Phase::Done => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn entries(&self) -> impl Iterator<Item = &ParamEntry> {
        self.entries.values()
    }
}

fn request_read(index: u16, target_system: u8, target_component: u8) -> MavMessage {
    MavMessage::ParamRequestRead(ParamRequestRead {
        param_index: index as i16,
        param_id: [0; 16],
        target_system,
        target_component,
    })
}

/// Single `PARAM_SET` with echo-as-ack semantics (spec.md §4.6.1).
pub struct ParamSetRequest {
    name: String,
    retry_count: u32,
    deadline: Instant,
    msg: MavMessage,
}

impl ParamSetRequest {
    pub fn start(now: Instant, name: String, value: f32, type_code: u8, target_system: u8, target_component: u8) -> (Self, MavMessage) {
        let msg = MavMessage::ParamSet(ParamSet {
            param_value: value,
            target_system,
            target_component,
            param_id: string_to_param_id(&name),
            param_type: type_code,
        });
        (
            Self {
                name,
                retry_count: 0,
                deadline: now + SET_RETRY_DELAY,
                msg: msg.clone(),
            },
            msg,
        )
    }

    /// Returns `true` once the matching echo arrives.
    pub fn on_param_value(&self, pv: &ParamValue) -> bool {
        param_id_to_string(&pv.param_id) == self.name
    }

    pub fn poll(&mut self, now: Instant) -> Option<PollAction> {
        if now < self.deadline {
            return None;
        }
        if self.retry_count >= SET_MAX_RETRIES {
            return Some(PollAction::TimedOut);
        }
        self.retry_count += 1;
        self.deadline = now + SET_RETRY_DELAY;
        Some(PollAction::Send(self.msg.clone()))
    }

    pub fn next_deadline(&self) -> Instant {
        self.deadline
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_id_round_trips_through_the_fixed_buffer() {
        let raw = string_to_param_id("THR_MIN");
        assert_eq!(param_id_to_string(&raw), "THR_MIN");
    }

    #[test]
    fn download_completes_once_all_indices_seen() {
        let now = Instant::now();
        let (mut dl, _) = ParamDownload::start(now, 1, 1);
        for i in 0..3u16 {
            let pv = ParamValue {
                param_value: i as f32,
                param_count: 3,
                param_index: i,
                param_id: string_to_param_id(&format!("P{i}")),
                param_type: 9,
            };
            let outcome = dl.on_param_value(&pv, now);
            if i < 2 {
                assert!(matches!(outcome, ParamOutcome::Progress { .. }));
            } else {
                assert!(matches!(outcome, ParamOutcome::Completed));
            }
        }
        assert!(dl.is_done());
    }

    #[test]
    fn missing_index_is_patched_after_quiet_window_then_fails_after_retries() {
        let mut now = Instant::now();
        let (mut dl, _) = ParamDownload::start(now, 1, 1);
        let pv0 = ParamValue { param_value: 0.0, param_count: 2, param_index: 0, param_id: string_to_param_id("A"), param_type: 9 };
        dl.on_param_value(&pv0, now);
        now += BULK_QUIET_WINDOW;
        let action = dl.poll(now, 1, 1);
        assert!(matches!(action, Some(PollAction::Send(_))));
        for _ in 0..2 {
            now += Duration::from_secs(1);
            dl.poll(now, 1, 1);
        }
        now += Duration::from_secs(1);
        let failed = dl.poll(now, 1, 1);
        assert!(matches!(failed, Some(PollAction::Failed(1))));
    }

    #[test]
    fn patches_every_missing_index_not_just_the_first() {
        let mut now = Instant::now();
        let (mut dl, _) = ParamDownload::start(now, 1, 1);
        // Bulk burst covers indices 0 and 3 only; 1 and 2 are missing.
        for i in [0u16, 3] {
            let pv = ParamValue { param_value: i as f32, param_count: 4, param_index: i, param_id: string_to_param_id(&format!("P{i}")), param_type: 9 };
            dl.on_param_value(&pv, now);
        }
        now += BULK_QUIET_WINDOW;
        let first = dl.poll(now, 1, 1);
        assert!(matches!(first, Some(PollAction::Send(_))));

        // The first gap (index 1) resolves; the engine must pick up index 2
        // next instead of going quiet forever.
        let pv1 = ParamValue { param_value: 1.0, param_count: 4, param_index: 1, param_id: string_to_param_id("P1"), param_type: 9 };
        let outcome = dl.on_param_value(&pv1, now);
        assert!(matches!(outcome, ParamOutcome::Progress { seen: 3, total: 4 }));
        assert!(dl.next_deadline().is_some());

        now = dl.next_deadline().unwrap();
        let second = dl.poll(now, 1, 1);
        assert!(matches!(second, Some(PollAction::Send(_))));

        let pv2 = ParamValue { param_value: 2.0, param_count: 4, param_index: 2, param_id: string_to_param_id("P2"), param_type: 9 };
        let outcome = dl.on_param_value(&pv2, now);
        assert!(matches!(outcome, ParamOutcome::Completed));
        assert!(dl.is_done());
    }
}
