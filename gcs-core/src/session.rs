//! Session manager (C6): heartbeat acquisition, identity resolution,
//! per-protocol dispatch, stream-rate negotiation, and the single-slot
//! FIFO discipline over the C7 transfer engines (spec.md §4.5).
//!
//! The state machine itself is driven by one cooperative dispatcher task
//! (`Session::run`) rather than the literal "one task per transfer" of
//! spec.md §5: every suspension point in this core is an await on a
//! channel, a timer, or a link read, so a single `tokio::select!` loop
//! gives the same ordering/cancellation guarantees (frames from a link
//! arrive in order; a single writer slot serializes outbound traffic)
//! without the bookkeeping of tracking N transfer task handles. Per-class
//! single-slot exclusivity (invariant 6) is automatic here, since only the
//! dispatcher ever issues a request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep_until;

use mav_proto::dialect::common::{CommandLong, Heartbeat, MavCmd, MavMessage, MessageInterval, RequestDataStream};
use mav_proto::{MavHeader, Message as _};
use msp_proto::commands::{ApiVersion, BoxIds, FcVariant, FcVersion, ModeRanges, MspMessage};
use msp_proto::Direction as MspDirection;
use msp_proto::Message as _;

use crate::config::{ProtocolKind, RateProfile, TransportConfig};
use crate::error::{GcsError, Result};
use crate::events::{GcsEvent, GcsRequest, ParameterError};
use crate::link::{DecodedFrame, Link, LinkEvent};
use crate::rc_override::{RcOverride, TICK_PERIOD};
use crate::telemetry::Aggregator;
use crate::transfer::command::CommandExecution;
use crate::transfer::mission::{DownloadStep, MissionDownload, MissionOutcome, MissionUpload};
use crate::transfer::param::{ParamDownload, ParamOutcome, ParamSetRequest};
use crate::transfer::PollAction;

const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Opening,
    AwaitingHeartbeat,
    Identifying,
    Connected,
    Reconnecting,
}

enum ParamSlot {
    None,
    Download(ParamDownload),
    Set(ParamSetRequest),
}

enum MissionSlot {
    None,
    Upload(MissionUpload),
    Download(MissionDownload),
}

/// The request/event handle external layers hold. Cloning it shares the
/// same underlying session.
#[derive(Clone)]
pub struct SessionHandle {
    request_tx: mpsc::Sender<GcsRequest>,
    events: broadcast::Sender<GcsEvent>,
    message_feed: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<GcsEvent> {
        self.events.subscribe()
    }

    pub async fn request(&self, req: GcsRequest) -> Result<()> {
        self.request_tx.send(req).await.map_err(|_| GcsError::protocol("session has shut down"))
    }

    /// Enable or disable the `MessageReceived` diagnostic feed (spec.md
    /// §6; off by default, since most subscribers only want the decoded
    /// telemetry/transfer events and not every frame).
    pub fn set_message_feed(&self, enabled: bool) {
        self.message_feed.store(enabled, Ordering::Relaxed);
    }
}

/// Open a transport and spawn the session dispatcher. Returns immediately;
/// the returned handle is the sole way external layers interact with it.
pub fn spawn(config: TransportConfig, protocol: ProtocolKind, rate: RateProfile) -> SessionHandle {
    let (request_tx, request_rx) = mpsc::channel(64);
    let (events_tx, _) = broadcast::channel(256);
    let message_feed = Arc::new(AtomicBool::new(false));
    let handle = SessionHandle { request_tx, events: events_tx.clone(), message_feed: message_feed.clone() };
    let session = Session::new(config, protocol, rate, request_rx, events_tx, message_feed);
    tokio::spawn(session.run());
    handle
}

struct Session {
    link: Link,
    rate: RateProfile,
    state: SessionState,
    target_system: u8,
    target_component: u8,
    heartbeat_deadline: Instant,
    identifying_since: Instant,
    got_autopilot_version: bool,
    msp_ident: MspIdentFlags,
    aggregator: Aggregator,
    param: ParamSlot,
    mission: MissionSlot,
    command: Option<CommandExecution>,
    rc: RcOverride,
    requests: mpsc::Receiver<GcsRequest>,
    events: broadcast::Sender<GcsEvent>,
    message_feed: Arc<AtomicBool>,
}

#[derive(Default)]
struct MspIdentFlags {
    variant: bool,
    version: bool,
    api_version: bool,
    box_ids: bool,
    mode_ranges: bool,
}

impl MspIdentFlags {
    fn complete(&self) -> bool {
        self.variant && self.version && self.api_version && self.box_ids && self.mode_ranges
    }
}

impl Session {
    fn new(
        config: TransportConfig,
        protocol: ProtocolKind,
        rate: RateProfile,
        requests: mpsc::Receiver<GcsRequest>,
        events: broadcast::Sender<GcsEvent>,
        message_feed: Arc<AtomicBool>,
    ) -> Self {
        let now = Instant::now();
        Self {
            link: Link::open(config, protocol),
            rate,
            state: SessionState::Opening,
            target_system: 0,
            target_component: 0,
            heartbeat_deadline: now + HEARTBEAT_TIMEOUT,
            identifying_since: now,
            got_autopilot_version: false,
            msp_ident: MspIdentFlags::default(),
            aggregator: Aggregator::new(),
            param: ParamSlot::None,
            mission: MissionSlot::None,
            command: None,
            rc: RcOverride::new(),
            requests,
            events,
            message_feed,
        }
    }

    fn emit(&self, event: GcsEvent) {
        let _ = self.events.send(event);
    }

    async fn run(mut self) {
        loop {
            let now = Instant::now();
            let deadline = self.next_deadline(now);
            tokio::select! {
                link_event = self.link.next() => {
                    match link_event {
                        Some(event) => self.on_link_event(event, Instant::now()).await,
                        None => return,
                    }
                }
                request = self.requests.recv() => {
                    match request {
                        Some(req) => self.on_request(req).await,
                        None => return,
                    }
                }
                _ = sleep_until(tokio::time::Instant::from_std(deadline)) => {
                    self.on_timer(Instant::now()).await;
                }
            }
        }
    }

    fn next_deadline(&self, now: Instant) -> Instant {
        let mut deadline = now + Duration::from_secs(3600);
        if self.state == SessionState::Connected {
            deadline = deadline.min(self.heartbeat_deadline);
            if self.rc.is_active() {
                deadline = deadline.min(now + TICK_PERIOD);
            }
        }
        if let ParamSlot::Download(d) = &self.param {
            if let Some(d2) = d.next_deadline() {
                deadline = deadline.min(d2);
            }
        }
        if let ParamSlot::Set(s) = &self.param {
            deadline = deadline.min(s.next_deadline());
        }
        if let MissionSlot::Upload(u) = &self.mission {
            if let Some(d) = u.next_deadline() {
                deadline = deadline.min(d);
            }
        }
        if let MissionSlot::Download(d) = &self.mission {
            if let Some(d) = d.next_deadline() {
                deadline = deadline.min(d);
            }
        }
        if let Some(c) = &self.command {
            deadline = deadline.min(c.next_deadline());
        }
        deadline
    }

    async fn on_link_event(&mut self, event: LinkEvent, now: Instant) {
        match event {
            LinkEvent::TransportUp => {
                self.transition(SessionState::AwaitingHeartbeat, now);
            }
            LinkEvent::TransportDown { .. } => {
                self.reset_identity();
                self.rc.stop();
                self.transition(SessionState::Reconnecting, now);
            }
            LinkEvent::Frame(frame) => self.on_frame(frame, now).await,
        }
    }

    fn transition(&mut self, next: SessionState, now: Instant) {
        if self.state == next {
            return;
        }
        self.state = next;
        if next == SessionState::AwaitingHeartbeat {
            self.identifying_since = now;
        }
        let identity = (next == SessionState::Connected).then(|| self.aggregator.state.identity.clone());
        self.emit(GcsEvent::ConnectionStateChanged { state: next, identity });
    }

    fn reset_identity(&mut self) {
        self.aggregator.reset();
        self.got_autopilot_version = false;
        self.msp_ident = MspIdentFlags::default();
        self.target_system = 0;
        self.target_component = 0;
    }

    async fn on_frame(&mut self, frame: DecodedFrame, now: Instant) {
        match frame {
            DecodedFrame::MavLink { header, message } => self.on_mavlink_frame(header, message, now).await,
            DecodedFrame::Msp { direction, message } => self.on_msp_frame(direction, message, now).await,
        }
    }

    async fn on_mavlink_frame(&mut self, header: MavHeader, message: MavMessage, now: Instant) {
        if self.message_feed.load(Ordering::Relaxed) {
            self.emit(GcsEvent::MessageReceived {
                name: message.message_name(),
                id: message.message_id(),
                sys: header.system_id,
                comp: header.component_id,
            });
        }
        if let MavMessage::Heartbeat(hb) = &message {
            self.on_heartbeat(header, hb, now).await;
        }
        if let Some(category) = self.aggregator.apply_mavlink(header.system_id, header.component_id, &message, now) {
            self.emit(GcsEvent::TelemetryUpdated { category, snapshot: self.aggregator.state.clone() });
        }

        match &message {
            MavMessage::AutopilotVersion(_) if self.state == SessionState::Identifying => {
                self.got_autopilot_version = true;
                self.finish_identifying(now).await;
            }
            MavMessage::ParamValue(pv) => {
                let mut completed_progress = None;
                let mut set_done = false;
                match &mut self.param {
                    ParamSlot::Download(dl) => {
                        completed_progress = Some(dl.on_param_value(pv, now));
                    }
                    ParamSlot::Set(set) => {
                        if set.on_param_value(pv) {
                            set_done = true;
                        }
                    }
                    ParamSlot::None => {}
                }
                if let Some(outcome) = completed_progress {
                    self.handle_param_outcome(outcome);
                }
                if set_done {
                    self.param = ParamSlot::None;
                    self.emit(GcsEvent::ParameterCompleted);
                }
            }
            MavMessage::MissionRequest(req) => self.on_mission_request(req.seq, now).await,
            MavMessage::MissionRequestInt(req) => self.on_mission_request(req.seq, now).await,
            MavMessage::MissionCount(count) => {
                if let MissionSlot::Download(dl) = &mut self.mission {
                    let step = dl.on_mission_count(count.count, now, self.target_system, self.target_component);
                    self.act_on_mission_step(step).await;
                }
            }
            MavMessage::MissionItemInt(item) => {
                let seq = item.seq;
                if let MissionSlot::Download(dl) = &mut self.mission {
                    let step = dl.on_mission_item(item, now, self.target_system, self.target_component);
                    if let Some(total) = dl.total() {
                        self.emit(GcsEvent::MissionProgress { seq, total });
                    }
                    self.act_on_mission_step(step).await;
                }
                self.finish_mission_download_if_done();
            }
            MavMessage::MissionAck(ack) => {
                if let MissionSlot::Upload(up) = &mut self.mission {
                    match up.on_mission_ack(ack.mission_result) {
                        MissionOutcome::Completed => {
                            self.mission = MissionSlot::None;
                            self.emit(GcsEvent::MissionCompleted { items: None });
                        }
                        MissionOutcome::Failed(code) => {
                            self.mission = MissionSlot::None;
                            self.emit(GcsEvent::MissionFailed { ack: code });
                        }
                    }
                }
            }
            MavMessage::CommandAck(ack) => {
                let result = self.command.as_mut().and_then(|c| c.on_command_ack(ack, now));
                if let Some(result) = result {
                    self.command = None;
                    self.emit(GcsEvent::CommandAcknowledged { command: ack.command, result });
                }
            }
            _ => {}
        }
    }

    async fn on_heartbeat(&mut self, header: MavHeader, hb: &Heartbeat, now: Instant) {
        let _ = hb;
        self.heartbeat_deadline = now + HEARTBEAT_TIMEOUT;
        match self.state {
            SessionState::AwaitingHeartbeat => {
                self.target_system = header.system_id;
                self.target_component = header.component_id;
                self.transition(SessionState::Identifying, now);
                self.begin_identifying_mavlink().await;
            }
            SessionState::Reconnecting => {
                self.target_system = header.system_id;
                self.target_component = header.component_id;
                self.transition(SessionState::Identifying, now);
                self.begin_identifying_mavlink().await;
            }
            _ => {}
        }
    }

    /// Request `AUTOPILOT_VERSION` via the generic `REQUEST_MESSAGE`
    /// command (message id 148 is `AUTOPILOT_VERSION`'s own id).
    async fn begin_identifying_mavlink(&mut self) {
        let ts = self.target_system;
        let tc = self.target_component;
        let _ = self
            .link
            .send_mavlink(&MavMessage::CommandLong(CommandLong {
                param1: 148.0,
                param2: 0.0,
                param3: 0.0,
                param4: 0.0,
                param5: 0.0,
                param6: 0.0,
                param7: 0.0,
                command: MavCmd::REQUEST_MESSAGE.0,
                target_system: ts,
                target_component: tc,
                confirmation: 0,
            }))
            .await;
    }

    async fn finish_identifying(&mut self, now: Instant) {
        if !self.got_autopilot_version {
            return;
        }
        self.transition(SessionState::Connected, now);
        let ts = self.target_system;
        let tc = self.target_component;
        let hz = self.rate.hz();
        let _ = self
            .link
            .send_mavlink(&MavMessage::RequestDataStream(RequestDataStream {
                req_message_rate: hz,
                target_system: ts,
                target_component: tc,
                req_stream_id: 0, // MAV_DATA_STREAM_ALL
                start_stop: 1,
            }))
            .await;
        for message_id in [30u16 /* ATTITUDE */, 33 /* GLOBAL_POSITION_INT */, 74 /* VFR_HUD */] {
            let _ = self
                .link
                .send_mavlink(&MavMessage::MessageInterval(MessageInterval {
                    interval_us: 1_000_000 / hz.max(1) as i32,
                    message_id,
                }))
                .await;
        }
        // Seed the parameter-store refresh (spec.md §4.5).
        if matches!(self.param, ParamSlot::None) {
            let (state, msg) = ParamDownload::start(now, ts, tc);
            self.param = ParamSlot::Download(state);
            let _ = self.link.send_mavlink(&msg).await;
        }
    }

    async fn on_msp_frame(&mut self, direction: MspDirection, message: MspMessage, now: Instant) {
        if direction != MspDirection::FromFc {
            return;
        }
        if self.message_feed.load(Ordering::Relaxed) {
            // MSP has no sysid/compid addressing (point-to-point serial/UDP
            // link to a single FC), unlike MAVLink's multi-vehicle header.
            self.emit(GcsEvent::MessageReceived {
                name: message.name(),
                id: message.code() as u32,
                sys: 0,
                comp: 0,
            });
        }
        self.heartbeat_deadline = now + HEARTBEAT_TIMEOUT;
        if self.state == SessionState::AwaitingHeartbeat || self.state == SessionState::Reconnecting {
            self.transition(SessionState::Identifying, now);
            self.begin_identifying_msp().await;
        }

        if let Some(category) = self.aggregator.apply_msp(&message, now) {
            self.emit(GcsEvent::TelemetryUpdated { category, snapshot: self.aggregator.state.clone() });
        }

        match &message {
            MspMessage::FcVariant(_) => {
                self.msp_ident.variant = true;
                self.maybe_finish_msp_identifying(now).await;
            }
            MspMessage::FcVersion(_) => {
                self.msp_ident.version = true;
                self.maybe_finish_msp_identifying(now).await;
            }
            MspMessage::ApiVersion(_) => {
                self.msp_ident.api_version = true;
                self.maybe_finish_msp_identifying(now).await;
            }
            MspMessage::BoxIds(_) => {
                self.msp_ident.box_ids = true;
                self.maybe_finish_msp_identifying(now).await;
            }
            MspMessage::ModeRanges(_) => {
                self.msp_ident.mode_ranges = true;
                self.maybe_finish_msp_identifying(now).await;
            }
            _ => {}
        }
    }

    async fn begin_identifying_msp(&mut self) {
        for msg in [
            MspMessage::FcVariant(FcVariant { identifier: *b"\0\0\0\0" }),
            MspMessage::FcVersion(FcVersion { major: 0, minor: 0, patch: 0 }),
            MspMessage::ApiVersion(ApiVersion { protocol_version: 0, api_major: 0, api_minor: 0 }),
            MspMessage::BoxIds(BoxIds { ids: Vec::new() }),
            MspMessage::ModeRanges(ModeRanges { ranges: Vec::new() }),
        ] {
            let _ = self.link.send_msp(MspDirection::ToFc, &msg).await;
        }
    }

    async fn maybe_finish_msp_identifying(&mut self, now: Instant) {
        if self.state == SessionState::Identifying && self.msp_ident.complete() {
            self.transition(SessionState::Connected, now);
        }
    }

    async fn on_mission_request(&mut self, seq: u16, now: Instant) {
        if let MissionSlot::Upload(up) = &mut self.mission {
            let total = up.total();
            if let Some(msg) = up.on_mission_request(seq, now, self.target_system, self.target_component) {
                self.emit(GcsEvent::MissionProgress { seq, total });
                let _ = self.link.send_mavlink(&msg).await;
            }
        }
    }

    async fn act_on_mission_step(&mut self, step: DownloadStep) {
        match step {
            DownloadStep::RequestNext(msg) | DownloadStep::SendAck(msg) => {
                let _ = self.link.send_mavlink(&msg).await;
            }
            DownloadStep::None => {}
        }
    }

    /// A mission download reaching `Done` carries its collected items out
    /// through the event, mirroring the upload path's `MissionCompleted`
    /// (which has no items of its own to report — the caller already holds
    /// the list it uploaded).
    fn finish_mission_download_if_done(&mut self) {
        let done = matches!(&self.mission, MissionSlot::Download(dl) if dl.is_done());
        if !done {
            return;
        }
        if let MissionSlot::Download(dl) = std::mem::replace(&mut self.mission, MissionSlot::None) {
            self.emit(GcsEvent::MissionCompleted { items: Some(dl.into_items()) });
        }
    }

    fn handle_param_outcome(&mut self, outcome: ParamOutcome) {
        match outcome {
            ParamOutcome::Progress { seen, total } => {
                self.emit(GcsEvent::ParameterProgress { seen, total });
            }
            ParamOutcome::Completed => {
                self.param = ParamSlot::None;
                self.emit(GcsEvent::ParameterCompleted);
            }
            ParamOutcome::None => {}
        }
    }

    async fn on_request(&mut self, req: GcsRequest) {
        match req {
            GcsRequest::Connect | GcsRequest::Disconnect => {
                // Transport lifecycle is managed by the link's own
                // supervisor task; explicit connect/disconnect requests
                // are accepted for API symmetry but are no-ops here since
                // `Link::open` already starts the reconnect loop.
            }
            GcsRequest::SetTelemetryRate(rate) => {
                self.rate = rate;
            }
            GcsRequest::FetchParameters => {
                if self.state != SessionState::Connected {
                    return;
                }
                if matches!(self.param, ParamSlot::None) {
                    let (state, msg) = ParamDownload::start(Instant::now(), self.target_system, self.target_component);
                    self.param = ParamSlot::Download(state);
                    let _ = self.link.send_mavlink(&msg).await;
                }
            }
            GcsRequest::SetParameter { name, value } => {
                if self.state != SessionState::Connected || !matches!(self.param, ParamSlot::None) {
                    return;
                }
                let (state, msg) = ParamSetRequest::start(Instant::now(), name, value, 9, self.target_system, self.target_component);
                self.param = ParamSlot::Set(state);
                let _ = self.link.send_mavlink(&msg).await;
            }
            GcsRequest::DownloadMission { mission_type } => {
                if self.state != SessionState::Connected || !matches!(self.mission, MissionSlot::None) {
                    return;
                }
                let (state, msg) = MissionDownload::start(Instant::now(), mission_type, self.target_system, self.target_component);
                self.mission = MissionSlot::Download(state);
                let _ = self.link.send_mavlink(&msg).await;
            }
            GcsRequest::UploadMission { items, mission_type } => {
                if self.state != SessionState::Connected || !matches!(self.mission, MissionSlot::None) {
                    return;
                }
                let (state, msg) = MissionUpload::start(Instant::now(), items, mission_type, self.target_system, self.target_component);
                self.mission = MissionSlot::Upload(state);
                let _ = self.link.send_mavlink(&msg).await;
            }
            GcsRequest::ExecuteCommand { command, params, use_int, x, y } => {
                if self.state != SessionState::Connected || self.command.is_some() {
                    return;
                }
                let (state, msg) = if use_int {
                    CommandExecution::start_int(Instant::now(), command, [params[0], params[1], params[2], params[3]], x, y, params[6], 0, self.target_system, self.target_component)
                } else {
                    CommandExecution::start_long(Instant::now(), command, params, 0, self.target_system, self.target_component)
                };
                self.command = Some(state);
                let _ = self.link.send_mavlink(&msg).await;
            }
            GcsRequest::StartRcOverride => self.rc.start(),
            GcsRequest::StopRcOverride => self.rc.stop(),
            GcsRequest::SetRcChannel { index, value } => self.rc.set_channel(index, value),
        }
    }

    async fn on_timer(&mut self, now: Instant) {
        if self.state == SessionState::Connected && now >= self.heartbeat_deadline {
            self.reset_identity();
            self.rc.stop();
            self.transition(SessionState::Reconnecting, now);
            return;
        }

        if self.state == SessionState::Connected && self.rc.is_active() {
            match self.link.protocol() {
                ProtocolKind::MavLink => {
                    let msg = self.rc.to_mavlink(self.target_system, self.target_component);
                    self.link.try_send_mavlink(&msg);
                }
                ProtocolKind::Msp => {
                    let msg = self.rc.to_msp();
                    self.link.try_send_msp(MspDirection::ToFc, &msg);
                }
            }
        }

        self.poll_param(now).await;
        self.poll_mission(now).await;
        self.poll_command(now).await;
    }

    async fn poll_param(&mut self, now: Instant) {
        let action = match &mut self.param {
            ParamSlot::Download(dl) => dl.poll(now, self.target_system, self.target_component),
            ParamSlot::Set(set) => set.poll(now),
            ParamSlot::None => None,
        };
        match action {
            Some(PollAction::Send(msg)) => {
                let _ = self.link.send_mavlink(&msg).await;
            }
            Some(PollAction::Failed(idx)) => {
                self.param = ParamSlot::None;
                self.emit(GcsEvent::ParameterError(ParameterError::MissingIndex(idx)));
            }
            Some(PollAction::TimedOut) => {
                let name = if let ParamSlot::Set(set) = &self.param { set.name().to_string() } else { String::new() };
                self.param = ParamSlot::None;
                self.emit(GcsEvent::ParameterError(ParameterError::SetRejected { name }));
            }
            Some(PollAction::Done) | None => {}
        }
    }

    async fn poll_mission(&mut self, now: Instant) {
        let action = match &mut self.mission {
            MissionSlot::Upload(up) => up.poll(now, self.target_system, self.target_component),
            MissionSlot::Download(dl) => dl.poll(now, self.target_system, self.target_component),
            MissionSlot::None => None,
        };
        match action {
            Some(PollAction::Send(msg)) => {
                let _ = self.link.send_mavlink(&msg).await;
            }
            Some(PollAction::TimedOut) | Some(PollAction::Failed(_)) => {
                self.mission = MissionSlot::None;
                self.emit(GcsEvent::MissionFailed { ack: 0 });
            }
            Some(PollAction::Done) | None => {}
        }
    }

    async fn poll_command(&mut self, now: Instant) {
        let Some(cmd) = &mut self.command else { return };
        match cmd.poll(now) {
            Some(PollAction::Send(msg)) => {
                let _ = self.link.send_mavlink(&msg).await;
            }
            Some(PollAction::TimedOut) => {
                let command = 0;
                self.command = None;
                self.emit(GcsEvent::CommandAcknowledged {
                    command,
                    result: mav_proto::dialect::common::MavResult::Failed,
                });
            }
            _ => {}
        }
    }
}
