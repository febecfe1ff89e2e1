//! Link layer (C5): couples one transport with a frame parser/serializer
//! for whichever protocol the link speaks, and tracks the counters
//! spec.md §4.4/§7 requires ("every dropped frame increments a counter
//! visible through an observability accessor").

use std::sync::atomic::{AtomicU64, Ordering};

use mav_proto::dialect::common::MavMessage;
use mav_proto::{CommonDialect, MavHeader, MavlinkVersion};
use msp_proto::commands::MspMessage;
use msp_proto::Direction as MspDirection;

use crate::config::{ProtocolKind, TransportConfig};
use crate::error::Result;
use crate::transport::{TransportEvent, TransportHandle};

/// A frame decoded off either protocol, handed up to the session
/// dispatcher.
#[derive(Debug, Clone)]
pub enum DecodedFrame {
    MavLink { header: MavHeader, message: MavMessage },
    Msp { direction: MspDirection, message: MspMessage },
}

/// What [`Link::next`] can report on one call.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    TransportUp,
    TransportDown { reason: String },
    Frame(DecodedFrame),
}

/// Per-link counters, read through [`Link::stats`]. `Ordering::Relaxed` is
/// sufficient — these are independent monotonic counters, not used for
/// synchronization.
#[derive(Default)]
pub struct LinkStats {
    pub frames_rx: AtomicU64,
    pub frames_crc_dropped: AtomicU64,
    pub frames_unknown_id: AtomicU64,
    pub bytes_rx: AtomicU64,
    pub bytes_tx: AtomicU64,
}

impl LinkStats {
    pub fn snapshot(&self) -> LinkStatsSnapshot {
        LinkStatsSnapshot {
            frames_rx: self.frames_rx.load(Ordering::Relaxed),
            frames_crc_dropped: self.frames_crc_dropped.load(Ordering::Relaxed),
            frames_unknown_id: self.frames_unknown_id.load(Ordering::Relaxed),
            bytes_rx: self.bytes_rx.load(Ordering::Relaxed),
            bytes_tx: self.bytes_tx.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatsSnapshot {
    pub frames_rx: u64,
    pub frames_crc_dropped: u64,
    pub frames_unknown_id: u64,
    pub bytes_rx: u64,
    pub bytes_tx: u64,
}

/// One open link: a transport plus the codec state needed to turn its
/// byte stream into frames and back.
pub struct Link {
    transport: TransportHandle,
    protocol: ProtocolKind,
    mav_parser: mav_proto::FrameParser,
    msp_parser: msp_proto::FrameParser,
    local_header: MavHeader,
    pending: Vec<DecodedFrame>,
    pub stats: LinkStats,
}

impl Link {
    pub fn open(config: TransportConfig, protocol: ProtocolKind) -> Self {
        Self {
            transport: TransportHandle::open(config),
            protocol,
            mav_parser: mav_proto::FrameParser::new(),
            msp_parser: msp_proto::FrameParser::new(),
            local_header: MavHeader::default(),
            pending: Vec::new(),
            stats: LinkStats::default(),
        }
    }

    pub fn protocol(&self) -> ProtocolKind {
        self.protocol
    }

    pub async fn next_transport_event(&mut self) -> Option<TransportEvent> {
        self.transport.next_event().await
    }

    /// Block until at least one frame is decoded (draining CRC-failure and
    /// unknown-id bookkeeping along the way), or the transport closes.
    pub async fn next_frame(&mut self) -> Option<DecodedFrame> {
        loop {
            if let Some(frame) = self.pending.pop() {
                return Some(frame);
            }
            let chunk = self.transport.recv().await?;
            self.stats.bytes_rx.fetch_add(chunk.len() as u64, Ordering::Relaxed);
            self.ingest(&chunk);
        }
    }

    /// Combined stream of transport lifecycle events and decoded frames,
    /// for callers (the session dispatcher) that need to `select!` on a
    /// single link without holding two overlapping mutable borrows.
    pub async fn next(&mut self) -> Option<LinkEvent> {
        loop {
            if let Some(frame) = self.pending.pop() {
                return Some(LinkEvent::Frame(frame));
            }
            tokio::select! {
                event = self.transport.next_event() => {
                    return Some(match event? {
                        TransportEvent::Up => LinkEvent::TransportUp,
                        TransportEvent::Down { reason } => LinkEvent::TransportDown { reason },
                    });
                }
                chunk = self.transport.recv() => {
                    let chunk = chunk?;
                    self.stats.bytes_rx.fetch_add(chunk.len() as u64, Ordering::Relaxed);
                    self.ingest(&chunk);
                }
            }
        }
    }

    fn ingest(&mut self, chunk: &[u8]) {
        match self.protocol {
            ProtocolKind::MavLink => {
                let mut events = Vec::new();
                self.mav_parser.feed(chunk, &CommonDialect, &mut events);
                for event in events {
                    match event {
                        mav_proto::ParseEvent::Frame(frame) => {
                            self.stats.frames_rx.fetch_add(1, Ordering::Relaxed);
                            match mav_proto::decode_frame(&frame) {
                                Ok(message) => self.pending.push(DecodedFrame::MavLink {
                                    header: frame.header(),
                                    message,
                                }),
                                Err(e) => {
                                    self.stats.frames_unknown_id.fetch_add(1, Ordering::Relaxed);
                                    log::debug!("mavlink decode error: {e}");
                                }
                            }
                        }
                        mav_proto::ParseEvent::CrcMismatch { id } => {
                            self.stats.frames_crc_dropped.fetch_add(1, Ordering::Relaxed);
                            log::warn!("mavlink CRC mismatch (candidate id {id:?}), discarding frame");
                        }
                        mav_proto::ParseEvent::UnsupportedIncompatFlags { flags } => {
                            self.stats.frames_crc_dropped.fetch_add(1, Ordering::Relaxed);
                            log::warn!("mavlink frame with unsupported incompat_flags {flags:#04x}, discarding");
                        }
                    }
                }
            }
            ProtocolKind::Msp => {
                let mut events = Vec::new();
                self.msp_parser.feed(chunk, &mut events);
                for event in events {
                    match event {
                        msp_proto::ParseEvent::Frame(frame) => {
                            self.stats.frames_rx.fetch_add(1, Ordering::Relaxed);
                            match msp_proto::decode_frame(&frame) {
                                Ok(message) => self.pending.push(DecodedFrame::Msp {
                                    direction: frame.direction(),
                                    message,
                                }),
                                Err(e) => {
                                    self.stats.frames_unknown_id.fetch_add(1, Ordering::Relaxed);
                                    log::debug!("msp decode error: {e}");
                                }
                            }
                        }
                        msp_proto::ParseEvent::ChecksumMismatch { cmd } => {
                            self.stats.frames_crc_dropped.fetch_add(1, Ordering::Relaxed);
                            log::warn!("msp checksum mismatch (cmd {cmd}), discarding frame");
                        }
                        msp_proto::ParseEvent::ErrorResponse { cmd, .. } => {
                            log::warn!("msp error response for cmd {cmd}");
                        }
                    }
                }
            }
        }
    }

    /// Send a MAVLink message with this link's local identity and the
    /// next sequence number (invariant I3: per-sender monotonic mod 256).
    pub async fn send_mavlink(&mut self, msg: &MavMessage) -> Result<()> {
        let wire = mav_proto::encode_frame(self.local_header, MavlinkVersion::V2, msg);
        self.local_header.sequence = self.local_header.sequence.wrapping_add(1);
        self.stats.bytes_tx.fetch_add(wire.len() as u64, Ordering::Relaxed);
        self.transport.write(wire).await
    }

    /// Best-effort send for pure-telemetry MAVLink traffic: dropped rather
    /// than blocking the caller if the outbound queue is full.
    pub fn try_send_mavlink(&mut self, msg: &MavMessage) -> bool {
        let wire = mav_proto::encode_frame(self.local_header, MavlinkVersion::V2, msg);
        self.local_header.sequence = self.local_header.sequence.wrapping_add(1);
        let len = wire.len() as u64;
        let ok = self.transport.try_write(wire).is_ok();
        if ok {
            self.stats.bytes_tx.fetch_add(len, Ordering::Relaxed);
        }
        ok
    }

    pub async fn send_msp(&mut self, direction: MspDirection, msg: &MspMessage) -> Result<()> {
        let wire = msp_proto::encode_v2(direction, 0, msg);
        self.stats.bytes_tx.fetch_add(wire.len() as u64, Ordering::Relaxed);
        self.transport.write(wire).await
    }

    pub fn try_send_msp(&mut self, direction: MspDirection, msg: &MspMessage) -> bool {
        let wire = msp_proto::encode_v2(direction, 0, msg);
        let len = wire.len() as u64;
        let ok = self.transport.try_write(wire).is_ok();
        if ok {
            self.stats.bytes_tx.fetch_add(len, Ordering::Relaxed);
        }
        ok
    }

    pub fn close(&mut self) {
        self.transport.close();
    }
}
