//! Transport abstraction (C4): serial, TCP, UDP, each a supervised tokio
//! task that owns its own reconnect state and forwards raw bytes over
//! bounded channels. Generalizes the teacher's one-shot
//! `async_connection::{tcp,udp,direct_serial}::*` connectors, which return
//! an already-open connection, into a long-lived handle that reopens on
//! its own after a drop (SPEC_FULL.md §5.3).

mod serial;
mod tcp;
mod udp;

use tokio::sync::{mpsc, oneshot};

use crate::config::TransportConfig;
use crate::error::{GcsError, Result};

/// Outbound/inbound channel depth. Bounded so a write naturally backs
/// pressure the caller once the wire (or the OS socket buffer) can't keep
/// up, per spec.md §4.3's backpressure requirement.
pub const CHANNEL_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub enum TransportEvent {
    Up,
    Down { reason: String },
}

/// A live transport: a pair of channels plus an event feed, backed by a
/// supervisor task that owns reconnect/backoff policy (spec.md §4.3) and
/// is invisible to callers — they only ever see `Up`/`Down` events.
pub struct TransportHandle {
    outbound_tx: mpsc::Sender<Vec<u8>>,
    inbound_rx: mpsc::Receiver<Vec<u8>>,
    events_rx: mpsc::Receiver<TransportEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TransportHandle {
    /// Open a transport per `config`. Returns immediately; the underlying
    /// connect attempt and any reconnect loop run on a spawned task.
    pub fn open(config: TransportConfig) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_DEPTH);
        let (inbound_tx, inbound_rx) = mpsc::channel(CHANNEL_DEPTH);
        let (events_tx, events_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        match config {
            TransportConfig::Serial { path, baud } => {
                tokio::spawn(serial::run(path, baud, outbound_rx, inbound_tx, events_tx, shutdown_rx));
            }
            TransportConfig::Tcp { host, port } => {
                tokio::spawn(tcp::run(host, port, outbound_rx, inbound_tx, events_tx, shutdown_rx));
            }
            TransportConfig::Udp {
                local_port,
                remote_host,
                remote_port,
            } => {
                tokio::spawn(udp::run(
                    local_port,
                    remote_host,
                    remote_port,
                    outbound_rx,
                    inbound_tx,
                    events_tx,
                    shutdown_rx,
                ));
            }
        }

        Self {
            outbound_tx,
            inbound_rx,
            events_rx,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Enqueue bytes for transmission. Blocks (applying backpressure) once
    /// the bounded outbound channel is full; the link layer decides
    /// whether a given message is allowed to block or must be dropped
    /// (spec.md §4.3/§6).
    pub async fn write(&self, bytes: Vec<u8>) -> Result<()> {
        self.outbound_tx
            .send(bytes)
            .await
            .map_err(|_| GcsError::protocol("transport task has shut down"))
    }

    /// Non-blocking write used for pure-telemetry traffic that must never
    /// stall the caller: drop-oldest-on-full per spec.md §4.3.
    pub fn try_write(&self, bytes: Vec<u8>) -> std::result::Result<(), Vec<u8>> {
        self.outbound_tx.try_send(bytes).map_err(|e| match e {
            mpsc::error::TrySendError::Full(b) => b,
            mpsc::error::TrySendError::Closed(b) => b,
        })
    }

    /// Receive the next chunk of inbound bytes, or `None` once the
    /// transport task has exited for good.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.inbound_rx.recv().await
    }

    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events_rx.recv().await
    }

    /// Close the transport. The supervisor task tears down its socket and
    /// exits; in-flight reconnect backoff is cancelled.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        self.close();
    }
}
