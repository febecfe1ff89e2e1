//! UDP transport: symmetric (send/receive from whichever peer is
//! configured) or listener (the first peer heard becomes the default
//! destination), per spec.md §4.3.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};

use super::TransportEvent;
use crate::config::backoff_for_attempt;

const READ_CHUNK: usize = 280;

pub(super) async fn run(
    local_port: u16,
    remote_host: Option<String>,
    remote_port: Option<u16>,
    mut outbound_rx: mpsc::Receiver<Vec<u8>>,
    inbound_tx: mpsc::Sender<Vec<u8>>,
    events_tx: mpsc::Sender<TransportEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let configured_remote: Option<String> = match (remote_host, remote_port) {
        (Some(h), Some(p)) => Some(format!("{h}:{p}")),
        _ => None,
    };

    let mut attempt = 0u32;

    'rebind: loop {
        let bind_addr = format!("0.0.0.0:{local_port}");
        let socket = match UdpSocket::bind(&bind_addr).await {
            Ok(s) => s,
            Err(e) => {
                log::warn!("udp bind {bind_addr} failed: {e}");
                let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                let backoff = backoff_for_attempt(attempt);
                attempt = attempt.saturating_add(1);
                tokio::select! {
                    _ = &mut shutdown_rx => return,
                    _ = tokio::time::sleep(backoff) => continue 'rebind,
                }
            }
        };
        attempt = 0;

        let mut peer: Option<SocketAddr> = None;
        if let Some(remote) = &configured_remote {
            match tokio::net::lookup_host(remote).await {
                Ok(mut addrs) => peer = addrs.next(),
                Err(e) => log::warn!("udp remote {remote} did not resolve: {e}"),
            }
        }
        let _ = events_tx.send(TransportEvent::Up).await;

        let mut buf = [0u8; READ_CHUNK];
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => return,
                outgoing = outbound_rx.recv() => {
                    match outgoing {
                        Some(bytes) => {
                            let Some(dest) = peer else {
                                log::warn!("udp write dropped: no peer has been heard from yet");
                                continue;
                            };
                            if let Err(e) = socket.send_to(&bytes, dest).await {
                                log::warn!("udp send to {dest} failed: {e}");
                                let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                                continue 'rebind;
                            }
                        }
                        None => return,
                    }
                }
                read = socket.recv_from(&mut buf) => {
                    match read {
                        Ok((n, from)) => {
                            if peer.is_none() {
                                log::info!("udp: first peer heard from {from}, adopting as destination");
                            }
                            peer = Some(from);
                            if inbound_tx.send(buf[..n].to_vec()).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            log::warn!("udp recv on {bind_addr} failed (permanent): {e}");
                            let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                            continue 'rebind;
                        }
                    }
                }
            }
        }
    }
}
