//! Active TCP client transport, grounded on
//! `async_connection::tcp::tcpout` but generalized into a supervised
//! reconnect loop (spec.md §4.3: same 500ms/1s/2s/4s backoff as serial).

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use super::TransportEvent;
use crate::config::backoff_for_attempt;

const READ_CHUNK: usize = 280;

pub(super) async fn run(
    host: String,
    port: u16,
    mut outbound_rx: mpsc::Receiver<Vec<u8>>,
    inbound_tx: mpsc::Sender<Vec<u8>>,
    events_tx: mpsc::Sender<TransportEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut attempt = 0u32;

    'reconnect: loop {
        tokio::select! {
            _ = &mut shutdown_rx => return,
            stream = TcpStream::connect((host.as_str(), port)) => {
                let mut stream = match stream {
                    Ok(s) => s,
                    Err(e) => {
                        log::warn!("tcp connect to {host}:{port} failed: {e}");
                        let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                        let backoff = backoff_for_attempt(attempt);
                        attempt = attempt.saturating_add(1);
                        tokio::select! {
                            _ = &mut shutdown_rx => return,
                            _ = tokio::time::sleep(backoff) => continue 'reconnect,
                        }
                    }
                };
                attempt = 0;
                let _ = events_tx.send(TransportEvent::Up).await;

                let mut buf = [0u8; READ_CHUNK];
                loop {
                    tokio::select! {
                        _ = &mut shutdown_rx => return,
                        outgoing = outbound_rx.recv() => {
                            match outgoing {
                                Some(bytes) => {
                                    if let Err(e) = stream.write_all(&bytes).await {
                                        log::warn!("tcp write to {host}:{port} failed: {e}");
                                        let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                                        continue 'reconnect;
                                    }
                                }
                                None => return, // sender dropped: handle being torn down
                            }
                        }
                        read = stream.read(&mut buf) => {
                            match read {
                                Ok(0) => {
                                    log::warn!("tcp connection to {host}:{port} closed (EOF)");
                                    let _ = events_tx.send(TransportEvent::Down { reason: "EOF".into() }).await;
                                    continue 'reconnect;
                                }
                                Ok(n) => {
                                    if inbound_tx.send(buf[..n].to_vec()).await.is_err() {
                                        return;
                                    }
                                }
                                Err(e) => {
                                    log::warn!("tcp read from {host}:{port} failed: {e}");
                                    let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                                    continue 'reconnect;
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
