//! Serial transport, grounded on
//! `async_connection::direct_serial::AsyncSerialConnection`'s port setup
//! but generalized into a supervised reconnect loop (spec.md §4.3:
//! hot-reopen on disconnect).

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio_serial::SerialPortBuilderExt;

use super::TransportEvent;
use crate::config::backoff_for_attempt;

const READ_CHUNK: usize = 280;

pub(super) async fn run(
    path: String,
    baud: u32,
    mut outbound_rx: mpsc::Receiver<Vec<u8>>,
    inbound_tx: mpsc::Sender<Vec<u8>>,
    events_tx: mpsc::Sender<TransportEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut attempt = 0u32;

    'reopen: loop {
        let opened = tokio_serial::new(&path, baud).open_native_async().and_then(|mut port| {
            port.set_data_bits(tokio_serial::DataBits::Eight)?;
            port.set_parity(tokio_serial::Parity::None)?;
            port.set_stop_bits(tokio_serial::StopBits::One)?;
            port.set_flow_control(tokio_serial::FlowControl::None)?;
            Ok(port)
        });

        let mut port = match opened {
            Ok(p) => p,
            Err(e) => {
                log::warn!("serial open {path} failed: {e}");
                let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                let backoff = backoff_for_attempt(attempt);
                attempt = attempt.saturating_add(1);
                tokio::select! {
                    _ = &mut shutdown_rx => return,
                    _ = tokio::time::sleep(backoff) => continue 'reopen,
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
                            if let Err(e) = port.write_all(&bytes).await {
                                log::warn!("serial write to {path} failed: {e}");
                                let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                                continue 'reopen;
                            }
                        }
                        None => return,
                    }
                }
                read = port.read(&mut buf) => {
                    match read {
                        Ok(0) => continue,
                        Ok(n) => {
                            if inbound_tx.send(buf[..n].to_vec()).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            log::warn!("serial read from {path} failed: {e}");
                            let _ = events_tx.send(TransportEvent::Down { reason: e.to_string() }).await;
                            continue 'reopen;
                        }
                    }
                }
            }
        }
    }
}
