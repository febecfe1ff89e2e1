//! Diagnostic CLI: open a transport, drive a [`gcs_core::session::Session`],
//! and print decoded events to stdout. Grounded on the teacher's
//! `mavlink-dump` bin (`src/bin/mavlink-dump.rs`): same "parse a connection
//! string, send a heartbeat, print whatever comes back" shape, adapted to
//! this crate's typed event surface instead of a raw `recv()` loop.
//!
//! A developer tool, not the product UI — real UIs subscribe to
//! [`gcs_core::events::GcsEvent`] directly instead of formatting it to a
//! terminal.

use std::env;
use std::process::ExitCode;

use gcs_core::{GcsEvent, ProtocolKind, RateProfile, TransportConfig};

fn usage() -> &'static str {
    "Usage: gcs-dump (mavlink|msp) (tcp:<host>:<port>|udp:<local_port>[:<remote_host>:<remote_port>]|serial:<path>:<baud>)"
}

fn parse_transport(spec: &str) -> Option<TransportConfig> {
    let mut parts = spec.split(':');
    match parts.next()? {
        "tcp" => {
            let host = parts.next()?.to_string();
            let port = parts.next()?.parse().ok()?;
            Some(TransportConfig::Tcp { host, port })
        }
        "udp" => {
            let local_port = parts.next()?.parse().ok()?;
            let remote_host = parts.next().map(str::to_string);
            let remote_port = parts.next().and_then(|p| p.parse().ok());
            Some(TransportConfig::Udp { local_port, remote_host, remote_port })
        }
        "serial" => {
            let path = parts.next()?.to_string();
            let baud = parts.next()?.parse().ok()?;
            Some(TransportConfig::Serial { path, baud })
        }
        _ => None,
    }
}

fn parse_protocol(s: &str) -> Option<ProtocolKind> {
    match s {
        "mavlink" => Some(ProtocolKind::MavLink),
        "msp" => Some(ProtocolKind::Msp),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<_> = env::args().collect();
    let (Some(protocol_arg), Some(transport_arg)) = (args.get(1), args.get(2)) else {
        println!("{}", usage());
        return ExitCode::FAILURE;
    };
    let Some(protocol) = parse_protocol(protocol_arg) else {
        eprintln!("unknown protocol {protocol_arg:?}\n{}", usage());
        return ExitCode::FAILURE;
    };
    let Some(transport) = parse_transport(transport_arg) else {
        eprintln!("could not parse transport {transport_arg:?}\n{}", usage());
        return ExitCode::FAILURE;
    };

    let handle = gcs_core::spawn(transport, protocol, RateProfile::Normal);
    let mut events = handle.subscribe();

    println!("gcs-dump: waiting for events (ctrl-c to quit)...");
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => print_event(&event),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        log::warn!("event subscriber lagged, dropped {n} events");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        println!("session closed");
                        return ExitCode::SUCCESS;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("interrupted");
                return ExitCode::SUCCESS;
            }
        }
    }
}

fn print_event(event: &GcsEvent) {
    match event {
        GcsEvent::ConnectionStateChanged { state, identity } => {
            println!("[connection] {state:?} identity={identity:?}");
        }
        GcsEvent::TelemetryUpdated { category, snapshot } => {
            println!("[telemetry] {category:?} -> {snapshot:?}");
        }
        GcsEvent::MessageReceived { name, id, sys, comp } => {
            println!("[message] {name} (id {id}) from {sys}/{comp}");
        }
        GcsEvent::ParameterProgress { seen, total } => {
            println!("[param] progress {seen}/{total}");
        }
        GcsEvent::ParameterCompleted => println!("[param] download complete"),
        GcsEvent::ParameterError(e) => println!("[param] error: {e:?}"),
        GcsEvent::MissionProgress { seq, total } => {
            println!("[mission] progress {seq}/{total}");
        }
        GcsEvent::MissionCompleted { items: Some(items) } => {
            println!("[mission] download complete, {} items", items.len());
        }
        GcsEvent::MissionCompleted { items: None } => println!("[mission] upload complete"),
        GcsEvent::MissionFailed { ack } => println!("[mission] failed, ack={ack}"),
        GcsEvent::CommandAcknowledged { command, result } => {
            println!("[command] {command} -> {result:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tcp_transport() {
        let cfg = parse_transport("tcp:127.0.0.1:5760").unwrap();
        assert_eq!(cfg, TransportConfig::Tcp { host: "127.0.0.1".into(), port: 5760 });
    }

    #[test]
    fn parses_serial_transport() {
        let cfg = parse_transport("serial:/dev/ttyUSB0:57600").unwrap();
        assert_eq!(cfg, TransportConfig::Serial { path: "/dev/ttyUSB0".into(), baud: 57600 });
    }

    #[test]
    fn parses_bare_udp_without_remote_peer() {
        let cfg = parse_transport("udp:14550").unwrap();
        assert_eq!(cfg, TransportConfig::Udp { local_port: 14550, remote_host: None, remote_port: None });
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(parse_transport("carrier-pigeon:1").is_none());
    }
}
