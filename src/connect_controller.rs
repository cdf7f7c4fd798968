// Connect-phase listener on the well-known port. Answers PING and hands each
// HELLO a private V086 session port.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ConnectError;
use crate::fields;
use crate::kaillera::connect::ConnectMessage;
use crate::v086_controller::V086Controller;

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    pings: AtomicU64,
    format_errors: AtomicU64,
    protocol_errors: AtomicU64,
    denied_server_full: AtomicU64,
    denied_other: AtomicU64,
    connects: AtomicU64,
}

/// Point-in-time copy of the connect counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectStats {
    pub requests: u64,
    pub pings: u64,
    pub format_errors: u64,
    pub protocol_errors: u64,
    pub denied_server_full: u64,
    pub denied_other: u64,
    pub connects: u64,
}

pub struct ConnectController {
    socket: UdpSocket,
    v086: Arc<V086Controller>,
    buffer_size: usize,
    counters: Counters,
}

impl ConnectController {
    pub async fn bind(config: &Config, v086: Arc<V086Controller>) -> io::Result<Self> {
        let socket =
            UdpSocket::bind((config.connect.bind_address.as_str(), config.connect.port)).await?;
        info!(
            { fields::ADDR } = %socket.local_addr()?,
            "Connect controller listening"
        );
        Ok(Self {
            socket,
            v086,
            buffer_size: config.connect.buffer_size,
            counters: Counters::default(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn stats(&self) -> ConnectStats {
        let c = &self.counters;
        ConnectStats {
            requests: c.requests.load(Ordering::Relaxed),
            pings: c.pings.load(Ordering::Relaxed),
            format_errors: c.format_errors.load(Ordering::Relaxed),
            protocol_errors: c.protocol_errors.load(Ordering::Relaxed),
            denied_server_full: c.denied_server_full.load(Ordering::Relaxed),
            denied_other: c.denied_other.load(Ordering::Relaxed),
            connects: c.connects.load(Ordering::Relaxed),
        }
    }

    /// Serves requests until `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut buf = vec![0u8; self.buffer_size];
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                result = self.socket.recv_from(&mut buf) => {
                    let (len, src) = match result {
                        Ok(ok) => ok,
                        Err(e) => {
                            debug!({ fields::ERROR } = %e, "recv_from failed, continuing");
                            continue;
                        }
                    };
                    if let Some(response) = self.handle(&buf[..len], src).await {
                        if let Err(e) = self.socket.send_to(&response.to_bytes(), src).await {
                            warn!(
                                { fields::ADDR } = %src,
                                { fields::ERROR } = %e,
                                "Failed to send response"
                            );
                        }
                    }
                }
            }
        }
        info!(stats = ?self.stats(), "Connect controller stopped");
    }

    async fn handle(&self, data: &[u8], src: SocketAddr) -> Option<ConnectMessage> {
        let c = &self.counters;
        c.requests.fetch_add(1, Ordering::Relaxed);

        let message = match ConnectMessage::parse(data) {
            Ok(message) => message,
            Err(e) => {
                c.format_errors.fetch_add(1, Ordering::Relaxed);
                warn!(
                    { fields::ADDR } = %src,
                    { fields::ERROR } = %e,
                    "Received invalid connect message"
                );
                return None;
            }
        };

        let protocol = match message {
            ConnectMessage::Ping => {
                c.pings.fetch_add(1, Ordering::Relaxed);
                debug!({ fields::ADDR } = %src, "Ping");
                return Some(ConnectMessage::Pong);
            }
            ConnectMessage::Hello { protocol } => protocol,
            other => {
                c.format_errors.fetch_add(1, Ordering::Relaxed);
                warn!(
                    { fields::ADDR } = %src,
                    message = %other,
                    "Received unexpected connect message"
                );
                return None;
            }
        };

        match self.v086.new_connection(src, &protocol).await {
            Ok(port) => {
                c.connects.fetch_add(1, Ordering::Relaxed);
                debug!(
                    { fields::ADDR } = %src,
                    { fields::PORT } = port,
                    "Allocated session port"
                );
                Some(ConnectMessage::HelloD00d { port })
            }
            Err(ConnectError::ServerFull) => {
                c.denied_server_full.fetch_add(1, Ordering::Relaxed);
                debug!({ fields::ADDR } = %src, "Sending server full response");
                Some(ConnectMessage::TooMany)
            }
            Err(ConnectError::UnsupportedProtocol(protocol)) => {
                c.protocol_errors.fetch_add(1, Ordering::Relaxed);
                error!(
                    { fields::ADDR } = %src,
                    { fields::PROTOCOL } = %protocol,
                    "Client requested an unhandled protocol"
                );
                None
            }
            Err(e @ ConnectError::Bind { .. }) => {
                c.denied_other.fetch_add(1, Ordering::Relaxed);
                error!(
                    { fields::ADDR } = %src,
                    { fields::ERROR } = %e,
                    "Session failed to start"
                );
                None
            }
        }
    }
}
