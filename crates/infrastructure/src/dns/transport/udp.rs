//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! One connected socket per channel. A background task reads datagrams and
//! delivers them to the pending table; truncated answers are passed through
//! untouched.

use super::{deliver, DnsTransport};
use crate::dns::upstream::PendingQueries;
use async_trait::async_trait;
use bytes::Bytes;
use doh_gateway_domain::{DomainError, MAX_DNS_MESSAGE_LEN};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    server_addr: SocketAddr,
    pending: Arc<PendingQueries>,
    closed: Arc<AtomicBool>,
    _reader: DropGuard,
}

impl UdpTransport {
    pub async fn connect(server_addr: SocketAddr) -> Result<Self, DomainError> {
        let socket = create_socket(server_addr).map_err(|e| {
            DomainError::UpstreamFailure(format!("Failed to bind UDP socket: {}", e))
        })?;
        socket.connect(server_addr).await.map_err(|e| {
            DomainError::UpstreamFailure(format!(
                "Failed to connect UDP socket to {}: {}",
                server_addr, e
            ))
        })?;

        let socket = Arc::new(socket);
        let pending = Arc::new(PendingQueries::new());
        let closed = Arc::new(AtomicBool::new(false));
        let shutdown = CancellationToken::new();

        tokio::spawn(read_loop(
            Arc::clone(&socket),
            server_addr,
            Arc::clone(&pending),
            Arc::clone(&closed),
            shutdown.clone(),
        ));

        Ok(Self {
            socket,
            server_addr,
            pending,
            closed,
            _reader: shutdown.drop_guard(),
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(&self, query: Bytes) -> Result<(), DomainError> {
        match self.socket.send(&query).await {
            Ok(bytes_sent) => {
                debug!(server = %self.server_addr, bytes_sent, "UDP query sent");
                Ok(())
            }
            Err(e) => {
                self.closed.store(true, Ordering::Release);
                Err(DomainError::UpstreamFailure(format!(
                    "Failed to send UDP query to {}: {}",
                    self.server_addr, e
                )))
            }
        }
    }

    fn pending(&self) -> &Arc<PendingQueries> {
        &self.pending
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

fn create_socket(server: SocketAddr) -> Result<UdpSocket, std::io::Error> {
    use socket2::{Domain, Protocol, Socket, Type};

    let domain = if server.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(128 * 1024)?;

    let bind_addr: SocketAddr = if server.is_ipv4() {
        SocketAddr::from(([0, 0, 0, 0], 0))
    } else {
        SocketAddr::from(([0u16; 8], 0))
    };

    socket.bind(&bind_addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}

async fn read_loop(
    socket: Arc<UdpSocket>,
    server_addr: SocketAddr,
    pending: Arc<PendingQueries>,
    closed: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    let mut recv_buf = vec![0u8; MAX_DNS_MESSAGE_LEN];

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = socket.recv(&mut recv_buf) => match result {
                Ok(len) => {
                    debug!(server = %server_addr, bytes_received = len, "UDP response received");
                    deliver(&pending, Bytes::copy_from_slice(&recv_buf[..len]), &server_addr);
                }
                Err(e) => {
                    warn!(server = %server_addr, error = %e, "UDP upstream channel failed");
                    closed.store(true, Ordering::Release);
                    pending.fail_all();
                    break;
                }
            }
        }
    }
}
