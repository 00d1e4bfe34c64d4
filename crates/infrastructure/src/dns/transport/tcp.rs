//! Length-prefixed stream transport (RFC 1035 §4.2.2), shared by TCP and TLS.
//!
//! The stream is split: a reader task delivers replies to the pending table
//! and a writer task drains a queue of outgoing frames, so a query cancelled
//! mid-send never leaves a partial frame on the wire.

use super::{deliver, DnsTransport};
use crate::dns::upstream::PendingQueries;
use async_trait::async_trait;
use bytes::Bytes;
use doh_gateway_domain::{DnsMessage, DomainError, MAX_DNS_MESSAGE_LEN};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

const WRITE_QUEUE_DEPTH: usize = 256;

pub struct StreamTransport {
    writer: mpsc::Sender<Bytes>,
    server: String,
    protocol: &'static str,
    pending: Arc<PendingQueries>,
    closed: Arc<AtomicBool>,
    _tasks: DropGuard,
}

impl StreamTransport {
    pub fn spawn<S>(stream: S, server: String, protocol: &'static str) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let (tx, rx) = mpsc::channel(WRITE_QUEUE_DEPTH);
        let pending = Arc::new(PendingQueries::new());
        let closed = Arc::new(AtomicBool::new(false));
        let shutdown = CancellationToken::new();

        let channel = ChannelState {
            server: server.clone(),
            pending: Arc::clone(&pending),
            closed: Arc::clone(&closed),
            shutdown: shutdown.clone(),
        };
        tokio::spawn(read_loop(reader, channel.clone()));
        tokio::spawn(write_loop(writer, rx, channel));

        Self {
            writer: tx,
            server,
            protocol,
            pending,
            closed,
            _tasks: shutdown.drop_guard(),
        }
    }
}

#[async_trait]
impl DnsTransport for StreamTransport {
    async fn send(&self, query: Bytes) -> Result<(), DomainError> {
        self.writer.send(query).await.map_err(|_| {
            self.closed.store(true, Ordering::Release);
            DomainError::UpstreamFailure(format!(
                "{} connection to {} is closed",
                self.protocol, self.server
            ))
        })
    }

    fn pending(&self) -> &Arc<PendingQueries> {
        &self.pending
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.writer.is_closed()
    }

    fn protocol_name(&self) -> &'static str {
        self.protocol
    }
}

pub async fn connect(server_addr: SocketAddr) -> Result<StreamTransport, DomainError> {
    let stream = connect_tcp(server_addr).await?;
    debug!(server = %server_addr, "TCP connection established");
    Ok(StreamTransport::spawn(stream, server_addr.to_string(), "TCP"))
}

pub(crate) async fn connect_tcp(server_addr: SocketAddr) -> Result<TcpStream, DomainError> {
    let stream = TcpStream::connect(server_addr).await.map_err(|e| {
        DomainError::UpstreamFailure(format!(
            "Connection to {} failed: {}",
            server_addr, e
        ))
    })?;

    stream.set_nodelay(true).map_err(|e| {
        DomainError::UpstreamFailure(format!(
            "Failed to set TCP_NODELAY on {}: {}",
            server_addr, e
        ))
    })?;

    Ok(stream)
}

#[derive(Clone)]
struct ChannelState {
    server: String,
    pending: Arc<PendingQueries>,
    closed: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl ChannelState {
    fn fail(&self, error: &DomainError) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            warn!(server = %self.server, error = %error, "Upstream stream channel failed");
        }
        self.pending.fail_all();
        self.shutdown.cancel();
    }
}

async fn read_loop<R>(mut reader: R, channel: ChannelState)
where
    R: AsyncRead + Unpin,
{
    loop {
        tokio::select! {
            _ = channel.shutdown.cancelled() => break,
            result = read_with_length_prefix(&mut reader) => match result {
                Ok(reply) => deliver(&channel.pending, Bytes::from(reply), &channel.server),
                Err(e) => {
                    channel.fail(&e);
                    break;
                }
            }
        }
    }
}

async fn write_loop<W>(mut writer: W, mut queue: mpsc::Receiver<Bytes>, channel: ChannelState)
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            _ = channel.shutdown.cancelled() => break,
            frame = queue.recv() => {
                let Some(frame) = frame else { break };
                let abandoned = DnsMessage::peek_id(&frame)
                    .is_some_and(|wire_id| !channel.pending.is_waiting(wire_id));
                if abandoned {
                    debug!(server = %channel.server, "Dropping frame of abandoned query");
                    continue;
                }
                if let Err(e) = send_with_length_prefix(&mut writer, &frame).await {
                    channel.fail(&e);
                    break;
                }
                debug!(server = %channel.server, message_len = frame.len(), "Stream query sent");
            }
        }
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), DomainError>
where
    S: AsyncWrite + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::UpstreamFailure(format!(
            "Query too large: {} bytes (max {})",
            message_bytes.len(),
            MAX_DNS_MESSAGE_LEN
        ))
    })?;

    stream.write_all(&length.to_be_bytes()).await.map_err(|e| {
        DomainError::UpstreamFailure(format!("Failed to write length prefix: {}", e))
    })?;
    stream.write_all(message_bytes).await.map_err(|e| {
        DomainError::UpstreamFailure(format!("Failed to write DNS message: {}", e))
    })?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::UpstreamFailure(format!("Failed to flush stream: {}", e)))?;

    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DomainError>
where
    S: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await.map_err(|e| {
        DomainError::UpstreamFailure(format!("Failed to read response length: {}", e))
    })?;

    let response_len = u16::from_be_bytes(len_buf) as usize;

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await.map_err(|e| {
        DomainError::UpstreamFailure(format!("Failed to read response body: {}", e))
    })?;

    Ok(response)
}
