use super::messages::answer_for;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamBehavior {
    /// Echo the query identifier with one A record.
    Answer,
    /// Send a reply with a foreign identifier first, then the real answer.
    StrayThenAnswer,
    /// Read queries and never reply.
    Silent,
    /// (TCP) Close the first connection after reading a query; answer on
    /// later connections.
    HangUpFirst,
}

fn reply_for(query: &[u8]) -> Vec<u8> {
    let id = u16::from_be_bytes([query[0], query[1]]);
    answer_for(query, id)
}

fn stray_reply_for(query: &[u8]) -> Vec<u8> {
    let id = u16::from_be_bytes([query[0], query[1]]);
    answer_for(query, id.wrapping_add(1))
}

pub struct MockUdpUpstream {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUdpUpstream {
    pub async fn start(behavior: UpstreamBehavior) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let query = &buf[..len];
                        match behavior {
                            UpstreamBehavior::Silent => {}
                            UpstreamBehavior::StrayThenAnswer => {
                                let _ = socket.send_to(&stray_reply_for(query), peer).await;
                                let _ = socket.send_to(&reply_for(query), peer).await;
                            }
                            _ => {
                                let _ = socket.send_to(&reply_for(query), peer).await;
                            }
                        }
                    }
                }
            }
        });

        Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries_received(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockUdpUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub struct MockTcpUpstream {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTcpUpstream {
    pub async fn start(behavior: UpstreamBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        let index = counter.fetch_add(1, Ordering::SeqCst);
                        let hang_up = behavior == UpstreamBehavior::HangUpFirst && index == 0;
                        tokio::spawn(serve_connection(stream, behavior, hang_up));
                    }
                }
            }
        });

        Self {
            addr,
            connections,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connections_accepted(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for MockTcpUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_connection(mut stream: TcpStream, behavior: UpstreamBehavior, hang_up: bool) {
    loop {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }

        if hang_up {
            return;
        }

        let replies = match behavior {
            UpstreamBehavior::Silent => vec![],
            UpstreamBehavior::StrayThenAnswer => vec![stray_reply_for(&query), reply_for(&query)],
            _ => vec![reply_for(&query)],
        };
        for reply in replies {
            let mut frame = (reply.len() as u16).to_be_bytes().to_vec();
            frame.extend_from_slice(&reply);
            if stream.write_all(&frame).await.is_err() {
                return;
            }
        }
    }
}
