//! Pending-query table for a single upstream channel.
//!
//! Every forwarded query is registered under a fresh 16-bit wire identifier
//! that is unique among the channel's outstanding queries. The reader side
//! looks the identifier up when a reply arrives and hands the bytes to the
//! waiting task through a oneshot channel.

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use doh_gateway_domain::DomainError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Number of distinct DNS transaction identifiers.
const ID_SPACE: u32 = 1 << 16;

struct PendingEntry {
    client_id: u16,
    token: u64,
    tx: oneshot::Sender<Bytes>,
}

#[derive(Default)]
pub struct PendingQueries {
    entries: DashMap<u16, PendingEntry>,
    next_token: AtomicU64,
}

impl PendingQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a free wire identifier for a query whose client used
    /// `client_id`.
    ///
    /// The returned guard releases the identifier when dropped; the receiver
    /// yields the reply, or an error once the channel is failed.
    pub fn register(
        self: &Arc<Self>,
        client_id: u16,
    ) -> Result<(PendingGuard, oneshot::Receiver<Bytes>), DomainError> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let start = fastrand::u16(..);

        for offset in 0..ID_SPACE {
            let wire_id = start.wrapping_add(offset as u16);
            if let Entry::Vacant(slot) = self.entries.entry(wire_id) {
                let (tx, rx) = oneshot::channel();
                slot.insert(PendingEntry {
                    client_id,
                    token,
                    tx,
                });
                let guard = PendingGuard {
                    pending: Arc::clone(self),
                    wire_id,
                    token,
                };
                return Ok((guard, rx));
            }
        }

        Err(DomainError::UpstreamFailure(
            "no free transaction identifier for upstream query".to_string(),
        ))
    }

    /// Whether a query registered under `wire_id` is still waiting for its
    /// reply.
    pub fn is_waiting(&self, wire_id: u16) -> bool {
        self.entries
            .get(&wire_id)
            .is_some_and(|entry| !entry.tx.is_closed())
    }

    /// Delivers `reply` to the query registered under `wire_id`.
    ///
    /// Returns the client identifier of the matched query, or `None` when no
    /// query is waiting on that identifier (late or unsolicited reply).
    pub fn complete(&self, wire_id: u16, reply: Bytes) -> Option<u16> {
        let (_, entry) = self.entries.remove(&wire_id)?;
        let _ = entry.tx.send(reply);
        Some(entry.client_id)
    }

    /// Drops every outstanding query; their receivers observe a closed
    /// channel.
    pub fn fail_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Removes its pending entry on drop, unless the identifier has since been
/// handed to a newer query.
pub struct PendingGuard {
    pending: Arc<PendingQueries>,
    wire_id: u16,
    token: u64,
}

impl PendingGuard {
    pub fn wire_id(&self) -> u16 {
        self.wire_id
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let token = self.token;
        self.pending
            .entries
            .remove_if(&self.wire_id, |_, entry| entry.token == token);
    }
}
