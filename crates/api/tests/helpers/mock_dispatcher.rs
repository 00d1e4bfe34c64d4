use super::messages::answer_for;
use async_trait::async_trait;
use doh_gateway_application::ports::UpstreamDispatcher;
use doh_gateway_domain::{DnsMessage, DomainError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every query with a fixed reply identifier, or fails with a fixed
/// error.
pub struct MockDispatcher {
    reply: Result<u16, DomainError>,
    raw: Option<Vec<u8>>,
    calls: AtomicUsize,
}

impl MockDispatcher {
    pub fn answering(reply_id: u16) -> Self {
        Self {
            reply: Ok(reply_id),
            raw: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            reply: Err(error),
            raw: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn raw(bytes: Vec<u8>) -> Self {
        Self {
            reply: Ok(0),
            raw: Some(bytes),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamDispatcher for MockDispatcher {
    async fn dispatch(&self, query: &DnsMessage) -> Result<DnsMessage, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(raw) = &self.raw {
            return DnsMessage::from_wire(raw.clone());
        }
        match &self.reply {
            Ok(id) => DnsMessage::from_wire(answer_for(query.as_bytes(), *id)),
            Err(error) => Err(error.clone()),
        }
    }
}
