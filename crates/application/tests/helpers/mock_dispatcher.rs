use super::messages::answer_for;
use async_trait::async_trait;
use doh_gateway_application::ports::UpstreamDispatcher;
use doh_gateway_domain::{DnsMessage, DomainError};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer the query with an A record, using `id` as the reply identifier.
    Answer { id: u16, ip: Ipv4Addr },
    /// Return these bytes verbatim.
    Raw(Vec<u8>),
    Fail(DomainError),
}

pub struct MockDispatcher {
    reply: MockReply,
    calls: AtomicUsize,
    last_query: Mutex<Option<DnsMessage>>,
}

impl MockDispatcher {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn answering(id: u16) -> Self {
        Self::new(MockReply::Answer {
            id,
            ip: Ipv4Addr::new(93, 184, 216, 34),
        })
    }

    pub fn failing(error: DomainError) -> Self {
        Self::new(MockReply::Fail(error))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<DnsMessage> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamDispatcher for MockDispatcher {
    async fn dispatch(&self, query: &DnsMessage) -> Result<DnsMessage, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        match &self.reply {
            MockReply::Answer { id, ip } => DnsMessage::from_wire(answer_for(query.as_bytes(), *id, *ip)),
            MockReply::Raw(bytes) => DnsMessage::from_wire(bytes.clone()),
            MockReply::Fail(error) => Err(error.clone()),
        }
    }
}
