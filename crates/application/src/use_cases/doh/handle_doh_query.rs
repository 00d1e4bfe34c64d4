use crate::ports::UpstreamDispatcher;
use crate::services::{RequestDecoder, ResponseEncoder};
use bytes::Bytes;
use doh_gateway_domain::{DohRequest, DomainError};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Decode, forward and re-encode a single DoH request.
pub struct HandleDohQueryUseCase {
    dispatcher: Arc<dyn UpstreamDispatcher>,
}

impl HandleDohQueryUseCase {
    pub fn new(dispatcher: Arc<dyn UpstreamDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn execute(&self, request: &DohRequest) -> Result<Bytes, DomainError> {
        let start = Instant::now();

        let query = RequestDecoder::decode(request)?;
        let client_id = query.id();
        debug!(
            method = request.method.as_str(),
            client_id,
            len = query.as_bytes().len(),
            "Decoded DoH query"
        );

        let response = self.dispatcher.dispatch(&query).await?;
        let body = ResponseEncoder::encode(client_id, &response)?;

        debug!(
            client_id,
            len = body.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Upstream answered"
        );
        Ok(body)
    }
}
