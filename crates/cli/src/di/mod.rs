use doh_gateway_api::AppState;
use doh_gateway_application::use_cases::HandleDohQueryUseCase;
use doh_gateway_domain::Config;
use doh_gateway_infrastructure::dns::ForwardingDispatcher;
use std::sync::Arc;
use tracing::info;

pub struct DohServices {
    pub dispatcher: Arc<ForwardingDispatcher>,
    pub app_state: AppState,
}

impl DohServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let transport = config
            .upstream
            .transport_config()
            .map_err(|e| anyhow::anyhow!("Invalid upstream: {}", e))?;

        info!(
            upstream = %transport.endpoint,
            protocol = transport.endpoint.protocol_name(),
            timeout_ms = transport.timeout_ms(),
            max_in_flight = transport.max_in_flight,
            "Initializing upstream dispatcher"
        );

        let dispatcher = Arc::new(ForwardingDispatcher::new(transport));
        let handle_query = Arc::new(HandleDohQueryUseCase::new(dispatcher.clone()));
        let app_state = AppState::new(handle_query, config.server.status_mapping);

        Ok(Self {
            dispatcher,
            app_state,
        })
    }
}
