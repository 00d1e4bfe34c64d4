use doh_gateway_application::use_cases::HandleDohQueryUseCase;
use doh_gateway_domain::StatusMapping;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub handle_query: Arc<HandleDohQueryUseCase>,
    pub status_mapping: StatusMapping,
}

impl AppState {
    pub fn new(handle_query: Arc<HandleDohQueryUseCase>, status_mapping: StatusMapping) -> Self {
        Self {
            handle_query,
            status_mapping,
        }
    }
}
