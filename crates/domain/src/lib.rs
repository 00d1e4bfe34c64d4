//! DoH Gateway Domain Layer
pub mod config;
pub mod dns_message;
pub mod dns_protocol;
pub mod doh_request;
pub mod errors;
pub mod transport_config;

pub use config::{CliOverrides, Config, ConfigError, LogFormat, StatusMapping};
pub use dns_message::{DnsMessage, DNS_HEADER_LEN, MAX_DNS_MESSAGE_LEN};
pub use dns_protocol::{DnsProtocol, UpstreamAddr, UpstreamProtocol};
pub use doh_request::{DohRequest, HttpMethod, DNS_MESSAGE_MEDIA_TYPE, DOH_PATH};
pub use errors::DomainError;
pub use transport_config::TransportConfig;
