pub mod transport;
pub mod upstream;

pub use transport::tls::install_crypto_provider;
pub use transport::{DnsTransport, Transport};
pub use upstream::{ForwardingDispatcher, PendingQueries, UpstreamConnection};
