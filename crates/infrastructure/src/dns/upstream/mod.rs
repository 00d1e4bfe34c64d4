pub mod connection;
pub mod dispatcher;
pub mod pending;

pub use connection::UpstreamConnection;
pub use dispatcher::ForwardingDispatcher;
pub use pending::{PendingGuard, PendingQueries};
