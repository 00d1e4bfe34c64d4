mod upstream_dispatcher;

pub use upstream_dispatcher::UpstreamDispatcher;
