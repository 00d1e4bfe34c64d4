#![allow(dead_code)]

mod doh_upstream_mock;
mod messages;
mod upstream_mock;

pub use doh_upstream_mock::MockDohUpstream;
pub use messages::{answer_for, query_wire, question_of};
pub use upstream_mock::{MockTcpUpstream, MockUdpUpstream, UpstreamBehavior};
