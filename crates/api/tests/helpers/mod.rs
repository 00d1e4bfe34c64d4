#![allow(dead_code)]

mod messages;
mod mock_dispatcher;

pub use messages::{a_query, answer_for, encode_url_safe};
pub use mock_dispatcher::MockDispatcher;
