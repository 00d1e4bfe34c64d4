mod tls;
pub mod web;

pub use web::start_web_server;
