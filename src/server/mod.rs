//! # Server Module
//!
//! The network transport adapter: parses the raw HTTP request off the `may`
//! coroutine runtime, hands it to the dispatcher, and writes the outcome to
//! the socket exactly once. All routing, binding, and error mapping live in
//! the dispatch core; nothing here inspects route semantics.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query_params, parse_request, ParseError};
pub use service::AppService;
