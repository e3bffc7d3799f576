//! # Spur
//!
//! A small todo API service built around a request-dispatch core:
//!
//! - **Route table** ([`router`]) — (path pattern, method) registrations
//!   behind an atomically swapped snapshot; exact matches win over `{name}`
//!   pattern matches.
//! - **Argument binder** ([`dispatcher`]) — handlers declare where each
//!   parameter comes from (path, query, JSON body field, whole body, or the
//!   output of another handler) and the resolver binds them per request.
//! - **Token authority** ([`security`]) — HS256 bearer tokens carried in an
//!   `Authentication` header.
//! - **Static registry** ([`static_files`]) — filesystem directories mirrored
//!   into GET routes, rebuildable at runtime via `GET /static/refresh`.
//! - **Dual dispatch** — network requests and CLI-constructed synthetic
//!   requests drive the identical dispatch core.
//!
//! The users/todos API in [`handlers`] and the in-memory [`store`] are the
//! service built on top of that core.

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod router;
pub mod runtime_config;
pub mod security;
pub mod server;
pub mod static_files;
pub mod store;
pub mod timefmt;

pub use dispatcher::{DispatchOutcome, Dispatcher, RequestContext};
pub use error::DispatchError;
pub use router::RouteTable;
pub use runtime_config::RuntimeConfig;
pub use security::TokenAuthority;
pub use store::Store;
