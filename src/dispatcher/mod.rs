//! # Dispatcher Module
//!
//! The single entry point for request dispatch, shared by the network path
//! and the synthetic (CLI-constructed) path.
//!
//! ## Request Flow
//!
//! 1. The route table resolves (path, method) to a handler entry.
//! 2. The binder resolves the entry's declared [`ParamSpec`] list into
//!    concrete argument values against the current [`RequestContext`],
//!    left-to-right, short-circuiting on the first failure. A `Depends`
//!    binding invokes another handler against the same context and uses its
//!    return value; sub-calls fully complete before the next parameter
//!    resolves, and nothing is memoized across dependency edges.
//! 3. The handler runs; its payload (or typed failure) becomes the response,
//!    written exactly once.
//!
//! Both dispatch paths share all resolution and error-mapping logic;
//! [`Dispatcher::dispatch_synthetic`] only differs in how the context is
//! constructed and in returning the outcome as plain values.

mod binder;
mod core;

pub use binder::{resolve_args, Args, ParamSpec, TargetType};
pub use core::{
    DispatchOutcome, Dispatcher, HandlerEntry, Payload, RequestContext, RequestParts,
    ResponseParts,
};
