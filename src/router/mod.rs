//! # Router Module
//!
//! The route table: an ordered collection of (path pattern, method set,
//! handler) registrations with segment-based pattern matching.
//!
//! ## Matching
//!
//! Lookup tries an exact path match first. Failing that, patterns containing
//! `{name}` segments are matched segment-by-segment: a named segment binds any
//! non-empty value, literal segments must compare equal, and the segment
//! counts must match exactly (no trailing-wildcard matching).
//!
//! ## Concurrency
//!
//! The table is a snapshot behind [`arc_swap::ArcSwap`]. Registration and
//! removal build a fresh snapshot and swap it in atomically, so lookups that
//! race a refresh never observe a torn table. Writers serialize on a mutex;
//! readers never block.

mod table;
#[cfg(test)]
mod tests;

pub use table::{Route, RouteMatch, RouteTable};

use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum number of path parameters before heap allocation.
/// Most routes have well under 8 named segments.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated path-parameter storage for the hot path.
///
/// Names come from the static route patterns, so they are shared as
/// `Arc<str>`; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;
