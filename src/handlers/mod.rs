//! # Handlers Module
//!
//! The users/todos API built on top of the dispatch core.
//!
//! Cross-cutting concerns are expressed as handler dependencies rather than
//! middleware: `verify` decodes the bearer credential and yields the
//! username, `user_id` depends on `verify` and yields the numeric id, and
//! every todo route depends on `user_id`. A failing dependency short-circuits
//! the whole chain with its own status.

mod todos;
mod users;

pub use users::UserForm;

use crate::router::RouteTable;
use crate::security::TokenAuthority;
use crate::store::Store;
use std::sync::Arc;

/// Register every business route on the table.
pub fn register_all(table: &RouteTable, store: &Arc<Store>, authority: &Arc<TokenAuthority>) {
    let verify = users::verify_entry(Arc::clone(authority));
    let user_id = users::user_id_entry(Arc::clone(store), Arc::clone(&verify));
    users::register(table, store, authority, &verify, &user_id);
    todos::register(table, store, &user_id);
}
