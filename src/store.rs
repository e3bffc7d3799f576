//! In-memory storage collaborator for the users/todos API.
//!
//! The dispatch core treats this as an opaque handle captured by the business
//! handlers; nothing in routing or binding knows its internals. Ids are
//! assigned monotonically per table and never reused within a process.

use chrono::{DateTime, Timelike, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

/// Creation timestamps are stored at second resolution, the same granularity
/// they serialize at. Rows created within the same second tie on the sort key
/// and fall back to id order.
fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

/// SHA-256 of the password, hex-encoded. Matches what gets persisted and
/// compared at login.
#[must_use]
pub fn password_hash(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Todo {
    pub id: u64,
    pub user_id: u64,
    pub task: String,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}

struct Table<T> {
    rows: Vec<T>,
    next_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

/// Process-wide users/todos tables behind reader-writer locks.
#[derive(Default)]
pub struct Store {
    users: RwLock<Table<User>>,
    todos: RwLock<Table<Todo>>,
}

/// Raised when a unique constraint would be violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateUsername;

impl Store {
    /// Insert a user; usernames are unique.
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, DuplicateUsername> {
        let mut table = self.users.write();
        if table.rows.iter().any(|u| u.username == username) {
            return Err(DuplicateUsername);
        }
        let user = User {
            id: table.next_id,
            username: username.to_string(),
            password: password.to_string(),
            created_at: now(),
        };
        table.next_id += 1;
        table.rows.push(user.clone());
        Ok(user)
    }

    #[must_use]
    pub fn find_user(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .rows
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn delete_user(&self, id: u64) {
        self.users.write().rows.retain(|u| u.id != id);
    }

    /// Users created inside the window, newest first, ties in insertion order.
    #[must_use]
    pub fn users_between(
        &self,
        min: Option<DateTime<Utc>>,
        max: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Vec<User> {
        let table = self.users.read();
        window(&table.rows, |u| u.created_at, |u| u.id, min, max, limit)
    }

    /// Insert a todo for the user and return its assigned id.
    pub fn create_todo(&self, user_id: u64, task: &str, is_done: bool) -> u64 {
        let mut table = self.todos.write();
        let id = table.next_id;
        table.next_id += 1;
        table.rows.push(Todo {
            id,
            user_id,
            task: task.to_string(),
            is_done,
            created_at: now(),
        });
        id
    }

    /// Update task text and/or done flag; a missing row is a silent no-op.
    pub fn update_todo(
        &self,
        user_id: u64,
        id: u64,
        task: Option<&str>,
        is_done: Option<bool>,
    ) {
        let mut table = self.todos.write();
        if let Some(todo) = table
            .rows
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
        {
            if let Some(task) = task {
                todo.task = task.to_string();
            }
            if let Some(is_done) = is_done {
                todo.is_done = is_done;
            }
        }
    }

    pub fn delete_todo(&self, user_id: u64, id: u64) {
        self.todos
            .write()
            .rows
            .retain(|t| !(t.id == id && t.user_id == user_id));
    }

    pub fn delete_todos(&self, user_id: u64) {
        self.todos.write().rows.retain(|t| t.user_id != user_id);
    }

    /// The user's todos inside the window, newest first, ties in insertion
    /// order.
    #[must_use]
    pub fn todos_between(
        &self,
        user_id: u64,
        min: Option<DateTime<Utc>>,
        max: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Vec<Todo> {
        let table = self.todos.read();
        let mine: Vec<Todo> = table
            .rows
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        window(&mine, |t| t.created_at, |t| t.id, min, max, limit)
    }
}

fn window<T: Clone>(
    rows: &[T],
    created_at: impl Fn(&T) -> DateTime<Utc>,
    id: impl Fn(&T) -> u64,
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
    limit: usize,
) -> Vec<T> {
    let mut out: Vec<T> = rows
        .iter()
        .filter(|r| min.map_or(true, |m| created_at(r) >= m))
        .filter(|r| max.map_or(true, |m| created_at(r) <= m))
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        created_at(b)
            .cmp(&created_at(a))
            .then(id(a).cmp(&id(b)))
    });
    out.truncate(limit);
    out
}
