//! Filesystem-backed static routes.
//!
//! The registry mirrors a configured list of directory mounts into GET
//! routes on the route table: file `<dir>/<name>` is served at
//! `<prefix>/<name>` with a content type derived from its extension. A
//! distinguished `/` route always serves a designated index file, resolved
//! against an ordered list of candidate paths (first existing wins).
//!
//! `refresh()` replaces the whole static subset: the fresh listing is built
//! first, and only once the scan succeeded is every previously tracked path
//! removed and the new set registered, so a failed scan leaves the serving
//! routes untouched. Route lookups stay safe during the replace because the
//! table swaps snapshots atomically. The same scan is fatal at bootstrap but reported as a
//! request-level error when triggered through the `GET /static/refresh`
//! route.

use crate::dispatcher::{HandlerEntry, ParamSpec, Payload};
use crate::error::DispatchError;
use crate::router::RouteTable;
use http::Method;
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{info, warn};

/// Route path that rebuilds the registry without a process restart.
pub const REFRESH_ROUTE: &str = "/static/refresh";

/// Content type for a served file, from a fixed extension table.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// One directory mirrored under a URL prefix.
#[derive(Debug, Clone)]
pub struct StaticMount {
    pub dir: PathBuf,
    pub prefix: String,
}

impl StaticMount {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }
}

/// Keeps a subset of the route table synchronized with directory contents.
pub struct StaticRegistry {
    mounts: Vec<StaticMount>,
    index_candidates: Vec<PathBuf>,
    /// Route paths registered by the most recent refresh.
    tracked: Mutex<Vec<String>>,
}

impl StaticRegistry {
    #[must_use]
    pub fn new(mounts: Vec<StaticMount>, index_candidates: Vec<PathBuf>) -> Self {
        Self {
            mounts,
            index_candidates,
            tracked: Mutex::new(Vec::new()),
        }
    }

    /// Rescan every mount and replace the static subset of the table.
    ///
    /// Builds the fresh listing (non-recursive, regular files only) plus the
    /// index route, then swaps it in for the previously tracked paths. On a
    /// scan error the table is left exactly as it was. Returns the number of
    /// routes registered.
    pub fn refresh(&self, table: &RouteTable) -> io::Result<usize> {
        // Complete the scan before touching the table: a failing mount must
        // not take down routes that are already serving.
        let mut fresh: Vec<(String, Arc<HandlerEntry>)> = Vec::new();
        for mount in &self.mounts {
            let entries = fs::read_dir(&mount.dir)?;
            for entry in entries {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                let route_path =
                    format!("{}/{}", mount.prefix.trim_end_matches('/'), name);
                fresh.push((route_path, file_entry(entry.path())));
            }
        }

        // The root path always serves the index file, regardless of what the
        // mounts contain.
        let index = self
            .index_candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "no index file found in search roots")
            })?;
        fresh.push(("/".to_string(), file_entry(index)));

        let mut tracked = self.tracked.lock();
        for path in tracked.drain(..) {
            table.remove(&path);
        }
        for (route_path, entry) in fresh {
            table.register(&route_path, &[Method::GET], entry);
            tracked.push(route_path);
        }

        info!(routes = tracked.len(), "static routes refreshed");
        Ok(tracked.len())
    }

    /// Expose `refresh()` as a route so the registry can be rebuilt after
    /// files change on disk. Unlike the bootstrap scan, a failure here is
    /// reported as a request-level error, not a process exit.
    pub fn install_refresh_route(self: &Arc<Self>, table: &Arc<RouteTable>) {
        let registry = Arc::clone(self);
        // Weak, or the table would own a handler that owns the table.
        let table_ref: Weak<RouteTable> = Arc::downgrade(table);
        table.register(
            REFRESH_ROUTE,
            &[Method::GET],
            HandlerEntry::new("static_refresh", vec![ParamSpec::Request], move |_ctx, _args| {
                let table = table_ref
                    .upgrade()
                    .ok_or_else(|| DispatchError::handler(500, "route table shut down"))?;
                let count = registry.refresh(&table).map_err(|e| {
                    warn!(error = %e, "static refresh failed");
                    DispatchError::handler(500, format!("static refresh failed: {e}"))
                })?;
                Ok(Payload::Json(serde_json::json!({ "routes": count })))
            }),
        );
    }
}

/// Route entry that serves one file's bytes.
fn file_entry(path: PathBuf) -> Arc<HandlerEntry> {
    HandlerEntry::new("static_file", vec![ParamSpec::Response], move |_ctx, _args| {
        let body = fs::read(&path).map_err(|e| {
            DispatchError::handler(404, format!("cannot open {}: {e}", path.display()))
        })?;
        Ok(Payload::Bytes {
            content_type: content_type_for(&path),
            body,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("app.JS")), "application/javascript");
        assert_eq!(
            content_type_for(Path::new("blob.bin")),
            "application/octet-stream"
        );
        assert_eq!(content_type_for(Path::new("no_extension")), "application/octet-stream");
    }
}
