use super::ParamVec;
use crate::dispatcher::HandlerEntry;
use arc_swap::ArcSwap;
use http::Method;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// One registered route: a path pattern, the methods it answers, and the
/// handler entry (name, bindings, callable) that serves it.
#[derive(Clone)]
pub struct Route {
    pub path: Arc<str>,
    pub methods: Vec<Method>,
    pub handler: Arc<HandlerEntry>,
}

/// Result of matching a request path against the table.
#[derive(Clone)]
pub struct RouteMatch {
    pub route: Route,
    /// Named captures bound during pattern matching (e.g. `{id}` → `"42"`).
    pub path_params: ParamVec,
}

/// Ordered route registrations behind an atomically swapped snapshot.
///
/// Owned exclusively by the process; mutated at runtime only by the static
/// registry's refresh. Uniqueness invariant: no two entries share an
/// identical (path, method) pair; re-registration replaces.
pub struct RouteTable {
    snapshot: ArcSwap<Vec<Route>>,
    // Serializes read-modify-write cycles; lookups go through the snapshot
    // and never take this.
    write_lock: Mutex<()>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Insert or replace a route. Idempotent under identical re-registration;
    /// methods claimed here are stripped from any prior route at the same path.
    pub fn register(&self, path: &str, methods: &[Method], handler: Arc<HandlerEntry>) {
        let _guard = self.write_lock.lock();
        let mut routes: Vec<Route> = self.snapshot.load().as_ref().clone();

        // Identical (path, method-set) registration replaces in place,
        // keeping the original insertion position for `list()`.
        if let Some(existing) = routes
            .iter_mut()
            .find(|r| r.path.as_ref() == path && r.methods == methods)
        {
            existing.handler = handler;
            self.snapshot.store(Arc::new(routes));
            debug!(path, "route handler replaced");
            return;
        }

        for route in &mut routes {
            if route.path.as_ref() == path {
                route.methods.retain(|m| !methods.contains(m));
            }
        }
        routes.retain(|r| !r.methods.is_empty());
        routes.push(Route {
            path: Arc::from(path),
            methods: methods.to_vec(),
            handler,
        });
        let total = routes.len();
        self.snapshot.store(Arc::new(routes));
        debug!(path, methods = ?methods, total, "route registered");
    }

    /// Remove every method entry under the exact path; no-op if absent.
    pub fn remove(&self, path: &str) {
        let _guard = self.write_lock.lock();
        let mut routes: Vec<Route> = self.snapshot.load().as_ref().clone();
        let before = routes.len();
        routes.retain(|r| r.path.as_ref() != path);
        if routes.len() != before {
            debug!(path, "route removed");
        }
        self.snapshot.store(Arc::new(routes));
    }

    /// Stable insertion-order snapshot, for CLI introspection and
    /// refresh-time diffing.
    #[must_use]
    pub fn list(&self) -> Arc<Vec<Route>> {
        self.snapshot.load_full()
    }

    /// Match a (path, method) pair: exact paths win over parameterized ones.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let routes = self.snapshot.load();

        if let Some(route) = routes
            .iter()
            .find(|r| r.path.as_ref() == path && r.methods.contains(method))
        {
            return Some(RouteMatch {
                route: route.clone(),
                path_params: ParamVec::new(),
            });
        }

        for route in routes.iter() {
            if !route.methods.contains(method) || !route.path.contains('{') {
                continue;
            }
            if let Some(params) = match_pattern(&route.path, path) {
                info!(%method, path, pattern = %route.path, "route matched");
                return Some(RouteMatch {
                    route: route.clone(),
                    path_params: params,
                });
            }
        }

        debug!(%method, path, "no route matched");
        None
    }
}

/// Segment-wise pattern match. `{name}` binds any non-empty segment; literal
/// segments must be equal; segment counts must agree exactly.
fn match_pattern(pattern: &str, path: &str) -> Option<ParamVec> {
    let mut params = ParamVec::new();
    let mut pattern_segs = pattern.split('/');
    let mut path_segs = path.split('/');
    loop {
        match (pattern_segs.next(), path_segs.next()) {
            (None, None) => return Some(params),
            (Some(pat), Some(seg)) => {
                if let Some(name) = pat.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    if seg.is_empty() {
                        return None;
                    }
                    params.push((Arc::from(name), seg.to_string()));
                } else if pat != seg {
                    return None;
                }
            }
            _ => return None,
        }
    }
}
