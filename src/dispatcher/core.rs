use super::binder::{resolve_args, Args, ParamSpec};
use crate::error::DispatchError;
use crate::ids::RequestId;
use crate::router::{ParamVec, RouteTable};
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a handler hands back on success.
///
/// Handlers returning nothing, a JSON value, plain text, or raw bytes are all
/// legal; the dispatcher serializes a value at status 200 unless the handler
/// set a different status on the response parts.
#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Json(Value),
    Text(String),
    Bytes {
        content_type: &'static str,
        body: Vec<u8>,
    },
}

impl Payload {
    /// Convert into a JSON value for use as a dependency argument.
    pub(crate) fn into_value(self) -> Result<Value, DispatchError> {
        match self {
            Payload::Empty => Ok(Value::Null),
            Payload::Json(v) => Ok(v),
            Payload::Text(s) => Ok(Value::String(s)),
            Payload::Bytes { .. } => Err(DispatchError::handler(
                500,
                "dependency produced a binary payload",
            )),
        }
    }
}

type HandlerFn =
    Box<dyn Fn(&mut RequestContext, Args) -> Result<Payload, DispatchError> + Send + Sync>;

/// A handler plus its declared argument bindings.
///
/// Entries are `Arc`-shared: the route table holds one per route, and
/// [`ParamSpec::Depends`] edges hold the entries they invoke, forming an
/// explicit handler-dependency graph.
pub struct HandlerEntry {
    pub name: &'static str,
    pub bindings: Vec<ParamSpec>,
    func: HandlerFn,
}

impl HandlerEntry {
    pub fn new<F>(name: &'static str, bindings: Vec<ParamSpec>, func: F) -> Arc<Self>
    where
        F: Fn(&mut RequestContext, Args) -> Result<Payload, DispatchError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name,
            bindings,
            func: Box::new(func),
        })
    }

    /// Resolve this entry's bindings against the context, then run it.
    pub fn invoke(&self, ctx: &mut RequestContext) -> Result<Payload, DispatchError> {
        let args = resolve_args(&self.bindings, ctx)?;
        (self.func)(ctx, args)
    }
}

/// The parsed incoming request as the core sees it. The wire-level HTTP
/// parser lives in the transport collaborator; this is already decoded.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub method: Method,
    pub path: String,
    /// Header names lowercased at construction.
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    /// Raw body text; JSON parsing is lazy and cached per dispatch.
    pub body: Option<String>,
}

/// The in-progress response. Handlers may override the success status;
/// everything else is derived from the returned payload.
#[derive(Debug, Clone, Default)]
pub struct ResponseParts {
    status: Option<u16>,
}

impl ResponseParts {
    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

/// The mutable (request, response) pair threaded through one dispatch.
/// Owned by the dispatcher for the duration of the call; never shared
/// across concurrent dispatches.
pub struct RequestContext {
    pub request: RequestParts,
    pub response: ResponseParts,
    pub path_params: ParamVec,
    json_cache: Option<Value>,
}

impl RequestContext {
    #[must_use]
    pub fn new(request: RequestParts) -> Self {
        Self {
            request,
            response: ResponseParts::default(),
            path_params: ParamVec::new(),
            json_cache: None,
        }
    }

    /// Case-insensitive header lookup (names are stored lowercased).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.request.query.get(name).map(String::as_str)
    }

    /// Parse the request body as JSON once per dispatch and cache it.
    /// An absent body reads as `null`; unparseable text is `MalformedBody`.
    pub fn json_body(&mut self) -> Result<&Value, DispatchError> {
        if self.json_cache.is_none() {
            let parsed = match self.request.body.as_deref() {
                None | Some("") => Value::Null,
                Some(raw) => serde_json::from_str(raw)
                    .map_err(|e| DispatchError::MalformedBody(e.to_string()))?,
            };
            self.json_cache = Some(parsed);
        }
        // Cache was just populated above if it was empty.
        Ok(self.json_cache.as_ref().unwrap_or(&Value::Null))
    }
}

/// Finalized response data: status, content type, body bytes.
///
/// The network path writes this to the socket; the synthetic path returns it
/// to the CLI as plain values.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl DispatchOutcome {
    fn from_payload(status: u16, payload: Payload) -> Self {
        match payload {
            Payload::Empty => Self {
                status,
                content_type: "application/json",
                body: Vec::new(),
            },
            Payload::Json(v) => Self {
                status,
                content_type: "application/json",
                body: serde_json::to_vec(&v).unwrap_or_default(),
            },
            Payload::Text(s) => Self {
                status,
                content_type: "text/plain",
                body: s.into_bytes(),
            },
            Payload::Bytes { content_type, body } => Self {
                status,
                content_type,
                body,
            },
        }
    }

    fn from_error(err: &DispatchError) -> Self {
        let body = serde_json::json!({ "error": err.to_string() });
        Self {
            status: err.status(),
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }
}

/// Drives one complete resolve-and-invoke cycle per request.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// The shared dispatch core: look up the route, resolve arguments, invoke
    /// the handler, and produce a finalized outcome exactly once.
    pub fn dispatch(&self, ctx: &mut RequestContext) -> DispatchOutcome {
        let request_id = RequestId::new();
        let method = ctx.request.method.clone();
        let path = ctx.request.path.clone();
        debug!(%request_id, %method, %path, "dispatch start");

        let result = match self.table.lookup(&method, &path) {
            None => Err(DispatchError::RouteNotFound {
                method: method.to_string(),
                path: path.clone(),
            }),
            Some(matched) => {
                ctx.path_params = matched.path_params;
                info!(%request_id, handler = matched.route.handler.name, "handler invoked");
                matched.route.handler.invoke(ctx)
            }
        };

        let outcome = match result {
            Ok(payload) => {
                DispatchOutcome::from_payload(ctx.response.status().unwrap_or(200), payload)
            }
            Err(err) => {
                warn!(%request_id, %method, %path, status = err.status(), error = %err, "dispatch failed");
                DispatchOutcome::from_error(&err)
            }
        };

        info!(%request_id, %method, %path, status = outcome.status, "dispatch complete");
        outcome
    }

    /// Construct an in-memory request and drive it through the same dispatch
    /// core as the network path. Used for scripted or diagnostic invocation
    /// of any registered endpoint without opening a socket.
    pub fn dispatch_synthetic(
        &self,
        method: Method,
        path: &str,
        query: HashMap<String, String>,
        headers: HashMap<String, String>,
        body: Option<String>,
    ) -> DispatchOutcome {
        let mut merged = crate::server::request::parse_query_params(path);
        merged.extend(query);
        let path_only = path.split('?').next().unwrap_or("/").to_string();
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        let mut ctx = RequestContext::new(RequestParts {
            method,
            path: path_only,
            headers,
            query: merged,
            body,
        });
        self.dispatch(&mut ctx)
    }
}
