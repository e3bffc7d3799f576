use super::core::{HandlerEntry, Payload, RequestContext};
use crate::error::DispatchError;
use crate::timefmt;
use serde_json::Value;
use std::sync::Arc;

/// Target type a bound value is coerced into before the handler sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Str,
    UInt,
    Bool,
    Timestamp,
    Any,
}

/// One declared handler parameter: where its value comes from and how it is
/// coerced. A closed tagged variant interpreted by [`resolve_args`], so the
/// binding table stays data-driven and testable in isolation.
pub enum ParamSpec {
    /// Bind the live request; always succeeds (reachable through the context).
    Request,
    /// Bind the live response; always succeeds (reachable through the context).
    Response,
    /// A named capture from route matching.
    Path { name: &'static str },
    /// A URL query parameter, with an optional default for when it is absent.
    Query {
        name: &'static str,
        ty: TargetType,
        default: Option<Value>,
    },
    /// A named field of the JSON request body (parsed once per dispatch).
    JsonField {
        name: &'static str,
        ty: TargetType,
        default: Option<Value>,
    },
    /// The entire JSON request body.
    JsonBody,
    /// The output of another handler, invoked against the same context.
    Depends(Arc<HandlerEntry>),
}

/// Positional resolved arguments handed to a handler.
#[derive(Debug)]
pub struct Args(pub Vec<Value>);

impl Args {
    #[must_use]
    pub fn get(&self, idx: usize) -> &Value {
        self.0.get(idx).unwrap_or(&Value::Null)
    }

    /// Take ownership of one argument, leaving `Null` in its place.
    pub fn take(&mut self, idx: usize) -> Value {
        self.0
            .get_mut(idx)
            .map(Value::take)
            .unwrap_or(Value::Null)
    }

    pub fn str(&self, idx: usize) -> Result<&str, DispatchError> {
        self.get(idx)
            .as_str()
            .ok_or_else(|| arg_mismatch(idx, "string"))
    }

    pub fn u64(&self, idx: usize) -> Result<u64, DispatchError> {
        self.get(idx)
            .as_u64()
            .ok_or_else(|| arg_mismatch(idx, "unsigned integer"))
    }

    pub fn bool_or(&self, idx: usize, default: bool) -> bool {
        self.get(idx).as_bool().unwrap_or(default)
    }

    #[must_use]
    pub fn opt_str(&self, idx: usize) -> Option<&str> {
        self.get(idx).as_str()
    }

    #[must_use]
    pub fn opt_bool(&self, idx: usize) -> Option<bool> {
        self.get(idx).as_bool()
    }

    /// Timestamp arguments arrive canonicalized by the binder; a null slot
    /// means the parameter defaulted to absent.
    #[must_use]
    pub fn opt_timestamp(&self, idx: usize) -> Option<chrono::DateTime<chrono::Utc>> {
        self.get(idx).as_str().and_then(timefmt::parse)
    }
}

fn arg_mismatch(idx: usize, expected: &str) -> DispatchError {
    DispatchError::handler(500, format!("argument {idx} is not a {expected}"))
}

/// Resolve a handler's parameter list into concrete values, left-to-right,
/// short-circuiting on the first failure. Each `Depends` sub-call fully
/// completes (including its own nested resolution) before the next parameter
/// resolves, so side effects of sub-calls stay ordered. Sub-calls are never
/// memoized across dependency edges: two edges reaching the same handler
/// re-execute it once per edge.
pub fn resolve_args(specs: &[ParamSpec], ctx: &mut RequestContext) -> Result<Args, DispatchError> {
    let mut values = Vec::with_capacity(specs.len());
    for spec in specs {
        values.push(resolve_one(spec, ctx)?);
    }
    Ok(Args(values))
}

fn resolve_one(spec: &ParamSpec, ctx: &mut RequestContext) -> Result<Value, DispatchError> {
    match spec {
        ParamSpec::Request | ParamSpec::Response => Ok(Value::Null),
        ParamSpec::Path { name } => ctx
            .path_param(name)
            .map(|v| Value::String(v.to_string()))
            .ok_or_else(|| DispatchError::MissingPathParam((*name).to_string())),
        ParamSpec::Query { name, ty, default } => match ctx.query_value(name) {
            Some(raw) => {
                let raw = raw.to_string();
                coerce_text(name, &raw, *ty)
            }
            None => default
                .clone()
                .ok_or_else(|| DispatchError::MissingParam((*name).to_string())),
        },
        ParamSpec::JsonField { name, ty, default } => {
            let field = ctx.json_body()?.get(*name).cloned();
            match field {
                Some(v) if !v.is_null() => coerce_value(name, &v, *ty),
                _ => default
                    .clone()
                    .ok_or_else(|| DispatchError::MissingParam((*name).to_string())),
            }
        }
        ParamSpec::JsonBody => {
            let body = ctx.json_body()?;
            if body.is_null() {
                Err(DispatchError::MalformedBody(
                    "request body is required".to_string(),
                ))
            } else {
                Ok(body.clone())
            }
        }
        ParamSpec::Depends(entry) => entry.invoke(ctx).and_then(Payload::into_value),
    }
}

/// Coerce a raw text value (query or path source) into the target type.
fn coerce_text(name: &str, raw: &str, ty: TargetType) -> Result<Value, DispatchError> {
    match ty {
        TargetType::Str | TargetType::Any => Ok(Value::String(raw.to_string())),
        TargetType::UInt => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| DispatchError::InvalidFieldType(name.to_string())),
        TargetType::Bool => raw
            .parse::<bool>()
            .map(Value::from)
            .map_err(|_| DispatchError::InvalidFieldType(name.to_string())),
        TargetType::Timestamp => timefmt::parse(raw)
            .map(|ts| Value::String(timefmt::format(ts)))
            .ok_or_else(|| DispatchError::InvalidFieldType(name.to_string())),
    }
}

/// Coerce an already-parsed JSON value into the target type. Strict: a JSON
/// string is not accepted where an integer or bool is declared.
fn coerce_value(name: &str, value: &Value, ty: TargetType) -> Result<Value, DispatchError> {
    let mismatch = || DispatchError::InvalidFieldType(name.to_string());
    match ty {
        TargetType::Any => Ok(value.clone()),
        TargetType::Str => value
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(mismatch),
        TargetType::UInt => value.as_u64().map(Value::from).ok_or_else(mismatch),
        TargetType::Bool => value.as_bool().map(Value::from).ok_or_else(mismatch),
        TargetType::Timestamp => value
            .as_str()
            .and_then(timefmt::parse)
            .map(|ts| Value::String(timefmt::format(ts)))
            .ok_or_else(mismatch),
    }
}
