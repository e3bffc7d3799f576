use crate::dispatcher::{DispatchOutcome, RequestParts};
use http::Method;
use may_minihttp::Request;
use serde_json::json;
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// Rejection raised before dispatch: the request could not be decoded, so no
/// route semantics apply and the response is written directly.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized HTTP method")]
    BadMethod,
    #[error("request body is not valid UTF-8")]
    BadBody,
}

impl ParseError {
    /// A 400 outcome in the same JSON error shape the dispatcher produces.
    #[must_use]
    pub fn into_outcome(self) -> DispatchOutcome {
        DispatchOutcome {
            status: 400,
            content_type: "application/json",
            body: json!({ "error": self.to_string() }).to_string().into_bytes(),
        }
    }
}

/// Parse query string parameters out of a URL path.
///
/// Extracts everything after the `?` and URL-decodes parameter names and
/// values. Also used by the synthetic dispatch path, so both paths decode
/// queries identically.
#[must_use]
pub fn parse_query_params(path: &str) -> HashMap<String, String> {
    match path.find('?') {
        Some(pos) => url::form_urlencoded::parse(path[pos + 1..].as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => HashMap::new(),
    }
}

/// Decode a raw `may_minihttp` request into the parts the dispatcher consumes.
///
/// Header names are lowercased here; the body is kept as raw text and JSON
/// parsing stays lazy inside the dispatch context. A method or body that
/// cannot be decoded is a [`ParseError`], never a silently different request.
pub fn parse_request(req: Request) -> Result<RequestParts, ParseError> {
    let method =
        Method::from_bytes(req.method().as_bytes()).map_err(|_| ParseError::BadMethod)?;
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let query = parse_query_params(&raw_path);

    let body = {
        let mut body_str = String::new();
        let size = req
            .body()
            .read_to_string(&mut body_str)
            .map_err(|_| ParseError::BadBody)?;
        (size > 0).then_some(body_str)
    };

    debug!(
        %method,
        %path,
        header_count = headers.len(),
        query_count = query.len(),
        body_bytes = body.as_deref().map_or(0, str::len),
        "request parsed"
    );

    Ok(RequestParts {
        method,
        path,
        headers,
        query,
        body,
    })
}
