//! The typed failure taxonomy for request dispatch.
//!
//! Every failure carries enough to produce the response: a status code and a
//! message naming the offending route, parameter, or field. The dispatcher is
//! the single point that converts these into a wire response.

use crate::security::AuthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered route matched (path, method).
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// A declared path capture was absent from the match. Indicates a route
    /// pattern and binding table that disagree.
    #[error("missing path parameter `{0}`")]
    MissingPathParam(String),

    /// A required query parameter or JSON field was absent and had no default.
    #[error("missing parameter `{0}`")]
    MissingParam(String),

    /// A parameter was present but could not be coerced to its declared type.
    #[error("invalid value for field `{0}`")]
    InvalidFieldType(String),

    /// The request body was required but absent, or was not valid JSON.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// Credential extraction or token verification failed.
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// A handler-raised failure with its own status.
    #[error("{message}")]
    Handler { status: u16, message: String },
}

impl DispatchError {
    /// A handler-level failure carrying an explicit status.
    pub fn handler(status: u16, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// The HTTP status this failure maps to.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::RouteNotFound { .. } => 404,
            Self::MissingPathParam(_)
            | Self::MissingParam(_)
            | Self::InvalidFieldType(_)
            | Self::MalformedBody(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Handler { status, .. } => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::AuthError;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let not_found = DispatchError::RouteNotFound {
            method: "GET".into(),
            path: "/nope".into(),
        };
        assert_eq!(not_found.status(), 404);
        assert_eq!(DispatchError::MissingParam("id".into()).status(), 400);
        assert_eq!(
            DispatchError::Unauthorized(AuthError::MissingCredential).status(),
            401
        );
        assert_eq!(DispatchError::handler(409, "dup").status(), 409);
    }

    #[test]
    fn messages_name_the_offender() {
        assert_eq!(
            DispatchError::InvalidFieldType("limit".into()).to_string(),
            "invalid value for field `limit`"
        );
        assert_eq!(
            DispatchError::handler(409, "Username already exists").to_string(),
            "Username already exists"
        );
    }
}
