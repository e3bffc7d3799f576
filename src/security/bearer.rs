use super::VerifyError;

/// Non-standard credential header name carried over from the original wire
/// contract. Lookup must be case-insensitive; clients send both
/// `Authentication` and `authentication`.
pub const AUTH_HEADER: &str = "Authentication";

/// Credential failure, distinct from token verification failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication is needed")]
    MissingCredential,
    #[error("Bearer authentication is needed")]
    MalformedCredential,
    #[error(transparent)]
    Verify(#[from] VerifyError),
}

/// Pull the bearer token out of an `Authentication` header value.
///
/// `None` means the header was absent entirely.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    let raw = header_value.ok_or(AuthError::MissingCredential)?;
    raw.strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedCredential)
}
