use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Why a token failed verification.
///
/// The three live checks (signature, issuer, expiry) are independent causes
/// and stay distinguishable; anything undecodable is [`VerifyError::Malformed`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid token signature")]
    BadSignature,
    #[error("token issuer mismatch")]
    IssuerMismatch,
    #[error("token has expired")]
    Expired,
    #[error("malformed token: {0}")]
    Malformed(String),
}

/// JWT payload shape: registered claims plus the caller's flat claims map.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    iss: String,
    exp: i64,
    #[serde(flatten)]
    claims: BTreeMap<String, String>,
}

/// Issues and verifies signed, time-bounded bearer tokens.
///
/// The signing key, issuer, and expiry duration are fixed at construction
/// (process scope). Tokens are never revoked or refreshed; a new one is
/// obtained only by re-authenticating.
pub struct TokenAuthority {
    issuer: String,
    ttl_secs: i64,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenAuthority {
    /// `ttl_secs` may be negative in tests to mint already-expired tokens.
    #[must_use]
    pub fn new(secret: &str, issuer: impl Into<String>, ttl_secs: i64) -> Self {
        let issuer = issuer.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        // The library's expiry check passes at the exact expiry second; the
        // contract is strictly now < exp, so expiry is checked in verify().
        validation.validate_exp = false;
        Self {
            issuer,
            ttl_secs,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a claims map into a bearer token expiring `ttl_secs` from now.
    pub fn issue(&self, claims: BTreeMap<String, String>) -> Result<String, VerifyError> {
        let payload = TokenClaims {
            iss: self.issuer.clone(),
            exp: Utc::now().timestamp() + self.ttl_secs,
            claims,
        };
        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(|e| VerifyError::Malformed(e.to_string()))
    }

    /// Decode and verify a token, returning the embedded claims map.
    ///
    /// Checks signature, issuer, and expiry (`now < exp`); each failure cause
    /// is reported separately.
    pub fn verify(&self, token: &str) -> Result<BTreeMap<String, String>, VerifyError> {
        match decode::<TokenClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => {
                if data.claims.exp <= Utc::now().timestamp() {
                    debug!("token verification failed: expired");
                    return Err(VerifyError::Expired);
                }
                Ok(data.claims.claims)
            }
            Err(err) => {
                debug!(cause = %err, "token verification failed");
                Err(match err.kind() {
                    ErrorKind::InvalidSignature => VerifyError::BadSignature,
                    ErrorKind::InvalidIssuer => VerifyError::IssuerMismatch,
                    _ => VerifyError::Malformed(err.to_string()),
                })
            }
        }
    }
}
