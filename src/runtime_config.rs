//! # Runtime Configuration Module
//!
//! Environment-variable configuration for process-scoped knobs that are not
//! command-line concerns: the coroutine stack size and the token authority's
//! signing parameters.
//!
//! ## Environment Variables
//!
//! - `SPUR_STACK_SIZE` — coroutine stack size in bytes, decimal (`16384`) or
//!   hex (`0x4000`). Default `0x4000` (16 KB).
//! - `SPUR_JWT_SECRET` — HS256 signing secret. Default `secret`.
//! - `SPUR_JWT_ISSUER` — token issuer claim. Default `auth0`.
//! - `SPUR_JWT_TTL_SECS` — token lifetime in seconds. Default `86400` (24h).

use std::env;

/// Runtime configuration loaded once at startup via [`RuntimeConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000)
    pub stack_size: usize,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl_secs: i64,
}

fn parse_size(val: &str) -> Option<usize> {
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything absent or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("SPUR_STACK_SIZE")
            .ok()
            .and_then(|v| parse_size(&v))
            .unwrap_or(0x4000);
        let jwt_secret = env::var("SPUR_JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
        let jwt_issuer = env::var("SPUR_JWT_ISSUER").unwrap_or_else(|_| "auth0".to_string());
        let jwt_ttl_secs = env::var("SPUR_JWT_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);
        RuntimeConfig {
            stack_size,
            jwt_secret,
            jwt_issuer,
            jwt_ttl_secs,
        }
    }
}
