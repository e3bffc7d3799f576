//! # Security Module
//!
//! Bearer-credential extraction and the token authority.
//!
//! Tokens are HS256 JWTs carrying a flat string-to-string claims map plus the
//! issuer and expiry registered claims. Credentials ride in a header literally
//! named `Authentication` (a quirk of the original wire contract, preserved),
//! value `Bearer <token>`, with a case-insensitive header-name lookup.
//!
//! Extraction failures ([`AuthError::MissingCredential`],
//! [`AuthError::MalformedCredential`]) are distinct from verification
//! failures ([`VerifyError`]); all of them map to 401.

mod authority;
mod bearer;

pub use authority::{TokenAuthority, VerifyError};
pub use bearer::{bearer_token, AuthError, AUTH_HEADER};
