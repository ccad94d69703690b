//! # cb-auth-token
//!
//! Shared-secret implementation of `AuthProvider`.
//! One admin token, presented as `Authorization: Bearer <token>`, unlocks
//! every mutating endpoint. No expiry, no scopes.

use cb_core::error::{AppError, Result};
use cb_core::traits::AuthProvider;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

pub struct TokenAuthProvider {
    /// `None` when the deployment never set an admin token.
    token: Option<SecretString>,
}

impl TokenAuthProvider {
    /// An empty token counts as unset.
    pub fn new(token: Option<SecretString>) -> Self {
        Self {
            token: token.filter(|t| !t.expose_secret().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

impl AuthProvider for TokenAuthProvider {
    fn authorize(&self, authorization: Option<&str>) -> Result<()> {
        let Some(expected) = &self.token else {
            return Err(AppError::Misconfigured(
                "Server not configured with ADMIN_TOKEN".into(),
            ));
        };
        let presented = authorization.map(bearer_token).unwrap_or_default();
        if presented.is_empty() || !digests_match(presented, expected.expose_secret()) {
            return Err(AppError::Unauthorized);
        }
        Ok(())
    }
}

/// Strips a leading `Bearer ` (any case, any run of whitespace). A header
/// without the scheme is taken as the bare token.
fn bearer_token(header: &str) -> &str {
    let header = header.trim();
    match header.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim_start(),
        _ => header,
    }
}

/// Compares fixed-size digests so the comparison time does not depend on
/// where the tokens first differ.
fn digests_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
