//! CSRF tokens.
//!
//! Each session gets one random token, embedded in the page and echoed
//! back with every submission. Comparison uses `subtle::ConstantTimeEq`
//! so response timing does not reveal how much of a guess was right.
//! Tokens are not rotated after a successful submission.

use subtle::ConstantTimeEq;

/// Produces unguessable secrets for session ids and CSRF tokens.
pub trait TokenSource: Send + Sync + 'static {
    /// A fresh random secret, safe to embed in HTML and cookies.
    fn secret(&self) -> String;
}

/// OS randomness via UUID v4, rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn secret(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// The CSRF token bound to one session.
#[derive(Clone)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Wrap an existing secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Generate a token from `source`.
    #[must_use]
    pub fn generate(source: &dyn TokenSource) -> Self {
        Self(source.secret())
    }

    /// The token value, for embedding in the form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time check of a submitted token. A missing or empty
    /// submission never matches.
    #[must_use]
    pub fn verify(&self, submitted: Option<&str>) -> bool {
        let Some(submitted) = submitted else {
            return false;
        };
        if self.0.is_empty() || submitted.is_empty() {
            return false;
        }
        self.0.as_bytes().ct_eq(submitted.as_bytes()).into()
    }
}

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfToken([REDACTED])")
    }
}
