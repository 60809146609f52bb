//! Authentication tokens issued per user
//!
//! A token is created on successful login and replaced wholesale on
//! re-authentication. It is never mutated in place.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session material for one authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationToken {
    pub session_token: String,
    /// Key manager token, present when the backend issues one.
    pub key_manager_token: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthenticationToken {
    /// Create a token issued now and valid for `ttl`.
    pub fn new(
        session_token: impl Into<String>,
        key_manager_token: Option<String>,
        ttl: std::time::Duration,
    ) -> Self {
        let issued_at = Utc::now();
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        let expires_at = issued_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self { session_token: session_token.into(), key_manager_token, issued_at, expires_at }
    }

    /// Check whether the token is past its expiry.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against an explicit instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds until expiry (negative once expired).
    pub fn seconds_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_valid() {
        let token = AuthenticationToken::new(
            "session",
            Some("km".to_string()),
            std::time::Duration::from_secs(60),
        );

        assert!(!token.is_expired());
        assert!(token.seconds_until_expiry() > 0);
        assert_eq!(token.key_manager_token.as_deref(), Some("km"));
    }

    #[test]
    fn zero_ttl_token_is_expired() {
        let token = AuthenticationToken::new("session", None, std::time::Duration::ZERO);
        assert!(token.is_expired());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let token = AuthenticationToken::new("s", None, std::time::Duration::from_secs(10));
        assert!(token.is_expired_at(token.expires_at));
        assert!(!token.is_expired_at(token.expires_at - Duration::seconds(1)));
    }
}
