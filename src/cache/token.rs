use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const TOKEN_VALUE_STUB: &'static str = "";

/// Decision taken before every authenticated call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// token is valid, nothing to do
    Reuse,
    /// token still usable but past its refresh-window start
    Refresh,
    /// never authenticated or fully expired
    Initial,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match *self {
            AuthMode::Reuse => "reuse",
            AuthMode::Refresh => "refresh",
            AuthMode::Initial => "initial",
        }
    }
}

/// Token pair as returned by the authentication endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Cached token pair with the two timestamps decoded from the access token payload.
///
/// The empty state uses the Unix epoch for both timestamps, which is never valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub refreshable_until: DateTime<Utc>,
}

impl Default for TokenState {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl TokenState {
    pub fn sentinel() -> Self {
        Self {
            access_token: TOKEN_VALUE_STUB.to_owned(),
            refresh_token: TOKEN_VALUE_STUB.to_owned(),
            expires_at: DateTime::UNIX_EPOCH,
            refreshable_until: DateTime::UNIX_EPOCH,
        }
    }

    pub fn new(
        pair: TokenPair,
        expires_at: DateTime<Utc>,
        refreshable_until: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at,
            refreshable_until,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }

    /// Usable without touching the auth endpoints
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_empty() && now < self.expires_at && now < self.refreshable_until
    }

    pub fn mode_at(&self, now: DateTime<Utc>) -> AuthMode {
        if self.is_valid_at(now) {
            AuthMode::Reuse
        } else if !self.is_empty() && now < self.expires_at && now >= self.refreshable_until {
            AuthMode::Refresh
        } else {
            AuthMode::Initial
        }
    }
}
