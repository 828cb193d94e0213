//! Per-user token storage.

use std::collections::HashMap;

/// Access tokens are treated as expired slightly before their nominal expiry
/// so a token handed to the API layer is not rejected mid-request.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Tokens held for a single user.
///
/// Owned exclusively by the [`TokenStore`]; mutated on every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Host LMS user id this record belongs to.
    pub user_id: String,

    /// Long-lived credential exchanged for access tokens.
    pub refresh_token: String,

    /// Short-lived credential authorizing remote API calls, if one has been
    /// obtained.
    pub access_token: Option<String>,

    /// Unix-seconds expiry of `access_token`.
    pub expires_at: Option<i64>,
}

impl TokenRecord {
    /// Creates a record holding only a refresh token; no access token has
    /// been derived yet.
    #[must_use]
    pub fn new(user_id: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            refresh_token: refresh_token.into(),
            access_token: None,
            expires_at: None,
        }
    }
}

/// Returns true if an access token with the given expiry is still usable at
/// `now_unix`.
///
/// A token without a recorded expiry is treated as dead; the refresh flow
/// always records one.
#[must_use]
pub fn token_is_live(expires_at: Option<i64>, now_unix: i64) -> bool {
    let Some(expiry) = expires_at else {
        return false;
    };
    now_unix < expiry.saturating_sub(EXPIRY_SKEW_SECS)
}

/// Per-user token repository.
///
/// Keyed by user id; each user's session is independent. Concurrent writes
/// for the same user are last-write-wins.
pub trait TokenStore {
    /// Gets the record for a user, if one exists.
    fn get(&self, user_id: &str) -> Option<TokenRecord>;

    /// Inserts or overwrites the record for `record.user_id`.
    fn put(&mut self, record: TokenRecord);

    /// Removes the record for a user.
    fn remove(&mut self, user_id: &str);
}

/// In-memory token store.
///
/// Suitable for tests and for hosts that persist refresh tokens themselves
/// and seed a fresh store per session.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: HashMap<String, TokenRecord>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, user_id: &str) -> Option<TokenRecord> {
        self.records.get(user_id).cloned()
    }

    fn put(&mut self, record: TokenRecord) {
        self.records.insert(record.user_id.clone(), record);
    }

    fn remove(&mut self, user_id: &str) {
        self.records.remove(user_id);
    }
}
