//! Cart owner resolution.
//!
//! A cart belongs either to an authenticated user or to an anonymous browser session.
//! Authentication and session storage are collaborators; this module only decides which
//! key to use and issues the anonymous token the first time a session needs one.
//!
//! There is no merge step when an anonymous shopper logs in: the session cart and the
//! user cart stay separate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Session key under which the anonymous cart token is stored.
pub const SESSION_CART_KEY: &str = "cart_session_id";

/// Identity a cart is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKey {
    /// Authenticated user id, stable across devices and sessions
    User(i64),
    /// Anonymous session token
    Session(String),
}

impl OwnerKey {
    /// The user id for authenticated owners.
    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        match self {
            Self::User(id) => Some(*id),
            Self::Session(_) => None,
        }
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Session(token) => write!(f, "session:{token}"),
        }
    }
}

/// Per-session key/value storage provided by the web layer.
pub trait SessionStore {
    /// Reads a value from the session.
    fn get(&self, key: &str) -> Option<String>;
    /// Writes a value to the session, replacing any previous one.
    fn insert(&mut self, key: &str, value: String);
}

impl SessionStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn insert(&mut self, key: &str, value: String) {
        HashMap::insert(self, key.to_string(), value);
    }
}

/// Returns this session's anonymous cart token, creating and storing one on first use.
pub fn session_token<S>(session: &mut S) -> String
where
    S: SessionStore + ?Sized,
{
    if let Some(token) = session.get(SESSION_CART_KEY).filter(|t| !t.is_empty()) {
        return token;
    }

    let token = Uuid::new_v4().to_string();
    session.insert(SESSION_CART_KEY, token.clone());
    tracing::debug!("Issued anonymous cart token {}", token);
    token
}

/// Maps the current request onto a cart owner.
///
/// Authenticated callers always get [`OwnerKey::User`] and the session is left untouched.
pub fn resolve_owner<S>(current_user_id: Option<i64>, session: &mut S) -> OwnerKey
where
    S: SessionStore + ?Sized,
{
    match current_user_id {
        Some(user_id) => OwnerKey::User(user_id),
        None => OwnerKey::Session(session_token(session)),
    }
}
