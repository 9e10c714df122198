//! # Relyon Session
//!
//! Persists the pending authorization request for each provider inside the
//! caller's request session, namespaced by issuer so several providers can be
//! used from the same session without their state colliding.
//!
//! The layout written for a provider whose issuer host is `server.example.com`:
//!
//! ```json
//! { "openidconnect:server.example.com": { "state": { "handle": "...", "state": { } } } }
//! ```

#![warn(missing_docs)]

use relyon_core::{AuthError, RequestSession};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of every session namespace key.
pub const NAMESPACE_PREFIX: &str = "openidconnect";

/// Derive the session namespace key for an issuer, e.g.
/// `openidconnect:server.example.com`.
pub fn namespace_key(issuer: &str) -> Result<String, AuthError> {
    let url = url::Url::parse(issuer)
        .map_err(|e| AuthError::Configuration(format!("issuer is not a valid URL: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| AuthError::Configuration(format!("issuer {issuer} has no host")))?;
    Ok(format!("{NAMESPACE_PREFIX}:{host}"))
}

/// The pending authorization request for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// The CSRF handle sent as the `state` query parameter.
    pub handle: String,
    /// Application payload carried through the round trip, stored verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl StateRecord {
    /// A record holding only the handle.
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            state: None,
        }
    }

    /// Attach an application payload.
    pub fn with_app_state(mut self, state: Option<Value>) -> Self {
        self.state = state;
        self
    }
}

/// The value stored under a provider's namespace key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    /// The pending request, if any.
    pub state: StateRecord,
}

/// Storage for pending authorization request state.
pub trait StateStore: Send + Sync {
    /// Record a new pending request, replacing any earlier one for the same
    /// provider.
    fn store(&self, session: &mut dyn RequestSession, record: StateRecord)
        -> Result<(), AuthError>;

    /// Consume the pending request and check `handle` against it.
    ///
    /// The record is removed whether or not the handle matches. On success the
    /// application payload stored with it is returned.
    fn verify(
        &self,
        session: &mut dyn RequestSession,
        handle: &str,
    ) -> Result<Option<Value>, AuthError>;
}

/// A [`StateStore`] keeping the record in the request session.
#[derive(Debug, Clone)]
pub struct SessionStateStore {
    key: String,
}

impl SessionStateStore {
    /// Create a store writing under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Create a store for the namespace derived from `issuer`.
    pub fn for_issuer(issuer: &str) -> Result<Self, AuthError> {
        Ok(Self::new(namespace_key(issuer)?))
    }

    /// The session key this store writes under.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl StateStore for SessionStateStore {
    fn store(
        &self,
        session: &mut dyn RequestSession,
        record: StateRecord,
    ) -> Result<(), AuthError> {
        let entry = serde_json::to_value(NamespaceEntry { state: record })
            .map_err(|e| AuthError::Session(format!("state serialization error: {e}")))?;
        session.set(&self.key, entry);
        log::trace!("stored authorization request state under {}", self.key);
        Ok(())
    }

    fn verify(
        &self,
        session: &mut dyn RequestSession,
        handle: &str,
    ) -> Result<Option<Value>, AuthError> {
        let mut entry = match session.remove(&self.key) {
            Some(Value::Object(entry)) => entry,
            Some(other) => {
                // Put back what we don't understand; it isn't ours to discard.
                session.set(&self.key, other);
                return Err(AuthError::Session(format!(
                    "session entry {} is not an object",
                    self.key
                )));
            }
            None => return Err(AuthError::StateMissing),
        };

        let record = entry.remove("state");
        if !entry.is_empty() {
            session.set(&self.key, Value::Object(entry));
        }

        let record: StateRecord = match record {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| AuthError::Session(format!("malformed state record: {e}")))?,
            None => return Err(AuthError::StateMissing),
        };

        if record.handle != handle {
            log::warn!("authorization request state mismatch for {}", self.key);
            return Err(AuthError::CsrfMismatch);
        }

        Ok(record.state)
    }
}
