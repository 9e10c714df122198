use serde_json::{Map, Value};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// A request-scoped key/value session.
///
/// The web framework owns the session for the duration of one request and
/// lends it to the login flow through this trait. Nothing here is shared
/// between requests.
pub trait RequestSession: Send {
    /// Look up a value.
    fn get(&self, key: &str) -> Option<&Value>;

    /// Insert or replace a value.
    fn set(&mut self, key: &str, value: Value);

    /// Remove a value, returning it if it was present.
    fn remove(&mut self, key: &str) -> Option<Value>;
}

impl RequestSession for Map<String, Value> {
    fn get(&self, key: &str) -> Option<&Value> {
        Map::get(self, key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        Map::remove(self, key)
    }
}

impl<S: BuildHasher + Send> RequestSession for HashMap<String, Value, S> {
    fn get(&self, key: &str) -> Option<&Value> {
        HashMap::get(self, key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        HashMap::remove(self, key)
    }
}
