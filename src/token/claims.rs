//! Ordered claim set carried in the token payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved key holding the subject (username)
pub const SUBJECT: &str = "sub";
/// Reserved key holding the issue time (seconds since the epoch)
pub const ISSUED_AT: &str = "iat";
/// Reserved key holding the expiration time (seconds since the epoch)
pub const EXPIRATION: &str = "exp";

/// Flat, insertion-ordered claim map.
///
/// Extractors share one namespace; writing an existing key replaces its value
/// in place, so the last writer wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Claims(Map::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// List of strings under `key`; non-string elements are skipped.
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.0.get(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str(SUBJECT)
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.get_i64(ISSUED_AT)
    }

    pub fn expiration(&self) -> Option<i64> {
        self.get_i64(EXPIRATION)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Claims(map)
    }
}
