//! The per-request data bag.

use std::collections::HashMap;

use serde_json::Value;

/// Application-defined data threaded through the middleware chain.
///
/// Every request starts from a copy of the router-level defaults, so a
/// request never observes mutations made by a concurrent or earlier request.
/// A middleware that wants the rest of the chain to see new fields hands an
/// update to its continuation ([`Next::run_with`](crate::Next::run_with));
/// the update is merged shallowly over the snapshot that middleware
/// received, later keys winning.
///
/// ```rust
/// use trellis::Data;
///
/// let mut data = Data::new().with("site", "blog").with("draft", true);
/// data.merge(Data::new().with("draft", false));
///
/// assert_eq!(data.get("draft"), Some(&serde_json::Value::Bool(false)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Data {
    fields: HashMap<String, Value>,
}

impl Data {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chaining insert, for building defaults in one expression.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Shallow merge: every field of `update` is copied in, overwriting any
    /// field already present under the same key.
    pub fn merge(&mut self, update: Data) {
        self.fields.extend(update.fields);
    }
}
