//! Path-parameter bindings.

use std::collections::HashMap;

/// The name→value bindings produced by matching a request path against a
/// template's parameter segments.
///
/// For the template `/posts/:id` and the path `/posts/42`,
/// `params.get("id")` returns `Some("42")`. Bindings are produced fresh for
/// every matched template — two simultaneously matched templates never share
/// a binding set, even when they branch at the same trie position.
#[derive(Clone, Debug, Default)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value bound to `name`, if the matched template had a
    /// parameter by that name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// True when the matched template bound nothing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over the bindings in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
