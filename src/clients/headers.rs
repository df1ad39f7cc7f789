//! Immutable header sets.
//!
//! Requests never edit a shared header map. A [`HeaderSet`] is built once,
//! and each call produces a fresh merged copy via [`HeaderSet::merged`].

use std::collections::BTreeMap;
use std::fmt;

/// Header names whose values are masked in `Debug` output.
const SENSITIVE: &[&str] = &["authorization"];

/// An ordered set of HTTP headers with case-insensitive names.
///
/// Names are stored lower-cased, matching how HTTP/2 and `reqwest` treat them.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::clients::HeaderSet;
///
/// let base = HeaderSet::new()
///     .with("Content-Type", "application/json")
///     .with("X-Device-Id", "device-1");
/// let overrides = HeaderSet::new().with("content-type", "text/plain");
///
/// let merged = base.merged(&overrides);
/// assert_eq!(merged.get("Content-Type"), Some("text/plain"));
/// assert_eq!(base.get("content-type"), Some("application/json"));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderSet(BTreeMap<String, String>);

impl HeaderSet {
    /// Creates an empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this set with `name` set to `value`.
    #[must_use]
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub(crate) fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Returns the value of a header, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Returns `true` if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns a new set where entries of `overrides` replace entries of `self`.
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        for (name, value) in &overrides.0 {
            merged.0.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl fmt::Debug for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if SENSITIVE.contains(&name.as_str()) {
                map.entry(name, &"*****");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_insensitive() {
        let set = HeaderSet::new().with("X-Device-Id", "abc");
        assert_eq!(set.get("x-device-id"), Some("abc"));
        assert_eq!(set.get("X-DEVICE-ID"), Some("abc"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_merged_leaves_both_inputs_untouched() {
        let base = HeaderSet::new()
            .with("Accept", "application/json")
            .with("X-Device-Id", "abc");
        let overrides = HeaderSet::new().with("Accept", "application/vnd.test+json");

        let merged = base.merged(&overrides);

        assert_eq!(merged.get("accept"), Some("application/vnd.test+json"));
        assert_eq!(merged.get("x-device-id"), Some("abc"));
        assert_eq!(base.get("accept"), Some("application/json"));
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn test_debug_masks_authorization() {
        let set = HeaderSet::new()
            .with("Authorization", "Bearer secret-token")
            .with("X-Device-Id", "abc");
        let debug = format!("{set:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("*****"));
        assert!(debug.contains("abc"));
    }

    #[test]
    fn test_collects_from_pairs() {
        let set: HeaderSet = [("A", "1"), ("b", "2")].into_iter().collect();
        let pairs: Vec<_> = set.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }
}
