//! Discovery info metadata.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Small key/value metadata advertised alongside a peer's presence.
///
/// There is no ordering guarantee. The advertised size should be kept small
/// for network performance; this is a protocol framing concern and is not
/// enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscoveryInfo(HashMap<String, String>);

impl DiscoveryInfo {
    /// Create an empty discovery info map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, String>> for DiscoveryInfo {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for DiscoveryInfo {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for DiscoveryInfo {
    type Item = (String, String);
    type IntoIter = std::collections::hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut info = DiscoveryInfo::new();
        assert!(info.is_empty());
        info.insert("mode", "coop");
        assert_eq!(info.get("mode"), Some("coop"));
        assert_eq!(info.get("missing"), None);
        assert_eq!(info.len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let info: DiscoveryInfo = [("a".to_string(), "1".to_string())].into_iter().collect();
        let json = serde_json::to_string(&info).unwrap();
        let decoded: DiscoveryInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, decoded);
    }
}
