//! Ambient template variable state.
//!
//! Host engines often keep variables in process-wide mutable state; here the
//! state is an explicit context threaded through the render call so the
//! before/after diff is free of hidden aliasing.

use std::collections::BTreeMap;

/// Named string values set and read by template fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of the current state, taken before executing a fragment.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Entries that are new or whose value changed relative to `before`.
    ///
    /// Unchanged entries are excluded; the result is a diff, not a snapshot.
    pub fn diff(&self, before: &Variables) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter(|(name, value)| before.get(name) != Some(value.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Replay a stored diff onto the live state. Existing entries are
    /// overwritten by the stored value.
    pub fn merge(&mut self, diff: &BTreeMap<String, String>) {
        for (name, value) in diff {
            self.values.insert(name.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, String)> for Variables {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(entries: &[(&str, &str)]) -> Variables {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn diff_excludes_unchanged_entries() {
        let before = vars(&[("a", "1")]);
        let after = vars(&[("a", "1"), ("b", "2")]);

        let diff = after.diff(&before);
        assert_eq!(diff, BTreeMap::from([("b".to_string(), "2".to_string())]));
    }

    #[test]
    fn diff_includes_changed_entries() {
        let before = vars(&[("a", "1"), ("b", "2")]);
        let after = vars(&[("a", "changed"), ("b", "2")]);

        let diff = after.diff(&before);
        assert_eq!(
            diff,
            BTreeMap::from([("a".to_string(), "changed".to_string())])
        );
    }

    #[test]
    fn diff_of_identical_states_is_empty() {
        let state = vars(&[("a", "1")]);
        assert!(state.diff(&state.snapshot()).is_empty());
    }

    #[test]
    fn merge_replays_diff_onto_fresh_state() {
        let mut live = Variables::new();
        live.merge(&BTreeMap::from([("b".to_string(), "2".to_string())]));

        assert_eq!(live.get("b"), Some("2"));
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn merge_overwrites_existing_entries() {
        let mut live = vars(&[("color", "blue")]);
        live.merge(&BTreeMap::from([("color".to_string(), "red".to_string())]));

        assert_eq!(live.get("color"), Some("red"));
    }
}
