// ABOUTME: In-memory registry of live windows keyed by window identity.
// ABOUTME: Every lookup path tolerates dead handles and purges them lazily.

use std::collections::HashMap;

/// Maps window identity to the label of its open window. The caller supplies
/// a liveness check because only the windowing layer knows whether a label
/// still resolves to a showable window.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    entries: HashMap<String, String>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: String, label: String) {
        self.entries.insert(identity, label);
    }

    /// Returns the label of a live window for this identity. A registered but
    /// dead entry is purged and treated as absent, so a follow-up create gets
    /// a fresh window rather than a stale handle.
    pub fn live_label<F>(&mut self, identity: &str, is_live: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        match self.entries.get(identity) {
            Some(label) if is_live(label) => Some(label.clone()),
            Some(_) => {
                self.entries.remove(identity);
                None
            }
            None => None,
        }
    }

    /// Removes the entry for a closed window by its label.
    pub fn remove_label(&mut self, label: &str) {
        self.entries.retain(|_, l| l != label);
    }

    /// Number of live entries; dead handles are purged as part of the read.
    pub fn count<F>(&mut self, is_live: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.entries.retain(|_, label| is_live(label));
        self.entries.len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_label_returns_registered_window() {
        let mut registry = WindowRegistry::new();
        registry.insert("jira-acme".to_string(), "jira-acme".to_string());

        let label = registry.live_label("jira-acme", |_| true);
        assert_eq!(label.as_deref(), Some("jira-acme"));
    }

    #[test]
    fn test_live_label_purges_dead_entry() {
        let mut registry = WindowRegistry::new();
        registry.insert("jira-acme".to_string(), "jira-acme".to_string());

        assert!(registry.live_label("jira-acme", |_| false).is_none());
        // The stale entry is gone: a later lookup with a live predicate still
        // finds nothing, so the caller creates a fresh window.
        assert!(registry.live_label("jira-acme", |_| true).is_none());
        assert_eq!(registry.count(|_| true), 0);
    }

    #[test]
    fn test_remove_label_drops_entry() {
        let mut registry = WindowRegistry::new();
        registry.insert("jira-acme".to_string(), "jira-acme".to_string());
        registry.insert("wiki-acme".to_string(), "wiki-acme".to_string());

        registry.remove_label("jira-acme");
        assert_eq!(registry.count(|_| true), 1);
        assert!(registry.live_label("jira-acme", |_| true).is_none());
        assert!(registry.live_label("wiki-acme", |_| true).is_some());
    }

    #[test]
    fn test_count_purges_dead_handles() {
        let mut registry = WindowRegistry::new();
        registry.insert("a".to_string(), "a".to_string());
        registry.insert("b".to_string(), "b".to_string());

        assert_eq!(registry.count(|label| label == "a"), 1);
        // The purge is durable, not just a filtered view.
        assert_eq!(registry.count(|_| true), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut registry = WindowRegistry::new();
        registry.clear();
        registry.insert("a".to_string(), "a".to_string());
        registry.clear();
        registry.clear();
        assert_eq!(registry.count(|_| true), 0);
    }
}
