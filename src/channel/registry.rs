use crate::common::Signal;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Channels that currently accept listeners, each with its close signal
#[derive(Debug, Default)]
pub(crate) struct Registry {
    channels: RwLock<HashMap<String, Signal>>,
}

impl Registry {
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.channels.read().contains_key(id)
    }

    /// Returns true if the channel record was created by this call
    pub(crate) fn get_or_insert(&self, id: &str) -> bool {
        // fast check with shared access
        if self.contains(id) {
            return false;
        }

        // slow check with unique access
        let mut channels = self.channels.write();
        if channels.contains_key(id) {
            return false;
        }
        channels.insert(id.to_owned(), Signal::new());
        true
    }

    pub(crate) fn ids(&self) -> HashSet<String> {
        self.channels.read().keys().cloned().collect()
    }

    pub(crate) fn close_signal(&self, id: &str) -> Option<Signal> {
        self.channels.read().get(id).cloned()
    }

    /// Runs `f` while the channel is guaranteed to stay registered
    ///
    /// Returns None without calling `f` if the channel is absent
    pub(crate) fn attach<R>(&self, id: &str, f: impl FnOnce() -> R) -> Option<R> {
        let channels = self.channels.read();
        if !channels.contains_key(id) {
            return None;
        }
        Some(f())
    }

    /// Removes the channel and runs `f` before any other access is possible
    ///
    /// `f` receives the removed close signal, if the channel was registered
    pub(crate) fn detach<R>(&self, id: &str, f: impl FnOnce(Option<Signal>) -> R) -> R {
        let mut channels = self.channels.write();
        let signal = channels.remove(id);
        f(signal)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn get_or_insert_once() {
        let registry = Registry::default();
        assert!(registry.get_or_insert("a"));
        assert!(!registry.get_or_insert("a"));
        assert!(registry.contains("a"));
        assert_eq!(registry.ids(), HashSet::from(["a".to_owned()]));
    }

    #[test]
    fn attach_requires_registration() {
        let registry = Registry::default();
        assert_eq!(registry.attach("a", || 1), None);
        registry.get_or_insert("a");
        assert_eq!(registry.attach("a", || 1), Some(1));
    }

    #[test]
    fn detach_hands_over_signal() {
        let registry = Registry::default();
        registry.get_or_insert("a");
        let signal = registry.close_signal("a").unwrap();

        let removed = registry.detach("a", |removed| removed);
        assert!(removed.unwrap().fire());
        assert!(signal.is_fired());
        assert!(!registry.contains("a"));
        assert!(registry.close_signal("a").is_none());

        assert!(registry.detach("a", |removed| removed.is_none()));
    }
}
