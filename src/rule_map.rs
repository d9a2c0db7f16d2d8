//! Observable predecessor → successor mapping
//!
//! Shared by the grammar (`RuleMap<String>`) and the turtle interpretation
//! (`RuleMap<Order>`). Owners subscribe callbacks to hear about mutations.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{LsysError, Result};

type Callback = Box<dyn FnMut()>;

/// Callback registry fired after every mutation.
///
/// Subscriptions belong to one instance: cloning the owner yields a copy
/// with no subscribers, so an on-screen model and its paste-buffer copy
/// never notify each other.
#[derive(Default)]
pub struct ChangeNotifier {
    callbacks: Vec<Callback>,
}

impl ChangeNotifier {
    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn notify(&mut self) {
        for callback in self.callbacks.iter_mut() {
            callback();
        }
    }
}

impl Clone for ChangeNotifier {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

/// Single-character predecessor → successor rules, one per predecessor.
#[derive(Debug, Clone)]
pub struct RuleMap<V> {
    rules: BTreeMap<char, V>,
    notifier: ChangeNotifier,
}

impl<V> Default for RuleMap<V> {
    fn default() -> Self {
        Self {
            rules: BTreeMap::new(),
            notifier: ChangeNotifier::default(),
        }
    }
}

impl<V> RuleMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any existing rule for `predecessor`.
    /// Returns the replaced successor.
    pub fn add_rule(&mut self, predecessor: char, successor: V) -> Option<V> {
        let previous = self.rules.insert(predecessor, successor);
        self.notifier.notify();
        previous
    }

    pub fn remove_rule(&mut self, predecessor: char) -> Result<V> {
        let removed = self
            .rules
            .remove(&predecessor)
            .ok_or(LsysError::MissingRule(predecessor))?;
        self.notifier.notify();
        Ok(removed)
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
        self.notifier.notify();
    }

    pub fn get(&self, predecessor: char) -> Option<&V> {
        self.rules.get(&predecessor)
    }

    /// Rules in ascending predecessor order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &V)> {
        self.rules.iter().map(|(&p, s)| (p, s))
    }

    pub fn predecessors(&self) -> impl Iterator<Item = char> + '_ {
        self.rules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) {
        self.notifier.subscribe(callback);
    }

    /// Fire the change callbacks without touching the rules. Owners that
    /// layer extra state on top of the map (e.g. an axiom) use this.
    pub(crate) fn notify(&mut self) {
        self.notifier.notify();
    }
}

impl<V> FromIterator<(char, V)> for RuleMap<V> {
    fn from_iter<I: IntoIterator<Item = (char, V)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
            notifier: ChangeNotifier::default(),
        }
    }
}
