//! L-System derivation engine
//!
//! Rewrites the axiom depth by depth and keeps two incremental caches:
//! - the produced string per depth
//! - the recursion count of every produced symbol per depth
//!
//! The recursion count of a symbol is the number of flagged
//! ("iteration") predecessors in its derivation chain. It drives the
//! per-vertex iteration depth used by the painters.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::rule_map::RuleMap;

/// Recursion counts of one depth plus the largest count seen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IterationEntry {
    counts: Vec<u8>,
    max: u8,
}

/// Result of [`LSystem::produce`], borrowed from the caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation<'a> {
    pub string: &'a str,
    pub recursion: &'a [u8],
    /// Largest recursion count observed at any depth up to the requested one.
    pub max_recursion: u8,
}

#[derive(Debug, Clone)]
pub struct LSystem {
    axiom: String,
    rules: RuleMap<String>,
    iteration_predecessors: BTreeSet<char>,
    /// Index = depth. Entry 0 is always the axiom.
    production_cache: Vec<String>,
    /// Index = depth. Never longer than `production_cache`.
    iteration_cache: Vec<IterationEntry>,
}

impl Default for LSystem {
    fn default() -> Self {
        Self::new("", [], [])
    }
}

impl LSystem {
    pub fn new(
        axiom: impl Into<String>,
        rules: impl IntoIterator<Item = (char, String)>,
        iteration_predecessors: impl IntoIterator<Item = char>,
    ) -> Self {
        let mut lsystem = Self {
            axiom: axiom.into(),
            rules: rules.into_iter().collect(),
            iteration_predecessors: iteration_predecessors.into_iter().collect(),
            production_cache: Vec::new(),
            iteration_cache: Vec::new(),
        };
        lsystem.reset_caches();
        lsystem
    }

    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    pub fn rules(&self) -> &RuleMap<String> {
        &self.rules
    }

    pub fn iteration_predecessors(&self) -> &BTreeSet<char> {
        &self.iteration_predecessors
    }

    pub fn set_axiom(&mut self, axiom: impl Into<String>) {
        self.axiom = axiom.into();
        self.reset_caches();
        self.rules.notify();
    }

    pub fn add_rule(&mut self, predecessor: char, successor: impl Into<String>) {
        self.reset_caches();
        self.rules.add_rule(predecessor, successor.into());
    }

    pub fn remove_rule(&mut self, predecessor: char) -> Result<String> {
        let removed = self.rules.remove_rule(predecessor)?;
        self.reset_caches();
        Ok(removed)
    }

    pub fn clear_rules(&mut self) {
        self.reset_caches();
        self.rules.clear_rules();
    }

    pub fn set_iteration_predecessors(&mut self, predecessors: impl IntoIterator<Item = char>) {
        self.iteration_predecessors = predecessors.into_iter().collect();
        self.reset_caches();
        self.rules.notify();
    }

    /// Register a callback fired after every axiom, rule or flag change.
    /// Derivation never fires it.
    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) {
        self.rules.subscribe(callback);
    }

    /// Highest cached depth of the string cache and of the recursion cache.
    pub fn cached_depths(&self) -> (usize, usize) {
        (
            self.production_cache.len() - 1,
            self.iteration_cache.len() - 1,
        )
    }

    /// Produced string and recursion counts at depth `n`.
    ///
    /// Extends both caches up to `n`. Depths whose string is already cached
    /// only get their recursion counts computed.
    pub fn produce(&mut self, n: usize) -> Derivation<'_> {
        debug_assert!(self.iteration_cache.len() <= self.production_cache.len());

        if self.axiom.is_empty() {
            return Derivation {
                string: "",
                recursion: &[],
                max_recursion: 0,
            };
        }

        let first = self.iteration_cache.len();
        if first <= n {
            tracing::debug!(from = first, to = n, "extending derivation caches");
        }
        for depth in first..=n {
            let (string, entry) = self.derive_step(depth, true);
            if let Some(string) = string {
                self.production_cache.push(string);
            }
            self.iteration_cache.push(entry);
        }
        debug_assert!(self.iteration_cache.len() <= self.production_cache.len());

        let entry = &self.iteration_cache[n];
        Derivation {
            string: &self.production_cache[n],
            recursion: &entry.counts,
            max_recursion: entry.max,
        }
    }

    /// Produced string at depth `n`, without recursion bookkeeping.
    pub fn produce_string(&mut self, n: usize) -> &str {
        if self.axiom.is_empty() {
            return "";
        }

        let first = self.production_cache.len();
        if first <= n {
            tracing::debug!(from = first, to = n, "extending production cache");
        }
        for depth in first..=n {
            let (string, _) = self.derive_step(depth, false);
            if let Some(string) = string {
                self.production_cache.push(string);
            }
        }
        &self.production_cache[n]
    }

    /// Derive depth `depth` from depth `depth - 1`.
    ///
    /// The string is only materialized when it is not cached yet. Recursion
    /// counts are only computed when `with_counts` is set, in which case the
    /// parent depth must be in the recursion cache.
    fn derive_step(&self, depth: usize, with_counts: bool) -> (Option<String>, IterationEntry) {
        let source = &self.production_cache[depth - 1];
        let mut next = (depth >= self.production_cache.len())
            .then(|| String::with_capacity(source.len() * 2));

        let parent = with_counts.then(|| &self.iteration_cache[depth - 1]);
        let mut counts = Vec::with_capacity(if with_counts { source.len() * 2 } else { 0 });

        for (position, symbol) in source.chars().enumerate() {
            let successor = self.rules.get(symbol);

            if let Some(next) = next.as_mut() {
                match successor {
                    Some(successor) => next.push_str(successor),
                    None => next.push(symbol),
                }
            }

            if let Some(parent) = parent {
                let mut count = parent.counts[position];
                if self.iteration_predecessors.contains(&symbol) {
                    count = count.saturating_add(1);
                }
                let span = successor.map_or(1, |s| s.chars().count());
                counts.extend(std::iter::repeat(count).take(span));
            }
        }

        let max = match parent {
            Some(parent) => counts.iter().copied().fold(parent.max, u8::max),
            None => 0,
        };
        (next, IterationEntry { counts, max })
    }

    fn reset_caches(&mut self) {
        self.production_cache = vec![self.axiom.clone()];
        self.iteration_cache = vec![IterationEntry {
            counts: vec![0; self.axiom.chars().count()],
            max: 0,
        }];
    }
}
