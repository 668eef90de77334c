//! Per-file side channel between the collecting and consuming passes of a rule
//!
//! Values are recorded under a key: the enclosing variable or method name, or
//! the offset of the call an inline expression is passed to. Each entry is
//! pending until a consumer takes or shares it; whatever is still pending
//! when the file is done is reported by [`MigrationContext::finish`].

use std::collections::VecDeque;

#[derive(Debug)]
struct Entry<T> {
    value: T,
    consumed: bool,
}

#[derive(Debug)]
pub struct MigrationContext<T> {
    keyed: Vec<(String, VecDeque<Entry<T>>)>,
    taken: Vec<T>,
}

/// What happened to the recorded values
#[derive(Debug)]
pub struct ContextSummary<T> {
    pub consumed: Vec<T>,
    pub pending: Vec<T>,
}

impl<T> Default for MigrationContext<T> {
    fn default() -> Self {
        Self {
            keyed: Vec::new(),
            taken: Vec::new(),
        }
    }
}

impl<T> MigrationContext<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value under `key`; several values per key are consumed in order
    pub fn record(&mut self, key: &str, value: T) {
        let entry = Entry {
            value,
            consumed: false,
        };
        match self.keyed.iter_mut().find(|(k, _)| k == key) {
            Some((_, entries)) => entries.push_back(entry),
            None => self.keyed.push((key.to_string(), VecDeque::from([entry]))),
        }
    }

    /// Consume the oldest pending value recorded under `key`
    pub fn take(&mut self, key: &str) -> Option<&T> {
        let (_, entries) = self.keyed.iter_mut().find(|(k, _)| k == key)?;
        let position = entries.iter().position(|e| !e.consumed)?;
        let entry = entries.remove(position)?;
        self.taken.push(entry.value);
        self.taken.last()
    }

    /// Mark the newest value under `key` consumed but keep it readable for
    /// later consumers of the same key
    pub fn share(&mut self, key: &str) -> Option<&T> {
        let (_, entries) = self.keyed.iter_mut().find(|(k, _)| k == key)?;
        let entry = entries.back_mut()?;
        entry.consumed = true;
        Some(&entry.value)
    }

    /// Split everything recorded into consumed and still-pending values
    pub fn finish(self) -> ContextSummary<T> {
        let mut consumed = self.taken;
        let mut pending = Vec::new();
        let entries = self.keyed.into_iter().flat_map(|(_, entries)| entries);
        for entry in entries {
            if entry.consumed {
                consumed.push(entry.value);
            } else {
                pending.push(entry.value);
            }
        }
        ContextSummary { consumed, pending }
    }
}
