use std::collections::HashMap;

use vigil_common::Fault;

/// Alert state of one critical fault as of the last tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notified {
    /// Critical, but no trigger has gone through yet.
    Pending,
    /// Triggered with this message.
    Triggered(String),
}

/// Critical faults the alerter knows about, keyed by qualified name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriticalSet {
    entries: HashMap<String, Notified>,
}

impl CriticalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from persisted faults: critical ones only, untriggered ones pending.
    pub fn from_faults<'a>(faults: impl IntoIterator<Item = &'a Fault>) -> Self {
        let entries = faults
            .into_iter()
            .filter(|f| f.is_critical())
            .map(|f| {
                let state = if f.triggered {
                    Notified::Triggered(f.message.clone())
                } else {
                    Notified::Pending
                };
                (f.name.clone(), state)
            })
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, name: String, state: Notified) {
        self.entries.insert(name, state);
    }

    pub fn get(&self, name: &str) -> Option<&Notified> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True when `name` was already triggered with exactly `message`.
    pub fn is_triggered_with(&self, name: &str, message: &str) -> bool {
        matches!(self.entries.get(name), Some(Notified::Triggered(m)) if m == message)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Notified)> {
        self.entries.iter().map(|(name, state)| (name.as_str(), state))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
