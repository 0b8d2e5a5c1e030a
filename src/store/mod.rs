//! In-memory resource store.
//!
//! Holds the ordered collection of records for one screen plus its loading
//! flag. The store is the single mutation authority over the collection:
//! every operation either applies wholly or leaves the collection untouched,
//! and identifiers stay unique throughout. Stale or duplicate deliveries are
//! logged, never crashed on.

use std::collections::HashSet;

use crate::models::Record;

/// Client-held ordered collection of records for one resource type.
#[derive(Debug, Default)]
pub struct ResourceStore {
    records: Vec<Record>,
    loading: bool,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Replace the whole collection with a freshly fetched sequence.
    ///
    /// Records without an identifier are dropped (they have never completed a
    /// server round-trip); duplicate identifiers keep the first occurrence.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            let Some(id) = record.id().map(str::to_string) else {
                tracing::warn!("Dropping fetched record without identifier");
                continue;
            };
            if seen.contains(&id) {
                tracing::warn!("Dropping duplicate identifier {} in fetched collection", id);
            } else {
                seen.insert(id);
                kept.push(record);
            }
        }

        self.records = kept;
    }

    /// Append a newly created record. Returns whether the append happened.
    ///
    /// A record without an identifier is rejected. A record whose identifier
    /// is already present is a duplicate delivery: the existing entry is
    /// replaced in place so the latest server state wins and identifiers stay
    /// unique.
    pub fn apply_create(&mut self, record: Record) -> bool {
        let Some(id) = record.id().map(str::to_string) else {
            tracing::warn!("Refusing to store created record without identifier");
            return false;
        };

        if let Some(pos) = self.position(&id) {
            tracing::warn!("Duplicate create delivery for {}, replacing existing entry", id);
            self.records[pos] = record;
            return false;
        }

        self.records.push(record);
        true
    }

    /// Replace the entry matching the record's identifier. Returns whether a
    /// matching entry was found; a miss is a stale-state condition.
    pub fn apply_update(&mut self, record: Record) -> bool {
        let Some(id) = record.id().map(str::to_string) else {
            tracing::warn!("Refusing to apply update without identifier");
            return false;
        };

        match self.position(&id) {
            Some(pos) => {
                self.records[pos] = record;
                true
            }
            None => {
                tracing::warn!("Update for {} not present locally, ignoring", id);
                false
            }
        }
    }

    /// Remove the entry with the given identifier. No-op if absent.
    pub fn apply_delete(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.records.remove(pos);
                true
            }
            None => {
                tracing::warn!("Delete for {} not present locally, ignoring", id);
                false
            }
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == Some(id))
    }
}
