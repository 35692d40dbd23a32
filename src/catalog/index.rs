//! In-memory catalog index: entries by id plus a name alias table

use std::collections::HashMap;

use super::entry::{CatalogEntry, normalize_name};
use crate::client::ConversationScope;

/// Entries keyed by id, and normalized names keyed to the id that claimed
/// them first.
///
/// Every alias points at an id present in `entries`. A name slot stays
/// with its first claimant until that entry is renamed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIndex {
    entries: HashMap<String, CatalogEntry>,
    aliases: HashMap<String, String>,
}

impl CatalogIndex {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Id owning an exact alias key.
    pub fn alias(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    /// Id owning a name, compared case-insensitively.
    pub fn lookup_name(&self, name: &str) -> Option<&str> {
        self.alias(&normalize_name(name))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Insert or update one entry observed in a fetch of `scope`.
    ///
    /// Member-scoped observations force `is_member`; all-scoped ones never
    /// clear a flag that is already set.
    pub fn upsert(&mut self, mut entry: CatalogEntry, scope: ConversationScope) {
        let existing = self.entries.get(&entry.id);

        match scope {
            ConversationScope::MemberOnly => entry.is_member = true,
            ConversationScope::All => {
                entry.is_member |= existing.is_some_and(|e| e.is_member);
            }
        }

        let old_name = existing
            .map(|e| normalize_name(&e.name))
            .filter(|n| !n.is_empty());
        let new_name = normalize_name(&entry.name);

        if let Some(old) = old_name
            && old != new_name
        {
            self.release_alias(&old, &entry.id);
        }

        let id = entry.id.clone();
        self.entries.insert(id.clone(), entry);
        self.claim_alias(&new_name, &id);
    }

    /// Claim `alias` for `id` if the slot is free or already ours.
    ///
    /// Returns whether `id` owns the alias afterwards.
    pub fn claim_alias(&mut self, alias: &str, id: &str) -> bool {
        let key = normalize_name(alias);
        if key.is_empty() || !self.entries.contains_key(id) {
            return false;
        }

        match self.aliases.get(&key) {
            Some(owner) => owner == id,
            None => {
                self.aliases.insert(key, id.to_string());
                true
            }
        }
    }

    fn release_alias(&mut self, key: &str, id: &str) {
        if self.aliases.get(key).is_some_and(|owner| owner == id) {
            self.aliases.remove(key);
        }
    }

    /// Copy of every entry, sorted by display name.
    pub fn to_vec(&self) -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> = self.entries.values().cloned().collect();
        entries.sort_by_key(|e| (e.display_name().to_lowercase(), e.id.clone()));
        entries
    }

    /// Whether every alias resolves to an entry and every named entry has one.
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        let aliases_valid = self
            .aliases
            .values()
            .all(|id| self.entries.contains_key(id));
        let names_covered = self
            .entries
            .values()
            .filter(|e| !e.name.is_empty())
            .all(|e| self.aliases.contains_key(&normalize_name(&e.name)));
        aliases_valid && names_covered
    }
}
