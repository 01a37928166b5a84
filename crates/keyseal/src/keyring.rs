//! Historical keys indexed by key id.

use keyseal_crypto::{KeyId, SymmetricKey};

/// Ordered id → key mapping of previous keys.
///
/// Iteration follows insertion (rotation) order. Inserting an id that is
/// already present replaces its key in place, keeping the original
/// position. Lookups are linear; rings hold a handful of keys.
#[derive(Debug, Default)]
pub struct KeyRing {
    entries: Vec<(KeyId, SymmetricKey)>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning the key it replaced (wiped when dropped).
    pub fn insert(&mut self, id: KeyId, key: SymmetricKey) -> Option<SymmetricKey> {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => Some(std::mem::replace(slot, key)),
            None => {
                self.entries.push((id, key));
                None
            }
        }
    }

    pub fn get(&self, id: &KeyId) -> Option<&SymmetricKey> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, key)| key)
    }

    pub fn contains(&self, id: &KeyId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, &SymmetricKey)> {
        self.entries.iter().map(|(id, key)| (id, key))
    }

    pub fn ids(&self) -> impl Iterator<Item = &KeyId> {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SymmetricKey> {
        self.entries.iter().map(|(_, key)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
