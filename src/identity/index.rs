//! Insertion-ordered key-value index with switchable key equality.

use std::collections::HashMap;
use std::hash::Hash;

use super::Equality;

/// Key-value container whose key equality follows an [`Equality`] strategy.
///
/// Strict mode keeps a hashed slot table over the ordered entries, so lookups
/// are O(1) amortized. Structural mode has no hash to lean on and scans the
/// keys with the comparator, which is O(n); structural graphs are expected to
/// stay small to medium sized.
///
/// Keys are unique under the active equality. `get_or_insert_with` keeps the
/// first-stored key; a structural `set` replaces both key and value.
#[derive(Debug, Clone)]
pub struct IdentityIndex<K, V> {
    equality: Equality<K>,
    entries: Vec<(K, V)>,
    /// Strict mode only: key -> position in `entries`.
    slots: HashMap<K, usize>,
}

impl<K, V> IdentityIndex<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(equality: Equality<K>) -> Self {
        Self {
            equality,
            entries: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Build an index from pairs. A later pair replaces the value of an
    /// earlier equal key.
    pub fn from_entries<I>(entries: I, equality: Equality<K>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut index = Self::new(equality);
        for (key, value) in entries {
            index.set(key, value);
        }
        index
    }

    pub fn equality(&self) -> &Equality<K> {
        &self.equality
    }

    fn find(&self, key: &K) -> Option<usize> {
        match &self.equality {
            Equality::Strict => self.slots.get(key).copied(),
            Equality::Structural(cmp) => self
                .entries
                .iter()
                .position(|(stored, _)| cmp.equals(key, stored)),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.find(key) {
            Some(i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// The stored key equal to `key`, which may be a distinct instance.
    pub fn key(&self, key: &K) -> Option<&K> {
        self.find(key).map(|i| &self.entries[i].0)
    }

    pub fn has(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Insert or replace. Returns the previous value for an equal key.
    ///
    /// Strict mode assigns in place. Structural mode removes the equal entry
    /// and appends `key`, so the newest instance becomes the stored key.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let Some(i) = self.find(&key) else {
            self.push(key, value);
            return None;
        };
        if self.equality.is_structural() {
            let (_, previous) = self.entries.remove(i);
            self.entries.push((key, value));
            Some(previous)
        } else {
            Some(std::mem::replace(&mut self.entries[i].1, value))
        }
    }

    /// Value for `key`, inserting `default()` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let i = match self.find(&key) {
            Some(i) => i,
            None => {
                self.push(key, default());
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    fn push(&mut self, key: K, value: V) {
        if !self.equality.is_structural() {
            self.slots.insert(key.clone(), self.entries.len());
        }
        self.entries.push((key, value));
    }

    /// Removes the entry for `key`. Returns true if a matching key was removed.
    pub fn delete(&mut self, key: &K) -> bool {
        let Some(i) = self.find(key) else {
            return false;
        };
        let (removed, _) = self.entries.remove(i);
        if !self.equality.is_structural() {
            self.slots.remove(&removed);
            for slot in self.slots.values_mut() {
                if *slot > i {
                    *slot -= 1;
                }
            }
        }
        true
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.entries.retain_mut(|(key, value)| keep(key, value));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.slots.clear();
        if self.equality.is_structural() {
            return;
        }
        for (i, (key, _)) in self.entries.iter().enumerate() {
            self.slots.insert(key.clone(), i);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case_insensitive() -> Equality<String> {
        Equality::structural(|a: &String, b: &String| a.eq_ignore_ascii_case(b))
    }

    #[test]
    fn test_strict_set_and_get() {
        let mut index = IdentityIndex::new(Equality::strict());
        assert!(index.set("a", 1).is_none());
        assert!(index.set("b", 2).is_none());
        assert_eq!(index.get(&"a"), Some(&1));
        assert_eq!(index.get(&"c"), None);
        assert!(index.has(&"b"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut index = IdentityIndex::new(Equality::strict());
        index.set("a", 1);
        index.set("b", 2);
        assert_eq!(index.set("a", 3), Some(1));
        let keys: Vec<_> = index.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(index.get(&"a"), Some(&3));
    }

    #[test]
    fn test_strict_delete_keeps_slots_consistent() {
        let mut index = IdentityIndex::new(Equality::strict());
        for (i, key) in ["a", "b", "c", "d"].into_iter().enumerate() {
            index.set(key, i);
        }
        assert!(index.delete(&"b"));
        assert!(!index.delete(&"b"));
        assert_eq!(index.get(&"a"), Some(&0));
        assert_eq!(index.get(&"c"), Some(&2));
        assert_eq!(index.get(&"d"), Some(&3));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_structural_lookup_matches_equal_keys() {
        let mut index = IdentityIndex::new(case_insensitive());
        index.set("English".to_string(), 1);
        assert_eq!(index.get(&"ENGLISH".to_string()), Some(&1));
        assert!(index.has(&"english".to_string()));
        assert!(!index.has(&"Korean".to_string()));
    }

    #[test]
    fn test_structural_set_keeps_keys_unique() {
        let mut index = IdentityIndex::new(case_insensitive());
        index.set("English".to_string(), 1);
        assert_eq!(index.set("english".to_string(), 2), Some(1));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&"English".to_string()), Some(&2));
        assert_eq!(index.key(&"ENGLISH".to_string()).map(String::as_str), Some("english"));
    }

    #[test]
    fn test_structural_set_moves_replaced_key_last() {
        let mut index = IdentityIndex::new(case_insensitive());
        index.set("English".to_string(), 1);
        index.set("Korean".to_string(), 2);
        index.set("english".to_string(), 3);
        let keys: Vec<_> = index.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Korean", "english"]);
        assert_eq!(index.get(&"ENGLISH".to_string()), Some(&3));
    }

    #[test]
    fn test_get_or_insert_keeps_first_key() {
        let mut index = IdentityIndex::new(case_insensitive());
        index.get_or_insert_with("English".to_string(), Vec::new).push(1);
        index.get_or_insert_with("english".to_string(), Vec::new).push(2);
        assert_eq!(index.key(&"ENGLISH".to_string()).map(String::as_str), Some("English"));
        assert_eq!(index.get(&"english".to_string()), Some(&vec![1, 2]));
    }

    #[test]
    fn test_structural_delete() {
        let mut index = IdentityIndex::new(case_insensitive());
        index.set("a".to_string(), 1);
        index.set("b".to_string(), 2);
        assert!(index.delete(&"A".to_string()));
        assert!(!index.has(&"a".to_string()));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_from_entries_later_wins() {
        let index = IdentityIndex::from_entries(
            vec![("x", 1), ("y", 2), ("x", 3)],
            Equality::strict(),
        );
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&"x"), Some(&3));
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut index: IdentityIndex<&str, Vec<i32>> = IdentityIndex::new(Equality::strict());
        index.get_or_insert_with("a", Vec::new).push(1);
        index.get_or_insert_with("a", Vec::new).push(2);
        assert_eq!(index.get(&"a"), Some(&vec![1, 2]));
    }

    #[test]
    fn test_retain_reindexes() {
        let mut index = IdentityIndex::new(Equality::strict());
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            index.set(key, i);
        }
        index.retain(|_, v| *v != 0);
        assert!(!index.has(&"a"));
        assert_eq!(index.get(&"b"), Some(&1));
        assert_eq!(index.get(&"c"), Some(&2));
    }

    #[test]
    fn test_iteration_is_insertion_ordered() {
        let mut index = IdentityIndex::new(Equality::strict());
        index.set(3, "c");
        index.set(1, "a");
        index.set(2, "b");
        let keys: Vec<_> = index.keys().copied().collect();
        assert_eq!(keys, vec![3, 1, 2]);
        index.clear();
        assert!(index.is_empty());
    }
}
