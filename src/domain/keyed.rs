//! Identity keys and key-deduplicated collections.
//!
//! Entities in the catalog are identified by a key rather than by their full
//! contents (a course by its code, a student by their id, and so on). The
//! [`Keyed`] trait extracts that key, and [`KeyedSet`] uses it to keep an
//! insertion-ordered collection free of duplicates.

use std::{collections::BTreeMap, fmt, sync::Arc};

/// An entity with an identity key.
pub trait Keyed {
    /// The identity of the entity.
    type Key: Ord + Clone + fmt::Debug;

    /// Extracts the identity key.
    fn key(&self) -> Self::Key;
}

impl<T: Keyed + ?Sized> Keyed for Arc<T> {
    type Key = T::Key;

    fn key(&self) -> Self::Key {
        T::key(self)
    }
}

/// An insertion-ordered collection that holds at most one item per key.
///
/// Inserting an item whose key is already present is a no-op.
#[derive(Debug, Clone)]
pub struct KeyedSet<T: Keyed> {
    items: Vec<T>,
    index: BTreeMap<T::Key, usize>,
}

impl<T: Keyed> Default for KeyedSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: BTreeMap::new(),
        }
    }
}

impl<T: Keyed> KeyedSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an item unless one with the same key is already present.
    ///
    /// Returns `true` if the item was added.
    pub fn insert(&mut self, item: T) -> bool {
        let key = item.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.items.len());
        self.items.push(item);
        true
    }

    /// Returns `true` if an item with the same key as `item` is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.index.contains_key(&item.key())
    }

    /// Returns `true` if an item with the given key is present.
    #[must_use]
    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up an item by key.
    #[must_use]
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    /// The insertion position of the item with the given key.
    #[must_use]
    pub fn position(&self, key: &T::Key) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Iterates over the items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The items in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// The number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the set holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the set, returning the items in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Keyed> FromIterator<T> for KeyedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Keyed> Extend<T> for KeyedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<'a, T: Keyed> IntoIterator for &'a KeyedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Keyed> IntoIterator for KeyedSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
