//! Flat association lists.

use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::error::Error;
use crate::flat::Flat;
use crate::vector::Vector;

/// A key-value entry.
#[repr(C)]
#[derive(Debug)]
pub struct Pair<K, V> {
    pub key: K,
    pub value: V,
}

unsafe impl<K: Flat, V: Flat> Flat for Pair<K, V> {}

/// A map stored as a flat vector of [`Pair`]s, searched linearly.
///
/// Sized by [`make_map`](crate::Arena::make_map) and filled entry by
/// entry; nothing enforces key uniqueness, lookups return the first
/// match. Derefs to the underlying [`Vector`] for positional access and
/// iteration.
#[repr(C)]
pub struct Map<K, V> {
    pub(crate) entries: Vector<Pair<K, V>>,
}

unsafe impl<K: Flat, V: Flat> Flat for Map<K, V> {}

impl<K: Flat, V: Flat> Map<K, V> {
    /// The value under the first entry whose key matches.
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: PartialEq<Q>,
    {
        self.entries.iter().find(|p| p.key == *key).map(|p| &p.value)
    }

    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: PartialEq<Q>,
    {
        self.entries
            .iter_mut()
            .find(|p| p.key == *key)
            .map(|p| &mut p.value)
    }

    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        K: PartialEq<Q>,
    {
        self.get(key).is_some()
    }

    /// Like [`get`](Map::get), but reports an absent key as out of bounds.
    pub fn try_get<Q: ?Sized>(&self, key: &Q) -> Result<&V, Error>
    where
        K: PartialEq<Q>,
    {
        let len = self.entries.len();
        self.get(key).ok_or(Error::OutOfBounds { index: len, len })
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|p| &p.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|p| &p.value)
    }
}

impl<K: Flat, V: Flat> Deref for Map<K, V> {
    type Target = Vector<Pair<K, V>>;

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl<K: Flat, V: Flat> DerefMut for Map<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entries
    }
}

impl<K: Flat + fmt::Debug, V: Flat + fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|p| (&p.key, &p.value)))
            .finish()
    }
}
