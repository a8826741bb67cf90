//! Singly-linked lists with self-relative links.

use core::fmt;

use static_assertions::assert_eq_size;

use crate::error::Error;
use crate::flat::Flat;
use crate::ptr::RelPtr;

/// A singly-linked list node; the head node is embedded in the record.
///
/// Each node carries the number of values reachable from it, a reference
/// to its own value, and a reference to the next node. An all-zeroes node
/// is the empty list. Nodes after the head live in the arena and are
/// created by [`make_list`](crate::Arena::make_list) and
/// [`list_push`](crate::Arena::list_push), which keep every node's count
/// consistent.
#[repr(C)]
pub struct List<T> {
    pub(crate) len: u16,
    pub(crate) value: RelPtr<T>,
    pub(crate) next: RelPtr<List<T>>,
}

assert_eq_size!(List<u8>, [u16; 3]);

unsafe impl<T: Flat> Flat for List<T> {}

impl<T: Flat> List<T> {
    /// Values reachable from this node, including its own.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// This node's value, or `None` for the empty list.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        self.value.get()
    }

    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.value.get_mut()
    }

    /// The next node, or `None` at the tail.
    #[inline]
    pub fn next(&self) -> Option<&List<T>> {
        self.next.get()
    }

    #[inline]
    pub fn next_mut(&mut self) -> Option<&mut List<T>> {
        self.next.get_mut()
    }

    /// The value `index` links down the chain.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.iter().nth(index)
    }

    pub fn try_at(&self, index: usize) -> Result<&T, Error> {
        let len = self.len();
        self.get(index).ok_or(Error::OutOfBounds { index, len })
    }

    pub fn iter(&self) -> Iter<T> {
        Iter { node: Some(self) }
    }

    /// Detaches the whole chain; the old nodes stay allocated.
    pub fn clear(&mut self) {
        self.len = 0;
        self.value.clear();
        self.next.clear();
    }
}

/// Iterator over a list's values, front to back.
pub struct Iter<'a, T> {
    node: Option<&'a List<T>>,
}

impl<'a, T: Flat> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.node.take()?;
        let value = node.value()?;
        self.node = node.next();
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.node.map_or(0, |n| n.len());
        (len, Some(len))
    }
}

impl<T: Flat + PartialEq> PartialEq for List<T> {
    /// Element-wise and positional; unequal lengths short-circuit.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}
impl<T: Flat + Eq> Eq for List<T> {}

impl<'a, T: Flat> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Flat + fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
