//! Fixed-capacity inline sequences.

use core::fmt;
use core::slice;

use crate::error::Error;
use crate::flat::Flat;

/// A sequence of up to `N` elements stored inline, no indirection.
///
/// The element storage is part of the struct itself, so an `Array` field
/// contributes its full `N`-element footprint to the record's fixed
/// layout. Use [`Vector`](crate::Vector) when the length is only known at
/// runtime.
///
/// An all-zeroes `Array` is empty; the enclosing arena's
/// [`make_array`](crate::Arena::make_array) allocates one with all `N`
/// slots live.
#[repr(C)]
pub struct Array<T, const N: usize> {
    pub(crate) len: u16,
    pub(crate) items: [T; N],
}

unsafe impl<T: Flat, const N: usize> Flat for Array<T, N> {}

impl<T: Flat, const N: usize> Array<T, N> {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len as usize]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items[..self.len as usize]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Like [`get`](Array::get), but reports the violated bound.
    pub fn try_at(&self, index: usize) -> Result<&T, Error> {
        let len = self.len();
        self.get(index).ok_or(Error::OutOfBounds { index, len })
    }

    pub fn try_at_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len();
        self.get_mut(index).ok_or(Error::OutOfBounds { index, len })
    }

    pub fn iter(&self) -> slice::Iter<T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<T> {
        self.as_mut_slice().iter_mut()
    }

    /// Marks every slot dead; the storage itself stays in place.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<T: Flat + PartialEq, const N: usize> PartialEq for Array<T, N> {
    /// Element-wise; unequal lengths short-circuit.
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}
impl<T: Flat + Eq, const N: usize> Eq for Array<T, N> {}

impl<'a, T: Flat, const N: usize> IntoIterator for &'a Array<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Flat + fmt::Debug, const N: usize> fmt::Debug for Array<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
