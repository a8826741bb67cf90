//! Length-prefixed out-of-line sequences.

use core::fmt;
use core::slice;

use static_assertions::assert_eq_size;

use crate::error::Error;
use crate::flat::Flat;
use crate::ptr::RelPtr;

/// A fixed-length sequence of `T` stored out of line in the arena.
///
/// The field itself is four bytes: a length and a self-relative reference
/// to the first element. Elements are contiguous. The length is fixed at
/// allocation time by [`make_vec`](crate::Arena::make_vec); all elements
/// start zeroed and are filled in place afterwards.
#[repr(C)]
pub struct Vector<T> {
    pub(crate) len: u16,
    pub(crate) data: RelPtr<T>,
}

assert_eq_size!(Vector<u8>, u32);

unsafe impl<T: Flat> Flat for Vector<T> {}

impl<T: Flat> Vector<T> {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self.data.get() {
            None => &[],
            Some(first) => unsafe { slice::from_raw_parts(first, self.len as usize) },
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len as usize;
        match self.data.get_mut() {
            None => &mut [],
            Some(first) => unsafe { slice::from_raw_parts_mut(first, len) },
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Like [`get`](Vector::get), but reports the violated bound.
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

    /// Resets to the empty vector; the old elements stay allocated.
    pub fn clear(&mut self) {
        self.len = 0;
        self.data.clear();
    }
}

impl<T: Flat + PartialEq> PartialEq for Vector<T> {
    /// Element-wise; unequal lengths short-circuit.
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}
impl<T: Flat + Eq> Eq for Vector<T> {}

impl<'a, T: Flat> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Flat + fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
