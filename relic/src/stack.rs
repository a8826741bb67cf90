//! Inline arenas with no heap allocation.

use core::mem::{size_of, MaybeUninit};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use crate::arena::Arena;
use crate::error::Error;
use crate::record::{Header, Record, MAX_CAPACITY};

/// An arena carrying its buffer inline: the root record plus `EXTRA`
/// reservoir bytes, no heap involved.
///
/// Because everything inside is self-relative, the whole arena can be
/// moved, embedded in another struct, or boxed, and its content stays
/// valid. Cloning one is a plain byte copy for the same reason.
#[repr(C, align(8))]
pub struct StackArena<T, const EXTRA: usize> {
    root: MaybeUninit<T>,
    reservoir: [u8; EXTRA],
}

impl<T: Record, const EXTRA: usize> StackArena<T, EXTRA> {
    pub fn new() -> Result<Self, Error> {
        let capacity = size_of::<T>() + EXTRA;
        if capacity > MAX_CAPACITY {
            return Err(Error::CapacityTooLarge {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        let mut this = StackArena {
            root: MaybeUninit::zeroed(),
            reservoir: [0; EXTRA],
        };
        unsafe {
            (*(this.root.as_mut_ptr() as *mut Header)).init(size_of::<T>() as u16, capacity as u16);
        }
        Ok(this)
    }
}

unsafe impl<T: Record, const EXTRA: usize> Arena for StackArena<T, EXTRA> {
    type Root = T;

    #[inline(always)]
    fn base(&self) -> NonNull<T> {
        unsafe { NonNull::new_unchecked(self.root.as_ptr() as *mut T) }
    }
}

impl<T: Record, const EXTRA: usize> Deref for StackArena<T, EXTRA> {
    type Target = T;

    fn deref(&self) -> &T {
        self.root()
    }
}

impl<T: Record, const EXTRA: usize> DerefMut for StackArena<T, EXTRA> {
    fn deref_mut(&mut self) -> &mut T {
        self.root_mut()
    }
}

impl<T: Record, const EXTRA: usize> Clone for StackArena<T, EXTRA> {
    /// A bitwise copy; self-relative content needs no fix-up.
    fn clone(&self) -> Self {
        unsafe { ptr::read(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Text;
    use crate::Flat;

    #[repr(C)]
    struct Tag {
        header: Header,
        name: Text,
    }
    unsafe impl Flat for Tag {}
    unsafe impl Record for Tag {}

    fn build() -> StackArena<Tag, 56> {
        let mut a = StackArena::<Tag, 56>::new().unwrap();
        a.set_text(|t| Ok(&mut t.name), "portable").unwrap();
        a
    }

    #[test]
    fn content_survives_a_move() {
        let a = build();
        assert_eq!(a.root().name, "portable");

        let moved = a;
        assert_eq!(moved.root().name, "portable");

        let boxed = Box::new(moved);
        assert_eq!(boxed.root().name, "portable");
    }

    #[test]
    fn clones_are_independent() {
        let a = build();
        let mut b = a.clone();
        b.set_text(|t| Ok(&mut t.name), "changed").unwrap();
        assert_eq!(a.root().name, "portable");
        assert_eq!(b.root().name, "changed");
    }

    #[test]
    fn capacity_spans_the_reservoir() {
        let a = StackArena::<Tag, 56>::new().unwrap();
        assert_eq!(a.root().capacity() as usize, size_of::<Tag>() + 56);
    }
}
