//! Heap-backed arenas.

use core::marker::PhantomData;
use core::mem::size_of;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;
use std::alloc::{self, Layout};

use crate::arena::Arena;
use crate::error::Error;
use crate::record::{Header, Record, ARENA_ALIGN, MAX_CAPACITY};

/// An arena owning a heap allocation of a chosen capacity.
///
/// The usual starting point: build a record here, then hand its
/// [`as_bytes`](Record::as_bytes) to whatever stores or ships it.
#[derive(Debug)]
pub struct HeapArena<T> {
    base: NonNull<T>,
    capacity: usize,
    marker: PhantomData<T>,
}

impl<T: Record> HeapArena<T> {
    /// Allocates a zeroed `capacity`-byte buffer and initializes a `T`
    /// at its start.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity > MAX_CAPACITY {
            return Err(Error::CapacityTooLarge {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        if capacity < size_of::<T>() {
            return Err(Error::BufferTooSmall {
                len: capacity,
                needed: size_of::<T>(),
            });
        }
        unsafe {
            // capacity is bounded above, the layout is always valid
            let layout = Layout::from_size_align_unchecked(capacity, ARENA_ALIGN);
            let ptr = alloc::alloc_zeroed(layout);
            if ptr.is_null() {
                alloc::handle_alloc_error(layout);
            }
            (*(ptr as *mut Header)).init(size_of::<T>() as u16, capacity as u16);
            Ok(HeapArena {
                base: NonNull::new_unchecked(ptr as *mut T),
                capacity,
                marker: PhantomData,
            })
        }
    }

    /// A new arena of `capacity` bytes holding a copy of `src`.
    pub fn new_copy(capacity: usize, src: &T) -> Result<Self, Error> {
        let mut this = Self::new(capacity)?;
        this.copy_from(src)?;
        Ok(this)
    }
}

unsafe impl<T: Record> Arena for HeapArena<T> {
    type Root = T;

    #[inline(always)]
    fn base(&self) -> NonNull<T> {
        self.base
    }
}

impl<T: Record> Deref for HeapArena<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.root()
    }
}

impl<T: Record> DerefMut for HeapArena<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.root_mut()
    }
}

impl<T> Drop for HeapArena<T> {
    fn drop(&mut self) {
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity, ARENA_ALIGN);
            alloc::dealloc(self.base.as_ptr() as *mut u8, layout);
        }
    }
}

// The buffer is exclusively owned and T is plain data.
unsafe impl<T: Record + Send> Send for HeapArena<T> {}
unsafe impl<T: Record + Sync> Sync for HeapArena<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Text;
    use crate::Flat;

    #[derive(Debug)]
    #[repr(C)]
    struct Note {
        header: Header,
        body: Text,
    }
    unsafe impl Flat for Note {}
    unsafe impl Record for Note {}

    #[test]
    fn rejects_oversized_capacity() {
        assert_eq!(
            HeapArena::<Note>::new(100_000).unwrap_err(),
            Error::CapacityTooLarge {
                requested: 100_000,
                max: MAX_CAPACITY,
            }
        );
    }

    #[test]
    fn rejects_undersized_capacity() {
        assert_eq!(
            HeapArena::<Note>::new(2).unwrap_err(),
            Error::BufferTooSmall {
                len: 2,
                needed: size_of::<Note>(),
            }
        );
    }

    #[test]
    fn new_copy_clones_content() {
        let mut src = HeapArena::<Note>::new(64).unwrap();
        src.set_text(|n| Ok(&mut n.body), "carried over").unwrap();

        let dst = HeapArena::new_copy(128, src.root()).unwrap();
        assert_eq!(dst.root().body, "carried over");
        assert_eq!(dst.root().capacity(), 128);

        assert_eq!(
            HeapArena::new_copy(size_of::<Note>(), src.root()).unwrap_err(),
            Error::DestinationTooSmall {
                used: src.root().used(),
                capacity: size_of::<Note>() as u16,
            }
        );
    }
}
