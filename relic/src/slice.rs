//! Arenas over caller-provided byte buffers.

use core::marker::PhantomData;
use core::mem::size_of;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;

use crate::arena::Arena;
use crate::error::Error;
use crate::record::{Header, Record, ARENA_ALIGN, MAX_CAPACITY};

/// An arena borrowing a caller-provided byte buffer.
///
/// Used to build a record directly inside a frame, a shared-memory
/// segment, or a memory-mapped file. The buffer must be aligned to
/// [`ARENA_ALIGN`]; capacities beyond [`MAX_CAPACITY`] are clamped, the
/// excess bytes are simply never used.
#[derive(Debug)]
pub struct SliceArena<'a, T> {
    base: NonNull<T>,
    marker: PhantomData<&'a mut [u8]>,
}

impl<'a, T: Record> SliceArena<'a, T> {
    /// Initializes a fresh `T` at the start of `bytes`.
    pub fn emplace(bytes: &'a mut [u8]) -> Result<Self, Error> {
        if bytes.as_ptr() as usize % ARENA_ALIGN != 0 {
            return Err(Error::Misaligned { align: ARENA_ALIGN });
        }
        if bytes.len() < size_of::<T>() {
            return Err(Error::BufferTooSmall {
                len: bytes.len(),
                needed: size_of::<T>(),
            });
        }
        let capacity = bytes.len().min(MAX_CAPACITY);
        for b in bytes[..size_of::<T>()].iter_mut() {
            *b = 0;
        }
        let base = bytes.as_mut_ptr() as *mut T;
        unsafe {
            (*(base as *mut Header)).init(size_of::<T>() as u16, capacity as u16);
            Ok(SliceArena {
                base: NonNull::new_unchecked(base),
                marker: PhantomData,
            })
        }
    }

    /// Resumes building on a buffer that already holds a `T`.
    ///
    /// # Safety
    ///
    /// Same contract as [`Record::view_mut`]: the caller asserts that
    /// `bytes` starts with a record previously written by this schema.
    /// Checked here: length, alignment, and that the recorded capacity
    /// fits the buffer.
    pub unsafe fn adopt(bytes: &'a mut [u8]) -> Result<Self, Error> {
        let len = bytes.len();
        let root = T::view_mut(bytes)?;
        let capacity = root.capacity() as usize;
        if capacity > len {
            return Err(Error::BufferTooSmall { len, needed: capacity });
        }
        Ok(SliceArena {
            base: NonNull::from(root),
            marker: PhantomData,
        })
    }
}

impl<'a, T: Record> Deref for SliceArena<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.root()
    }
}

impl<'a, T: Record> DerefMut for SliceArena<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.root_mut()
    }
}

unsafe impl<'a, T: Record> Arena for SliceArena<'a, T> {
    type Root = T;

    #[inline(always)]
    fn base(&self) -> NonNull<T> {
        self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Text;
    use crate::Flat;

    #[derive(Debug)]
    #[repr(C)]
    struct Tag {
        header: Header,
        name: Text,
    }
    unsafe impl Flat for Tag {}
    unsafe impl Record for Tag {}

    #[repr(C, align(8))]
    struct Buffer<const N: usize>([u8; N]);

    #[test]
    fn emplace_build_and_reread() {
        let mut buf = Buffer([0xaau8; 64]);
        {
            let mut a = SliceArena::<Tag>::emplace(&mut buf.0).unwrap();
            a.set_text(|t| Ok(&mut t.name), "in place").unwrap();
        }
        let tag = unsafe { Tag::view(&buf.0).unwrap() };
        assert_eq!(tag.name, "in place");
        assert_eq!(tag.capacity(), 64);
    }

    #[test]
    fn adopt_continues_allocating() {
        let mut buf = Buffer([0u8; 64]);
        {
            let mut a = SliceArena::<Tag>::emplace(&mut buf.0).unwrap();
            a.set_text(|t| Ok(&mut t.name), "first").unwrap();
        }
        {
            let mut a = unsafe { SliceArena::<Tag>::adopt(&mut buf.0).unwrap() };
            assert_eq!(a.root().name, "first");
            a.set_text(|t| Ok(&mut t.name), "second").unwrap();
        }
        let tag = unsafe { Tag::view(&buf.0).unwrap() };
        assert_eq!(tag.name, "second");
    }

    #[test]
    fn rejects_a_short_buffer() {
        let mut buf = Buffer([0u8; 4]);
        assert_eq!(
            SliceArena::<Tag>::emplace(&mut buf.0).unwrap_err(),
            Error::BufferTooSmall {
                len: 4,
                needed: size_of::<Tag>(),
            }
        );
    }

    #[test]
    fn rejects_a_misaligned_buffer() {
        let mut buf = Buffer([0u8; 64]);
        assert_eq!(
            SliceArena::<Tag>::emplace(&mut buf.0[1..]).unwrap_err(),
            Error::Misaligned { align: ARENA_ALIGN },
        );
    }
}
