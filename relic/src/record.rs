//! Record headers, schema probing, and zero-copy views.

use core::mem::{align_of, size_of};
use core::slice;

use static_assertions::assert_eq_size;

use crate::error::Error;
use crate::flat::Flat;

/// Alignment required of every arena base address.
///
/// Because allocations are aligned relative to the base, two bases with
/// the same alignment see identical layouts, which is what lets a raw
/// byte copy relocate a record. Eight covers every [`Flat`] type.
pub const ARENA_ALIGN: usize = 8;

/// The largest usable arena capacity, in bytes.
///
/// Self-relative deltas are stored as `i16`, so the distance between a
/// reference and its target must stay below `i16::MAX`. Capping the whole
/// buffer at that size makes every in-buffer delta representable.
pub const MAX_CAPACITY: usize = i16::MAX as usize;

/// The arena header living at offset 0 of every record.
///
/// `declared_size` is the size of the schema revision the writer was
/// compiled against, `used` the bytes consumed so far, `capacity` the
/// total buffer size. `declared_size <= used <= capacity` holds at all
/// times; `capacity` never changes after construction, not even when the
/// record is overwritten by a copy.
#[repr(C)]
#[derive(Debug)]
pub struct Header {
    declared_size: u16,
    capacity: u16,
    used: u16,
}

assert_eq_size!(Header, [u16; 3]);

impl Header {
    #[inline(always)]
    pub fn declared_size(&self) -> u16 {
        self.declared_size
    }

    #[inline(always)]
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    #[inline(always)]
    pub fn used(&self) -> u16 {
        self.used
    }

    pub(crate) fn init(&mut self, declared_size: u16, capacity: u16) {
        self.declared_size = declared_size;
        self.used = declared_size;
        self.capacity = capacity;
    }

    pub(crate) fn set_used(&mut self, used: u16) {
        debug_assert!(self.declared_size <= used && used <= self.capacity);
        self.used = used;
    }

    pub(crate) fn set_capacity(&mut self, capacity: u16) {
        self.capacity = capacity;
    }
}

unsafe impl Flat for Header {}

/// A relocatable record: a fixed-field region introduced by a [`Header`],
/// plus arena-allocated content behind self-relative references.
///
/// Record schemas evolve by appending fields only. A reader compiled
/// against a newer revision probes [`has_field`](Record::has_field)
/// before touching fields an older writer may not have declared.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]` with a [`Header`] as their first
/// field, and must uphold the [`Flat`] contract. The
/// [`relic-derive`](https://docs.rs/relic-derive) crate checks both
/// requirements at derive time.
pub unsafe trait Record: Flat {
    #[inline(always)]
    fn header(&self) -> &Header {
        unsafe { &*(self as *const Self as *const Header) }
    }

    #[inline(always)]
    fn declared_size(&self) -> u16 {
        self.header().declared_size()
    }

    #[inline(always)]
    fn capacity(&self) -> u16 {
        self.header().capacity()
    }

    #[inline(always)]
    fn used(&self) -> u16 {
        self.header().used()
    }

    /// Bytes still available for allocation.
    #[inline]
    fn remaining(&self) -> usize {
        (self.capacity() - self.used()) as usize
    }

    /// Whether the revision that populated this record declared `member`.
    ///
    /// `member` must be a field of `self` (or of a struct embedded in
    /// it); the probe compares the field's byte span against the writer's
    /// `declared_size`.
    fn has_field<M: Flat>(&self, member: &M) -> bool {
        let base = self as *const Self as usize;
        let addr = member as *const M as usize;
        debug_assert!(
            addr >= base && addr + size_of::<M>() <= base + size_of::<Self>(),
            "has_field probe outside the record's fixed-field region"
        );
        addr - base + size_of::<M>() <= self.declared_size() as usize
    }

    /// The used region of the buffer.
    ///
    /// Persistence collaborators write exactly these bytes; reading them
    /// back at any [`ARENA_ALIGN`]ed address reproduces the record.
    fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self as *const Self as *const u8, self.used() as usize) }
    }

    /// Typed read at a byte offset within the used region.
    ///
    /// Returns `None` when the span falls outside the used region or the
    /// resulting address is misaligned for `U`.
    fn field_at<U: Flat>(&self, offset: usize) -> Option<&U> {
        if offset + size_of::<U>() > self.used() as usize {
            return None;
        }
        let addr = self as *const Self as usize + offset;
        if addr % align_of::<U>() != 0 {
            return None;
        }
        Some(unsafe { &*(addr as *const U) })
    }

    /// Reinterprets foreign bytes as a record of this type.
    ///
    /// `bytes` must cover at least `size_of::<Self>()`: a `&Self` spans
    /// the whole fixed-field region, even the fields an older writer
    /// never declared. Bytes written by a shorter revision are viewed by
    /// first relocating them into a buffer of at least the current size
    /// (a zeroed buffer plus [`copy_from`](crate::Arena::copy_from), or
    /// a copy into the tail-padded buffer directly); probing the
    /// undeclared fields with [`has_field`](Record::has_field) is then
    /// what keeps reads honest.
    ///
    /// # Safety
    ///
    /// The caller asserts that `bytes` holds the used region of a record
    /// written by this schema (or an earlier revision of it), i.e. that
    /// every self-relative reference inside resolves within `bytes` and
    /// all `Text` content is valid UTF-8. Checked here: length and
    /// alignment only.
    unsafe fn view(bytes: &[u8]) -> Result<&Self, Error> {
        if bytes.len() < size_of::<Self>() {
            return Err(Error::BufferTooSmall { len: bytes.len(), needed: size_of::<Self>() });
        }
        if bytes.as_ptr() as usize % ARENA_ALIGN != 0 {
            return Err(Error::Misaligned { align: ARENA_ALIGN });
        }
        Ok(&*(bytes.as_ptr() as *const Self))
    }

    /// Mutable counterpart of [`view`](Record::view); same contract, and
    /// the caller must additionally own the bytes exclusively.
    unsafe fn view_mut(bytes: &mut [u8]) -> Result<&mut Self, Error> {
        if bytes.len() < size_of::<Self>() {
            return Err(Error::BufferTooSmall { len: bytes.len(), needed: size_of::<Self>() });
        }
        if bytes.as_ptr() as usize % ARENA_ALIGN != 0 {
            return Err(Error::Misaligned { align: ARENA_ALIGN });
        }
        Ok(&mut *(bytes.as_mut_ptr() as *mut Self))
    }
}
