//! The self-relative pointer primitive.

use core::fmt;
use core::marker::PhantomData;

use static_assertions::assert_eq_size;

use crate::flat::Flat;

/// A reference stored as a signed byte offset from its own address.
///
/// A `RelPtr` resolves to `address_of(self) + delta`, so a byte-for-byte
/// copy of the enclosing buffer leaves it pointing at the copied target;
/// no fix-up pass is ever needed. A delta of zero represents null, which
/// is also why a `RelPtr` can never designate itself.
///
/// `RelPtr` is deliberately neither `Clone` nor `Copy`: a duplicated
/// delta at a different address would refer to something else entirely.
/// Links are only ever created by the arena operations, which compute the
/// delta in place.
#[repr(transparent)]
pub struct RelPtr<T> {
    delta: i16,
    marker: PhantomData<fn() -> T>,
}

assert_eq_size!(RelPtr<u8>, i16);

impl<T: Flat> RelPtr<T> {
    /// Whether this reference is null.
    #[inline(always)]
    pub fn is_null(&self) -> bool {
        self.delta == 0
    }

    /// Resets this reference to null.
    #[inline]
    pub fn clear(&mut self) {
        self.delta = 0;
    }

    /// Resolves the reference, or `None` if it is null.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.delta == 0 {
            None
        } else {
            unsafe { Some(&*Self::resolve(self)) }
        }
    }

    /// Mutably resolves the reference, or `None` if it is null.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.delta == 0 {
            None
        } else {
            unsafe { Some(&mut *(Self::resolve(self) as *mut T)) }
        }
    }

    /// Points this reference at `target`.
    ///
    /// # Safety
    ///
    /// `target` must be a live, well-aligned `T` inside the same arena
    /// buffer as `self`, at a distance representable as a non-zero `i16`;
    /// both conditions hold for anything the enclosing arena allocated,
    /// since arena capacity is capped at [`MAX_CAPACITY`](crate::MAX_CAPACITY).
    pub unsafe fn set(&mut self, target: *const T) {
        Self::set_raw(self, target as *const u8)
    }

    // Resolution from a raw location; the caller has checked for null.
    #[inline(always)]
    pub(crate) unsafe fn resolve(this: *const Self) -> *const T {
        (this as *const u8).offset((*this).delta as isize) as *const T
    }

    pub(crate) unsafe fn set_raw(this: *mut Self, target: *const u8) {
        let delta = target as isize - this as isize;
        debug_assert!(delta != 0, "an entity may not reference itself");
        debug_assert!(
            delta >= i16::MIN as isize && delta <= i16::MAX as isize,
            "relative delta {} out of range",
            delta
        );
        (*this).delta = delta as i16;
    }

    pub(crate) unsafe fn clear_raw(this: *mut Self) {
        (*this).delta = 0;
    }

    /// The target's byte offset from `base`, read through a raw location.
    pub(crate) unsafe fn target_offset(this: *const Self, base: *const u8) -> Option<usize> {
        if (*this).delta == 0 {
            None
        } else {
            Some(Self::resolve(this) as usize - base as usize)
        }
    }
}

unsafe impl<T: Flat> Flat for RelPtr<T> {}

impl<T: Flat> fmt::Debug for RelPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_null() {
            f.write_str("RelPtr(null)")
        } else {
            write!(f, "RelPtr({:+})", self.delta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A RelPtr and its target moved together, as the arena guarantees.
    #[repr(C)]
    struct Pod {
        link: RelPtr<u32>,
        pad: u16,
        cell: u32,
    }

    #[test]
    fn set_get_roundtrip() {
        let mut pod = Pod {
            link: RelPtr { delta: 0, marker: PhantomData },
            pad: 0,
            cell: 0xdead_beef,
        };
        assert!(pod.link.is_null());
        assert_eq!(pod.link.get(), None);

        let target = &pod.cell as *const u32;
        unsafe { pod.link.set(target) };
        assert!(!pod.link.is_null());
        assert_eq!(pod.link.get(), Some(&0xdead_beef));

        pod.link.clear();
        assert_eq!(pod.link.get(), None);
    }

    #[test]
    fn survives_a_move() {
        let mut pod = Pod {
            link: RelPtr { delta: 0, marker: PhantomData },
            pad: 0,
            cell: 7,
        };
        unsafe { pod.link.set(&pod.cell) };

        let moved = pod;
        assert_eq!(moved.link.get(), Some(&7));
    }
}
