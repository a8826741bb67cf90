//! Types that may live inside an arena buffer.

/// Asserts that a value of this type can be stored directly in an arena
/// and survive a byte-for-byte relocation of the whole buffer.
///
/// # Safety
///
/// Implementors must guarantee all of the following:
///
/// * the layout is defined (`#[repr(C)]` or `#[repr(transparent)]`);
/// * every initialized bit pattern is a valid value; in particular an
///   all-zeroes value is valid, since the arena zero-fills allocations;
/// * the type contains no absolute pointers, references, or anything else
///   whose meaning depends on the buffer's base address (self-relative
///   [`RelPtr`](crate::RelPtr)s are fine, that is their whole point);
/// * the alignment is at most [`ARENA_ALIGN`](crate::ARENA_ALIGN);
/// * the type needs no drop glue.
pub unsafe trait Flat: Sized + 'static {}

macro_rules! primitive_impls {
    ( $( $t:ty, )* ) => {
        $(
            unsafe impl Flat for $t {}
        )*
    }
}

primitive_impls! {
    u8, u16, u32, u64,
    i8, i16, i32, i64,
    f32, f64,
}

unsafe impl<T: Flat, const N: usize> Flat for [T; N] {}
