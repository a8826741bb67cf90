//! The bump allocator and structure-building operations.

use core::mem::{align_of, size_of};
use core::ptr::{self, NonNull};

use crate::array::Array;
use crate::error::Error;
use crate::flat::Flat;
use crate::list::List;
use crate::map::Map;
use crate::ptr::RelPtr;
use crate::record::{Header, Record, ARENA_ALIGN};
use crate::text::{Text, WideText};
use crate::vector::Vector;

/// Computes the delta for the reference at `base + field` so that it
/// designates `base + target`.
unsafe fn link<T: Flat>(base: *mut u8, field: usize, target: usize) {
    RelPtr::<T>::set_raw(base.add(field) as *mut RelPtr<T>, base.add(target));
}

/// An owner of one contiguous buffer holding a root [`Record`] followed
/// by its bump-allocated content.
///
/// Implementors only supply [`base`](Arena::base); every operation is
/// provided on top of it. Fields are designated by projection closures
/// running against the root, so the same building code works unchanged
/// over a heap, stack, or borrowed-slice arena.
///
/// Allocation only ever moves forward. Freed content is never reclaimed;
/// the expected lifecycle is build once, relocate and read many times.
///
/// Every operation that allocates is total: on failure the designated
/// field is left exactly as it was, because the field is linked only
/// after all allocations have succeeded.
///
/// # Safety
///
/// Implementors must guarantee that `base` points to the start of a
/// buffer that is aligned to [`ARENA_ALIGN`], exclusively owned by
/// `self`, at least `capacity` bytes long, and fronted by an initialized
/// `Root` whose [`Header`] capacity equals the usable buffer size. The
/// buffer must not move while the arena handle exists (self-relative
/// content makes a *copy* of the whole handle-plus-buffer fine, as
/// [`StackArena`](crate::StackArena) relies on).
pub unsafe trait Arena {
    type Root: Record;

    /// The buffer's base address, which is also the root record.
    fn base(&self) -> NonNull<Self::Root>;

    #[inline(always)]
    fn root(&self) -> &Self::Root {
        unsafe { &*self.base().as_ptr() }
    }

    #[inline(always)]
    fn root_mut(&mut self) -> &mut Self::Root {
        unsafe { &mut *self.base().as_ptr() }
    }

    /// Reserves zeroed storage for `count` values of `U`, returning its
    /// byte offset from the base.
    ///
    /// The cursor is aligned up for `U` first; the skipped padding is
    /// zeroed too, so the used region never exposes stale bytes.
    fn alloc<U: Flat>(&mut self, count: usize) -> Result<u16, Error> {
        let size = size_of::<U>().checked_mul(count).unwrap_or(usize::MAX);
        self.alloc_bytes(size, align_of::<U>())
    }

    /// Untyped form of [`alloc`](Arena::alloc).
    fn alloc_bytes(&mut self, size: usize, align: usize) -> Result<u16, Error> {
        if size == 0 {
            return Err(Error::ZeroSized);
        }
        debug_assert!(align.is_power_of_two() && align <= ARENA_ALIGN);
        let header = self.root().header();
        let used = header.used() as usize;
        let capacity = header.capacity() as usize;
        let start = (used + align - 1) & !(align - 1);
        let end = match start.checked_add(size) {
            Some(end) if end <= capacity => end,
            _ => {
                return Err(Error::OutOfSpace {
                    needed: size,
                    remaining: capacity - used,
                })
            }
        };
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            ptr::write_bytes(base.add(used), 0, end - used);
            (*(base as *mut Header)).set_used(end as u16);
        }
        Ok(start as u16)
    }

    /// The byte offset of the field `proj` designates.
    ///
    /// The offset is stable across relocation, so it can be fed to
    /// [`Record::field_at`] against any copy of the record.
    ///
    /// A projection that reaches outside this arena's buffer, such as a
    /// field borrowed from a different leaked record, is rejected with
    /// [`Error::ForeignField`]; every link the arena writes is therefore
    /// confined to its own bytes.
    fn offset_of<F, P>(&mut self, proj: P) -> Result<usize, Error>
    where
        F: Flat,
        P: FnOnce(&mut Self::Root) -> Result<&mut F, Error>,
    {
        let base = self.base().as_ptr() as usize;
        let capacity = self.root().capacity() as usize;
        let field = proj(self.root_mut())? as *mut F as usize;
        if field < base || field + size_of::<F>() > base + capacity {
            return Err(Error::ForeignField);
        }
        Ok(field - base)
    }

    /// Allocates `content` as NUL-terminated bytes and points the
    /// designated [`Text`] field at them.
    fn set_text<P>(&mut self, proj: P, content: &str) -> Result<(), Error>
    where
        P: FnOnce(&mut Self::Root) -> Result<&mut Text, Error>,
    {
        let field = self.offset_of(proj)?;
        let off = self.alloc::<u8>(content.len() + 1)? as usize;
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            ptr::copy_nonoverlapping(content.as_ptr(), base.add(off), content.len());
            // the terminator is already zero
            link::<u8>(base, field, off);
        }
        Ok(())
    }

    /// Allocates `content` as NUL-terminated `u32` scalar values and
    /// points the designated [`WideText`] field at them.
    fn set_wide_text<P>(&mut self, proj: P, content: &str) -> Result<(), Error>
    where
        P: FnOnce(&mut Self::Root) -> Result<&mut WideText, Error>,
    {
        let field = self.offset_of(proj)?;
        let units: Vec<u32> = content.chars().map(|c| c as u32).collect();
        let off = self.alloc::<u32>(units.len() + 1)? as usize;
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            ptr::copy_nonoverlapping(units.as_ptr(), base.add(off) as *mut u32, units.len());
            link::<u32>(base, field, off);
        }
        Ok(())
    }

    /// Points one [`Text`] field at another's bytes, allocating nothing.
    ///
    /// An aliased string is shared storage; both fields keep resolving to
    /// the same bytes in every copy of the record.
    fn alias_text<D, S>(&mut self, dst: D, src: S) -> Result<(), Error>
    where
        D: FnOnce(&mut Self::Root) -> Result<&mut Text, Error>,
        S: FnOnce(&Self::Root) -> Result<&Text, Error>,
    {
        let target = {
            let base = self.base().as_ptr() as usize;
            let capacity = self.root().capacity() as usize;
            let text = src(self.root())?;
            let addr = text as *const Text as usize;
            if addr < base || addr + size_of::<Text>() > base + capacity {
                return Err(Error::ForeignField);
            }
            unsafe { RelPtr::<u8>::target_offset(&text.data, base as *const u8) }
        };
        let field = self.offset_of(dst)?;
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            let data = base.add(field) as *mut RelPtr<u8>;
            match target {
                Some(off) => RelPtr::set_raw(data, base.add(off)),
                None => RelPtr::clear_raw(data),
            }
        }
        Ok(())
    }

    /// Reserves `count` nested records, initializing each one's header,
    /// and returns the byte offset of the first.
    ///
    /// A nested record's header declares its full fixed size; it cannot
    /// allocate for itself, its out-of-line content lives in this arena.
    fn create<U: Record>(&mut self, count: usize) -> Result<u16, Error> {
        let off = self.alloc::<U>(count)?;
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            let size = size_of::<U>() as u16;
            for i in 0..count {
                let header = base.add(off as usize + i * size_of::<U>()) as *mut Header;
                (*header).init(size, size);
            }
        }
        Ok(off)
    }

    /// Allocates a nested record and points the designated reference at
    /// it.
    fn make_rec<U, P>(&mut self, proj: P) -> Result<(), Error>
    where
        U: Record,
        P: FnOnce(&mut Self::Root) -> Result<&mut RelPtr<U>, Error>,
    {
        let field = self.offset_of(proj)?;
        let off = self.create::<U>(1)? as usize;
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            link::<U>(base, field, off);
        }
        Ok(())
    }

    /// Allocates `len` zeroed elements and sizes the designated
    /// [`Vector`] over them.
    fn make_vec<U, P>(&mut self, proj: P, len: usize) -> Result<(), Error>
    where
        U: Flat,
        P: FnOnce(&mut Self::Root) -> Result<&mut Vector<U>, Error>,
    {
        let field = self.offset_of(proj)?;
        if len == 0 {
            unsafe {
                let base = self.base().as_ptr() as *mut u8;
                ptr::write(base.add(field) as *mut u16, 0);
                RelPtr::<U>::clear_raw(base.add(field + 2) as *mut RelPtr<U>);
            }
            return Ok(());
        }
        let data = self.alloc::<U>(len)? as usize;
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            ptr::write(base.add(field) as *mut u16, len as u16);
            link::<U>(base, field + 2, data);
        }
        Ok(())
    }

    /// Sizes the designated [`Map`] for `len` zeroed entries.
    fn make_map<K, V, P>(&mut self, proj: P, len: usize) -> Result<(), Error>
    where
        K: Flat,
        V: Flat,
        P: FnOnce(&mut Self::Root) -> Result<&mut Map<K, V>, Error>,
    {
        self.make_vec(move |root| Ok(&mut proj(root)?.entries), len)
    }

    /// Allocates an [`Array`] with all `N` slots live and points the
    /// designated reference at it.
    fn make_array<U, P, const N: usize>(&mut self, proj: P) -> Result<(), Error>
    where
        U: Flat,
        P: FnOnce(&mut Self::Root) -> Result<&mut RelPtr<Array<U, N>>, Error>,
    {
        let field = self.offset_of(proj)?;
        let off = self.alloc::<Array<U, N>>(1)? as usize;
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            ptr::write(base.add(off) as *mut u16, N as u16);
            link::<Array<U, N>>(base, field, off);
        }
        Ok(())
    }

    /// Builds a chain of `len` zeroed values on the designated [`List`]
    /// head.
    ///
    /// The head node is the field itself; `len - 1` further nodes go to
    /// the arena. All allocation happens before the head is touched, so a
    /// failure leaves the field as it was.
    fn make_list<U, P>(&mut self, proj: P, len: usize) -> Result<(), Error>
    where
        U: Flat,
        P: FnOnce(&mut Self::Root) -> Result<&mut List<U>, Error>,
    {
        let field = self.offset_of(proj)?;
        if len == 0 {
            unsafe {
                let base = self.base().as_ptr() as *mut u8;
                ptr::write(base.add(field) as *mut u16, 0);
                RelPtr::<U>::clear_raw(base.add(field + 2) as *mut RelPtr<U>);
                RelPtr::<List<U>>::clear_raw(base.add(field + 4) as *mut RelPtr<List<U>>);
            }
            return Ok(());
        }
        let head_value = self.alloc::<U>(1)? as usize;
        let mut tail = Vec::with_capacity(len - 1);
        for _ in 1..len {
            let node = self.alloc::<List<U>>(1)? as usize;
            let value = self.alloc::<U>(1)? as usize;
            tail.push((node, value));
        }
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            for (i, &(node, value)) in tail.iter().enumerate() {
                ptr::write(base.add(node) as *mut u16, (len - 1 - i) as u16);
                link::<U>(base, node + 2, value);
                if let Some(&(next, _)) = tail.get(i + 1) {
                    link::<List<U>>(base, node + 4, next);
                }
            }
            ptr::write(base.add(field) as *mut u16, len as u16);
            link::<U>(base, field + 2, head_value);
            match tail.first() {
                Some(&(node, _)) => link::<List<U>>(base, field + 4, node),
                None => RelPtr::<List<U>>::clear_raw(base.add(field + 4) as *mut RelPtr<List<U>>),
            }
        }
        Ok(())
    }

    /// Appends `value` to the designated [`List`], bumping the count of
    /// every node on the way to the tail.
    fn list_push<U, P>(&mut self, proj: P, value: U) -> Result<(), Error>
    where
        U: Flat,
        P: FnOnce(&mut Self::Root) -> Result<&mut List<U>, Error>,
    {
        let field = self.offset_of(proj)?;
        let mut path = Vec::with_capacity(8);
        let mut tail = field;
        let tail_empty;
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            loop {
                path.push(tail);
                let next = base.add(tail + 4) as *const RelPtr<List<U>>;
                match RelPtr::<List<U>>::target_offset(next, base) {
                    Some(off) => tail = off,
                    None => break,
                }
            }
            tail_empty = (*(base.add(tail + 2) as *const RelPtr<U>)).is_null();
        }
        if tail_empty {
            // the empty head gets its first value in place
            let slot = self.alloc::<U>(1)? as usize;
            unsafe {
                let base = self.base().as_ptr() as *mut u8;
                ptr::write(base.add(slot) as *mut U, value);
                link::<U>(base, tail + 2, slot);
                for &node in &path {
                    let count = base.add(node) as *mut u16;
                    ptr::write(count, ptr::read(count) + 1);
                }
            }
        } else {
            let node = self.alloc::<List<U>>(1)? as usize;
            let slot = self.alloc::<U>(1)? as usize;
            unsafe {
                let base = self.base().as_ptr() as *mut u8;
                ptr::write(base.add(slot) as *mut U, value);
                ptr::write(base.add(node) as *mut u16, 1);
                link::<U>(base, node + 2, slot);
                link::<List<U>>(base, tail + 4, node);
                for &n in &path {
                    let count = base.add(n) as *mut u16;
                    ptr::write(count, ptr::read(count) + 1);
                }
            }
        }
        Ok(())
    }

    /// Overwrites this arena's content with a byte-for-byte copy of
    /// `src`, preserving this arena's capacity.
    ///
    /// Only `src`'s used region is copied. Fails without writing anything
    /// when it does not fit.
    fn copy_from(&mut self, src: &Self::Root) -> Result<(), Error> {
        let used = src.used();
        let capacity = self.root().capacity();
        if used > capacity {
            return Err(Error::DestinationTooSmall { used, capacity });
        }
        unsafe {
            let base = self.base().as_ptr() as *mut u8;
            ptr::copy_nonoverlapping(src as *const Self::Root as *const u8, base, used as usize);
            (*(base as *mut Header)).set_capacity(capacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::HeapArena;

    #[repr(C)]
    struct Rec {
        header: Header,
        label: Text,
        wide: WideText,
        nums: Vector<u32>,
        chain: List<u16>,
        dict: Map<Text, i32>,
        block: RelPtr<Array<u64, 4>>,
    }

    unsafe impl Flat for Rec {}
    unsafe impl Record for Rec {}

    fn arena() -> HeapArena<Rec> {
        HeapArena::new(512).unwrap()
    }

    #[test]
    fn fresh_root_is_empty() {
        let a = arena();
        let rec = a.root();
        assert_eq!(rec.declared_size() as usize, size_of::<Rec>());
        assert_eq!(rec.used() as usize, size_of::<Rec>());
        assert_eq!(rec.capacity(), 512);
        assert_eq!(rec.label, "");
        assert!(rec.nums.is_empty());
        assert!(rec.chain.is_empty());
    }

    #[test]
    fn alloc_zero_is_an_error() {
        let mut a = arena();
        assert_eq!(a.alloc::<u32>(0), Err(Error::ZeroSized));
    }

    #[test]
    fn alloc_aligns_and_advances() {
        let mut a = arena();
        let before = a.root().used() as usize;
        a.alloc::<u8>(1).unwrap();
        let off = a.alloc::<u64>(1).unwrap() as usize;
        assert_eq!(off % align_of::<u64>(), 0);
        assert!(a.root().used() as usize > before);
    }

    #[test]
    fn alloc_reports_exhaustion() {
        let mut a = arena();
        let err = a.alloc::<u8>(4096).unwrap_err();
        match err {
            Error::OutOfSpace { needed, remaining } => {
                assert_eq!(needed, 4096);
                assert!(remaining < 4096);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // a failed allocation consumes nothing
        let used = a.root().used();
        assert!(a.alloc::<u8>(4096).is_err());
        assert_eq!(a.root().used(), used);
    }

    #[test]
    fn text_roundtrip() {
        let mut a = arena();
        a.set_text(|r| Ok(&mut r.label), "hello").unwrap();
        assert_eq!(a.root().label, "hello");
        assert_eq!(a.root().label.len(), 5);
    }

    #[test]
    fn empty_text() {
        let mut a = arena();
        a.set_text(|r| Ok(&mut r.label), "").unwrap();
        assert_eq!(a.root().label, "");
        assert!(!a.root().label.data.is_null());
    }

    #[test]
    fn wide_text_roundtrip() {
        let mut a = arena();
        a.set_wide_text(|r| Ok(&mut r.wide), "héllo").unwrap();
        assert_eq!(a.root().wide.len(), 5);
        assert!(a.root().wide == *"héllo");
    }

    #[test]
    fn vector_fill_and_read() {
        let mut a = arena();
        a.make_vec(|r| Ok(&mut r.nums), 3).unwrap();
        for (i, n) in a.root_mut().nums.iter_mut().enumerate() {
            *n = (i as u32 + 1) * 10;
        }
        let rec = a.root();
        assert_eq!(rec.nums.len(), 3);
        assert_eq!(rec.nums.get(1), Some(&20));
        assert_eq!(rec.nums.get(3), None);
        assert_eq!(
            rec.nums.try_at(7),
            Err(Error::OutOfBounds { index: 7, len: 3 })
        );
    }

    #[test]
    fn empty_vector() {
        let mut a = arena();
        let used = a.root().used();
        a.make_vec(|r| Ok(&mut r.nums), 0).unwrap();
        assert_eq!(a.root().used(), used);
        assert!(a.root().nums.is_empty());
        assert!(a.root().nums.as_slice().is_empty());
    }

    #[test]
    fn list_build_and_push() {
        let mut a = arena();
        a.make_list(|r| Ok(&mut r.chain), 2).unwrap();
        *a.root_mut().chain.value_mut().unwrap() = 10;
        *a.root_mut().chain.next_mut().unwrap().value_mut().unwrap() = 20;
        a.list_push(|r| Ok(&mut r.chain), 30).unwrap();

        let chain = &a.root().chain;
        assert_eq!(chain.len(), 3);
        let values: Vec<u16> = chain.iter().copied().collect();
        assert_eq!(values, [10, 20, 30]);
        // every node counts what is reachable from it
        assert_eq!(chain.next().unwrap().len(), 2);
        assert_eq!(chain.next().unwrap().next().unwrap().len(), 1);
    }

    #[test]
    fn push_onto_empty_list() {
        let mut a = arena();
        a.list_push(|r| Ok(&mut r.chain), 7).unwrap();
        a.list_push(|r| Ok(&mut r.chain), 8).unwrap();
        let values: Vec<u16> = a.root().chain.iter().copied().collect();
        assert_eq!(values, [7, 8]);
    }

    #[test]
    fn failed_push_leaves_list_unchanged() {
        let mut a = HeapArena::<Rec>::new(size_of::<Rec>() + 16).unwrap();
        a.list_push(|r| Ok(&mut r.chain), 1).unwrap();
        loop {
            let before: Vec<u16> = a.root().chain.iter().copied().collect();
            match a.list_push(|r| Ok(&mut r.chain), 9) {
                Ok(()) => continue,
                Err(Error::OutOfSpace { .. }) => {
                    let after: Vec<u16> = a.root().chain.iter().copied().collect();
                    assert_eq!(before, after);
                    assert_eq!(a.root().chain.len(), after.len());
                    break;
                }
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn rejects_a_field_from_another_arena() {
        let mut a = arena();
        let foreign: &'static mut Text = &mut Box::leak(Box::new(arena())).root_mut().label;
        let err = a.set_text(move |_| Ok(foreign), "nope").unwrap_err();
        assert_eq!(err, Error::ForeignField);
        assert_eq!(a.root().label, "");
        assert_eq!(a.root().used() as usize, size_of::<Rec>());
    }

    #[test]
    fn rejects_aliasing_a_foreign_text() {
        let mut a = arena();
        let mut other = arena();
        other.set_text(|r| Ok(&mut r.label), "elsewhere").unwrap();
        let foreign: &'static Text = &Box::leak(Box::new(other)).root().label;
        let err = a
            .alias_text(|r| Ok(&mut r.label), move |_| Ok(foreign))
            .unwrap_err();
        assert_eq!(err, Error::ForeignField);
        assert!(a.root().label.data.is_null());
    }

    #[test]
    fn map_lookup() {
        let mut a = arena();
        a.make_map(|r| Ok(&mut r.dict), 2).unwrap();
        a.set_text(|r| Ok(&mut r.dict.try_at_mut(0)?.key), "x").unwrap();
        a.set_text(|r| Ok(&mut r.dict.try_at_mut(1)?.key), "y").unwrap();
        a.root_mut().dict.try_at_mut(0).unwrap().value = -1;
        a.root_mut().dict.try_at_mut(1).unwrap().value = 1;

        let dict = &a.root().dict;
        assert_eq!(dict.get("x"), Some(&-1));
        assert_eq!(dict.get("y"), Some(&1));
        assert_eq!(dict.get("z"), None);
        assert!(dict.contains_key("x"));
    }

    #[repr(C)]
    struct Inner {
        header: Header,
        n: u32,
    }
    unsafe impl Flat for Inner {}
    unsafe impl Record for Inner {}

    #[repr(C)]
    struct Outer {
        header: Header,
        inner: RelPtr<Inner>,
    }
    unsafe impl Flat for Outer {}
    unsafe impl Record for Outer {}

    #[test]
    fn nested_record() {
        let mut a = HeapArena::<Outer>::new(64).unwrap();
        a.make_rec(|r| Ok(&mut r.inner)).unwrap();
        let inner = a.root().inner.get().unwrap();
        assert_eq!(inner.declared_size() as usize, size_of::<Inner>());
        assert_eq!(inner.capacity() as usize, size_of::<Inner>());
    }

    #[test]
    fn create_initializes_a_whole_run() {
        let mut a = HeapArena::<Outer>::new(128).unwrap();
        let off = a.create::<Inner>(3).unwrap() as usize;
        for i in 0..3 {
            let inner: &Inner = a.root().field_at(off + i * size_of::<Inner>()).unwrap();
            assert_eq!(inner.declared_size() as usize, size_of::<Inner>());
            assert_eq!(inner.n, 0);
        }
    }

    #[test]
    fn vectors_compare_element_wise() {
        let mut a = arena();
        let mut b = arena();
        a.make_vec(|r| Ok(&mut r.nums), 2).unwrap();
        b.make_vec(|r| Ok(&mut r.nums), 2).unwrap();
        *a.root_mut().nums.try_at_mut(0).unwrap() = 4;
        *b.root_mut().nums.try_at_mut(0).unwrap() = 4;
        assert_eq!(a.root().nums, b.root().nums);

        *b.root_mut().nums.try_at_mut(1).unwrap() = 9;
        assert_ne!(a.root().nums, b.root().nums);

        b.make_vec(|r| Ok(&mut r.nums), 1).unwrap();
        assert_ne!(a.root().nums, b.root().nums);
    }

    #[test]
    fn lists_compare_positionally() {
        let mut a = arena();
        let mut b = arena();
        for v in [3u16, 5] {
            a.list_push(|r| Ok(&mut r.chain), v).unwrap();
            b.list_push(|r| Ok(&mut r.chain), v).unwrap();
        }
        assert_eq!(a.root().chain, b.root().chain);
        b.list_push(|r| Ok(&mut r.chain), 7).unwrap();
        assert_ne!(a.root().chain, b.root().chain);
    }

    #[test]
    fn array_behind_a_reference() {
        let mut a = arena();
        a.make_array(|r| Ok(&mut r.block)).unwrap();
        {
            let rec = a.root_mut();
            let block = rec.block.get_mut().unwrap();
            assert_eq!(block.len(), 4);
            *block.try_at_mut(2).unwrap() = 99;
        }
        assert_eq!(a.root().block.get().unwrap().get(2), Some(&99));
        assert_eq!(
            a.root().block.get().unwrap().try_at(4),
            Err(Error::OutOfBounds { index: 4, len: 4 })
        );
    }

    #[test]
    fn aliased_text_shares_bytes() {
        let mut a = arena();
        a.set_text(|r| Ok(&mut r.label), "shared").unwrap();
        a.make_map(|r| Ok(&mut r.dict), 1).unwrap();
        let used = a.root().used();
        a.alias_text(
            |r| Ok(&mut r.dict.try_at_mut(0)?.key),
            |r| Ok(&r.label),
        )
        .unwrap();
        // aliasing allocates nothing
        assert_eq!(a.root().used(), used);
        assert_eq!(a.root().dict.get("shared"), Some(&0));
    }

    #[test]
    fn copy_preserves_destination_capacity() {
        let mut src = arena();
        src.set_text(|r| Ok(&mut r.label), "move me").unwrap();
        src.make_vec(|r| Ok(&mut r.nums), 2).unwrap();
        *src.root_mut().nums.try_at_mut(0).unwrap() = 5;

        let mut dst = HeapArena::<Rec>::new(256).unwrap();
        dst.copy_from(src.root()).unwrap();
        assert_eq!(dst.root().capacity(), 256);
        assert_eq!(dst.root().label, "move me");
        assert_eq!(dst.root().nums.get(0), Some(&5));

        let mut tiny = HeapArena::<Rec>::new(size_of::<Rec>()).unwrap();
        let err = tiny.copy_from(src.root()).unwrap_err();
        assert_eq!(
            err,
            Error::DestinationTooSmall {
                used: src.root().used(),
                capacity: tiny.root().capacity(),
            }
        );
        assert_eq!(tiny.root().capacity() as usize, size_of::<Rec>());
    }

    #[test]
    fn offset_of_matches_field_at() {
        let mut a = arena();
        a.make_vec(|r| Ok(&mut r.nums), 1).unwrap();
        *a.root_mut().nums.try_at_mut(0).unwrap() = 42;
        let off = a.offset_of(|r| Ok(r.nums.try_at_mut(0)?)).unwrap();
        assert_eq!(a.root().field_at::<u32>(off), Some(&42));
        assert_eq!(a.root().field_at::<u32>(4096), None);
    }
}
