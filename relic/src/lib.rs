//! Relocatable, extensible, self-contained binary structures.
//!
//! A *record* is a plain `#[repr(C)]` struct built inside one contiguous
//! buffer, with all of its strings, vectors, lists, and maps stored in
//! the same buffer behind self-relative references. Because nothing in
//! the buffer depends on its own address, the whole record can be moved
//! with `memcpy`, written to disk, mapped back in, or handed across a
//! process boundary, and read in place without any deserialization step.
//!
//! Three things make that work:
//!
//! * [`RelPtr`], a reference stored as a signed offset from its own
//!   location rather than an absolute address;
//! * a bump-only [`Arena`] that owns the buffer, never reallocates, and
//!   links fields only after their content is fully in place;
//! * a [`Header`] fronting every record, whose declared size lets newer
//!   readers probe which fields an older writer actually wrote, so
//!   schemas can grow by appending fields without breaking old data.
//!
//! # Example
//!
//! ```
//! use relic::{Arena, Flat, Header, HeapArena, Record, Text, Vector};
//!
//! #[repr(C)]
//! struct Contact {
//!     header: Header,
//!     name: Text,
//!     phones: Vector<u32>,
//! }
//! unsafe impl Flat for Contact {}
//! unsafe impl Record for Contact {}
//!
//! # fn main() -> Result<(), relic::Error> {
//! let mut arena = HeapArena::<Contact>::new(128)?;
//! arena.set_text(|c| Ok(&mut c.name), "Ada")?;
//! arena.make_vec(|c| Ok(&mut c.phones), 2)?;
//! *arena.root_mut().phones.try_at_mut(0)? = 555_0100;
//! *arena.root_mut().phones.try_at_mut(1)? = 555_0199;
//!
//! // relocate by plain byte copy, then read in place
//! let copy = HeapArena::new_copy(256, arena.root())?;
//! let contact = copy.root();
//! assert_eq!(contact.name, "Ada");
//! assert_eq!(contact.phones.get(1), Some(&555_0199));
//! # Ok(())
//! # }
//! ```
//!
//! The [`Flat`] and [`Record`] impls above are `unsafe` because they
//! assert layout properties the compiler cannot check; the
//! `relic-derive` crate provides `#[derive(Flat)]` and
//! `#[derive(Record)]` that verify them at compile time.

pub mod arena;
pub mod array;
pub mod error;
pub mod flat;
pub mod heap;
pub mod list;
pub mod map;
pub mod ptr;
pub mod record;
pub mod slice;
pub mod stack;
pub mod text;
pub mod vector;

pub use crate::arena::Arena;
pub use crate::array::Array;
pub use crate::error::Error;
pub use crate::flat::Flat;
pub use crate::heap::HeapArena;
pub use crate::list::List;
pub use crate::map::{Map, Pair};
pub use crate::ptr::RelPtr;
pub use crate::record::{Header, Record, ARENA_ALIGN, MAX_CAPACITY};
pub use crate::slice::SliceArena;
pub use crate::stack::StackArena;
pub use crate::text::{Text, WideText};
pub use crate::vector::Vector;
