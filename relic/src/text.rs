//! NUL-terminated character sequences stored in an arena.

use core::fmt;
use core::slice;
use core::str;

use static_assertions::assert_eq_size;

use crate::flat::Flat;
use crate::ptr::RelPtr;

/// A NUL-terminated UTF-8 byte sequence behind a [`RelPtr`].
///
/// A null reference reads as the empty string. Content is written through
/// the enclosing arena's [`set_text`](crate::Arena::set_text), which
/// allocates the bytes and links them in one step.
#[repr(C)]
pub struct Text {
    pub(crate) data: RelPtr<u8>,
}

assert_eq_size!(Text, i16);

impl Text {
    /// The string bytes, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        match self.data.get() {
            None => &[],
            Some(first) => unsafe {
                let start = first as *const u8;
                let mut len = 0;
                while *start.add(len) != 0 {
                    len += 1;
                }
                slice::from_raw_parts(start, len)
            },
        }
    }

    pub fn as_str(&self) -> &str {
        // Arena writers only store `&str` content; foreign buffers assert
        // well-formedness when viewed.
        unsafe { str::from_utf8_unchecked(self.as_bytes()) }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Resets to the empty string; the old bytes stay allocated.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

unsafe impl Flat for Text {}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
impl Eq for Text {}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
impl PartialEq<&'_ str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A NUL-terminated wide-character sequence behind a [`RelPtr`].
///
/// Code units are Unicode scalar values stored as `u32`, written through
/// [`set_wide_text`](crate::Arena::set_wide_text).
#[repr(C)]
pub struct WideText {
    pub(crate) data: RelPtr<u32>,
}

assert_eq_size!(WideText, i16);

impl WideText {
    /// The raw code units, without the terminator.
    pub fn code_units(&self) -> &[u32] {
        match self.data.get() {
            None => &[],
            Some(first) => unsafe {
                let start = first as *const u32;
                let mut len = 0;
                while *start.add(len) != 0 {
                    len += 1;
                }
                slice::from_raw_parts(start, len)
            },
        }
    }

    /// Decoded characters; invalid code units read as U+FFFD.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.code_units()
            .iter()
            .map(|&unit| core::char::from_u32(unit).unwrap_or(core::char::REPLACEMENT_CHARACTER))
    }

    pub fn len(&self) -> usize {
        self.code_units().len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_units().is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

unsafe impl Flat for WideText {}

impl PartialEq for WideText {
    fn eq(&self, other: &Self) -> bool {
        self.code_units() == other.code_units()
    }
}
impl Eq for WideText {}

impl PartialEq<str> for WideText {
    fn eq(&self, other: &str) -> bool {
        self.chars().eq(other.chars())
    }
}

impl fmt::Debug for WideText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"")?;
        for c in self.chars() {
            write!(f, "{}", c.escape_debug())?;
        }
        write!(f, "\"")
    }
}

impl fmt::Display for WideText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in self.chars() {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
