//! isonbt parses NBT data from *Minecraft: Java Edition* into an owned tree
//! of [`Value`]s. The game stores world data in this format, big-endian
//! throughout, usually behind zlib or gzip compression (decompression is the
//! caller's concern).
//!
//! * For parsing, see [`from_bytes`] and [`from_reader`].
//! * For writing NBT back out, see [`to_bytes`].
//! * For the sentinel used for absent data, see [`AIR`].
//!
//! The accessors on [`Value`] are deliberately lenient: asking a compound for
//! a child it does not have yields the [`AIR`] sentinel, and typed accessors
//! return `None` or an empty slice on a tag mismatch. Consumers that walk
//! thousands of chunks guard once with [`Value::is_end`] rather than handling
//! a `Result` on every lattice cell.

use std::convert::TryFrom;

pub mod error;

mod de;
mod ser;
mod value;

pub use de::{from_bytes, from_reader};
pub use ser::to_bytes;
pub use value::{Value, AIR};

/// An NBT tag. This does not carry the value or the name of the data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Tag {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64.
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// Represents as array of Byte (i8).
    ByteArray = 7,
    /// Represents a Unicode string.
    String = 8,
    /// Represents a list of other objects, elements are not required to be the same type.
    List = 9,
    /// Represents a struct-like structure.
    Compound = 10,
    /// Represents as array of Int (i32).
    IntArray = 11,
    /// Represents as array of Long (i64).
    LongArray = 12,
}

// A derive crate could generate this for us, but the tags will very rarely
// change, so writing it out saves the compile time.
impl TryFrom<u8> for Tag {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        use Tag::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            _ => return Err(()),
        })
    }
}
