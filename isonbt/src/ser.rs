//! Writes a [`Value`] tree back into big-endian NBT bytes.

use std::convert::TryInto;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::{Tag, Value};

/// Serialize a compound as a root with an empty name. The inverse of
/// [`crate::from_bytes`], modulo compound ordering.
pub fn to_bytes(value: &Value) -> Result<Vec<u8>> {
    if !value.is_compound() {
        return Err(Error::bespoke("root must be a compound"));
    }

    let mut out = Vec::new();
    write_tag(&mut out, Tag::Compound)?;
    write_string(&mut out, "")?;
    write_payload(&mut out, value)?;
    Ok(out)
}

fn tag_of(value: &Value) -> Tag {
    match value {
        Value::End => Tag::End,
        Value::Byte(_) => Tag::Byte,
        Value::Short(_) => Tag::Short,
        Value::Int(_) => Tag::Int,
        Value::Long(_) => Tag::Long,
        Value::Float(_) => Tag::Float,
        Value::Double(_) => Tag::Double,
        Value::ByteArray(_) => Tag::ByteArray,
        Value::String(_) => Tag::String,
        Value::List(_) => Tag::List,
        Value::Compound(_) => Tag::Compound,
        Value::IntArray(_) => Tag::IntArray,
        Value::LongArray(_) => Tag::LongArray,
    }
}

fn write_tag(out: &mut impl Write, tag: Tag) -> Result<()> {
    out.write_u8(tag as u8)?;
    Ok(())
}

fn write_string(out: &mut impl Write, s: &str) -> Result<()> {
    let encoded = cesu8::to_java_cesu8(s);
    let len: u16 = encoded
        .len()
        .try_into()
        .map_err(|_| Error::bespoke("string too long"))?;
    out.write_u16::<BigEndian>(len)?;
    out.write_all(&encoded)?;
    Ok(())
}

fn write_len(out: &mut impl Write, len: usize) -> Result<()> {
    let len: i32 = len.try_into().map_err(|_| Error::bespoke("len too large"))?;
    out.write_i32::<BigEndian>(len)?;
    Ok(())
}

fn write_payload(out: &mut impl Write, value: &Value) -> Result<()> {
    match value {
        Value::End => return Err(Error::bespoke("end tag has no payload")),
        Value::Byte(v) => out.write_i8(*v)?,
        Value::Short(v) => out.write_i16::<BigEndian>(*v)?,
        Value::Int(v) => out.write_i32::<BigEndian>(*v)?,
        Value::Long(v) => out.write_i64::<BigEndian>(*v)?,
        Value::Float(v) => out.write_f32::<BigEndian>(*v)?,
        Value::Double(v) => out.write_f64::<BigEndian>(*v)?,
        Value::String(v) => write_string(out, v)?,
        Value::ByteArray(v) => {
            write_len(out, v.len())?;
            for b in v {
                out.write_i8(*b)?;
            }
        }
        Value::IntArray(v) => {
            write_len(out, v.len())?;
            for i in v {
                out.write_i32::<BigEndian>(*i)?;
            }
        }
        Value::LongArray(v) => {
            write_len(out, v.len())?;
            for l in v {
                out.write_i64::<BigEndian>(*l)?;
            }
        }
        Value::List(items) => {
            let element_tag = items.first().map(tag_of).unwrap_or(Tag::End);
            if items.iter().any(|i| tag_of(i) != element_tag) {
                return Err(Error::bespoke("list elements must share one tag"));
            }
            write_tag(out, element_tag)?;
            write_len(out, items.len())?;
            for item in items {
                write_payload(out, item)?;
            }
        }
        Value::Compound(map) => {
            for (name, child) in map {
                write_tag(out, tag_of(child))?;
                write_string(out, name)?;
                write_payload(out, child)?;
            }
            write_tag(out, Tag::End)?;
        }
    }

    Ok(())
}
