//! Builds a [`Value`] tree out of big-endian NBT bytes.

use std::collections::HashMap;
use std::convert::TryFrom;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::{Tag, Value};

/// Parse one named root compound from a byte slice.
pub fn from_bytes(data: &[u8]) -> Result<Value> {
    from_reader(data)
}

/// Parse one named root compound from a reader. Does not do decompression.
pub fn from_reader(mut reader: impl Read) -> Result<Value> {
    let tag = read_tag(&mut reader)?;
    if tag != Tag::Compound {
        return Err(Error::no_root_compound());
    }

    // The root compound carries a name, usually the empty string. It is not
    // preserved in the tree.
    read_string(&mut reader)?;

    read_payload(&mut reader, Tag::Compound)
}

fn read_tag(reader: &mut impl Read) -> Result<Tag> {
    let t = reader.read_u8()?;
    Tag::try_from(t).map_err(|_| Error::invalid_tag(t))
}

fn read_string(reader: &mut impl Read) -> Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;

    let mut buf = vec![0; len];
    reader.read_exact(&mut buf[..])?;

    Ok(cesu8::from_java_cesu8(&buf[..])
        .map_err(|_| Error::nonunicode_string(&buf[..]))?
        .into_owned())
}

fn read_len(reader: &mut impl Read) -> Result<usize> {
    let len = reader.read_i32::<BigEndian>()?;
    if len < 0 {
        return Err(Error::bespoke(format!("negative length: {}", len)));
    }
    Ok(len as usize)
}

fn read_payload(reader: &mut impl Read, tag: Tag) -> Result<Value> {
    Ok(match tag {
        Tag::End => return Err(Error::bespoke("end tag has no payload")),
        Tag::Byte => Value::Byte(reader.read_i8()?),
        Tag::Short => Value::Short(reader.read_i16::<BigEndian>()?),
        Tag::Int => Value::Int(reader.read_i32::<BigEndian>()?),
        Tag::Long => Value::Long(reader.read_i64::<BigEndian>()?),
        Tag::Float => Value::Float(reader.read_f32::<BigEndian>()?),
        Tag::Double => Value::Double(reader.read_f64::<BigEndian>()?),
        Tag::String => Value::String(read_string(reader)?),
        Tag::ByteArray => {
            let len = read_len(reader)?;
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf[..])?;
            Value::ByteArray(buf.into_iter().map(|b| b as i8).collect())
        }
        Tag::IntArray => {
            let len = read_len(reader)?;
            let mut buf = vec![0i32; len];
            reader.read_i32_into::<BigEndian>(&mut buf[..])?;
            Value::IntArray(buf)
        }
        Tag::LongArray => {
            let len = read_len(reader)?;
            let mut buf = vec![0i64; len];
            reader.read_i64_into::<BigEndian>(&mut buf[..])?;
            Value::LongArray(buf)
        }
        Tag::List => {
            let element_tag = read_tag(reader)?;
            let len = read_len(reader)?;

            if element_tag == Tag::End && len > 0 {
                return Err(Error::bespoke("non-empty list of end tags"));
            }

            // Cap the pre-allocation: the length is attacker-controlled.
            let mut items = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                items.push(read_payload(reader, element_tag)?);
            }
            Value::List(items)
        }
        Tag::Compound => {
            let mut map = HashMap::new();
            loop {
                let tag = read_tag(reader)?;
                if tag == Tag::End {
                    break;
                }
                let name = read_string(reader)?;
                let value = read_payload(reader, tag)?;
                map.insert(name, value);
            }
            Value::Compound(map)
        }
    })
}
