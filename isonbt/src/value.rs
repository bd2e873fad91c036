use std::collections::HashMap;

/// The sentinel returned for everything that is absent: missing compound
/// children, queries against non-compounds, and unpopulated world sections.
/// Checking [`Value::is_end`] against a reference obtained from [`Value::child`]
/// is the cheap way to ask "was it there".
pub static AIR: Value = Value::End;

/// Value is a complete NBT value. It owns its data. Compounds and Lists are
/// recursively built. The name of the root compound (usually the empty
/// string) is not preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Value>),
    Compound(HashMap<String, Value>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Value {
    pub fn is_end(&self) -> bool {
        matches!(self, Value::End)
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Value::Compound(_))
    }

    /// Does this compound have a child of the given name? Always false for
    /// non-compounds.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Value::Compound(map) => map.contains_key(name),
            _ => false,
        }
    }

    /// The child of the given name, or [`AIR`] if this is not a compound or
    /// has no such child.
    pub fn child(&self, name: &str) -> &Value {
        match self {
            Value::Compound(map) => map.get(name).unwrap_or(&AIR),
            _ => &AIR,
        }
    }

    /// Insert a child into this compound. Anything already stored under the
    /// name is replaced. No-op on non-compounds.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        if let Value::Compound(map) = self {
            map.insert(name.into(), value);
        }
    }

    /// Remove and return the child of the given name, leaving the compound
    /// without it. Returns [`Value::End`] when absent or when this is not a
    /// compound.
    pub fn take(&mut self, name: &str) -> Value {
        match self {
            Value::Compound(map) => map.remove(name).unwrap_or(Value::End),
            _ => Value::End,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match *self {
            Value::Byte(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(v as i64),
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// The elements of this list, or an empty slice for anything that is not
    /// a list.
    pub fn as_list(&self) -> &[Value] {
        match self {
            Value::List(v) => v,
            _ => &[],
        }
    }

    /// The contents of this long array, or an empty slice for anything else.
    pub fn as_long_array(&self) -> &[i64] {
        match self {
            Value::LongArray(v) => v,
            _ => &[],
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::End
    }
}
