use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::value::{Value, ValueKind};

/// Errors raised while building or comparing [`Key`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("{kind} values cannot be used as keys")]
    Unsupported { kind: ValueKind },
    #[error("cannot compare {left} key with {right} key")]
    TypeMismatch {
        left: &'static str,
        right: &'static str,
    },
}

/// Convenience alias for key construction and comparison.
pub type KeyResult<T> = Result<T, KeyError>;

/// Ordered key derived from a row by an [`Indexer`](crate::Indexer).
///
/// Scalar keys only compare against the same scalar variant. A composite key
/// compares element by element; when one composite is a prefix of the other
/// the shorter one sorts first. `NoKey` sorts before everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    NoKey,
    Int(i64),
    Str(String),
    Bool(bool),
    Char(char),
    Date(u64),
    Composite(Vec<Key>),
}

impl Key {
    /// Converts a single column value into a scalar key.
    pub fn from_value(value: &Value) -> KeyResult<Key> {
        match value {
            Value::Int(v) => Ok(Key::Int((*v).into())),
            Value::UInt(v) => Ok(Key::Int((*v).into())),
            Value::Long(v) => Ok(Key::Int(*v)),
            Value::Byte(v) => Ok(Key::Int((*v).into())),
            Value::Str(v) => Ok(Key::Str(v.clone())),
            Value::Bool(v) => Ok(Key::Bool(*v)),
            Value::Char(v) => Ok(Key::Char(*v)),
            Value::Date(v) => Ok(Key::Date(*v)),
            other => Err(KeyError::Unsupported { kind: other.kind() }),
        }
    }

    /// Builds a key from projected column values: no values give `NoKey`,
    /// one gives a scalar and more give a composite.
    pub fn from_values(values: &[&Value]) -> KeyResult<Key> {
        match values {
            [] => Ok(Key::NoKey),
            [single] => Key::from_value(single),
            many => many
                .iter()
                .map(|value| Key::from_value(value))
                .collect::<KeyResult<Vec<_>>>()
                .map(Key::Composite),
        }
    }

    /// Returns a lower-case name for the key variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Key::NoKey => "none",
            Key::Int(_) => "int",
            Key::Str(_) => "str",
            Key::Bool(_) => "bool",
            Key::Char(_) => "char",
            Key::Date(_) => "date",
            Key::Composite(_) => "composite",
        }
    }

    /// Compares two keys, failing when their representations are incompatible.
    pub fn compare(&self, other: &Key) -> KeyResult<Ordering> {
        match (self, other) {
            (Key::NoKey, Key::NoKey) => Ok(Ordering::Equal),
            (Key::NoKey, _) => Ok(Ordering::Less),
            (_, Key::NoKey) => Ok(Ordering::Greater),
            (Key::Int(a), Key::Int(b)) => Ok(a.cmp(b)),
            (Key::Str(a), Key::Str(b)) => Ok(a.cmp(b)),
            (Key::Bool(a), Key::Bool(b)) => Ok(a.cmp(b)),
            (Key::Char(a), Key::Char(b)) => Ok(a.cmp(b)),
            (Key::Date(a), Key::Date(b)) => Ok(a.cmp(b)),
            (Key::Composite(a), Key::Composite(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    match left.compare(right)? {
                        Ordering::Equal => continue,
                        decided => return Ok(decided),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (left, right) => Err(KeyError::TypeMismatch {
                left: left.kind_name(),
                right: right.kind_name(),
            }),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::NoKey => f.write_str("()"),
            Key::Int(v) => write!(f, "{}", v),
            Key::Str(v) => write!(f, "{:?}", v),
            Key::Bool(v) => write!(f, "{}", v),
            Key::Char(v) => write!(f, "{:?}", v),
            Key::Date(v) => write!(f, "{}", v),
            Key::Composite(keys) => {
                f.write_str("(")?;
                for (idx, key) in keys.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", key)?;
                }
                f.write_str(")")
            }
        }
    }
}
