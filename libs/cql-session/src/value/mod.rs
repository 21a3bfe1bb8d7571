//! Generic column values and their mapping to CQL
//!
//! [`GenericValue`] is the closed, driver-independent representation handed to
//! API front ends. [`codec`] converts between it and the driver's
//! [`CqlValue`](scylla::value::CqlValue) under a declared [`CqlType`].

pub mod codec;
mod decimal;
mod json;
mod types;

pub use codec::{decode, encode};
pub use decimal::{Decimal, ParseDecimalError};
pub use json::row_to_json;
pub use types::CqlType;

/// A column value as seen by API front ends.
///
/// Integer variants keep the exact width of the column they came from; any
/// widening is left to the caller. `Null` means "no stored value" and is
/// distinct from an empty collection.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericValue {
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<GenericValue>),
    /// Order is irrelevant; uniqueness is left to the application
    Set(Vec<GenericValue>),
    Map(Vec<(GenericValue, GenericValue)>),
}

impl GenericValue {
    /// Variant name used in error messages
    pub fn variant_name(&self) -> &'static str {
        match self {
            GenericValue::Null => "Null",
            GenericValue::Boolean(_) => "Boolean",
            GenericValue::Int8(_) => "Int8",
            GenericValue::Int16(_) => "Int16",
            GenericValue::Int32(_) => "Int32",
            GenericValue::Int64(_) => "Int64",
            GenericValue::Float32(_) => "Float32",
            GenericValue::Float64(_) => "Float64",
            GenericValue::Decimal(_) => "Decimal",
            GenericValue::Text(_) => "Text",
            GenericValue::Bytes(_) => "Bytes",
            GenericValue::List(_) => "List",
            GenericValue::Set(_) => "Set",
            GenericValue::Map(_) => "Map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, GenericValue::Null)
    }

    /// Bit width of an integer variant
    pub fn integer_width(&self) -> Option<u8> {
        match self {
            GenericValue::Int8(_) => Some(8),
            GenericValue::Int16(_) => Some(16),
            GenericValue::Int32(_) => Some(32),
            GenericValue::Int64(_) => Some(64),
            _ => None,
        }
    }

    /// Integer payload widened to i64, for callers that want to ignore width
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            GenericValue::Int8(v) => Some(v.into()),
            GenericValue::Int16(v) => Some(v.into()),
            GenericValue::Int32(v) => Some(v.into()),
            GenericValue::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GenericValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            GenericValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl From<bool> for GenericValue {
    fn from(value: bool) -> Self {
        GenericValue::Boolean(value)
    }
}

impl From<i8> for GenericValue {
    fn from(value: i8) -> Self {
        GenericValue::Int8(value)
    }
}

impl From<i16> for GenericValue {
    fn from(value: i16) -> Self {
        GenericValue::Int16(value)
    }
}

impl From<i32> for GenericValue {
    fn from(value: i32) -> Self {
        GenericValue::Int32(value)
    }
}

impl From<i64> for GenericValue {
    fn from(value: i64) -> Self {
        GenericValue::Int64(value)
    }
}

impl From<f32> for GenericValue {
    fn from(value: f32) -> Self {
        GenericValue::Float32(value)
    }
}

impl From<f64> for GenericValue {
    fn from(value: f64) -> Self {
        GenericValue::Float64(value)
    }
}

impl From<Decimal> for GenericValue {
    fn from(value: Decimal) -> Self {
        GenericValue::Decimal(value)
    }
}

impl From<&str> for GenericValue {
    fn from(value: &str) -> Self {
        GenericValue::Text(value.to_string())
    }
}

impl From<String> for GenericValue {
    fn from(value: String) -> Self {
        GenericValue::Text(value)
    }
}

impl From<Vec<u8>> for GenericValue {
    fn from(value: Vec<u8>) -> Self {
        GenericValue::Bytes(value)
    }
}

impl<T: Into<GenericValue>> From<Option<T>> for GenericValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(GenericValue::Null, Into::into)
    }
}
