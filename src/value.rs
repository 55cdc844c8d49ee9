//! The dynamic value type carried across the statement and row boundary.
//!
//! Every variant wraps an `Option` so a NULL stays typed: a missing text and
//! a missing integer are distinct values, and collaborators can bind them as
//! such. [`ValueType`] is the typed view — the conversion pair model structs
//! use to read columns and callers use to bind parameters.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single column value, typed, with NULL represented in-band.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    SmallInt(Option<i16>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Double(Option<f64>),
    Bool(Option<bool>),
    Text(Option<String>),
    Bytes(Option<Vec<u8>>),
    Decimal(Option<Decimal>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    Timestamp(Option<NaiveDateTime>),
    Uuid(Option<Uuid>),
    Json(Option<Box<serde_json::Value>>),
}

impl Value {
    /// Whether this is a (typed) NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Value::SmallInt(v) => v.is_none(),
            Value::Int(v) => v.is_none(),
            Value::BigInt(v) => v.is_none(),
            Value::Double(v) => v.is_none(),
            Value::Bool(v) => v.is_none(),
            Value::Text(v) => v.is_none(),
            Value::Bytes(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::Json(v) => v.is_none(),
        }
    }
}

/// Typed conversion to and from [`Value`].
///
/// `from_value` returns `None` when the variant does not match (narrower
/// integer variants widen losslessly into `i32`/`i64`). `null_value` is the
/// typed NULL this type binds as.
pub trait ValueType: Sized {
    fn into_value(self) -> Value;
    fn from_value(value: Value) -> Option<Self>;
    fn null_value() -> Value;
}

macro_rules! impl_value_type {
    ($ty:ty, $variant:ident) => {
        impl ValueType for $ty {
            fn into_value(self) -> Value {
                Value::$variant(Some(self))
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => v,
                    _ => None,
                }
            }

            fn null_value() -> Value {
                Value::$variant(None)
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Value {
                Value::$variant(Some(v))
            }
        }
    };
}

impl_value_type!(i16, SmallInt);
impl_value_type!(f64, Double);
impl_value_type!(bool, Bool);
impl_value_type!(String, Text);
impl_value_type!(Vec<u8>, Bytes);
impl_value_type!(Decimal, Decimal);
impl_value_type!(NaiveDate, Date);
impl_value_type!(NaiveTime, Time);
impl_value_type!(NaiveDateTime, Timestamp);
impl_value_type!(Uuid, Uuid);

impl ValueType for i32 {
    fn into_value(self) -> Value {
        Value::Int(Some(self))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(v) => v,
            Value::SmallInt(v) => v.map(i32::from),
            _ => None,
        }
    }

    fn null_value() -> Value {
        Value::Int(None)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int(Some(v))
    }
}

impl ValueType for i64 {
    fn into_value(self) -> Value {
        Value::BigInt(Some(self))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::BigInt(v) => v,
            Value::Int(v) => v.map(i64::from),
            Value::SmallInt(v) => v.map(i64::from),
            _ => None,
        }
    }

    fn null_value() -> Value {
        Value::BigInt(None)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::BigInt(Some(v))
    }
}

impl ValueType for serde_json::Value {
    fn into_value(self) -> Value {
        Value::Json(Some(Box::new(self)))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Json(v) => v.map(|b| *b),
            _ => None,
        }
    }

    fn null_value() -> Value {
        Value::Json(None)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Value {
        Value::Json(Some(Box::new(v)))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Text(Some(v.to_string()))
    }
}

impl<T: ValueType> ValueType for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => T::null_value(),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }

    fn null_value() -> Value {
        T::null_value()
    }
}

impl<T: ValueType> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        v.into_value()
    }
}
