use crate::{Error, Result};

/// A value bound to, or read from, a storage statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Value::I64(v) => Ok(*v),
            Value::Bool(v) => Ok(*v as i64),
            _ => Err(Error::from_args(format_args!("cannot convert {self:?} to i64"))),
        }
    }

    pub fn to_opt_i64(&self) -> Result<Option<i64>> {
        match self {
            Value::Null => Ok(None),
            _ => self.to_i64().map(Some),
        }
    }

    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(*v),
            Value::I64(v) => Ok(*v != 0),
            _ => Err(Error::from_args(format_args!("cannot convert {self:?} to bool"))),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(v) => Ok(v),
            _ => Err(Error::from_args(format_args!("cannot convert {self:?} to String"))),
        }
    }

    pub fn to_opt_string(&self) -> Result<Option<String>> {
        match self {
            Value::Null => Ok(None),
            _ => self.as_str().map(|s| Some(s.to_string())),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}
