use std::collections::BTreeMap;

use crate::Error;
use crate::Result;

/// A loosely typed value read out of a capability description.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  None,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  Bytes(Vec<u8>),
  Tuple(Vec<Value>),
  List(Vec<Value>),
  Object,
}

impl Value {
  /// Booleans count as `0` and `1`.
  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(v) => Some(*v),
      Value::Bool(b) => Some(*b as i64),
      _ => None,
    }
  }

  /// Byte view of a payload. Strings count as their UTF-8 encoding.
  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      Value::Bytes(b) => Some(b),
      Value::Str(s) => Some(s.as_bytes()),
      _ => None,
    }
  }
}

impl From<i32> for Value {
  fn from(v: i32) -> Self {
    Value::Int(v as i64)
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self {
    Value::Int(v)
  }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self {
    Value::Bool(v)
  }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self {
    Value::Str(v.to_string())
  }
}

impl From<Vec<u8>> for Value {
  fn from(v: Vec<u8>) -> Self {
    Value::Bytes(v)
  }
}

impl From<&[u8]> for Value {
  fn from(v: &[u8]) -> Self {
    Value::Bytes(v.to_vec())
  }
}

impl From<(u8, Vec<u8>)> for Value {
  fn from((ty, payload): (u8, Vec<u8>)) -> Self {
    Value::Tuple(vec![Value::Int(ty as i64), Value::Bytes(payload)])
  }
}

/// Anything an endpoint can be described by: a named-field lookup.
pub trait CapabilitySource {
  /// Fetch the raw value stored under `name`, or `Error::MissingField`.
  fn lookup(&self, name: &str) -> Result<Value>;

  fn get_numeric(&self, name: &str) -> Result<i64> {
    self
      .lookup(name)?
      .as_int()
      .ok_or_else(|| Error::TypeMismatch(name.to_string()))
  }

  /// `Ok(None)` when the field is absent or explicitly `None`.
  fn get_sequence(&self, name: &str) -> Result<Option<Vec<Value>>> {
    match self.lookup(name) {
      Err(_) | Ok(Value::None) => Ok(None),
      Ok(Value::List(items)) => Ok(Some(items)),
      Ok(_) => Err(Error::TypeMismatch(name.to_string())),
    }
  }
}

impl<S: CapabilitySource + ?Sized> CapabilitySource for &S {
  fn lookup(&self, name: &str) -> Result<Value> {
    (**self).lookup(name)
  }
}

/// In-memory capability description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
  fields: BTreeMap<String, Value>,
}

impl Description {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
    self.insert(name, value);
    self
  }

  pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
    self.fields.insert(name.to_string(), value.into());
  }

  pub fn remove(&mut self, name: &str) -> Option<Value> {
    self.fields.remove(name)
  }
}

impl CapabilitySource for Description {
  fn lookup(&self, name: &str) -> Result<Value> {
    self
      .fields
      .get(name)
      .cloned()
      .ok_or_else(|| Error::MissingField(name.to_string()))
  }
}

#[cfg(feature = "json")]
mod json {
  use std::convert::TryFrom;

  use super::*;

  #[derive(Clone, Copy)]
  enum Nesting {
    Field,
    List,
    Tuple,
  }

  fn convert(value: &serde_json::Value, nesting: Nesting) -> Value {
    match value {
      serde_json::Value::Null => Value::None,
      serde_json::Value::Bool(b) => Value::Bool(*b),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => Value::Int(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
      },
      serde_json::Value::String(s) => Value::Str(s.clone()),
      serde_json::Value::Array(items) => match nesting {
        Nesting::Field => Value::List(
          items.iter().map(|v| convert(v, Nesting::List)).collect(),
        ),
        Nesting::List => Value::Tuple(
          items.iter().map(|v| convert(v, Nesting::Tuple)).collect(),
        ),
        Nesting::Tuple => {
          let bytes: Option<Vec<u8>> = items
            .iter()
            .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect();
          match bytes {
            Some(bytes) => Value::Bytes(bytes),
            None => Value::List(
              items.iter().map(|v| convert(v, Nesting::List)).collect(),
            ),
          }
        }
      },
      serde_json::Value::Object(_) => Value::Object,
    }
  }

  /// JSON objects describe an endpoint field by field. Descriptor payloads
  /// are written as byte arrays, e.g. `"descriptors": [[36, [1, 2]]]`.
  impl CapabilitySource for serde_json::Value {
    fn lookup(&self, name: &str) -> Result<Value> {
      self
        .get(name)
        .map(|v| convert(v, Nesting::Field))
        .ok_or_else(|| Error::MissingField(name.to_string()))
    }
  }
}
