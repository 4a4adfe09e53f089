use crate::constants::*;
use crate::source::Value;
use crate::Error;
use crate::Result;

#[cfg(feature = "serde_derive")]
use serde::Serialize;

macro_rules! malformed {
  ($($arg:tt)*) => {
    return Err(Error::MalformedDescriptor(format!($($arg)*)))
  };
}

/// One class or vendor specific descriptor advertised next to an endpoint.
#[cfg_attr(feature = "serde_derive", derive(Serialize))]
#[cfg_attr(feature = "serde_derive", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorRecord {
  descriptor_type: u8,
  payload: Vec<u8>,
}

impl DescriptorRecord {
  pub fn new(descriptor_type: u8, payload: Vec<u8>) -> Result<Self> {
    if DESCRIPTOR_HEADER_SIZE + payload.len() > DESCRIPTOR_MAX_LENGTH {
      malformed!(
        "payload of {} bytes does not fit a descriptor",
        payload.len()
      );
    }

    Ok(DescriptorRecord {
      descriptor_type,
      payload,
    })
  }

  pub fn descriptor_type(&self) -> u8 {
    self.descriptor_type
  }

  pub fn payload(&self) -> &[u8] {
    &self.payload
  }

  /// bLength: header plus payload.
  pub fn length(&self) -> u8 {
    (DESCRIPTOR_HEADER_SIZE + self.payload.len()) as u8
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(self.length() as usize);
    bytes.push(self.length());
    bytes.push(self.descriptor_type);
    bytes.extend_from_slice(&self.payload);
    bytes
  }

  // Builds a record from one `(type, payload)` element of a description.
  fn from_value(index: usize, value: &Value) -> Result<Self> {
    let items = match value {
      Value::Tuple(items) => items,
      _ => malformed!("element {} is not a tuple", index),
    };

    let (ty, payload) = match items.as_slice() {
      [ty, payload] => (ty, payload),
      _ => malformed!(
        "element {} has {} members, expected (type, data)",
        index,
        items.len()
      ),
    };

    let descriptor_type = match ty.as_int() {
      Some(ty) if (0..=u8::MAX as i64).contains(&ty) => ty as u8,
      Some(ty) => malformed!("element {} has invalid type {}", index, ty),
      None => malformed!("element {} type is not numeric", index),
    };

    let payload = match payload.as_bytes() {
      Some(payload) => payload.to_vec(),
      None => malformed!("element {} data is not a byte string", index),
    };

    DescriptorRecord::new(descriptor_type, payload)
  }
}

/// Descriptors owned by an endpoint, in the order they were described.
#[cfg_attr(feature = "serde_derive", derive(Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorList(Vec<DescriptorRecord>);

impl DescriptorList {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds the list from the raw `descriptors` field. A missing field is
  /// an empty list. Either every element becomes a record or none does.
  pub fn materialize(raw: Option<Vec<Value>>) -> Result<Self> {
    let elements = match raw {
      Some(elements) => elements,
      None => return Ok(Self::new()),
    };

    let records = elements
      .iter()
      .enumerate()
      .map(|(i, element)| DescriptorRecord::from_value(i, element))
      .collect::<Result<Vec<DescriptorRecord>>>()?;

    log::debug!("materialized {} descriptor(s)", records.len());

    Ok(DescriptorList(records))
  }

  /// Splits a buffer of back-to-back descriptors, as found trailing a
  /// configuration's endpoint descriptor.
  pub fn parse(mut bytes: &[u8]) -> Result<Self> {
    let mut records = Vec::new();

    while !bytes.is_empty() {
      let length = bytes[0] as usize;
      if length < DESCRIPTOR_HEADER_SIZE {
        malformed!("bLength {} is shorter than the header", length);
      }
      if length > bytes.len() {
        malformed!(
          "bLength {} overruns the remaining {} bytes",
          length,
          bytes.len()
        );
      }

      records.push(DescriptorRecord::new(
        bytes[1],
        bytes[DESCRIPTOR_HEADER_SIZE..length].to_vec(),
      )?);
      bytes = &bytes[length..];
    }

    Ok(DescriptorList(records))
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    self.0.iter().flat_map(|d| d.to_bytes()).collect()
  }

  pub fn push(&mut self, record: DescriptorRecord) {
    self.0.push(record);
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, DescriptorRecord> {
    self.0.iter()
  }
}

impl<'a> IntoIterator for &'a DescriptorList {
  type Item = &'a DescriptorRecord;
  type IntoIter = std::slice::Iter<'a, DescriptorRecord>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}
