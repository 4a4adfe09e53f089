//! Endpoint capability layer for virtual USB gadgets.
//!
//! A gadget endpoint is described by a loosely typed record (see
//! [`CapabilitySource`]) and turned into a validated [`Endpoint`] holding
//! its [`EndpointCapabilities`] and the descriptors it advertises. The
//! crate also renders in-flight [`Urb`]s for diagnostics.

use core::convert::TryFrom;

#[cfg(feature = "serde_derive")]
use serde::Serialize;

#[cfg(feature = "libusb")]
pub use rusb;

pub mod capabilities;
pub mod constants;
pub mod descriptors;
pub mod endpoint;
pub mod request;
pub mod source;
pub mod urb;

pub use crate::capabilities::Direction;
pub use crate::capabilities::EndpointCapabilities;
pub use crate::capabilities::SyncType;
pub use crate::capabilities::TransferType;
pub use crate::capabilities::UsageType;
pub use crate::descriptors::DescriptorList;
pub use crate::descriptors::DescriptorRecord;
pub use crate::endpoint::Endpoint;
pub use crate::endpoint::EndpointHandler;
pub use crate::request::ControlRequestFields;
pub use crate::request::Recipient;
pub use crate::request::RequestDirection;
pub use crate::request::RequestKind;
pub use crate::request::SetupPacket;
pub use crate::source::CapabilitySource;
pub use crate::source::Description;
pub use crate::source::Value;
pub use crate::urb::Urb;
pub use crate::urb::UrbType;

use crate::constants::*;

#[derive(Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
  #[error("attribute '{0}' not found")]
  MissingField(String),
  #[error("value of '{0}' has the wrong type")]
  TypeMismatch(String),
  #[error("invalid '{0}' value")]
  InvalidEnumValue(String),
  #[error("malformed descriptor: {0}")]
  MalformedDescriptor(String),
  #[error("'{0}' is not bound")]
  UnboundCapability(&'static str),
  #[error("{}", .0.as_str())]
  Protocol(ResultCode),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  /// The runtime result code this error is reported as.
  pub fn code(&self) -> ResultCode {
    match self {
      Error::MissingField(_)
      | Error::TypeMismatch(_)
      | Error::InvalidEnumValue(_)
      | Error::MalformedDescriptor(_) => ResultCode::Misuse,
      Error::UnboundCapability(_) => ResultCode::NotFound,
      Error::Protocol(code) => *code,
    }
  }
}

impl From<ResultCode> for Error {
  fn from(code: ResultCode) -> Self {
    Self::Protocol(code)
  }
}

/// Result codes of the gadget runtime.
#[cfg_attr(feature = "serde_derive", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ResultCode {
  Success = RESULT_SUCCESS,
  NoMem = RESULT_NOMEM,
  Misuse = RESULT_MISUSE,
  Unknown = RESULT_UNKNOWN,
  NotFound = RESULT_NOT_FOUND,
  Busy = RESULT_BUSY,
  ProtocolError = RESULT_PROTOCOL_ERROR,
}

impl ResultCode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResultCode::Success => "success",
      ResultCode::NoMem => "not enough memory",
      ResultCode::Misuse => "misuse",
      ResultCode::Unknown => "unknown error",
      ResultCode::NotFound => "entity not found",
      ResultCode::Busy => "device is busy",
      ResultCode::ProtocolError => "kernel-user protocol error",
    }
  }
}

impl TryFrom<i32> for ResultCode {
  type Error = Error;

  fn try_from(code: i32) -> Result<Self> {
    Ok(match code {
      RESULT_SUCCESS => ResultCode::Success,
      RESULT_NOMEM => ResultCode::NoMem,
      RESULT_MISUSE => ResultCode::Misuse,
      RESULT_UNKNOWN => ResultCode::Unknown,
      RESULT_NOT_FOUND => ResultCode::NotFound,
      RESULT_BUSY => ResultCode::Busy,
      RESULT_PROTOCOL_ERROR => ResultCode::ProtocolError,
      _ => return Err(Error::InvalidEnumValue("result".to_string())),
    })
  }
}

#[cfg_attr(feature = "serde_derive", derive(Serialize))]
#[cfg_attr(feature = "serde_derive", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Speed {
  Low = SPEED_LOW,
  Full = SPEED_FULL,
  High = SPEED_HIGH,
}

impl TryFrom<i32> for Speed {
  type Error = Error;

  fn try_from(speed: i32) -> Result<Self> {
    match speed {
      SPEED_LOW => Ok(Speed::Low),
      SPEED_FULL => Ok(Speed::Full),
      SPEED_HIGH => Ok(Speed::High),
      _ => Err(Error::InvalidEnumValue("speed".to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_result_codes() {
    assert_eq!(ResultCode::Success as i32, 0);
    assert_eq!(ResultCode::ProtocolError as i32, 6);
    assert_eq!(ResultCode::try_from(4), Ok(ResultCode::NotFound));
    assert!(ResultCode::try_from(7).is_err());
    assert_eq!(ResultCode::Busy.as_str(), "device is busy");
  }

  #[test]
  fn test_error_codes() {
    assert_eq!(
      Error::MissingField("dir".to_string()).code(),
      ResultCode::Misuse
    );
    assert_eq!(
      Error::UnboundCapability("enqueue").code(),
      ResultCode::NotFound
    );
    assert_eq!(Error::from(ResultCode::Busy).code(), ResultCode::Busy);
    assert_eq!(
      Error::MissingField("address".to_string()).to_string(),
      "attribute 'address' not found"
    );
  }

  #[test]
  fn test_speed() {
    assert_eq!(Speed::try_from(SPEED_HIGH), Ok(Speed::High));
    assert!(Speed::try_from(0).is_err());
  }
}
