use std::fmt;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDirection {
  /// Host to device.
  Out,
  /// Device to host.
  In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
  Standard,
  Class,
  Vendor,
  Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
  Device,
  Interface,
  Endpoint,
  Other,
  Port,
  Rpipe,
  /// Any of the reserved recipient values; the raw bits are kept.
  Unknown(u8),
}

impl RequestDirection {
  pub fn as_str(&self) -> &'static str {
    match self {
      RequestDirection::Out => "out",
      RequestDirection::In => "in",
    }
  }
}

impl RequestKind {
  fn from_bits(bits: u8) -> Self {
    match bits & 0x3 {
      0 => RequestKind::Standard,
      1 => RequestKind::Class,
      2 => RequestKind::Vendor,
      _ => RequestKind::Reserved,
    }
  }

  fn bits(&self) -> u8 {
    match self {
      RequestKind::Standard => 0,
      RequestKind::Class => 1,
      RequestKind::Vendor => 2,
      RequestKind::Reserved => 3,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      RequestKind::Standard => "standard",
      RequestKind::Class => "class",
      RequestKind::Vendor => "vendor",
      RequestKind::Reserved => "reserved",
    }
  }
}

impl Recipient {
  fn from_bits(bits: u8) -> Self {
    match bits & REQUEST_TYPE_RECIPIENT_MASK {
      0 => Recipient::Device,
      1 => Recipient::Interface,
      2 => Recipient::Endpoint,
      3 => Recipient::Other,
      4 => Recipient::Port,
      5 => Recipient::Rpipe,
      other => Recipient::Unknown(other),
    }
  }

  fn bits(&self) -> u8 {
    match self {
      Recipient::Device => 0,
      Recipient::Interface => 1,
      Recipient::Endpoint => 2,
      Recipient::Other => 3,
      Recipient::Port => 4,
      Recipient::Rpipe => 5,
      Recipient::Unknown(bits) => bits & REQUEST_TYPE_RECIPIENT_MASK,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Recipient::Device => "device",
      Recipient::Interface => "interface",
      Recipient::Endpoint => "endpoint",
      Recipient::Other => "other",
      Recipient::Port => "port",
      Recipient::Rpipe => "rpipe",
      Recipient::Unknown(_) => "unknown",
    }
  }
}

/// The three fields packed into `bmRequestType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequestFields {
  pub direction: RequestDirection,
  pub kind: RequestKind,
  pub recipient: Recipient,
}

impl ControlRequestFields {
  pub fn decode(request_type: u8) -> Self {
    ControlRequestFields {
      direction: if request_type & REQUEST_TYPE_DIR_IN != 0 {
        RequestDirection::In
      } else {
        RequestDirection::Out
      },
      kind: RequestKind::from_bits(
        (request_type & REQUEST_TYPE_TYPE_MASK) >> REQUEST_TYPE_TYPE_SHIFT,
      ),
      recipient: Recipient::from_bits(request_type),
    }
  }

  pub fn encode(&self) -> u8 {
    let direction = match self.direction {
      RequestDirection::In => REQUEST_TYPE_DIR_IN,
      RequestDirection::Out => 0,
    };
    direction
      | (self.kind.bits() << REQUEST_TYPE_TYPE_SHIFT)
      | self.recipient.bits()
  }
}

impl fmt::Display for ControlRequestFields {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}:{}",
      self.direction.as_str(),
      self.kind.as_str(),
      self.recipient.as_str()
    )
  }
}

/// An 8 byte SETUP packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupPacket {
  pub request_type: u8,
  pub request: u8,
  pub value: u16,
  pub index: u16,
  pub length: u16,
}

impl SetupPacket {
  pub fn from_bytes(bytes: &[u8; 8]) -> Self {
    SetupPacket {
      request_type: bytes[0],
      request: bytes[1],
      value: u16::from_le_bytes([bytes[2], bytes[3]]),
      index: u16::from_le_bytes([bytes[4], bytes[5]]),
      length: u16::from_le_bytes([bytes[6], bytes[7]]),
    }
  }

  pub fn to_bytes(&self) -> [u8; 8] {
    let value = self.value.to_le_bytes();
    let index = self.index.to_le_bytes();
    let length = self.length.to_le_bytes();
    [
      self.request_type,
      self.request,
      value[0],
      value[1],
      index[0],
      index[1],
      length[0],
      length[1],
    ]
  }

  pub fn fields(&self) -> ControlRequestFields {
    ControlRequestFields::decode(self.request_type)
  }
}

/// Name of a standard `bRequest` code, as the runtime's diagnostics print it.
pub fn request_name(request: u8) -> &'static str {
  match request {
    REQUEST_GET_STATUS => "VDP_USB_REQUEST_GET_STATUS",
    REQUEST_CLEAR_FEATURE => "VDP_USB_REQUEST_CLEAR_FEATURE",
    REQUEST_SET_FEATURE => "VDP_USB_REQUEST_SET_FEATURE",
    REQUEST_SET_ADDRESS => "VDP_USB_REQUEST_SET_ADDRESS",
    REQUEST_GET_DESCRIPTOR => "VDP_USB_REQUEST_GET_DESCRIPTOR",
    REQUEST_SET_DESCRIPTOR => "VDP_USB_REQUEST_SET_DESCRIPTOR",
    REQUEST_GET_CONFIGURATION => "VDP_USB_REQUEST_GET_CONFIGURATION",
    REQUEST_SET_CONFIGURATION => "VDP_USB_REQUEST_SET_CONFIGURATION",
    REQUEST_GET_INTERFACE => "VDP_USB_REQUEST_GET_INTERFACE",
    REQUEST_SET_INTERFACE => "VDP_USB_REQUEST_SET_INTERFACE",
    REQUEST_SYNCH_FRAME => "VDP_USB_REQUEST_SYNCH_FRAME",
    REQUEST_SET_ENCRYPTION => "VDP_USB_REQUEST_SET_ENCRYPTION",
    REQUEST_GET_ENCRYPTION => "VDP_USB_REQUEST_GET_ENCRYPTION",
    REQUEST_SET_HANDSHAKE => "VDP_USB_REQUEST_SET_HANDSHAKE",
    REQUEST_GET_HANDSHAKE => "VDP_USB_REQUEST_GET_HANDSHAKE",
    REQUEST_SET_CONNECTION => "VDP_USB_REQUEST_SET_CONNECTION",
    REQUEST_SET_SECURITY_DATA => "VDP_USB_REQUEST_SET_SECURITY_DATA",
    REQUEST_GET_SECURITY_DATA => "VDP_USB_REQUEST_GET_SECURITY_DATA",
    REQUEST_SET_WUSB_DATA => "VDP_USB_REQUEST_SET_WUSB_DATA",
    REQUEST_LOOPBACK_DATA_WRITE => "VDP_USB_REQUEST_LOOPBACK_DATA_WRITE",
    REQUEST_LOOPBACK_DATA_READ => "VDP_USB_REQUEST_LOOPBACK_DATA_READ",
    REQUEST_SET_INTERFACE_DS => "VDP_USB_REQUEST_SET_INTERFACE_DS",
    _ => "VDP_USB_REQUEST_XXX",
  }
}
