use core::convert::TryFrom;
use std::fmt;
use std::fmt::Write;

use crate::request::request_name;
use crate::request::SetupPacket;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum UrbType {
  Control = 0,
  Bulk = 1,
  Int = 2,
  Iso = 3,
}

impl UrbType {
  pub fn as_str(&self) -> &'static str {
    match self {
      UrbType::Control => "control",
      UrbType::Bulk => "bulk",
      UrbType::Int => "int",
      UrbType::Iso => "iso",
    }
  }
}

impl TryFrom<i32> for UrbType {
  type Error = Error;

  fn try_from(ty: i32) -> crate::Result<Self> {
    match ty {
      0 => Ok(UrbType::Control),
      1 => Ok(UrbType::Bulk),
      2 => Ok(UrbType::Int),
      3 => Ok(UrbType::Iso),
      _ => Err(Error::InvalidEnumValue("urb type".to_string())),
    }
  }
}

/// A transfer request as handed to a gadget endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urb {
  pub id: u32,
  pub urb_type: UrbType,
  pub flags: u32,
  pub endpoint_address: u8,
  /// Interrupt and isochronous only.
  pub interval: u32,
  /// Isochronous only.
  pub number_of_packets: u32,
  pub transfer_length: u32,
  /// Control only.
  pub setup_packet: Option<SetupPacket>,
}

impl Urb {
  pub fn new(id: u32, urb_type: UrbType, endpoint_address: u8) -> Self {
    Urb {
      id,
      urb_type,
      flags: 0,
      endpoint_address,
      interval: 0,
      number_of_packets: 0,
      transfer_length: 0,
      setup_packet: None,
    }
  }

  pub fn control(id: u32, endpoint_address: u8, setup: SetupPacket) -> Self {
    Urb {
      setup_packet: Some(setup),
      transfer_length: setup.length as u32,
      ..Urb::new(id, UrbType::Control, endpoint_address)
    }
  }
}

impl fmt::Display for Urb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "id = {}, type = {}, flags = 0x{:X}, ep = 0x{:02X}",
      self.id,
      self.urb_type.as_str(),
      self.flags,
      self.endpoint_address
    )?;

    match (self.urb_type, &self.setup_packet) {
      (UrbType::Int, _) => write!(
        f,
        ", interval = {}, buff = ({})",
        self.interval, self.transfer_length
      ),
      (UrbType::Iso, _) => write!(
        f,
        ", num_packets = {}, interval = {}, buff = ({})",
        self.number_of_packets, self.interval, self.transfer_length
      ),
      (UrbType::Control, Some(setup)) => write!(
        f,
        ", bRequestType = {}, bRequest = {}, wValue = {}, wIndex = {}, \
         buff = ({})",
        setup.fields(),
        request_name(setup.request),
        setup.value,
        setup.index,
        setup.length
      ),
      _ => write!(f, ", buff = ({})", self.transfer_length),
    }
  }
}

// Like snprintf: keeps what fits and drops the rest.
struct Truncating<'a> {
  buf: &'a mut [u8],
  pos: usize,
}

impl<'a> Write for Truncating<'a> {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    let room = self.buf.len() - self.pos;
    let n = s.len().min(room);
    self.buf[self.pos..self.pos + n].copy_from_slice(&s.as_bytes()[..n]);
    self.pos += n;
    Ok(())
  }
}

/// Renders `urb` into `buf` as a NUL terminated string and returns the text
/// part. Output that does not fit is cut off; on failure the result is empty.
pub fn render_into<'a>(urb: &Urb, buf: &'a mut [u8]) -> &'a str {
  let cap = match buf.len().checked_sub(1) {
    Some(cap) => cap,
    None => return "",
  };

  let mut w = Truncating {
    buf: &mut buf[..cap],
    pos: 0,
  };
  let len = match write!(w, "{}", urb) {
    Ok(()) => w.pos,
    Err(_) => 0,
  };
  buf[len] = 0;
  let buf: &'a [u8] = buf;

  // Everything rendered is ASCII, so a cut never splits a character.
  std::str::from_utf8(&buf[..len]).unwrap_or("")
}
