use core::convert::TryFrom;

#[cfg(feature = "serde_derive")]
use serde::Serialize;

use crate::constants::*;
use crate::descriptors::DescriptorList;
use crate::source::CapabilitySource;
use crate::Error;
use crate::Result;

macro_rules! field_enum {
  (
    $(#[$meta:meta])*
    $name:ident { $($variant:ident = $value:expr),+ $(,)? }
  ) => {
    $(#[$meta])*
    #[cfg_attr(feature = "serde_derive", derive(Serialize))]
    #[cfg_attr(feature = "serde_derive", serde(rename_all = "lowercase"))]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(i32)]
    pub enum $name {
      $($variant = $value),+
    }

    impl TryFrom<i64> for $name {
      type Error = ();

      fn try_from(value: i64) -> std::result::Result<Self, ()> {
        match value {
          $(v if v == $value as i64 => Ok($name::$variant),)+
          _ => Err(()),
        }
      }
    }
  };
}

field_enum!(Direction {
  In = EP_IN,
  Out = EP_OUT,
  InOut = EP_INOUT,
});

field_enum!(TransferType {
  Control = EP_CONTROL,
  Iso = EP_ISO,
  Bulk = EP_BULK,
  Int = EP_INT,
});

field_enum!(
  /// Isochronous synchronization type.
  SyncType {
    None = EP_SYNC_NONE,
    Async = EP_SYNC_ASYNC,
    Adaptive = EP_SYNC_ADAPTIVE,
    Sync = EP_SYNC_SYNC,
  }
);

field_enum!(
  /// Isochronous usage type.
  UsageType {
    Data = EP_USAGE_DATA,
    Feedback = EP_USAGE_FEEDBACK,
    ImplicitFeedback = EP_USAGE_IMPLICIT_FB,
  }
);

// Values left in fields that were skipped after an earlier failure.
impl Default for Direction {
  fn default() -> Self {
    Direction::In
  }
}

impl Default for TransferType {
  fn default() -> Self {
    TransferType::Control
  }
}

impl Default for SyncType {
  fn default() -> Self {
    SyncType::None
  }
}

impl Default for UsageType {
  fn default() -> Self {
    UsageType::Data
  }
}

/// Validated description of a gadget endpoint.
#[cfg_attr(feature = "serde_derive", derive(Serialize))]
#[cfg_attr(feature = "serde_derive", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCapabilities {
  pub address: u8,
  pub direction: Direction,
  pub transfer_type: TransferType,
  /// Only set for isochronous endpoints.
  pub sync_type: Option<SyncType>,
  /// Only set for isochronous endpoints.
  pub usage_type: Option<UsageType>,
  pub max_packet_size: u16,
  pub interval: u8,
  pub descriptors: DescriptorList,
}

/// Reads fields one after another. After the first failure nothing more is
/// read from the source and every later field gets its default.
struct FieldReader<'a, S: ?Sized> {
  source: &'a S,
  error: Option<Error>,
}

impl<'a, S: CapabilitySource + ?Sized> FieldReader<'a, S> {
  fn new(source: &'a S) -> Self {
    FieldReader {
      source,
      error: None,
    }
  }

  fn read<T: Default>(&mut self, read: impl FnOnce(&S) -> Result<T>) -> T {
    if self.error.is_some() {
      return T::default();
    }

    match read(self.source) {
      Ok(value) => value,
      Err(err) => {
        self.error = Some(err);
        T::default()
      }
    }
  }

  fn numeric(&mut self, name: &str) -> i64 {
    self.read(|source| source.get_numeric(name))
  }

  fn enumerated<T: TryFrom<i64> + Default>(&mut self, name: &str) -> T {
    self.read(|source| {
      T::try_from(source.get_numeric(name)?)
        .map_err(|_| Error::InvalidEnumValue(name.to_string()))
    })
  }

  fn descriptors(&mut self, name: &str) -> DescriptorList {
    self.read(|source| DescriptorList::materialize(source.get_sequence(name)?))
  }

  fn finish(self) -> Result<()> {
    match self.error {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }
}

impl EndpointCapabilities {
  /// Validates a description field by field and reports the first failure.
  pub fn from_source<S: CapabilitySource + ?Sized>(source: &S) -> Result<Self> {
    let mut fields = FieldReader::new(source);

    let address = fields.numeric("address");
    let direction = fields.enumerated::<Direction>("dir");
    let transfer_type = fields.enumerated::<TransferType>("type");
    let (sync_type, usage_type) = if transfer_type == TransferType::Iso {
      (
        Some(fields.enumerated::<SyncType>("sync")),
        Some(fields.enumerated::<UsageType>("usage")),
      )
    } else {
      (None, None)
    };
    let max_packet_size = fields.numeric("max_packet_size");
    let interval = fields.numeric("interval");
    let descriptors = fields.descriptors("descriptors");

    if let Err(err) = fields.finish() {
      log::warn!("rejected endpoint description: {}", err);
      return Err(err);
    }

    Ok(EndpointCapabilities {
      address: address as u8,
      direction,
      transfer_type,
      sync_type,
      usage_type,
      max_packet_size: max_packet_size as u16,
      interval: interval as u8,
      descriptors,
    })
  }

  pub fn is_iso(&self) -> bool {
    self.transfer_type == TransferType::Iso
  }
}

#[cfg(feature = "libusb")]
mod libusb {
  use super::*;

  impl From<rusb::Direction> for Direction {
    fn from(direction: rusb::Direction) -> Self {
      match direction {
        rusb::Direction::In => Direction::In,
        rusb::Direction::Out => Direction::Out,
      }
    }
  }

  impl From<rusb::TransferType> for TransferType {
    fn from(ty: rusb::TransferType) -> Self {
      match ty {
        rusb::TransferType::Control => TransferType::Control,
        rusb::TransferType::Isochronous => TransferType::Iso,
        rusb::TransferType::Bulk => TransferType::Bulk,
        rusb::TransferType::Interrupt => TransferType::Int,
      }
    }
  }

  impl From<rusb::SyncType> for SyncType {
    fn from(ty: rusb::SyncType) -> Self {
      match ty {
        rusb::SyncType::NoSync => SyncType::None,
        rusb::SyncType::Asynchronous => SyncType::Async,
        rusb::SyncType::Adaptive => SyncType::Adaptive,
        rusb::SyncType::Synchronous => SyncType::Sync,
      }
    }
  }

  impl TryFrom<rusb::UsageType> for UsageType {
    type Error = Error;

    fn try_from(ty: rusb::UsageType) -> Result<Self> {
      match ty {
        rusb::UsageType::Data => Ok(UsageType::Data),
        rusb::UsageType::Feedback => Ok(UsageType::Feedback),
        rusb::UsageType::FeedbackData => Ok(UsageType::ImplicitFeedback),
        rusb::UsageType::Reserved => {
          Err(Error::InvalidEnumValue("usage".to_string()))
        }
      }
    }
  }

  /// Mirrors an endpoint of a real device, including any class specific
  /// descriptors that follow it in the configuration.
  impl<'a> TryFrom<&rusb::EndpointDescriptor<'a>> for EndpointCapabilities {
    type Error = Error;

    fn try_from(e: &rusb::EndpointDescriptor<'a>) -> Result<Self> {
      let transfer_type = TransferType::from(e.transfer_type());
      let (sync_type, usage_type) = if transfer_type == TransferType::Iso {
        (
          Some(SyncType::from(e.sync_type())),
          Some(UsageType::try_from(e.usage_type())?),
        )
      } else {
        (None, None)
      };

      Ok(EndpointCapabilities {
        address: e.address(),
        direction: Direction::from(e.direction()),
        transfer_type,
        sync_type,
        usage_type,
        max_packet_size: e.max_packet_size(),
        interval: e.interval(),
        descriptors: match e.extra() {
          Some(extra) => DescriptorList::parse(extra)?,
          None => DescriptorList::new(),
        },
      })
    }
  }
}
