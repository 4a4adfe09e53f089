use crate::capabilities::EndpointCapabilities;
use crate::source::CapabilitySource;
use crate::urb::Urb;
use crate::Error;
use crate::Result;

/// Behaviour the gadget runtime drives an endpoint with. Every hook is
/// optional; one left unimplemented fails with `Error::UnboundCapability`.
pub trait EndpointHandler {
  fn enable(
    &mut self,
    _caps: &EndpointCapabilities,
    _value: bool,
  ) -> Result<()> {
    Err(Error::UnboundCapability("enable"))
  }

  fn enqueue(&mut self, _urb: &Urb) -> Result<()> {
    Err(Error::UnboundCapability("enqueue"))
  }

  fn dequeue(&mut self, _urb: &Urb) -> Result<()> {
    Err(Error::UnboundCapability("dequeue"))
  }

  fn clear_stall(&mut self) -> Result<()> {
    Err(Error::UnboundCapability("clear_stall"))
  }

  fn destroy(&mut self) -> Result<()> {
    Err(Error::UnboundCapability("destroy"))
  }
}

/// Handler for endpoints nobody has attached behaviour to yet.
pub struct Unbound;

impl EndpointHandler for Unbound {}

/// A gadget endpoint: validated capabilities plus the handler they were
/// bound to. Dropping the endpoint releases its descriptors.
pub struct Endpoint {
  caps: EndpointCapabilities,
  handler: Box<dyn EndpointHandler>,
}

impl Endpoint {
  pub fn new<S, H>(source: &S, handler: H) -> Result<Self>
  where
    S: CapabilitySource + ?Sized,
    H: EndpointHandler + 'static,
  {
    let caps = EndpointCapabilities::from_source(source)?;

    log::debug!(
      "endpoint 0x{:02X}: {:?} {:?}, max packet {}, {} descriptor(s)",
      caps.address,
      caps.transfer_type,
      caps.direction,
      caps.max_packet_size,
      caps.descriptors.len()
    );

    Ok(Endpoint {
      caps,
      handler: Box::new(handler),
    })
  }

  pub fn unbound<S: CapabilitySource + ?Sized>(source: &S) -> Result<Self> {
    Self::new(source, Unbound)
  }

  pub fn caps(&self) -> &EndpointCapabilities {
    &self.caps
  }

  pub fn enable(&mut self, value: bool) -> Result<()> {
    let res = self.handler.enable(&self.caps, value);
    self.trace("enable", res)
  }

  pub fn enqueue(&mut self, urb: &Urb) -> Result<()> {
    log::trace!("ep 0x{:02X} enqueue: {}", self.caps.address, urb);
    let res = self.handler.enqueue(urb);
    self.trace("enqueue", res)
  }

  pub fn dequeue(&mut self, urb: &Urb) -> Result<()> {
    log::trace!("ep 0x{:02X} dequeue: {}", self.caps.address, urb);
    let res = self.handler.dequeue(urb);
    self.trace("dequeue", res)
  }

  pub fn clear_stall(&mut self) -> Result<()> {
    let res = self.handler.clear_stall();
    self.trace("clear_stall", res)
  }

  /// Runs the `destroy` hook and consumes the endpoint.
  pub fn destroy(mut self) -> Result<()> {
    let res = self.handler.destroy();
    self.trace("destroy", res)
  }

  fn trace(&self, hook: &str, res: Result<()>) -> Result<()> {
    if let Err(Error::UnboundCapability(_)) = &res {
      log::warn!("ep 0x{:02X}: {} is not bound", self.caps.address, hook);
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use super::*;
  use crate::constants::*;
  use crate::source::Description;
  use crate::urb::UrbType;

  struct Calls(Rc<RefCell<Vec<String>>>);

  impl EndpointHandler for Calls {
    fn enable(
      &mut self,
      caps: &EndpointCapabilities,
      value: bool,
    ) -> Result<()> {
      self
        .0
        .borrow_mut()
        .push(format!("enable 0x{:02X} {}", caps.address, value));
      Ok(())
    }

    fn enqueue(&mut self, urb: &Urb) -> Result<()> {
      self.0.borrow_mut().push(format!("enqueue {}", urb.id));
      Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
      self.0.borrow_mut().push("destroy".to_string());
      Ok(())
    }
  }

  fn bulk_in() -> Description {
    Description::new()
      .with("address", 0x81)
      .with("dir", EP_IN)
      .with("type", EP_BULK)
      .with("max_packet_size", 512)
      .with("interval", 0)
  }

  #[test]
  fn test_bound_hooks() -> crate::Result<()> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut ep = Endpoint::new(&bulk_in(), Calls(calls.clone()))?;

    assert!(ep.caps().descriptors.is_empty());
    ep.enable(true)?;
    ep.enqueue(&Urb::new(5, UrbType::Bulk, 0x81))?;
    assert_eq!(
      ep.dequeue(&Urb::new(5, UrbType::Bulk, 0x81)),
      Err(Error::UnboundCapability("dequeue"))
    );
    assert_eq!(
      ep.clear_stall(),
      Err(Error::UnboundCapability("clear_stall"))
    );
    ep.destroy()?;

    assert_eq!(
      *calls.borrow(),
      vec!["enable 0x81 true", "enqueue 5", "destroy"]
    );
    Ok(())
  }

  #[test]
  fn test_unbound_endpoint() -> crate::Result<()> {
    let mut ep = Endpoint::unbound(&bulk_in())?;

    assert_eq!(ep.enable(true), Err(Error::UnboundCapability("enable")));
    assert_eq!(
      ep.enqueue(&Urb::new(1, UrbType::Bulk, 0x81)),
      Err(Error::UnboundCapability("enqueue"))
    );
    assert_eq!(ep.destroy(), Err(Error::UnboundCapability("destroy")));
    Ok(())
  }

  #[test]
  fn test_rejected_description() {
    let desc = bulk_in().with("type", "bulk");
    match Endpoint::unbound(&desc) {
      Err(Error::TypeMismatch(field)) => assert_eq!(field, "type"),
      Err(err) => panic!("unexpected error {}", err),
      Ok(_) => panic!("description should be rejected"),
    }
  }
}
