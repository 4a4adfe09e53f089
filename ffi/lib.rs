//! C ABI for the gadget runtime.
//!
//! Descriptor lists cross the boundary in their classic shape: a NULL
//! terminated array of pointers, each to a `bLength`/`bDescriptorType`
//! record followed by its payload.

use std::convert::TryFrom;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::os::raw::c_int;
use std::ptr;

use vdpusb::constants::*;
use vdpusb::urb::render_into;
use vdpusb::DescriptorList;
use vdpusb::EndpointCapabilities;
use vdpusb::ResultCode;
use vdpusb::SetupPacket;
use vdpusb::Urb;
use vdpusb::UrbType;

macro_rules! c_ffi {
  (fn $name:ident($($arg:ident: $arg_type:ty),*) -> Result<$ret_type:ty, ()> { $($body:tt)* }) => {
    #[no_mangle]
    pub extern "C" fn $name($($arg: $arg_type),*) -> $ret_type {
      let res: Result<$ret_type, ()> = (|| { $($body)* })();
      match res {
        Ok(v) => v,
        Err(_) => Default::default(),
      }
    }
  };
  (status fn $name:ident($($arg:ident: $arg_type:ty),*) { $($body:tt)* }) => {
    #[no_mangle]
    pub extern "C" fn $name($($arg: $arg_type),*) -> i32 {
      let res: vdpusb::Result<()> = (|| { $($body)* })();
      match res {
        Ok(()) => RESULT_SUCCESS,
        Err(err) => {
          log::warn!("{}: {}", stringify!($name), err);
          err.code() as i32
        }
      }
    }
  };
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct VdpUsbSetupPacket {
  pub b_request_type: u8,
  pub b_request: u8,
  pub w_value: u16,
  pub w_index: u16,
  pub w_length: u16,
}

#[repr(C)]
pub struct VdpUsbUrb {
  pub id: u32,
  pub urb_type: i32,
  pub flags: u32,
  pub endpoint_address: u8,
  pub interval: u32,
  pub number_of_packets: u32,
  pub transfer_length: u32,
  /// Only read for control URBs; may be NULL otherwise.
  pub setup_packet: *const VdpUsbSetupPacket,
}

#[repr(C)]
pub struct VdpUsbEndpointCaps {
  pub address: u8,
  pub dir: c_int,
  pub type_: c_int,
  pub sync: c_int,
  pub usage: c_int,
  pub max_packet_size: u16,
  pub interval: u8,
  pub descriptors: *mut *mut u8,
}

/// Lays `list` out as a NULL terminated array of heap records.
pub fn export_descriptors(list: &DescriptorList) -> *mut *mut u8 {
  let mut array: Vec<*mut u8> = list
    .iter()
    .map(|d| Box::into_raw(d.to_bytes().into_boxed_slice()) as *mut u8)
    .collect();
  array.push(ptr::null_mut());

  Box::into_raw(array.into_boxed_slice()) as *mut *mut u8
}

/// Frees an array made by `export_descriptors`. NULL is a no-op.
///
/// # Safety
///
/// `descriptors` must be NULL or come from `export_descriptors` and not
/// have been freed before.
pub unsafe fn free_descriptors(descriptors: *mut *mut u8) {
  if descriptors.is_null() {
    return;
  }

  let mut count = 0;
  loop {
    let record = *descriptors.add(count);
    if record.is_null() {
      break;
    }
    let length = *record as usize;
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(record, length)));
    count += 1;
  }

  drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
    descriptors,
    count + 1,
  )));
}

fn urb_from_c(urb: &VdpUsbUrb) -> vdpusb::Result<Urb> {
  let urb_type = UrbType::try_from(urb.urb_type)?;
  let setup_packet = if urb_type == UrbType::Control {
    unsafe { urb.setup_packet.as_ref() }.map(|s| SetupPacket {
      request_type: s.b_request_type,
      request: s.b_request,
      value: s.w_value,
      index: s.w_index,
      length: s.w_length,
    })
  } else {
    None
  };

  Ok(Urb {
    id: urb.id,
    urb_type,
    flags: urb.flags,
    endpoint_address: urb.endpoint_address,
    interval: urb.interval,
    number_of_packets: urb.number_of_packets,
    transfer_length: urb.transfer_length,
    setup_packet,
  })
}

c_ffi!(
  fn vdpusb_urb_to_str(
    urb: *const VdpUsbUrb,
    buff: *mut c_char,
    buff_size: usize
  ) -> Result<(), ()> {
    if buff.is_null() || buff_size == 0 {
      return Err(());
    }
    let buf =
      unsafe { std::slice::from_raw_parts_mut(buff as *mut u8, buff_size) };
    buf[0] = 0;

    let urb = unsafe { urb.as_ref() }.ok_or(())?;
    let urb = urb_from_c(urb).map_err(|_| ())?;
    render_into(&urb, buf);
    Ok(())
  }
);

#[no_mangle]
pub extern "C" fn vdpusb_result_to_str(res: i32) -> *const c_char {
  let text: &'static [u8] = match ResultCode::try_from(res) {
    Ok(ResultCode::Success) => b"success\0",
    Ok(ResultCode::NoMem) => b"not enough memory\0",
    Ok(ResultCode::Misuse) => b"misuse\0",
    Ok(ResultCode::Unknown) => b"unknown error\0",
    Ok(ResultCode::NotFound) => b"entity not found\0",
    Ok(ResultCode::Busy) => b"device is busy\0",
    Ok(ResultCode::ProtocolError) => b"kernel-user protocol error\0",
    Err(_) => b"undefined error\0",
  };
  text.as_ptr() as *const c_char
}

c_ffi!(
  status fn vdpusb_endpoint_caps_from_json(
    json: *const c_char,
    caps: *mut VdpUsbEndpointCaps
  ) {
    if json.is_null() || caps.is_null() {
      return Err(ResultCode::Misuse.into());
    }
    let json = unsafe { CStr::from_ptr(json) };
    let description: serde_json::Value =
      serde_json::from_slice(json.to_bytes())
        .map_err(|err| vdpusb::Error::TypeMismatch(err.to_string()))?;

    let parsed = EndpointCapabilities::from_source(&description)?;

    let out = unsafe { &mut *caps };
    out.address = parsed.address;
    out.dir = parsed.direction as c_int;
    out.type_ = parsed.transfer_type as c_int;
    out.sync = parsed.sync_type.map_or(0, |s| s as c_int);
    out.usage = parsed.usage_type.map_or(0, |u| u as c_int);
    out.max_packet_size = parsed.max_packet_size;
    out.interval = parsed.interval;
    out.descriptors = export_descriptors(&parsed.descriptors);
    Ok(())
  }
);

c_ffi!(
  fn vdpusb_endpoint_caps_release(
    caps: *mut VdpUsbEndpointCaps
  ) -> Result<(), ()> {
    let caps = unsafe { caps.as_mut() }.ok_or(())?;
    unsafe { free_descriptors(caps.descriptors) };
    caps.descriptors = ptr::null_mut();
    Ok(())
  }
);

#[cfg(test)]
mod tests {
  use super::*;
  use std::ffi::CString;

  fn records(descriptors: *mut *mut u8) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    unsafe {
      let mut i = 0;
      while !(*descriptors.add(i)).is_null() {
        let record = *descriptors.add(i);
        let length = *record as usize;
        out.push(std::slice::from_raw_parts(record, length).to_vec());
        i += 1;
      }
    }
    out
  }

  fn empty_caps() -> VdpUsbEndpointCaps {
    VdpUsbEndpointCaps {
      address: 0,
      dir: 0,
      type_: 0,
      sync: 0,
      usage: 0,
      max_packet_size: 0,
      interval: 0,
      descriptors: ptr::null_mut(),
    }
  }

  #[test]
  fn test_endpoint_caps_layout() {
    let caps = empty_caps();
    let base = &caps as *const VdpUsbEndpointCaps as usize;
    let offset = |field: usize| field - base;

    assert_eq!(offset(&caps.dir as *const c_int as usize), 4);
    assert_eq!(offset(&caps.type_ as *const c_int as usize), 8);
    assert_eq!(offset(&caps.sync as *const c_int as usize), 12);
    assert_eq!(offset(&caps.usage as *const c_int as usize), 16);
    assert_eq!(offset(&caps.max_packet_size as *const u16 as usize), 20);
    assert_eq!(offset(&caps.interval as *const u8 as usize), 22);
    assert_eq!(
      offset(&caps.descriptors as *const *mut *mut u8 as usize),
      24
    );
    assert_eq!(
      std::mem::size_of::<VdpUsbEndpointCaps>(),
      24 + std::mem::size_of::<*mut *mut u8>()
    );
  }

  #[test]
  fn test_export_descriptors() {
    let list = DescriptorList::parse(&[0x03, 0x24, 0xAA, 0x02, 0xFF]).unwrap();
    let exported = export_descriptors(&list);

    assert_eq!(
      records(exported),
      vec![vec![0x03, 0x24, 0xAA], vec![0x02, 0xFF]]
    );
    unsafe {
      free_descriptors(exported);
      free_descriptors(ptr::null_mut());
    }
  }

  #[test]
  fn test_caps_from_json() {
    let json = CString::new(
      r#"{"address": 2, "dir": 2, "type": 1, "sync": 1, "usage": 0,
          "max_packet_size": 192, "interval": 1,
          "descriptors": [[37, [1, 0, 0, 0, 0]]]}"#,
    )
    .unwrap();
    let mut caps = empty_caps();

    assert_eq!(
      vdpusb_endpoint_caps_from_json(json.as_ptr(), &mut caps),
      RESULT_SUCCESS
    );
    assert_eq!(caps.dir, EP_OUT);
    assert_eq!(caps.type_, EP_ISO);
    assert_eq!(caps.sync, EP_SYNC_ASYNC);
    assert_eq!(caps.max_packet_size, 192);
    assert_eq!(records(caps.descriptors), vec![vec![7, 37, 1, 0, 0, 0, 0]]);

    vdpusb_endpoint_caps_release(&mut caps);
    assert!(caps.descriptors.is_null());
    // Releasing twice is harmless.
    vdpusb_endpoint_caps_release(&mut caps);
  }

  #[test]
  fn test_caps_from_json_rejects() {
    let json = CString::new(
      r#"{"address": 2, "dir": 2, "type": 2, "max_packet_size": 64,
          "interval": 0, "descriptors": [[37, 5]]}"#,
    )
    .unwrap();
    let mut caps = empty_caps();

    assert_eq!(
      vdpusb_endpoint_caps_from_json(json.as_ptr(), &mut caps),
      RESULT_MISUSE
    );
    assert!(caps.descriptors.is_null());
    assert_eq!(
      vdpusb_endpoint_caps_from_json(ptr::null(), &mut caps),
      RESULT_MISUSE
    );
  }

  #[test]
  fn test_urb_to_str() {
    let setup = VdpUsbSetupPacket {
      b_request_type: 0x80,
      b_request: 6,
      w_value: 0x0100,
      w_index: 0,
      w_length: 18,
    };
    let urb = VdpUsbUrb {
      id: 1,
      urb_type: UrbType::Control as i32,
      flags: 0,
      endpoint_address: 0,
      interval: 0,
      number_of_packets: 0,
      transfer_length: 18,
      setup_packet: &setup,
    };

    let mut buff = [0x55 as c_char; 32];
    vdpusb_urb_to_str(&urb, buff.as_mut_ptr(), buff.len());
    let text = unsafe { CStr::from_ptr(buff.as_ptr()) };
    assert_eq!(text.to_str().unwrap(), "id = 1, type = control, flags =");

    let bad = VdpUsbUrb { urb_type: 9, ..urb };
    vdpusb_urb_to_str(&bad, buff.as_mut_ptr(), buff.len());
    assert_eq!(buff[0], 0);
  }

  #[test]
  fn test_result_to_str() {
    let text = unsafe { CStr::from_ptr(vdpusb_result_to_str(RESULT_BUSY)) };
    assert_eq!(text.to_str().unwrap(), "device is busy");
    let text = unsafe { CStr::from_ptr(vdpusb_result_to_str(42)) };
    assert_eq!(text.to_str().unwrap(), "undefined error");
  }
}
