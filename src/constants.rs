// Values shared with the gadget runtime. These must stay bit-for-bit
// identical to what the C side uses.

pub const RESULT_SUCCESS: i32 = 0;
pub const RESULT_NOMEM: i32 = 1;
pub const RESULT_MISUSE: i32 = 2;
pub const RESULT_UNKNOWN: i32 = 3;
pub const RESULT_NOT_FOUND: i32 = 4;
pub const RESULT_BUSY: i32 = 5;
pub const RESULT_PROTOCOL_ERROR: i32 = 6;

pub const SPEED_LOW: i32 = 1;
pub const SPEED_FULL: i32 = 2;
pub const SPEED_HIGH: i32 = 3;

pub const EP_IN: i32 = 1 << 0;
pub const EP_OUT: i32 = 1 << 1;
pub const EP_INOUT: i32 = EP_IN | EP_OUT;

pub const EP_CONTROL: i32 = 0;
pub const EP_ISO: i32 = 1;
pub const EP_BULK: i32 = 2;
pub const EP_INT: i32 = 3;

pub const EP_SYNC_NONE: i32 = 0;
pub const EP_SYNC_ASYNC: i32 = 1;
pub const EP_SYNC_ADAPTIVE: i32 = 2;
pub const EP_SYNC_SYNC: i32 = 3;

pub const EP_USAGE_DATA: i32 = 0;
pub const EP_USAGE_FEEDBACK: i32 = 1;
pub const EP_USAGE_IMPLICIT_FB: i32 = 2;

/// `bLength` + `bDescriptorType`.
pub const DESCRIPTOR_HEADER_SIZE: usize = 2;
pub const DESCRIPTOR_MAX_LENGTH: usize = u8::MAX as usize;

pub const REQUEST_TYPE_DIR_IN: u8 = 0x80;
pub const REQUEST_TYPE_TYPE_MASK: u8 = 0x60;
pub const REQUEST_TYPE_TYPE_SHIFT: u8 = 5;
pub const REQUEST_TYPE_RECIPIENT_MASK: u8 = 0x1F;

pub const REQUEST_GET_STATUS: u8 = 0x00;
pub const REQUEST_CLEAR_FEATURE: u8 = 0x01;
pub const REQUEST_SET_FEATURE: u8 = 0x03;
pub const REQUEST_SET_ADDRESS: u8 = 0x05;
pub const REQUEST_GET_DESCRIPTOR: u8 = 0x06;
pub const REQUEST_SET_DESCRIPTOR: u8 = 0x07;
pub const REQUEST_GET_CONFIGURATION: u8 = 0x08;
pub const REQUEST_SET_CONFIGURATION: u8 = 0x09;
pub const REQUEST_GET_INTERFACE: u8 = 0x0A;
pub const REQUEST_SET_INTERFACE: u8 = 0x0B;
pub const REQUEST_SYNCH_FRAME: u8 = 0x0C;
pub const REQUEST_SET_ENCRYPTION: u8 = 0x0D;
pub const REQUEST_GET_ENCRYPTION: u8 = 0x0E;
pub const REQUEST_SET_HANDSHAKE: u8 = 0x0F;
pub const REQUEST_GET_HANDSHAKE: u8 = 0x10;
pub const REQUEST_SET_CONNECTION: u8 = 0x11;
pub const REQUEST_SET_SECURITY_DATA: u8 = 0x12;
pub const REQUEST_GET_SECURITY_DATA: u8 = 0x13;
pub const REQUEST_SET_WUSB_DATA: u8 = 0x14;
pub const REQUEST_LOOPBACK_DATA_WRITE: u8 = 0x15;
pub const REQUEST_LOOPBACK_DATA_READ: u8 = 0x16;
pub const REQUEST_SET_INTERFACE_DS: u8 = 0x17;
