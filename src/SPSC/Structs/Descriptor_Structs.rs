// This is the fixed-size record carried by the inbound ring

/// One received event as described by the source.
///
/// `#[repr(C)]` so the layout matches a NIC/driver descriptor: 16 bytes,
/// no interior padding. Only `truncated_ts` is interpreted by the pipeline;
/// the payload fields are carried opaquely.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventDescriptor {
    /// Address of the payload (e.g. in a huge-page packet pool).
    pub payload_addr: u64,
    pub payload_len: u32,
    /// Low-order bits of the hardware timestamp, as written by the device.
    pub truncated_ts: u32,
}

impl EventDescriptor {
    pub fn new(payload_addr: u64, payload_len: u32, truncated_ts: u32) -> Self {
        Self {
            payload_addr,
            payload_len,
            truncated_ts,
        }
    }
}
