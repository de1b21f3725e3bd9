// Layout conformance tests for the descriptor shared with the device side.
// They assert size, alignment and field offsets, and print the observed
// values to aid debugging when a mismatch occurs on a given platform.
use hwts_pipeline::EventDescriptor;
use memoffset::offset_of;
use std::mem::{align_of, size_of};

#[test]
fn test_event_descriptor_layout() {
    let raw = 8 + 4 + 4; // 16 bytes of fields, no padding needed

    let size = size_of::<EventDescriptor>();
    let align = align_of::<EventDescriptor>();
    let off_payload_addr = offset_of!(EventDescriptor, payload_addr);
    let off_payload_len = offset_of!(EventDescriptor, payload_len);
    let off_truncated_ts = offset_of!(EventDescriptor, truncated_ts);

    println!(
        "EventDescriptor => size: {size}, expected: {raw}, align: {align}, offsets: [payload_addr:{off_payload_addr}, payload_len:{off_payload_len}, truncated_ts:{off_truncated_ts}]"
    );

    assert_eq!(size, raw);
    assert_eq!(align, align_of::<u64>());
    assert_eq!(off_payload_addr, 0);
    assert_eq!(off_payload_len, 8);
    assert_eq!(off_truncated_ts, 12);
}

#[test]
fn test_burst_of_descriptors_fits_cache_lines() {
    // 32 descriptors = 512 bytes = 8 x 64-byte lines
    assert_eq!(32 * size_of::<EventDescriptor>(), 8 * 64);
}
