// In demos/extend_once.rs
//
// Unwrap one fixed sequence that crosses a 20-bit rollover.
use hwts_pipeline::{TimestampExtender, TruncatedField};

fn main() {
    let base = 0x0000_0000_001F_F000u64;
    let input: [u32; 4] = [0x1FF000, 0x000010, 0x000020, 0x100005];

    let mut output = [0u64; 4];

    let mut extender = TimestampExtender::new(base, TruncatedField::default());
    extender.extend_batched(&input, &mut output);

    println!("Seed: {:#018x}", base);
    println!("Output:");
    for (i, (raw, full)) in input.iter().zip(&output).enumerate() {
        println!("  [{}] {:#08x} -> {:#018x}", i, raw, full);
    }
    println!("State after: {:?}", extender);
}
