// Allocation tracking for the hot-path operations.
//
// dhat only allows one profiler at a time, so every test here is
// #[serial_test::serial].
//
// cargo test --test allocation_tracking -- --nocapture

use hwts_pipeline::{BoundedRing, EventDescriptor, RecordingSink, TimestampExtender, TimestampSink, TruncatedField};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn blocks_during(f: impl FnOnce()) -> u64 {
    let before = dhat::HeapStats::get();
    f();
    let after = dhat::HeapStats::get();
    after.total_blocks - before.total_blocks
}

#[test]
#[serial_test::serial]
fn ring_operations_do_not_allocate() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let (mut tx, mut rx) = BoundedRing::<EventDescriptor>::split(1024).unwrap();
    let burst = vec![EventDescriptor::new(1, 64, 7); 32];
    let mut out = vec![EventDescriptor::default(); 32];

    let blocks = blocks_during(|| {
        for i in 0..10_000u32 {
            assert!(tx.try_push(EventDescriptor::new(u64::from(i), 64, i)));
            assert_eq!(rx.try_pop().map(|d| d.truncated_ts), Some(i));

            assert_eq!(tx.try_push_bulk(&burst), 32);
            assert_eq!(rx.try_pop_bulk(&mut out), 32);
        }
    });
    println!("ring push/pop: {blocks} new heap blocks");
    assert_eq!(blocks, 0);
}

#[test]
#[serial_test::serial]
fn extension_and_recording_do_not_allocate() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let field = TruncatedField::default();
    let mut extender = TimestampExtender::new(0x1F_F000, field);
    let raw: Vec<u32> = (0..4_099u32).map(|i| field.truncate(u64::from(i) * 977)).collect();
    let descs: Vec<EventDescriptor> = raw.iter().map(|&t| EventDescriptor::new(0, 64, t)).collect();
    let mut out = vec![0u64; raw.len()];

    let mut sink = RecordingSink::default();
    // Fill the head and tail buffers first
    for ts in 0..RecordingSink::DEFAULT_KEEP as u64 * 2 {
        sink.deliver(ts);
    }

    let blocks = blocks_during(|| {
        for _ in 0..50 {
            extender.extend_batched(&raw, &mut out);
            extender.extend_descriptors(&descs, &mut out);
            extender.extend(&raw, &mut out);
            for &ts in &out {
                sink.deliver(ts);
            }
        }
    });
    println!("extend + deliver: {blocks} new heap blocks");
    assert_eq!(blocks, 0);
    assert_eq!(sink.count(), 20 + 50 * raw.len() as u64);
}
