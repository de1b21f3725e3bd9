// In demos/timestamp_engine.rs
//
// Full pipeline against the synthetic packet generator:
//   cargo run --release --example timestamp_engine -- [num_packets]
use hwts_pipeline::Core::affinity::available_cores;
use hwts_pipeline::Engine::builder::DEFAULT_SEED;
use hwts_pipeline::{Pipeline, RecordingSink, ShutdownSignal, SyntheticSource};
use std::env;

const SIMULATED_PACKETS: u64 = 1_000_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let packets = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => SIMULATED_PACKETS,
    };

    let shutdown = ShutdownSignal::new();
    let shutdown_for_handler = shutdown.clone();

    // Handle Ctrl+C by asking every stage to stop
    ctrlc::set_handler(move || {
        shutdown_for_handler.request();
    })?;

    let mut builder = Pipeline::builder()
        .with_seed(DEFAULT_SEED)
        .with_expected(packets)
        .with_memory_lock(true)
        .with_shutdown(shutdown);
    if available_cores() >= 3 {
        builder = builder.with_core_affinity([0, 1, 2]);
    }
    let pipeline = builder.build()?;

    println!("HFT Timestamp Engine Starting...");
    println!(
        "Field: {} bits, unwrap: {}-lane batched",
        pipeline.config().field.width(),
        hwts_pipeline::Timestamp::LANES
    );
    println!(
        "Rings: {} descriptors inbound, {} timestamps outbound, burst {}",
        pipeline.config().inbound_capacity,
        pipeline.config().outbound_capacity,
        pipeline.config().burst
    );
    println!("Threads: source -> extender -> sink\n");

    let source = SyntheticSource::new(DEFAULT_SEED, packets, pipeline.config().field);
    let (report, sink) = pipeline.run(source, RecordingSink::default())?;

    println!("=== First {} Timestamps ===", sink.first().len());
    for (i, ts) in sink.first().iter().enumerate() {
        println!("  [{}] {:#x}", i, ts);
    }

    let last = sink.last();
    let offset = sink.count() - last.len() as u64;
    println!("\n=== Last {} Timestamps ===", last.len());
    for (i, ts) in last.iter().enumerate() {
        println!("  [{}] {:#x}", offset + i as u64, ts);
    }

    println!("\nSink: {} timestamps delivered", report.delivered());
    if report.shutdown_requested {
        println!(
            "Interrupted: {} dropped, {} still queued",
            report.dropped(),
            report.inbound_resident + report.outbound_resident
        );
    }
    println!(
        "Performance: {:.2} cycles per packet, {:.2} ns per packet",
        report.cycles_per_item(),
        report.nanos_per_item()
    );

    Ok(())
}
