use hwts_pipeline::BoundedRing;
use std::thread;

#[test]
fn spsc_bulk_correctness_random_batches() {
    let capacity = 64;
    let total = 200_000u64;
    let (mut tx, mut rx) = BoundedRing::<u64>::split(capacity).unwrap();

    let producer = thread::spawn(move || {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut batch = Vec::with_capacity(capacity * 2);
        let mut next = 0u64;
        let mut pushed_total = 0u64;
        while next < total {
            // Sometimes ask for more than the ring can ever hold
            let want = rng.usize(1..=capacity * 2).min((total - next) as usize);
            batch.clear();
            batch.extend(next..next + want as u64);

            let pushed = tx.try_push_bulk(&batch);
            assert!(pushed <= want);
            next += pushed as u64;
            pushed_total += pushed as u64;
            if pushed == 0 {
                thread::yield_now();
            }
        }
        pushed_total
    });

    let consumer = thread::spawn(move || {
        let mut rng = fastrand::Rng::with_seed(0xfeed);
        let mut out = vec![0u64; capacity * 2];
        let mut expected = 0u64;
        while expected < total {
            let want = rng.usize(1..=capacity * 2);
            let popped = rx.try_pop_bulk(&mut out[..want]);
            assert!(popped <= want);
            for &v in &out[..popped] {
                assert_eq!(v, expected, "out of order or duplicated");
                expected += 1;
            }
            if popped == 0 {
                thread::yield_now();
            }
        }
        assert_eq!(rx.try_pop(), None);
        expected
    });

    let pushed = producer.join().unwrap();
    let popped = consumer.join().unwrap();
    assert_eq!(pushed, total);
    assert_eq!(popped, total);
}

#[test]
fn spsc_mixed_single_and_bulk() {
    let (mut tx, mut rx) = BoundedRing::<u64>::split(16).unwrap();
    let total = 50_000u64;

    let producer = thread::spawn(move || {
        let mut next = 0u64;
        while next < total {
            if next % 3 == 0 {
                if tx.try_push(next) {
                    next += 1;
                }
            } else {
                let end = (next + 7).min(total);
                let batch: Vec<u64> = (next..end).collect();
                next += tx.try_push_bulk(&batch) as u64;
            }
            std::hint::spin_loop();
        }
    });

    let consumer = thread::spawn(move || {
        let mut out = [0u64; 5];
        let mut expected = 0u64;
        while expected < total {
            if expected % 2 == 0 {
                if let Some(v) = rx.try_pop() {
                    assert_eq!(v, expected);
                    expected += 1;
                }
            } else {
                let n = rx.try_pop_bulk(&mut out);
                for &v in &out[..n] {
                    assert_eq!(v, expected);
                    expected += 1;
                }
            }
            std::hint::spin_loop();
        }
    });

    producer.join().unwrap();
    consumer.join().unwrap();
}

#[test]
fn spsc_throughput_print() {
    let (mut tx, mut rx) = BoundedRing::<u64>::split(4096).unwrap();
    let count = 1_000_000u64;
    let start = std::time::Instant::now();

    let p = thread::spawn(move || {
        let batch: Vec<u64> = (0..32).collect();
        let mut sent = 0u64;
        while sent < count {
            let want = (count - sent).min(32) as usize;
            sent += tx.try_push_bulk(&batch[..want]) as u64;
        }
    });

    let c = thread::spawn(move || {
        let mut out = [0u64; 32];
        let mut rx_count = 0u64;
        while rx_count < count {
            rx_count += rx.try_pop_bulk(&mut out) as u64;
        }
    });

    p.join().unwrap();
    c.join().unwrap();

    let elapsed = start.elapsed();
    println!(
        "Throughput: {:.2} million items/sec",
        (count as f64 / elapsed.as_secs_f64()) / 1_000_000.0
    );
}
