/// Raw time-stamp counter on x86_64.
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn read_cycle_counter() -> u64 {
    // SAFETY: rdtsc has no preconditions on x86_64.
    unsafe { core::arch::x86_64::_rdtsc() }
}

/// Monotonic nanoseconds since first use, standing in for a cycle counter.
#[cfg(not(target_arch = "x86_64"))]
#[inline]
pub fn read_cycle_counter() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_nanos() as u64
}
