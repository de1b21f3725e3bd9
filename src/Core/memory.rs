// Page residency helpers: keep the hot path free of page faults

use std::io;

/// Fallback when the OS will not tell us.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Lock every current and future page of the process into RAM.
///
/// Usually needs `CAP_IPC_LOCK` or a generous `RLIMIT_MEMLOCK`.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn lock_all_memory() -> io::Result<()> {
    let rc = unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn lock_all_memory() -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "mlockall is only wired up on Linux",
    ))
}

#[cfg(unix)]
pub fn page_size() -> usize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        DEFAULT_PAGE_SIZE
    } else {
        size as usize
    }
}

#[cfg(not(unix))]
pub fn page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Touch one byte per page of `buf` with a volatile read-write so every page
/// is mapped and dirty before latency-sensitive code runs. Contents are
/// unchanged.
pub fn prefault_bytes(buf: &mut [u8]) {
    let page = page_size();
    let mut offset = 0;
    while offset < buf.len() {
        let byte: *mut u8 = &mut buf[offset];
        // SAFETY: `byte` points into `buf`, which we borrow mutably.
        unsafe { byte.write_volatile(byte.read_volatile()) };
        offset += page;
    }
}
