//! Process resource readings for the portable profilers.

use std::time::Duration;

/// CPU time consumed by this process so far.
#[cfg(target_os = "linux")]
pub(crate) fn process_cpu_time() -> Option<Duration> {
    // /proc/self/stat fields 14 and 15 are utime and stime in clock ticks.
    // The command name (field 2) may contain spaces; skip past its closing
    // parenthesis before splitting.
    let stat = std::fs::read_to_string("/proc/self/stat").ok()?;
    let rest = stat.get(stat.rfind(')')? + 1..)?;
    let fields: Vec<&str> = rest.split_whitespace().collect();

    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;

    const CLOCK_TICKS_PER_SEC: u64 = 100;
    Some(Duration::from_millis(
        (utime + stime) * 1000 / CLOCK_TICKS_PER_SEC,
    ))
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn process_cpu_time() -> Option<Duration> {
    None
}

/// Memory usage of this process: (virtual bytes, resident bytes).
#[cfg(target_os = "linux")]
pub(crate) fn process_memory() -> Option<(u64, u64)> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let mut fields = statm.split_whitespace();
    let size_pages: u64 = fields.next()?.parse().ok()?;
    let resident_pages: u64 = fields.next()?.parse().ok()?;

    const PAGE_SIZE: u64 = 4096;
    Some((size_pages * PAGE_SIZE, resident_pages * PAGE_SIZE))
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn process_memory() -> Option<(u64, u64)> {
    None
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_time_is_readable() {
        assert!(process_cpu_time().is_some());
    }

    #[test]
    fn test_memory_readings_are_sane() {
        let (virtual_bytes, resident_bytes) = process_memory().unwrap();
        assert!(virtual_bytes >= resident_bytes);
        assert!(resident_bytes > 0);
    }
}
