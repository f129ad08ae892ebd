//! Process memory measurement.

/// Peak resident set size of this process in kilobytes.
///
/// Reads the `VmHWM` line of `/proc/self/status`. Returns 0 when the value
/// cannot be read.
#[cfg(target_os = "linux")]
pub fn peak_rss_kb() -> u64 {
    let status = match std::fs::read_to_string("/proc/self/status") {
        Ok(content) => content,
        Err(_) => return 0,
    };

    status
        .lines()
        .find(|line| line.starts_with("VmHWM:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Peak RSS is only measured on Linux; other platforms report 0.
#[cfg(not(target_os = "linux"))]
pub fn peak_rss_kb() -> u64 {
    use std::sync::Once;
    static WARN_ONCE: Once = Once::new();
    WARN_ONCE.call_once(|| {
        log::warn!("Peak RSS measurement is only supported on Linux; reporting 0.");
    });
    0
}
