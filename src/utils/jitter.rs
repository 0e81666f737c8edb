//! Lightweight jitter for retry delays
//!
//! Uses the system clock as a pseudo-random source so the crate does not pull
//! in an RNG dependency for a single call site.

/// Pseudo-random value between 0 and `max_ms` (inclusive)
pub fn jitter_ms(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }

    (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        % (max_ms + 1) as u128) as u64
}

/// Pseudo-random value between 0 and `percent` percent of `base` (inclusive)
pub fn jitter_percent(base: u64, percent: u8) -> u64 {
    if percent == 0 || base == 0 {
        return 0;
    }

    jitter_ms(base * percent as u64 / 100)
}
