// src/fetch/backoff.rs
// =============================================================================
// Exponential backoff between retry attempts.
//
//   delay(factor, n) = factor * 2^(n - 1)
//
// where n is how many attempts have already been made (1-based).
// With the default factor of 1 second that gives 1s, 2s, 4s, 8s, ...
// =============================================================================

use std::time::Duration;

/// How long to wait after `attempts_made` failed attempts.
///
/// `attempts_made == 0` means nothing has been tried yet, so there is no wait.
/// Very large attempt counts saturate instead of overflowing.
pub fn delay(factor: Duration, attempts_made: u32) -> Duration {
    if attempts_made == 0 {
        return Duration::ZERO;
    }

    match 1u32.checked_shl(attempts_made - 1) {
        Some(multiplier) => factor.saturating_mul(multiplier),
        None => {
            if factor.is_zero() {
                Duration::ZERO
            } else {
                Duration::MAX
            }
        }
    }
}
