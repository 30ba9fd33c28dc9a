//! Monotonic clock adapter.
//!
//! All timestamps in the crate are nanoseconds since a process-wide epoch,
//! fixed the first time the clock is consulted. `Instant` is monotonic, so
//! readings never go backwards; the epoch makes them small enough to store
//! as `i64` and to diff without overflow concerns.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

fn epoch() -> Instant {
    *EPOCH.get_or_init(Instant::now)
}

/// Nanoseconds elapsed since the process-wide epoch.
///
/// The first call defines the epoch and therefore returns a value close to
/// zero.
pub fn now_ns() -> i64 {
    epoch().elapsed().as_nanos() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_are_monotonic() {
        let a = now_ns();
        let b = now_ns();
        let c = now_ns();
        assert!(a <= b);
        assert!(b <= c);
    }

    #[test]
    fn readings_advance_across_a_sleep() {
        let before = now_ns();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let after = now_ns();
        assert!(after - before >= 2_000_000);
    }
}
