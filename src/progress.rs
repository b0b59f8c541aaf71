//! Serialized operator progress stream.
//!
//! Workers report per-shard progress on stdout with elapsed-time context.
//! A shared mutex makes each line print atomically instead of interleaved
//! fragments; this is a formatting concern only, never a correctness
//! mechanism.
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct Progress {
    start: Instant,
    lock: Mutex<()>,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            lock: Mutex::new(()),
        }
    }

    /// Print one `worker | date_key | elapsed | message` line.
    pub fn report(&self, worker: &str, date_key: &str, message: &str) {
        let elapsed = format_elapsed(self.start.elapsed());
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        println!("{:>4} | {:>8} | {} | {}", worker, date_key, elapsed, message);
    }
}

/// `HH:MM:SS` elapsed time.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formats_as_hms() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_elapsed(Duration::from_secs(3721)), "01:02:01");
    }
}
