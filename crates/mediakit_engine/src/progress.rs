//! Progress extraction from the media engine's `-progress pipe:1` stream.

/// Turns engine output into a 0..=100 percentage for a single invocation.
#[derive(Debug, Default)]
pub(crate) struct ProgressTracker {
    duration_us: Option<u64>,
    last: u8,
}

impl ProgressTracker {
    /// Feeds one stderr line. Picks up the input duration from the banner.
    pub(crate) fn observe_log(&mut self, line: &str) {
        if self.duration_us.is_some() {
            return;
        }
        if let Some(rest) = line.trim_start().strip_prefix("Duration:") {
            let stamp = rest.split(',').next().unwrap_or_default();
            self.duration_us = parse_timestamp(stamp).filter(|d| *d > 0);
        }
    }

    /// Feeds one `key=value` line of the progress stream. Returns a new
    /// percentage when it advanced.
    pub(crate) fn observe_progress(&mut self, line: &str) -> Option<u8> {
        let (key, value) = line.trim().split_once('=')?;
        let percent = match key {
            "progress" if value == "end" => 100,
            "out_time_us" | "out_time_ms" => {
                // Both keys carry microseconds.
                let elapsed: u64 = value.parse().ok()?;
                self.percent_of(elapsed)?
            }
            "out_time" => {
                let elapsed = parse_timestamp(value)?;
                self.percent_of(elapsed)?
            }
            _ => return None,
        };
        if percent > self.last {
            self.last = percent;
            Some(percent)
        } else {
            None
        }
    }

    fn percent_of(&self, elapsed_us: u64) -> Option<u8> {
        let total = self.duration_us?;
        let ratio = (elapsed_us as f64 / total as f64).clamp(0.0, 0.99);
        Some((ratio * 100.0) as u8)
    }
}

/// Parses `HH:MM:SS.ff` into microseconds.
pub(crate) fn parse_timestamp(stamp: &str) -> Option<u64> {
    let mut parts = stamp.trim().splitn(3, ':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let whole = (hours * 3600 + minutes * 60) * 1_000_000;
    Some(whole + (seconds * 1_000_000.0).round() as u64)
}

/// Maps progress within step `index` of `total` onto the whole job. Never
/// reaches 100; that is reported once the outputs are collected.
pub(crate) fn scale_step(index: usize, total: usize, percent: u8) -> u8 {
    let total = total.max(1);
    let done = index.min(total) as f64 / total as f64;
    let share = f64::from(percent.min(100)) / 100.0 / total as f64;
    ((done + share) * 100.0).round().min(99.0) as u8
}
