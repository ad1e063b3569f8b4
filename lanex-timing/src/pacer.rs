//! Fixed-rate tick pacing for realtime runs, with tick-duration statistics.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct TickStats {
    pub average_tick_ns: f64,
    pub jitter_ns: f64,
    pub min_tick_ns: f64,
    pub max_tick_ns: f64,
    pub effective_hz: f64,
}

impl TickStats {
    fn empty() -> Self {
        Self {
            average_tick_ns: 0.0,
            jitter_ns: 0.0,
            min_tick_ns: 0.0,
            max_tick_ns: 0.0,
            effective_hz: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TickPacer {
    period: Duration,
    last_tick: Option<Instant>,
    tick_times: Vec<Duration>,
    max_samples: usize,
}

impl TickPacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_tick: None,
            tick_times: Vec::with_capacity(1000),
            max_samples: 1000,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleeps out the remainder of the current period, then records how long
    /// the whole tick took.
    pub fn wait_next(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            let spent = now.duration_since(last);
            if spent < self.period {
                high_precision_sleep(self.period - spent);
            }
            let tick = Instant::now();
            self.record_tick(tick.duration_since(last));
            self.last_tick = Some(tick);
        } else {
            self.last_tick = Some(now);
        }
    }

    pub fn record_tick(&mut self, d: Duration) {
        if self.tick_times.len() >= self.max_samples {
            self.tick_times.remove(0);
        }
        self.tick_times.push(d);
    }

    pub fn stats(&self) -> TickStats {
        if self.tick_times.is_empty() {
            return TickStats::empty();
        }
        let times: Vec<f64> = self
            .tick_times
            .iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        TickStats {
            average_tick_ns: avg,
            jitter_ns: var.sqrt(),
            min_tick_ns: times.iter().copied().fold(f64::INFINITY, f64::min),
            max_tick_ns: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            effective_hz: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

/// Sleeps on the monotonic clock where the platform offers it.
pub fn high_precision_sleep(duration: Duration) {
    #[cfg(all(target_os = "linux", feature = "high_precision_timer"))]
    linux_sleep(duration);
    #[cfg(not(all(target_os = "linux", feature = "high_precision_timer")))]
    std::thread::sleep(duration);
}

#[cfg(all(target_os = "linux", feature = "high_precision_timer"))]
fn linux_sleep(duration: Duration) {
    use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

    let req = timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };

    // SAFETY: `req` outlives the call and a null remainder pointer is allowed.
    let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut()) };
    if rc != 0 {
        tracing::debug!(rc, "clock_nanosleep interrupted, falling back to thread::sleep");
        std::thread::sleep(duration);
    }
}
