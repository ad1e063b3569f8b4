//! Time-to-collision under a constant-speed projection.

/// Below this speed the vehicle is treated as stationary and TTC is unbounded.
pub const TTC_MIN_SPEED_KMH: f32 = 0.001;

/// Seconds until the vehicle covers `forward_distance` (metres) at
/// `speed_kmh`. Returns `f32::INFINITY` for a stationary vehicle.
pub fn estimate_ttc(forward_distance: f32, speed_kmh: f32) -> f32 {
    if speed_kmh.abs() < TTC_MIN_SPEED_KMH {
        return f32::INFINITY;
    }
    (forward_distance / 1000.0) / (speed_kmh / 3600.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtcSummary {
    pub mean: f32,
    pub min: f32,
}

impl TtcSummary {
    /// Used when a trial terminates without any TTC reading.
    pub const EMPTY: Self = Self {
        mean: f32::INFINITY,
        min: f32::INFINITY,
    };

    pub fn from_series(series: &[f32]) -> Option<Self> {
        let (&first, rest) = series.split_first()?;
        let (sum, min) = rest
            .iter()
            .fold((first, first), |(sum, min), &ttc| (sum + ttc, min.min(ttc)));
        Some(Self {
            mean: sum / series.len() as f32,
            min,
        })
    }
}
