//! Peak lateral acceleration by two successive finite differences.
//!
//! No smoothing is applied, so the estimate follows sampling jitter. The
//! result is the signed maximum: a trial that only decelerates laterally
//! reports a negative peak.

use crate::sampler::Sample;

fn seconds_between(a: &Sample, b: &Sample) -> f32 {
    (b.timestamp_ms - a.timestamp_ms) as f32 / 1000.0
}

/// Absolute lateral speed per sample interval, with a leading zero so that
/// `velocities[i]` covers the interval ending at sample `i`.
pub fn lateral_velocities(samples: &[Sample]) -> Vec<f32> {
    std::iter::once(0.0)
        .chain(samples.windows(2).map(|pair| {
            let dt = seconds_between(&pair[0], &pair[1]);
            if dt > 0.0 {
                (pair[1].lateral_x - pair[0].lateral_x).abs() / dt
            } else {
                0.0
            }
        }))
        .collect()
}

/// Signed maximum lateral acceleration, or `None` when the series is too
/// short to yield a single term (fewer than 4 samples).
///
/// Each velocity difference `v[j+1] - v[j]` is divided by the interval that
/// follows it, `t[j+2] - t[j+1]`. The leading zero of the velocity series is
/// skipped, so a constant-velocity trace yields exactly zero.
pub fn peak_lateral_accel(samples: &[Sample]) -> Option<f32> {
    if samples.len() < 3 {
        return None;
    }
    let velocities = lateral_velocities(samples);
    (1..velocities.len() - 2)
        .filter_map(|j| {
            let dt = seconds_between(&samples[j + 1], &samples[j + 2]);
            (dt > 0.0).then(|| (velocities[j + 1] - velocities[j]) / dt)
        })
        .reduce(f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(points: &[(f32, i64)]) -> Vec<Sample> {
        points
            .iter()
            .map(|&(lateral_x, timestamp_ms)| Sample {
                lateral_x,
                timestamp_ms,
            })
            .collect()
    }

    #[test]
    fn constant_velocity_has_no_acceleration() {
        let samples = trace(&[(0.0, 0), (0.5, 100), (1.0, 200), (1.5, 300), (2.0, 400)]);
        let peak = peak_lateral_accel(&samples).unwrap();
        assert!(peak.abs() < 1e-4, "peak = {peak}");
    }

    #[test]
    fn uneven_ticks_at_constant_velocity() {
        let samples = trace(&[(0.0, 0), (0.2, 40), (0.9, 180), (1.0, 200)]);
        let peak = peak_lateral_accel(&samples).unwrap();
        assert!(peak.abs() < 1e-3, "peak = {peak}");
    }

    #[test]
    fn accelerating_trace() {
        let samples = trace(&[(0.0, 0), (0.0, 1000), (1.0, 2000), (3.0, 3000)]);
        let velocities = lateral_velocities(&samples);
        assert_eq!(velocities, [0.0, 0.0, 1.0, 2.0]);
        assert!((peak_lateral_accel(&samples).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn jittered_ticks_divide_by_the_following_interval() {
        // v = [0, 0, 2, 4/3]; (2 - 0) / 1.5 s
        let samples = trace(&[(0.0, 0), (0.0, 1000), (1.0, 1500), (3.0, 3000)]);
        let peak = peak_lateral_accel(&samples).unwrap();
        assert!((peak - 4.0 / 3.0).abs() < 1e-5, "peak = {peak}");
    }

    #[test]
    fn last_velocity_difference_is_not_used() {
        // only term: (1 - 0) / 1 s; the jump to 9 m/s at the end is ignored
        let samples = trace(&[(0.0, 0), (0.0, 1000), (1.0, 2000), (10.0, 3000)]);
        assert!((peak_lateral_accel(&samples).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn peak_is_signed_not_magnitude() {
        let samples = trace(&[(0.0, 0), (3.0, 1000), (4.0, 2000), (4.5, 3000)]);
        assert!((peak_lateral_accel(&samples).unwrap() + 2.0).abs() < 1e-6);
    }

    #[test]
    fn direction_changes_count_as_speed() {
        let samples = trace(&[(0.0, 0), (1.0, 1000), (0.0, 2000), (1.0, 3000)]);
        assert!(peak_lateral_accel(&samples).unwrap().abs() < 1e-6);
    }

    #[test]
    fn too_few_samples() {
        assert_eq!(peak_lateral_accel(&[]), None);
        assert_eq!(peak_lateral_accel(&trace(&[(0.0, 0), (1.0, 100)])), None);
    }

    #[test]
    fn three_samples_have_no_term() {
        let samples = trace(&[(0.0, 0), (1.0, 100), (3.0, 200)]);
        assert_eq!(peak_lateral_accel(&samples), None);
    }
}
