use std::time::{Duration, Instant};

/// Mean of whole-millisecond samples rounded half-up to the nearest integer.
pub fn rounded_mean(data: &[u64]) -> Option<u64> {
    match data.len() as u64 {
        0 => None,
        count => {
            let sum: u64 = data.iter().sum();
            Some((2 * sum + count) / (2 * count))
        }
    }
}

pub fn std_dev(data: &[u64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => {
            let mean = data.iter().sum::<u64>() as f64 / count as f64;
            let variance = data
                .iter()
                .map(|value| {
                    let diff = mean - *value as f64;

                    diff * diff
                })
                .sum::<f64>()
                / count as f64;

            Some(variance.sqrt())
        }
    }
}

/// Whole milliseconds between two monotonic instants, rounded to nearest.
/// An `end` before `start` counts as zero.
pub fn elapsed_ms(start: Instant, end: Instant) -> u64 {
    round_millis(end.saturating_duration_since(start))
}

pub fn round_millis(duration: Duration) -> u64 {
    ((duration.as_micros() + 500) / 1000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_mean() {
        assert_eq!(rounded_mean(&[200, 300, 250]), Some(250));
        assert_eq!(rounded_mean(&[42]), Some(42));
    }

    #[test]
    fn test_rounded_mean_rounds_half_up() {
        assert_eq!(rounded_mean(&[1, 2]), Some(2));
        assert_eq!(rounded_mean(&[1, 1, 2]), Some(1));
        assert_eq!(rounded_mean(&[100, 101, 101]), Some(101));
    }

    #[test]
    fn test_rounded_mean_empty_slice() {
        assert_eq!(rounded_mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[5, 5, 5, 5]), Some(0.0));
        let sd = std_dev(&[100, 120, 90, 102, 94]).unwrap();
        assert!((sd - 10.322790320451151).abs() < 1e-9);
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_elapsed_ms_rounds_to_nearest() {
        let start = Instant::now();
        assert_eq!(elapsed_ms(start, start + Duration::from_micros(250_499)), 250);
        assert_eq!(elapsed_ms(start, start + Duration::from_micros(250_500)), 251);
        assert_eq!(elapsed_ms(start, start), 0);
    }

    #[test]
    fn test_elapsed_ms_saturates_when_reversed() {
        let start = Instant::now();
        let later = start + Duration::from_millis(10);
        assert_eq!(elapsed_ms(later, start), 0);
    }
}
