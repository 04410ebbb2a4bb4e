/// Top of a bar chart holding `values`: the maximum rounded up to a multiple
/// of `step`, never below one step.
pub fn bar_ceiling(values: &[u64], step: u64) -> u64 {
    let step = step.max(1);
    let highest = values.iter().copied().max().unwrap_or(0);
    (highest.div_ceil(step) * step).max(step)
}

/// Bar height for `value` on a `(min, max)` axis, in percent. Never below 5 so
/// every played day stays visible.
pub fn bar_percent(value: u64, (min, max): (u64, u64)) -> u64 {
    let range = max.saturating_sub(min).max(1) as f64;
    let pct = value.saturating_sub(min) as f64 / range * 100.0;
    pct.clamp(5.0, 100.0).round() as u64
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_ceiling_rounds_up() {
        assert_eq!(bar_ceiling(&[], 50), 50);
        assert_eq!(bar_ceiling(&[120, 231], 50), 250);
        assert_eq!(bar_ceiling(&[250], 50), 250);
        assert_eq!(bar_ceiling(&[12_345], 1_000), 13_000);
    }

    #[test]
    fn bar_percent_is_clamped() {
        assert_eq!(bar_percent(150, (100, 200)), 50);
        assert_eq!(bar_percent(100, (100, 200)), 5);
        assert_eq!(bar_percent(900, (100, 200)), 100);
        assert_eq!(bar_percent(7, (7, 7)), 5);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
