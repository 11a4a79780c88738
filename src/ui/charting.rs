use crate::time_series::{peak_wpm, TimeSeriesPoint};

/// X (seconds) and Y (wpm) bounds for the results chart.
///
/// An empty series spans the configured duration so the axes still make
/// sense after a session in which nothing was sampled.
pub fn compute_chart_params(wpm_coords: &[TimeSeriesPoint], duration_secs: u64) -> (f64, f64) {
    let overall_duration = wpm_coords
        .last()
        .map(|p| p.t)
        .unwrap_or(duration_secs as f64)
        .max(1.0);

    (overall_duration, peak_wpm(wpm_coords).round())
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
    fn test_compute_chart_params_empty() {
        assert_eq!(compute_chart_params(&[], 30), (30.0, 0.0));
        assert_eq!(compute_chart_params(&[], 0), (1.0, 0.0));
    }

    #[test]
    fn test_compute_chart_params_uses_last_sample_and_peak() {
        let coords = [
            TimeSeriesPoint::new(1.0, 48.4),
            TimeSeriesPoint::new(2.0, 71.6),
            TimeSeriesPoint::new(3.0, 66.0),
        ];
        assert_eq!(compute_chart_params(&coords, 60), (3.0, 72.0));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(15.0), "15");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
