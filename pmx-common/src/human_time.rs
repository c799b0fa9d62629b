//! Human-readable duration formatting
//!
//! Track and song durations are shown as `M:SS` below an hour and
//! `H:MM:SS` from an hour up.

/// Format a duration in seconds for track listings.
///
/// Fractional seconds are rounded to the nearest second. Negative or
/// non-finite values mean the duration is unknown and format as `--:--`.
///
/// # Examples
///
/// ```
/// use pmx_common::human_time::format_duration;
///
/// assert_eq!(format_duration(0.0), "0:00");
/// assert_eq!(format_duration(142.4), "2:22");
/// assert_eq!(format_duration(3661.0), "1:01:01");
/// ```
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "--:--".to_string();
    }

    let total = seconds.round() as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Format an optional duration, showing `--:--` when unknown
pub fn format_duration_opt(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) => format_duration(s),
        None => "--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_format() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(5.0), "0:05");
        assert_eq!(format_duration(59.4), "0:59");
        assert_eq!(format_duration(59.6), "1:00");
        assert_eq!(format_duration(3599.0), "59:59");
    }

    #[test]
    fn test_hours_format() {
        assert_eq!(format_duration(3600.0), "1:00:00");
        assert_eq!(format_duration(3661.0), "1:01:01");
        assert_eq!(format_duration(36000.0), "10:00:00");
    }

    #[test]
    fn test_unknown_values() {
        assert_eq!(format_duration(-1.0), "--:--");
        assert_eq!(format_duration(f64::NAN), "--:--");
        assert_eq!(format_duration_opt(None), "--:--");
        assert_eq!(format_duration_opt(Some(90.0)), "1:30");
    }
}
