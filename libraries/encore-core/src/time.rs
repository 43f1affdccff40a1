//! Time display helpers

/// Format seconds as `M:SS`
///
/// NaN and negative input render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if seconds.is_nan() || seconds < 0.0 || !seconds.is_finite() {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.9), "0:09");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn invalid_input_is_zero() {
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }
}
