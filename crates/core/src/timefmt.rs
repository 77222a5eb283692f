//! Human-readable duration labels for queue cards.

/// Format a duration as `"1h 2m 3s"` / `"2m 3s"`.
pub fn format_seconds(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else {
        format!("{m}m {s}s")
    }
}

/// Format a countdown as `"1:30"` / `"1:02:03"`.
pub fn format_clock(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_seconds_without_hours() {
        assert_eq!(format_seconds(90), "1m 30s");
        assert_eq!(format_seconds(0), "0m 0s");
    }

    #[test]
    fn format_seconds_with_hours() {
        assert_eq!(format_seconds(3723), "1h 2m 3s");
    }

    #[test]
    fn format_clock_pads_trailing_fields() {
        assert_eq!(format_clock(90), "1:30");
        assert_eq!(format_clock(5), "0:05");
        assert_eq!(format_clock(3723), "1:02:03");
    }
}
