//! Playback position display: `MM:SS`, minutes unbounded

/// Format seconds as `MM:SS`. NaN and negative values render as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse `SS`, `SS.mmm`, `MM:SS` or `HH:MM:SS` into seconds.
pub fn parse_time(s: &str) -> Result<f64, String> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err("Invalid time. Expected SS, MM:SS or HH:MM:SS".to_string());
    }

    let (last, leading) = parts.split_last().ok_or_else(|| "Empty time".to_string())?;
    let seconds = last
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid seconds: {last}"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("Seconds must be a positive number".to_string());
    }
    if !leading.is_empty() && seconds >= 60.0 {
        return Err("Seconds must be < 60".to_string());
    }

    let mut total = 0.0;
    for (i, part) in leading.iter().enumerate() {
        let value = part
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid field: {part}"))?;
        // Minutes are bounded only when hours are present.
        if leading.len() == 2 && i == 1 && value >= 60 {
            return Err("Minutes must be < 60".to_string());
        }
        total = total * 60.0 + value as f64;
    }
    Ok(total * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(4.0), "00:04");
        assert_eq!(format_time(12.9), "00:12");
        assert_eq!(format_time(90.5), "01:30");
        assert_eq!(format_time(6000.0), "100:00");
    }

    #[test]
    fn invalid_positions_format_as_zero() {
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(-5.0), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
    }

    #[test]
    fn parses_supported_forms() {
        assert_eq!(parse_time("42").unwrap(), 42.0);
        assert_eq!(parse_time("1.5").unwrap(), 1.5);
        assert_eq!(parse_time("01:30").unwrap(), 90.0);
        assert_eq!(parse_time("90:00").unwrap(), 5400.0);
        assert_eq!(parse_time("1:02:03").unwrap(), 3723.0);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_time("").is_err());
        assert!(parse_time("abc").is_err());
        assert!(parse_time("1:75").is_err());
        assert!(parse_time("1:60:00").is_err());
        assert!(parse_time("-3").is_err());
        assert!(parse_time("1:2:3:4").is_err());
    }

    #[test]
    fn format_then_parse_is_whole_seconds() {
        assert_eq!(parse_time(&format_time(754.8)).unwrap(), 754.0);
    }
}
