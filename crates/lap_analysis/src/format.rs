//! Lap time and gap formatting.

/// Slack added before truncating to milliseconds so `83.456` does not
/// print as `.455`
const MILLIS_EPS: f64 = 1e-6;

/// Format a lap time as `mm:ss.mmm`.
///
/// Non-finite or negative input formats as `00:00.000`. Milliseconds are
/// truncated, not rounded.
pub fn format_lap_time(seconds: f64) -> String {
    let time = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    let total_ms = (time * 1000.0 + MILLIS_EPS).floor() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    format!("{minutes:02}:{secs:02}.{millis:03}")
}

/// Format a gap in seconds with an explicit sign and 3 decimals.
///
/// Zero and non-finite input format as `0.000`.
pub fn format_gap(gap: f64) -> String {
    if !gap.is_finite() || gap == 0.0 {
        return "0.000".to_string();
    }
    if gap > 0.0 {
        format!("+{gap:.3}")
    } else {
        format!("{gap:.3}")
    }
}
