//! Conversions between seconds, subtitle timestamps, and host frames.
//!
//! Subtitle timestamps look like `HH:MM:SS,mmm`. Hours are not wrapped at 24, so long
//! recordings keep counting up.
//!
//! Parsing is deliberately forgiving: transcription tools don't always emit clean output, and a
//! bad timestamp should cost us one caption's timing, not the whole import.

/// Format seconds as a subtitle timestamp (`HH:MM:SS,mmm`).
///
/// Negative (and NaN) input is clamped to zero. We round to the nearest millisecond before
/// splitting into fields so a value like `1.9996` becomes `00:00:02,000` rather than
/// `00:00:01,1000`.
pub fn format_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Format seconds as a WebVTT timestamp (`HH:MM:SS.mmm`).
pub fn format_timestamp_vtt(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Format seconds as a whole-second clock (`HH:MM:SS`), truncating any fraction.
///
/// Used for the compact list view where millisecond detail is noise.
pub fn format_clock(seconds: f64) -> String {
    let total_s = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let s = total_s % 60;
    let m = (total_s / 60) % 60;
    let h = total_s / 3600;
    format!("{h:02}:{m:02}:{s:02}")
}

fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let clamped = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let total_ms = (clamped * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    (h, m, s, ms)
}

/// Parse a subtitle timestamp (`HH:MM:SS,mmm`) into seconds.
///
/// Fails soft: fewer than three `:`-separated fields yields `0.0`, and any field that doesn't
/// start with digits counts as zero. The milliseconds field is read as an integer count of
/// milliseconds.
pub fn parse_timestamp(timestamp: &str) -> f64 {
    let parts: Vec<&str> = timestamp.trim().split(':').collect();
    if parts.len() < 3 {
        return 0.0;
    }

    let h = leading_int(parts[0]);
    let m = leading_int(parts[1]);
    let (secs, millis) = match parts[2].split_once(',') {
        Some((secs, millis)) => (leading_int(secs), leading_int(millis)),
        None => (leading_int(parts[2]), 0),
    };

    (h * 3600 + m * 60 + secs) as f64 + millis as f64 / 1000.0
}

/// Parse a timestamp that may use either `,` or `.` before the fractional part.
///
/// This is the variant we use for subtitle files and editor input, since both conventions show
/// up in the wild (SRT uses `,`, WebVTT and most host UIs use `.`). The fraction is read as a
/// decimal fraction, so `00:00:01.5` is one and a half seconds.
pub fn parse_timestamp_lenient(timestamp: &str) -> f64 {
    let normalized = timestamp.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() < 3 {
        return 0.0;
    }

    let h = leading_int(parts[0]);
    let m = leading_int(parts[1]);
    let (secs, fraction) = match parts[2].split_once('.') {
        Some((secs, fraction)) => (leading_int(secs), decimal_fraction(fraction)),
        None => (leading_int(parts[2]), 0.0),
    };

    (h * 3600 + m * 60 + secs) as f64 + fraction
}

/// Read the leading ASCII digits of `field` as an integer, ignoring surrounding whitespace.
/// Anything without leading digits is zero.
fn leading_int(field: &str) -> u64 {
    let field = field.trim();
    let end = field
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(field.len());
    field[..end].parse().unwrap_or(0)
}

fn decimal_fraction(digits: &str) -> f64 {
    let digits = digits.trim();
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0.0;
    }
    format!("0.{}", &digits[..end]).parse().unwrap_or(0.0)
}

/// Convert seconds into (fractional) frames for a host with the given seconds-per-frame.
pub fn to_frames(seconds: f64, frame_duration: f64) -> f64 {
    seconds / frame_duration
}

/// Convert frames back into seconds for a host with the given seconds-per-frame.
pub fn to_seconds(frames: f64, frame_duration: f64) -> f64 {
    frames * frame_duration
}

/// Snap `seconds` to the nearest frame boundary.
///
/// Every timing we commit to the host goes through here. A frame duration that is not a finite
/// positive number means the host has no frame grid, and the value is returned unchanged.
pub fn quantize_to_frame(seconds: f64, frame_duration: f64) -> f64 {
    if !frame_duration.is_finite() || frame_duration <= 0.0 {
        return seconds;
    }
    to_seconds(to_frames(seconds, frame_duration).round(), frame_duration)
}
