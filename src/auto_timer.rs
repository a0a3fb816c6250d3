use crate::caption::Caption;

/// Seconds per line when we don't know how long the media is.
pub const FALLBACK_SECONDS_PER_LINE: f64 = 3.0;

/// Shortest duration we'll give any one line, no matter how many lines share the media.
pub const MIN_SECONDS_PER_LINE: f64 = 1.5;

/// Lay `lines` out back-to-back from zero, sharing `total_duration` evenly between them.
///
/// A missing, zero or negative duration means "unknown" and each line gets
/// [`FALLBACK_SECONDS_PER_LINE`]. Either way no line gets less than [`MIN_SECONDS_PER_LINE`],
/// so a long transcript over a short clip can run past `total_duration`.
///
/// An empty `lines` slice yields an empty track.
pub fn auto_time<S: AsRef<str>>(lines: &[S], total_duration: Option<f64>) -> Vec<Caption> {
    if lines.is_empty() {
        return Vec::new();
    }

    let per_line = seconds_per_line(lines.len(), total_duration);

    let mut captions = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        // Multiply rather than accumulate so rounding error doesn't build up over long tracks.
        let start = i as f64 * per_line;
        let end = (i + 1) as f64 * per_line;
        captions.push(Caption::new(i + 1, start, end, line.as_ref()));
    }

    captions
}

fn seconds_per_line(line_count: usize, total_duration: Option<f64>) -> f64 {
    let per_line = match total_duration {
        Some(total) if total > 0.0 => total / line_count as f64,
        _ => FALLBACK_SECONDS_PER_LINE,
    };
    per_line.max(MIN_SECONDS_PER_LINE)
}
