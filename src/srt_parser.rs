//! Best-effort SubRip reader.
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! First caption text
//!
//! 2
//! 00:00:05,500 --> 00:00:08,000
//! Second caption text
//! with multiple lines
//! ```
//!
//! This reader never fails on content. A block whose second line has no `-->` is dropped along
//! with its index, and we carry on with the next block. Transcription output isn't guaranteed to
//! be well formed, and losing one caption is better than losing the track.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::Result;
use crate::caption::Caption;
use crate::timecode::parse_timestamp_lenient;

/// Separator between the start and end timestamps on a timing line.
pub const TIMING_SEPARATOR: &str = "-->";

static STYLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("style tag regex is valid"));

/// Parse SRT text into a caption track.
///
/// Captions are numbered 1, 2, 3, ... in file order regardless of the indices in the file, so
/// skipped blocks never leave gaps. Styling tags such as `<i>` or `<font color="red">` are
/// stripped from caption text.
pub fn parse_srt(content: &str) -> Vec<Caption> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines().enumerate().peekable();
    let mut captions = Vec::new();

    loop {
        // Skip blank lines while looking for the next index line.
        while lines.next_if(|(_, l)| is_blank(l)).is_some() {}

        let Some((index_line_no, _index)) = lines.next() else {
            break;
        };

        let timing = match lines.next() {
            Some((_, l)) if l.contains(TIMING_SEPARATOR) => l,
            other => {
                warn!(
                    line = index_line_no + 1,
                    found = other.map(|(_, l)| l).unwrap_or("<end of file>"),
                    "skipping subtitle block without a timing line"
                );
                continue;
            }
        };

        let (start, end) = parse_timing_line(timing);

        let mut text = Vec::new();
        while let Some((_, line)) = lines.next_if(|(_, l)| !is_blank(l)) {
            text.push(strip_style_tags(line));
        }

        if end < start {
            debug!(line = index_line_no + 1, start, end, "caption ends before it starts");
        }

        captions.push(Caption {
            index: captions.len() + 1,
            start_seconds: start,
            end_seconds: end,
            lines: text,
        });
    }

    captions
}

/// Read and parse an SRT file.
///
/// Invalid UTF-8 is replaced rather than rejected, in keeping with the rest of the reader.
pub fn read_srt_file(path: impl AsRef<Path>) -> Result<Vec<Caption>> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(parse_srt(&String::from_utf8_lossy(&bytes)))
}

fn parse_timing_line(line: &str) -> (f64, f64) {
    let mut halves = line.splitn(2, TIMING_SEPARATOR);
    let start = halves.next().map(parse_timestamp_lenient).unwrap_or(0.0);
    // WebVTT-style cue settings can follow the end time; only the first token is the timestamp.
    let end = halves
        .next()
        .and_then(|rest| rest.split_whitespace().next())
        .map(parse_timestamp_lenient)
        .unwrap_or(0.0);
    (start, end)
}

fn strip_style_tags(line: &str) -> String {
    STYLE_TAG.replace_all(line, "").into_owned()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
