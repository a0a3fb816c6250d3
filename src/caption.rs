use serde::{Deserialize, Serialize};

/// One timed subtitle block.
///
/// `index` is 1-based and sequential within a track. A track is ordered by `index`, which in
/// normal use is also ascending `start_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// Text lines in display order. Line breaks inside a caption are preserved as separate
    /// entries rather than embedded newlines. A blank line ends a subtitle block, so caption
    /// text never carries one.
    pub lines: Vec<String>,
}

impl Caption {
    pub fn new(index: usize, start_seconds: f64, end_seconds: f64, text: &str) -> Self {
        Self {
            index,
            start_seconds,
            end_seconds,
            lines: text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Lines safe to write inside a subtitle block: blank entries pushed into `lines` by hand
    /// are skipped.
    pub fn block_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
    }

    /// The caption text with lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Reassign `index` so a track reads 1, 2, 3, ... in its current order.
pub fn renumber(captions: &mut [Caption]) {
    for (i, caption) in captions.iter_mut().enumerate() {
        caption.index = i + 1;
    }
}
