use std::fmt;
use std::path::PathBuf;

/// Options that control a transcribe-and-import run.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (plugins, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Which Whisper model the transcriber should load.
    pub model: WhisperModel,

    /// Spoken language passed to the transcriber, by name (e.g. `"English"`).
    pub language: String,

    /// Where the transcriber should write its output files.
    ///
    /// When `None`, we use the directory that holds the media file.
    pub output_dir: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            model: WhisperModel::default(),
            language: "English".to_owned(),
            output_dir: None,
        }
    }
}

/// Whisper model sizes, smallest and fastest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    #[default]
    Medium,
    Large,
}

impl WhisperModel {
    /// The model name as the Whisper CLI expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Small => "small",
            WhisperModel::Medium => "medium",
            WhisperModel::Large => "large",
        }
    }
}

impl fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_medium_model_in_english() {
        let opts = Opts::default();
        assert_eq!(opts.model, WhisperModel::Medium);
        assert_eq!(opts.language, "English");
        assert!(opts.output_dir.is_none());
    }

    #[test]
    fn model_names_are_lowercase() {
        assert_eq!(WhisperModel::Tiny.to_string(), "tiny");
        assert_eq!(WhisperModel::Large.as_str(), "large");
    }
}
