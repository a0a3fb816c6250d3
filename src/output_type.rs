/// The supported export formats for a caption track.
///
/// Each variant maps to a concrete `CaptionEncoder` implementation. With the `cli` feature the
/// enum doubles as a `clap` value so the CLI can take it as a flag directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// SubRip, the format transcription tools exchange.
    #[default]
    Srt,

    /// WebVTT.
    Vtt,

    /// A JSON array of caption objects.
    Json,
}

impl OutputType {
    /// File extension (without the dot) conventionally used for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Srt => "srt",
            OutputType::Vtt => "vtt",
            OutputType::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srt_is_the_default_format() {
        assert_eq!(OutputType::default(), OutputType::Srt);
        assert_eq!(OutputType::default().extension(), "srt");
        assert_eq!(OutputType::Vtt.extension(), "vtt");
    }
}
