use std::io::Write;

use crate::Result;
use crate::caption::Caption;
use crate::caption_encoder::CaptionEncoder;
use crate::timecode::format_timestamp;

/// A `CaptionEncoder` that writes captions as SubRip (`.srt`) blocks.
///
/// Each block is the index line, a `start --> end` timing line, one line per text line, and a
/// blank separator line. Output is UTF-8.
///
/// We write the caption's own `index` rather than counting, so callers decide numbering (see
/// [`crate::caption::renumber`]).
pub struct SrtEncoder<W: Write> {
    w: W,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> CaptionEncoder for SrtEncoder<W> {
    fn write_caption(&mut self, caption: &Caption) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write caption: encoder is already closed",
            ));
        }

        let start = format_timestamp(caption.start_seconds);
        let end = format_timestamp(caption.end_seconds);

        writeln!(&mut self.w, "{}", caption.index)?;
        writeln!(&mut self.w, "{start} --> {end}")?;
        for line in caption.block_lines() {
            writeln!(&mut self.w, "{line}")?;
        }
        writeln!(&mut self.w)?;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Render a whole track as SRT text.
pub fn to_srt_string(captions: &[Caption]) -> Result<String> {
    let mut out = Vec::new();
    let mut enc = SrtEncoder::new(&mut out);
    for caption in captions {
        enc.write_caption(caption)?;
    }
    enc.close()?;

    String::from_utf8(out).map_err(|err| crate::Error::msg(err.to_string()))
}
