use std::io::Write;

use crate::Result;
use crate::caption::Caption;
use crate::caption_encoder::CaptionEncoder;
use crate::timecode::format_timestamp_vtt;

const HEADER: &[u8] = b"WEBVTT\n\n";

/// Streams captions as WebVTT cues.
///
/// The `WEBVTT` header goes out with the first cue, so closing an encoder that never saw a
/// caption writes nothing at all. Cue identifiers reuse the caption index, which keeps cues
/// lined up with an SRT export of the same track.
pub struct VttEncoder<W: Write> {
    w: W,
    header_written: bool,
    closed: bool,
}

impl<W: Write> VttEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            header_written: false,
            closed: false,
        }
    }

    fn write_cue(&mut self, caption: &Caption) -> Result<()> {
        if !self.header_written {
            self.w.write_all(HEADER)?;
            self.header_written = true;
        }

        writeln!(
            self.w,
            "{}\n{} --> {}",
            caption.index,
            format_timestamp_vtt(caption.start_seconds),
            format_timestamp_vtt(caption.end_seconds)
        )?;
        for line in caption.block_lines() {
            writeln!(self.w, "{line}")?;
        }
        writeln!(self.w)?;
        Ok(())
    }
}

impl<W: Write> CaptionEncoder for VttEncoder<W> {
    fn write_caption(&mut self, caption: &Caption) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write caption: encoder is already closed",
            ));
        }
        self.write_cue(caption)
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.w.flush()?;
            self.closed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vtt_close_without_captions_emits_nothing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "");
        Ok(())
    }

    #[test]
    fn vtt_writes_header_once_and_formats_cues() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);

        enc.write_caption(&Caption::new(1, 0.0, 1.5, "hello"))?;
        enc.write_caption(&Caption::new(2, 61.2, 62.0, "world"))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("WEBVTT\n\n"));
        assert!(s.contains("1\n00:00:00.000 --> 00:00:01.500\nhello\n\n"));
        assert!(s.contains("2\n00:01:01.200 --> 00:01:02.000\nworld\n\n"));
        assert_eq!(s.matches("WEBVTT\n\n").count(), 1);
        Ok(())
    }

    #[test]
    fn vtt_skips_blank_text_lines() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        let caption = Caption {
            index: 1,
            start_seconds: 0.0,
            end_seconds: 1.0,
            lines: vec!["top".into(), String::new(), "bottom".into()],
        };
        enc.write_caption(&caption)?;
        enc.close()?;
        assert_eq!(
            std::str::from_utf8(&out)?,
            "WEBVTT\n\n1\n00:00:00.000 --> 00:00:01.000\ntop\nbottom\n\n"
        );
        Ok(())
    }

    #[test]
    fn vtt_write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        let err = enc
            .write_caption(&Caption::new(1, 0.0, 1.0, "nope"))
            .unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
