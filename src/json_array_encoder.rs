use std::io::Write;

use crate::Result;
use crate::caption::Caption;
use crate::caption_encoder::CaptionEncoder;

/// A `CaptionEncoder` that writes captions as a single JSON array.
///
/// The array is opened lazily and closed by `close`, so an empty run still produces `[]`.
///
/// Example output:
/// ```json
/// [
///   { "index": 1, "start_seconds": 0.0, "end_seconds": 1.2, "lines": ["hello"] },
///   { "index": 2, "start_seconds": 1.2, "end_seconds": 2.5, "lines": ["world"] }
/// ]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    w: W,

    /// Whether we have written the opening `[`.
    started: bool,

    /// Whether the next element is the first, so we know where commas go.
    first: bool,

    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> CaptionEncoder for JsonArrayEncoder<W> {
    fn write_caption(&mut self, caption: &Caption) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write caption: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, caption)?;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
