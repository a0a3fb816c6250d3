use crate::Result;
use crate::caption::Caption;

/// A streaming sink for captions.
///
/// Encoders write each caption as it arrives; `close` finalizes the output and is idempotent.
/// Writing after `close` is an error.
pub trait CaptionEncoder {
    fn write_caption(&mut self, caption: &Caption) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
