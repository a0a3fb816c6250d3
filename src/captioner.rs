//! High-level API: transcribe a clip and get captions onto the timeline.
//!
//! We expose a single entry point (`Captioner`) that wires the external transcriber, the
//! subtitle codec, the transcript fallback, and the timeline synchronizer together.
//!
//! The happy path is a transcriber that writes `<stem>.srt`. When it doesn't, we fall back to
//! `<stem>.txt`, and failing that to whatever the process printed, segmenting and auto-timing
//! the text ourselves. Whatever the source, we write the result out as `<stem>.srt` next to
//! the transcriber's output and import that file, so the user can re-import or hand-edit it
//! later.
//!
//! Everything here blocks until done. There is no cancellation; a caller that needs it has to
//! own the transcriber process itself and must not touch the timeline while an import runs.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::auto_timer::auto_time;
use crate::caption::Caption;
use crate::caption_encoder::CaptionEncoder;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::segmenter::split_transcript;
use crate::srt_encoder::{SrtEncoder, to_srt_string};
use crate::srt_parser::read_srt_file;
use crate::sync::import_captions;
use crate::timeline::{EntityHandle, SourceClip, Timeline};
use crate::transcriber::{SUBTITLE_FORMAT, TranscribeRequest, Transcriber, WhisperCli};
use crate::vtt_encoder::VttEncoder;
use crate::{Error, Result};

/// Where the imported captions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSource {
    /// The transcriber wrote a subtitle file.
    SubtitleFile,
    /// We built captions from the transcriber's plain-text transcript.
    TranscriptFile,
    /// We built captions from the transcriber's stdout.
    ProcessOutput,
}

/// The outcome of a successful [`Captioner::transcribe_and_import`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub source: CaptionSource,
    /// The subtitle file that was imported.
    pub srt_path: PathBuf,
    /// Created entities, in caption order.
    pub entities: Vec<EntityHandle>,
}

/// The selected clip and the folder its transcripts will go to by default.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedSource {
    pub clip: SourceClip,
    pub default_output_dir: PathBuf,
}

/// The main high-level entry point.
///
/// `Captioner` owns the transcriber; the timeline is borrowed per call since the host owns it.
pub struct Captioner<T: Transcriber = WhisperCli> {
    transcriber: T,
}

impl Captioner<WhisperCli> {
    /// A captioner that runs `whisper` from `PATH`.
    pub fn new() -> Self {
        Self::with_transcriber(WhisperCli::new())
    }
}

impl Default for Captioner<WhisperCli> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transcriber> Captioner<T> {
    pub fn with_transcriber(transcriber: T) -> Self {
        Self { transcriber }
    }

    pub fn transcriber(&self) -> &T {
        &self.transcriber
    }

    /// Report the clip that would be transcribed and its default output folder.
    pub fn select_source<L>(&self, timeline: &L) -> Result<SelectedSource>
    where
        L: Timeline + ?Sized,
    {
        let clip = selected_clip(timeline)?;
        let default_output_dir = media_parent(&clip.media_path);
        Ok(SelectedSource {
            clip,
            default_output_dir,
        })
    }

    /// Transcribe the selected clip and import the resulting captions.
    ///
    /// We check the container and selection before starting the transcriber, so usage errors
    /// never leave partial work behind.
    pub fn transcribe_and_import<L>(&self, timeline: &mut L, opts: &Opts) -> Result<ImportReport>
    where
        L: Timeline + ?Sized,
    {
        let container = timeline
            .container()
            .ok_or_else(|| Error::usage("make a composition active before transcribing"))?;
        let clip = selected_clip(&*timeline)?;

        let stem = media_stem(&clip.media_path)?;
        let output_dir = opts
            .output_dir
            .clone()
            .unwrap_or_else(|| media_parent(&clip.media_path));

        let request = TranscribeRequest {
            media_path: &clip.media_path,
            model: opts.model,
            language: &opts.language,
            output_format: SUBTITLE_FORMAT,
            output_dir: &output_dir,
        };
        let command = self.transcriber.describe(&request);
        let output = self.transcriber.transcribe(&request)?;

        let srt_path = output_dir.join(format!("{stem}.{SUBTITLE_FORMAT}"));
        let txt_path = output_dir.join(format!("{stem}.txt"));
        // Auto-timing covers whichever is longer: the clip or the whole container.
        let total_duration = clip.duration().max(container.duration);

        let source = if srt_path.is_file() {
            info!(path = %srt_path.display(), "found subtitle file");
            CaptionSource::SubtitleFile
        } else {
            let transcript = read_if_exists(&txt_path)?;
            let (source, text) = if has_text(&transcript) {
                (CaptionSource::TranscriptFile, transcript)
            } else if has_text(&output.stdout) {
                warn!("no transcript file, building captions from process output");
                (CaptionSource::ProcessOutput, output.stdout)
            } else {
                return Err(Error::MissingOutput {
                    command,
                    searched: vec![srt_path, txt_path],
                });
            };

            if !write_srt_from_text(&text, &srt_path, Some(total_duration))? {
                return Err(Error::MissingOutput {
                    command,
                    searched: vec![srt_path, txt_path],
                });
            }
            info!(path = %srt_path.display(), ?source, "built auto-timed subtitle file");
            source
        };

        let entities = import_srt_file(&srt_path, timeline)?;
        Ok(ImportReport {
            source,
            srt_path,
            entities,
        })
    }

    /// Import a subtitle file the user picked. No transcription involved.
    pub fn import_srt_file<L>(&self, path: impl AsRef<Path>, timeline: &mut L) -> Result<Vec<EntityHandle>>
    where
        L: Timeline + ?Sized,
    {
        import_srt_file(path, timeline)
    }
}

/// Parse a subtitle file and import its captions into the active container.
pub fn import_srt_file<L>(path: impl AsRef<Path>, timeline: &mut L) -> Result<Vec<EntityHandle>>
where
    L: Timeline + ?Sized,
{
    let path = path.as_ref();
    if timeline.container().is_none() {
        return Err(Error::usage("select a composition before importing subtitles"));
    }
    if !path.is_file() {
        return Err(Error::usage(format!(
            "subtitle file not found: {}",
            path.display()
        )));
    }

    let captions = read_srt_file(path)?;
    info!(path = %path.display(), count = captions.len(), "importing subtitle file");
    import_captions(&captions, timeline)
}

/// Segment and auto-time `text`, then write it to `srt_path` as UTF-8 SRT.
///
/// Returns `Ok(false)` without touching the filesystem when the text has no caption lines.
pub fn write_srt_from_text(
    text: &str,
    srt_path: &Path,
    total_duration: Option<f64>,
) -> Result<bool> {
    let captions = captions_from_text(text, total_duration);
    if captions.is_empty() {
        return Ok(false);
    }

    if let Some(dir) = srt_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(srt_path, to_srt_string(&captions)?)?;
    Ok(true)
}

/// Segment and auto-time raw transcript text.
pub fn captions_from_text(text: &str, total_duration: Option<f64>) -> Vec<Caption> {
    auto_time(&split_transcript(text), total_duration)
}

/// Encode a caption track to `w` in the requested format.
pub fn export<W: Write>(captions: &[Caption], w: W, output_type: OutputType) -> Result<()> {
    let writer = BufWriter::new(w);

    // Explicit per-format arms (no trait objects) keep the encoder lifetimes simple.
    match output_type {
        OutputType::Srt => {
            let mut encoder = SrtEncoder::new(writer);
            let run_res = write_all(captions, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
        OutputType::Vtt => {
            let mut encoder = VttEncoder::new(writer);
            let run_res = write_all(captions, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
        OutputType::Json => {
            let mut encoder = JsonArrayEncoder::new(writer);
            let run_res = write_all(captions, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
    }
}

fn write_all<E: CaptionEncoder>(captions: &[Caption], encoder: &mut E) -> Result<()> {
    for caption in captions {
        encoder.write_caption(caption)?;
    }
    Ok(())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        // The run error is the one worth reporting; a close failure after it is noise.
        (Err(err), _) => Err(err),
    }
}

fn selected_clip<L>(timeline: &L) -> Result<SourceClip>
where
    L: Timeline + ?Sized,
{
    timeline
        .selected_source()
        .ok_or_else(|| Error::usage("select a video or audio clip in the active composition"))
}

fn media_stem(media_path: &Path) -> Result<String> {
    media_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::usage(format!(
                "selected clip has no file name: {}",
                media_path.display()
            ))
        })
}

fn media_parent(media_path: &Path) -> PathBuf {
    media_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn read_if_exists(path: &Path) -> Result<String> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err.into()),
    }
}

fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_stem_drops_only_the_last_extension() -> anyhow::Result<()> {
        assert_eq!(media_stem(Path::new("/a/b/interview.final.mov"))?, "interview.final");
        assert_eq!(media_stem(Path::new("clip"))?, "clip");
        assert!(media_stem(Path::new("/")).is_err());
        Ok(())
    }

    #[test]
    fn media_parent_defaults_to_current_dir() {
        assert_eq!(media_parent(Path::new("clip.wav")), PathBuf::from("."));
        assert_eq!(media_parent(Path::new("/x/clip.wav")), PathBuf::from("/x"));
    }

    #[test]
    fn export_srt_matches_the_encoder_output() -> anyhow::Result<()> {
        let track = vec![Caption::new(1, 0.0, 1.5, "hi")];
        let mut out = Vec::new();
        export(&track, &mut out, OutputType::Srt)?;
        assert_eq!(String::from_utf8(out)?, "1\n00:00:00,000 --> 00:00:01,500\nhi\n\n");
        Ok(())
    }

    #[test]
    fn export_json_of_empty_track_is_an_empty_array() -> anyhow::Result<()> {
        let mut out = Vec::new();
        export(&[], &mut out, OutputType::Json)?;
        assert_eq!(String::from_utf8(out)?, "[]");
        Ok(())
    }

    #[test]
    fn write_srt_from_blank_text_writes_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("clip.srt");
        assert!(!write_srt_from_text(" \n\n ", &path, Some(10.0))?);
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn merge_prefers_the_run_error() {
        let merged = merge_run_and_close(Err(Error::msg("run")), Err(Error::msg("close")));
        assert_eq!(merged.unwrap_err().to_string(), "run");

        let merged = merge_run_and_close(Ok(()), Err(Error::msg("close")));
        assert_eq!(merged.unwrap_err().to_string(), "close");
    }
}
