//! The external speech-to-text step.
//!
//! Transcription is a single blocking call into some other program. We only care about what it
//! leaves behind: a subtitle file, a plain-text transcript, or text on its stdout. The
//! orchestrator in [`crate::captioner`] sorts out which of those it got.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::opts::WhisperModel;
use crate::{Error, Result};

/// Output format we ask the transcriber for.
pub const SUBTITLE_FORMAT: &str = "srt";

/// Everything a transcriber needs for one run.
#[derive(Debug, Clone, Copy)]
pub struct TranscribeRequest<'a> {
    pub media_path: &'a Path,
    pub model: WhisperModel,
    pub language: &'a str,
    /// Requested output format; always [`SUBTITLE_FORMAT`] today.
    pub output_format: &'a str,
    pub output_dir: &'a Path,
}

/// What a finished run handed back directly, as opposed to files it wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriberOutput {
    /// Captured standard output. Some builds print the transcript here, but it may just as well
    /// contain progress or log lines, so treat it as a lossy last resort.
    pub stdout: String,
}

/// Pluggable transcription engine used by [`crate::Captioner`].
///
/// A transcriber blocks until the run is over. It should write `<stem>.srt` or `<stem>.txt`
/// into `output_dir` (where `<stem>` is the media file name without its extension), or print
/// the transcript to stdout.
pub trait Transcriber {
    /// Human-readable rendering of the invocation, for error messages.
    fn describe(&self, request: &TranscribeRequest<'_>) -> String;

    /// Run transcription to completion.
    ///
    /// Failures to launch or unsuccessful exits are reported as [`Error::ExternalTool`].
    fn transcribe(&self, request: &TranscribeRequest<'_>) -> Result<TranscriberOutput>;
}

/// Runs the `whisper` command-line tool.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    program: OsString,
}

impl WhisperCli {
    /// Use `whisper` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("whisper")
    }

    /// Use a specific executable, e.g. an absolute path or a wrapper script.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(request: &TranscribeRequest<'_>) -> Vec<OsString> {
        vec![
            request.media_path.as_os_str().to_owned(),
            "--model".into(),
            request.model.as_str().into(),
            "--language".into(),
            request.language.into(),
            "--output_format".into(),
            request.output_format.into(),
            "--output_dir".into(),
            request.output_dir.as_os_str().to_owned(),
        ]
    }

    fn command(&self, request: &TranscribeRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        configure_std_command(&mut cmd);
        cmd
    }
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcriber for WhisperCli {
    fn describe(&self, request: &TranscribeRequest<'_>) -> String {
        std::iter::once(self.program.clone())
            .chain(Self::args(request))
            .map(|arg| quote_arg(&arg.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn transcribe(&self, request: &TranscribeRequest<'_>) -> Result<TranscriberOutput> {
        let described = self.describe(request);
        info!(command = %described, "running transcription");

        let output = self
            .command(request)
            .output()
            .map_err(|err| Error::ExternalTool {
                command: described.clone(),
                reason: format!("failed to launch: {err}"),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            status = %output.status,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "transcription finished"
        );

        if !output.status.success() {
            return Err(Error::ExternalTool {
                command: described,
                reason: format!("{}: {}", output.status, last_lines(&stderr, 5)),
            });
        }

        Ok(TranscriberOutput { stdout })
    }
}

/// Keep console windows from flashing up when we're embedded in a GUI host on Windows.
fn configure_std_command(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

/// Quote an argument for display if it contains whitespace or quotes.
fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '"') {
        return arg.to_owned();
    }
    format!("\"{}\"", arg.replace('"', "\\\""))
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(media: &'a Path, out: &'a Path) -> TranscribeRequest<'a> {
        TranscribeRequest {
            media_path: media,
            model: WhisperModel::Small,
            language: "English",
            output_format: SUBTITLE_FORMAT,
            output_dir: out,
        }
    }

    #[test]
    fn describe_lists_every_argument() {
        let media = Path::new("/media/My Talk.mp4");
        let out = Path::new("/tmp/out");
        let described = WhisperCli::new().describe(&request(media, out));

        assert_eq!(
            described,
            "whisper \"/media/My Talk.mp4\" --model small --language English \
             --output_format srt --output_dir /tmp/out"
        );
    }

    #[test]
    fn quote_arg_escapes_quotes() {
        assert_eq!(quote_arg("plain"), "plain");
        assert_eq!(quote_arg("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_arg(""), "\"\"");
    }

    #[test]
    fn missing_program_is_an_external_tool_error() {
        let media = Path::new("clip.wav");
        let out = Path::new(".");
        let cli = WhisperCli::with_program("captioner-test-no-such-program");

        let err = cli.transcribe(&request(media, out)).unwrap_err();
        match err {
            Error::ExternalTool { command, reason } => {
                assert!(command.starts_with("captioner-test-no-such-program clip.wav"));
                assert!(reason.contains("failed to launch"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn last_lines_keeps_the_tail() {
        assert_eq!(last_lines("a\n\nb\nc\n", 2), "b\nc");
        assert_eq!(last_lines("", 3), "");
    }
}
