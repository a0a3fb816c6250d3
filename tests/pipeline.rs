use std::cell::Cell;
use std::path::Path;

use captioner::sync::enumerate;
use captioner::{
    CaptionSource, Captioner, ContainerInfo, Error, MemoryTimeline, Opts, SourceClip,
    TranscribeRequest, Transcriber, TranscriberOutput, Timeline, WhisperCli,
};

/// Stands in for the whisper CLI: writes whatever files it was told to and prints `stdout`.
#[derive(Default)]
struct FakeWhisper {
    srt: Option<String>,
    txt: Option<String>,
    stdout: String,
    fail_with: Option<String>,
    calls: Cell<usize>,
}

impl Transcriber for FakeWhisper {
    fn describe(&self, request: &TranscribeRequest<'_>) -> String {
        format!("fake-whisper {}", request.media_path.display())
    }

    fn transcribe(&self, request: &TranscribeRequest<'_>) -> captioner::Result<TranscriberOutput> {
        self.calls.set(self.calls.get() + 1);

        if let Some(reason) = &self.fail_with {
            return Err(Error::ExternalTool {
                command: self.describe(request),
                reason: reason.clone(),
            });
        }

        let stem = request
            .media_path
            .file_stem()
            .expect("media has a stem")
            .to_string_lossy()
            .into_owned();
        std::fs::create_dir_all(request.output_dir)?;
        if let Some(srt) = &self.srt {
            std::fs::write(request.output_dir.join(format!("{stem}.srt")), srt)?;
        }
        if let Some(txt) = &self.txt {
            std::fs::write(request.output_dir.join(format!("{stem}.txt")), txt)?;
        }

        Ok(TranscriberOutput {
            stdout: self.stdout.clone(),
        })
    }
}

fn container(duration: f64) -> ContainerInfo {
    ContainerInfo {
        duration,
        frame_duration: 1.0 / 30.0,
        width: 1280.0,
        height: 720.0,
    }
}

fn timeline_with_clip(dir: &Path, duration: f64) -> MemoryTimeline {
    MemoryTimeline::new(container(duration)).with_source(SourceClip {
        media_path: dir.join("interview.mp4"),
        in_point: 0.0,
        out_point: duration,
    })
}

const SCENARIO: &str = "Hello there. This is a test of the caption system that runs long enough \
    to need wrapping because it keeps going on and on without end.";

#[test]
fn imports_subtitle_file_written_by_transcriber() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut timeline = timeline_with_clip(dir.path(), 20.0);
    let fake = FakeWhisper {
        srt: Some("1\n00:00:01,000 --> 00:00:02,000\nfrom srt\n\n".to_string()),
        txt: Some("ignored transcript".to_string()),
        ..FakeWhisper::default()
    };

    let captioner = Captioner::with_transcriber(fake);
    let report = captioner.transcribe_and_import(&mut timeline, &Opts::default())?;

    assert_eq!(report.source, CaptionSource::SubtitleFile);
    assert_eq!(report.srt_path, dir.path().join("interview.srt"));
    assert_eq!(report.entities.len(), 1);

    let items = enumerate(&timeline)?;
    assert_eq!(items[0].first_line, "from srt");
    assert!((items[0].start_seconds - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn builds_captions_from_transcript_file_when_no_srt() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut timeline = timeline_with_clip(dir.path(), 9.0);
    let fake = FakeWhisper {
        txt: Some(SCENARIO.to_string()),
        ..FakeWhisper::default()
    };

    let report =
        Captioner::with_transcriber(fake).transcribe_and_import(&mut timeline, &Opts::default())?;
    assert_eq!(report.source, CaptionSource::TranscriptFile);

    // The generated file is left behind for re-import.
    let written = std::fs::read_to_string(dir.path().join("interview.srt"))?;
    assert!(written.starts_with("1\n00:00:00,000 --> 00:00:04,500\nHello there."));

    let items = enumerate(&timeline)?;
    assert_eq!(items.len(), 2);
    assert!(items[0].first_line.starts_with("Hello there."));
    assert!((items[0].start_seconds - 0.0).abs() < 1e-9);
    assert!((items[0].end_seconds - 4.5).abs() < 1e-9);
    assert!((items[1].start_seconds - 4.5).abs() < 1e-9);
    assert!((items[1].end_seconds - 9.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn whitespace_only_transcript_lines_survive_the_generated_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut timeline = timeline_with_clip(dir.path(), 10.0);
    let fake = FakeWhisper {
        txt: Some("Hello\n   \nWorld".to_string()),
        ..FakeWhisper::default()
    };

    Captioner::with_transcriber(fake).transcribe_and_import(&mut timeline, &Opts::default())?;

    let written = std::fs::read_to_string(dir.path().join("interview.srt"))?;
    assert!(!written.contains("   \n"));

    let texts: Vec<String> = enumerate(&timeline)?
        .into_iter()
        .map(|item| item.first_line)
        .collect();
    assert_eq!(texts, ["Hello", "World"]);
    Ok(())
}

#[test]
fn falls_back_to_process_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut timeline = timeline_with_clip(dir.path(), 0.0);
    let fake = FakeWhisper {
        txt: Some("   \n\n  ".to_string()),
        stdout: "printed line one\n\nprinted line two\n".to_string(),
        ..FakeWhisper::default()
    };

    let report =
        Captioner::with_transcriber(fake).transcribe_and_import(&mut timeline, &Opts::default())?;
    assert_eq!(report.source, CaptionSource::ProcessOutput);

    // Unknown duration: three seconds per line.
    let items = enumerate(&timeline)?;
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].first_line, "printed line two");
    assert!((items[1].end_seconds - 6.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn auto_timing_uses_the_longer_of_clip_and_container() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut timeline = MemoryTimeline::new(container(4.0)).with_source(SourceClip {
        media_path: dir.path().join("long.wav"),
        in_point: 2.0,
        out_point: 12.0,
    });
    let fake = FakeWhisper {
        txt: Some("one\n\ntwo".to_string()),
        ..FakeWhisper::default()
    };

    Captioner::with_transcriber(fake).transcribe_and_import(&mut timeline, &Opts::default())?;

    let items = enumerate(&timeline)?;
    assert!((items[1].end_seconds - 10.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn nothing_to_import_is_missing_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut timeline = timeline_with_clip(dir.path(), 10.0);
    let fake = FakeWhisper {
        stdout: " \n".to_string(),
        ..FakeWhisper::default()
    };

    let err = Captioner::with_transcriber(fake)
        .transcribe_and_import(&mut timeline, &Opts::default())
        .unwrap_err();

    match err {
        Error::MissingOutput { command, searched } => {
            assert!(command.starts_with("fake-whisper"));
            assert_eq!(searched.len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(timeline.is_empty());
    assert!(!dir.path().join("interview.srt").exists());
    Ok(())
}

#[test]
fn output_dir_option_redirects_lookup() -> anyhow::Result<()> {
    let media_dir = tempfile::tempdir()?;
    let out_dir = tempfile::tempdir()?;
    let mut timeline = timeline_with_clip(media_dir.path(), 10.0);
    let fake = FakeWhisper {
        txt: Some("only line".to_string()),
        ..FakeWhisper::default()
    };
    let opts = Opts {
        output_dir: Some(out_dir.path().to_path_buf()),
        ..Opts::default()
    };

    let report = Captioner::with_transcriber(fake).transcribe_and_import(&mut timeline, &opts)?;
    assert_eq!(report.srt_path, out_dir.path().join("interview.srt"));
    assert!(!media_dir.path().join("interview.srt").exists());
    Ok(())
}

#[test]
fn usage_errors_stop_before_transcribing() {
    let fake = FakeWhisper::default();
    let captioner = Captioner::with_transcriber(fake);

    let mut no_container = MemoryTimeline::default();
    let err = captioner
        .transcribe_and_import(&mut no_container, &Opts::default())
        .unwrap_err();
    assert!(matches!(err, Error::Usage(_)));

    let mut no_source = MemoryTimeline::new(container(10.0));
    let err = captioner
        .transcribe_and_import(&mut no_source, &Opts::default())
        .unwrap_err();
    assert!(matches!(err, Error::Usage(_)));

    assert_eq!(captioner.transcriber().calls.get(), 0);
}

#[test]
fn transcriber_failure_is_surfaced_with_command() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut timeline = timeline_with_clip(dir.path(), 10.0);
    let fake = FakeWhisper {
        fail_with: Some("exit status: 1".to_string()),
        ..FakeWhisper::default()
    };

    let err = Captioner::with_transcriber(fake)
        .transcribe_and_import(&mut timeline, &Opts::default())
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("exit status: 1"));
    assert!(msg.contains("fake-whisper"));
    assert!(timeline.is_empty());
    Ok(())
}

#[test]
fn missing_whisper_binary_is_an_external_tool_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut timeline = timeline_with_clip(dir.path(), 10.0);
    let captioner =
        Captioner::with_transcriber(WhisperCli::with_program("captioner-missing-whisper-binary"));

    let err = captioner
        .transcribe_and_import(&mut timeline, &Opts::default())
        .unwrap_err();
    assert!(matches!(err, Error::ExternalTool { .. }));
    assert_eq!(timeline.text_entities().len(), 0);
    Ok(())
}

#[test]
fn select_source_reports_default_output_folder() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let timeline = timeline_with_clip(dir.path(), 10.0);
    let selected = Captioner::new().select_source(&timeline)?;
    assert_eq!(selected.default_output_dir, dir.path());
    Ok(())
}
