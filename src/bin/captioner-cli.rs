use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use captioner::captioner::{captions_from_text, export};
use captioner::logging;
use captioner::sync::{edit_fields, enumerate, export_track, write_back_fields};
use captioner::{
    Captioner, ContainerInfo, EntityHandle, MemoryTimeline, Opts, OutputType, SourceClip,
    WhisperCli, WhisperModel,
};

fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();

    match params.command {
        Command::Init {
            duration,
            fps,
            width,
            height,
            media,
            in_point,
            out_point,
        } => {
            let container = ContainerInfo {
                duration,
                frame_duration: 1.0 / fps,
                width,
                height,
            };
            let mut timeline = MemoryTimeline::new(container);
            if let Some(media_path) = media {
                timeline.set_selected_source(Some(SourceClip {
                    media_path,
                    in_point,
                    out_point: out_point.unwrap_or(duration),
                }));
            }
            save(&timeline, &params.project)
        }

        Command::Source => {
            let timeline = load(&params.project)?;
            let selected = Captioner::new().select_source(&timeline)?;
            println!("selected: {}", selected.clip.media_path.display());
            println!("output folder: {}", selected.default_output_dir.display());
            Ok(())
        }

        Command::Transcribe {
            model,
            language,
            output_dir,
            whisper,
        } => {
            let mut timeline = load(&params.project)?;
            let opts = Opts {
                model,
                language,
                output_dir,
            };

            let captioner = Captioner::with_transcriber(WhisperCli::with_program(whisper));
            let report = captioner.transcribe_and_import(&mut timeline, &opts)?;
            save(&timeline, &params.project)?;

            println!(
                "imported {} captions from {} ({:?})",
                report.entities.len(),
                report.srt_path.display(),
                report.source
            );
            Ok(())
        }

        Command::Import { srt } => {
            let mut timeline = load(&params.project)?;
            let created = Captioner::new().import_srt_file(&srt, &mut timeline)?;
            save(&timeline, &params.project)?;
            println!("imported {} captions from {}", created.len(), srt.display());
            Ok(())
        }

        Command::List => {
            let timeline = load(&params.project)?;
            for (i, item) in enumerate(&timeline)?.iter().enumerate() {
                println!("{:>4}  {}  {}", i + 1, item.handle, item.display());
            }
            Ok(())
        }

        Command::Edit {
            handle,
            text,
            start,
            end,
        } => {
            let mut timeline = load(&params.project)?;
            let handle = EntityHandle::parse(&handle)
                .ok_or_else(|| anyhow!("not a caption handle: {handle}"))?;

            let current = edit_fields(&timeline, handle)?;
            write_back_fields(
                &mut timeline,
                handle,
                text.as_deref().unwrap_or(&current.text),
                start.as_deref().unwrap_or(&current.start),
                end.as_deref().unwrap_or(&current.end),
            )?;
            save(&timeline, &params.project)
        }

        Command::Export {
            output_type,
            output,
        } => {
            let timeline = load(&params.project)?;
            let track = export_track(&timeline)?;

            match output {
                Some(path) => {
                    let path = with_default_extension(path, output_type);
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create '{}'", path.display()))?;
                    export(&track, file, output_type)?;
                    println!("wrote {} captions to {}", track.len(), path.display());
                }
                None => export(&track, io::stdout().lock(), output_type)?,
            }
            Ok(())
        }

        Command::Segment {
            duration,
            output_type,
        } => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read transcript from stdin")?;

            let track = captions_from_text(&text, duration);
            let mut stdout = io::stdout().lock();
            export(&track, &mut stdout, output_type)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "captioner")]
#[command(about = "Transcribe media into captions and edit them on a timeline project")]
struct Params {
    /// Path to the JSON project file acting as the host timeline.
    #[arg(short = 'p', long = "project", default_value = "captions.project.json")]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty project with an active container.
    Init {
        /// Container length in seconds.
        #[arg(long = "duration")]
        duration: f64,

        #[arg(long = "fps", default_value_t = 30.0, value_parser = parse_fps)]
        fps: f64,

        #[arg(long = "width", default_value_t = 1920.0)]
        width: f64,

        #[arg(long = "height", default_value_t = 1080.0)]
        height: f64,

        /// Media file to select as the transcription source.
        #[arg(long = "media")]
        media: Option<PathBuf>,

        #[arg(long = "in", default_value_t = 0.0)]
        in_point: f64,

        /// Defaults to the container duration.
        #[arg(long = "out")]
        out_point: Option<f64>,
    },

    /// Show the selected source clip and where its transcripts will go.
    Source,

    /// Run Whisper on the selected clip and import the captions.
    Transcribe {
        #[arg(short = 'm', long = "model", value_enum, default_value_t = WhisperModel::Medium)]
        model: WhisperModel,

        #[arg(short = 'l', long = "language", default_value = "English")]
        language: String,

        /// Defaults to the folder holding the media file.
        #[arg(short = 'o', long = "output-dir")]
        output_dir: Option<PathBuf>,

        /// Whisper executable to run.
        #[arg(long = "whisper", default_value = "whisper")]
        whisper: String,
    },

    /// Import an existing SRT file.
    Import { srt: PathBuf },

    /// List captions bottom-to-top with their handles.
    List,

    /// Change a caption's text or timing. Omitted fields keep their current value.
    Edit {
        handle: String,

        #[arg(long = "text")]
        text: Option<String>,

        /// Start time as `HH:MM:SS,mmm`.
        #[arg(long = "start")]
        start: Option<String>,

        /// End time as `HH:MM:SS,mmm`.
        #[arg(long = "end")]
        end: Option<String>,
    },

    /// Write the project's captions to a file, or to stdout.
    Export {
        #[arg(short = 't', long = "output-type", value_enum, default_value_t = OutputType::Srt)]
        output_type: OutputType,

        /// Output file. Gets the format's extension if it has none.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Segment and auto-time a transcript read from stdin.
    Segment {
        /// Total duration to spread captions over, in seconds.
        #[arg(short = 'd', long = "duration")]
        duration: Option<f64>,

        #[arg(short = 't', long = "output-type", value_enum, default_value_t = OutputType::Srt)]
        output_type: OutputType,
    },
}

fn load(path: &Path) -> Result<MemoryTimeline> {
    MemoryTimeline::load(path)
        .with_context(|| format!("failed to load project from '{}'", path.display()))
}

fn save(timeline: &MemoryTimeline, path: &Path) -> Result<()> {
    timeline
        .save(path)
        .with_context(|| format!("failed to save project to '{}'", path.display()))
}

fn parse_fps(s: &str) -> std::result::Result<f64, String> {
    let fps: f64 = s.parse().map_err(|err| format!("invalid frame rate '{s}': {err}"))?;
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(format!("frame rate must be a positive number, got {s}"))
    }
}

fn with_default_extension(path: PathBuf, output_type: OutputType) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(output_type.extension())
    }
}
