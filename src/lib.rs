//! `captioner`: turn speech-to-text output into a timed caption track and keep it in step
//! with a host timeline.
//!
//! This crate provides:
//! - Subtitle timestamp formatting/parsing and frame snapping
//! - Transcript segmentation and auto-timing for untimed text
//! - A forgiving SRT reader plus SRT, WebVTT and JSON writers
//! - Import of captions into a host timeline, and listing/editing them afterwards
//! - An orchestrator that drives an external transcriber (the `whisper` CLI by default)
//!
//! The host document is abstracted behind [`Timeline`], so the same pipeline can drive an editor
//! plugin, a project file, or the in-memory [`MemoryTimeline`] used by the CLI and tests.

// High-level API (most consumers should start here).
pub mod captioner;
pub mod opts;

// Caption data model and pure transforms.
pub mod auto_timer;
pub mod caption;
pub mod segmenter;
pub mod timecode;

// Subtitle parsing, output selection, and encoders.
pub mod caption_encoder;
pub mod json_array_encoder;
pub mod output_type;
pub mod srt_encoder;
pub mod srt_parser;
pub mod vtt_encoder;

// Host timeline interface and synchronization.
pub mod memory_timeline;
pub mod sync;
pub mod timeline;

// External transcription.
pub mod transcriber;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use captioner::{CaptionSource, Captioner, ImportReport, SelectedSource};
pub use caption::Caption;
pub use error::{Error, Result};
pub use memory_timeline::MemoryTimeline;
pub use opts::{Opts, WhisperModel};
pub use output_type::OutputType;
pub use timeline::{ContainerInfo, EntityHandle, SourceClip, TimedEntity, Timeline};
pub use transcriber::{TranscribeRequest, Transcriber, TranscriberOutput, WhisperCli};
