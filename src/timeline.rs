//! The host document seen from the captioner's side.
//!
//! We never own the host's entities. A [`Timeline`] hands out opaque [`EntityHandle`]s and
//! performs every read and mutation itself, so an implementation can sit on top of an editor's
//! scripting API, a project file, or (as in [`crate::memory_timeline`]) plain memory.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Opaque, stable reference to a timed text entity in the host.
///
/// Handles stay valid across re-enumeration, so an edit always lands on the entity the user
/// picked even if the list was rebuilt in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHandle(Uuid);

impl EntityHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for EntityHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The active container (composition, sequence, ...) captions are placed into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Total length in seconds.
    pub duration: f64,
    /// Seconds per frame. Every timing we commit is snapped to this grid.
    pub frame_duration: f64,
    pub width: f64,
    pub height: f64,
}

/// The media clip the user picked as the thing to transcribe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceClip {
    pub media_path: PathBuf,
    /// Where the clip starts in the container, in seconds.
    pub in_point: f64,
    /// Where the clip ends in the container, in seconds.
    pub out_point: f64,
}

impl SourceClip {
    pub fn duration(&self) -> f64 {
        self.out_point - self.in_point
    }
}

/// A snapshot of one timed text entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEntity {
    pub handle: EntityHandle,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
    /// Host stacking position, 1 = topmost. New entities land on top.
    pub stack_index: usize,
}

/// Host document operations the captioner relies on.
///
/// Implementations report a mutation on a handle they no longer know with
/// [`crate::Error::EntityVanished`].
pub trait Timeline {
    /// The active container, or `None` if the host has nothing open that can hold captions.
    fn container(&self) -> Option<ContainerInfo>;

    /// The currently selected media clip, if any.
    fn selected_source(&self) -> Option<SourceClip>;

    /// Start grouping subsequent mutations into one undoable step.
    fn begin_undo_group(&mut self, name: &str);

    /// Close the group opened by `begin_undo_group`.
    fn end_undo_group(&mut self);

    /// Create a text entity on top of the stack and return its handle.
    fn add_text_entity(&mut self, text: &str) -> Result<EntityHandle>;

    fn set_text(&mut self, handle: EntityHandle, text: &str) -> Result<()>;

    fn set_timing(&mut self, handle: EntityHandle, start_seconds: f64, end_seconds: f64)
    -> Result<()>;

    /// Move an entity to `(x, y)` in container pixels.
    fn set_position(&mut self, handle: EntityHandle, position: [f64; 2]) -> Result<()>;

    /// All timed text entities, in any order; `stack_index` carries the host's stacking.
    fn text_entities(&self) -> Vec<TimedEntity>;

    /// One entity by handle, or `None` if the host no longer has it.
    fn entity(&self, handle: EntityHandle) -> Option<TimedEntity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_round_trip_through_text() {
        let a = EntityHandle::new();
        let b = EntityHandle::new();
        assert_ne!(a, b);
        assert_eq!(EntityHandle::parse(&a.to_string()), Some(a));
        assert_eq!(EntityHandle::parse("not-a-handle"), None);
    }

    #[test]
    fn clip_duration_is_out_minus_in() {
        let clip = SourceClip {
            media_path: PathBuf::from("talk.mp4"),
            in_point: 2.0,
            out_point: 12.5,
        };
        assert_eq!(clip.duration(), 10.5);
    }
}
