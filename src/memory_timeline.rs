//! A [`Timeline`] that lives in memory and can be saved to a JSON project file.
//!
//! The CLI uses this as its host document, and tests use it to observe exactly what the
//! synchronizer did.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::timeline::{ContainerInfo, EntityHandle, SourceClip, TimedEntity, Timeline};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredEntity {
    handle: EntityHandle,
    start_seconds: f64,
    end_seconds: f64,
    text: String,
    #[serde(default)]
    position: [f64; 2],
}

/// In-memory host document.
///
/// `entities` is kept in stacking order, topmost first, matching how editors number layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryTimeline {
    #[serde(default)]
    container: Option<ContainerInfo>,

    #[serde(default)]
    selected_source: Option<SourceClip>,

    #[serde(default)]
    entities: Vec<StoredEntity>,

    /// Names of closed undo groups, oldest first. Not persisted.
    #[serde(skip)]
    undo_groups: Vec<String>,

    #[serde(skip)]
    open_group: Option<String>,
}

impl MemoryTimeline {
    /// A document with an active container and nothing in it.
    pub fn new(container: ContainerInfo) -> Self {
        Self {
            container: Some(container),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, clip: SourceClip) -> Self {
        self.selected_source = Some(clip);
        self
    }

    pub fn set_selected_source(&mut self, clip: Option<SourceClip>) {
        self.selected_source = clip;
    }

    /// Delete an entity the way a user would in the host UI.
    pub fn remove_entity(&mut self, handle: EntityHandle) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.handle != handle);
        self.entities.len() != before
    }

    pub fn position_of(&self, handle: EntityHandle) -> Option<[f64; 2]> {
        self.find(handle).map(|e| e.position)
    }

    /// Names of the undo groups that have been closed, oldest first.
    pub fn undo_groups(&self) -> &[String] {
        &self.undo_groups
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Load a project file written by [`MemoryTimeline::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let timeline = serde_json::from_reader(BufReader::new(file))?;
        Ok(timeline)
    }

    /// Write the document as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut w = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut w, self)?;
        w.write_all(b"\n")?;
        w.flush()?;
        Ok(())
    }

    fn find(&self, handle: EntityHandle) -> Option<&StoredEntity> {
        self.entities.iter().find(|e| e.handle == handle)
    }

    fn find_mut(&mut self, handle: EntityHandle) -> Result<&mut StoredEntity> {
        self.entities
            .iter_mut()
            .find(|e| e.handle == handle)
            .ok_or(Error::EntityVanished(handle))
    }

    fn snapshot(&self, stack_pos: usize) -> TimedEntity {
        let e = &self.entities[stack_pos];
        TimedEntity {
            handle: e.handle,
            start_seconds: e.start_seconds,
            end_seconds: e.end_seconds,
            text: e.text.clone(),
            stack_index: stack_pos + 1,
        }
    }
}

impl Timeline for MemoryTimeline {
    fn container(&self) -> Option<ContainerInfo> {
        self.container
    }

    fn selected_source(&self) -> Option<SourceClip> {
        self.selected_source.clone()
    }

    fn begin_undo_group(&mut self, name: &str) {
        // Nested groups fold into the outer one, as most hosts do.
        if self.open_group.is_none() {
            self.open_group = Some(name.to_owned());
        }
    }

    fn end_undo_group(&mut self) {
        if let Some(name) = self.open_group.take() {
            debug!(group = %name, "closed undo group");
            self.undo_groups.push(name);
        }
    }

    fn add_text_entity(&mut self, text: &str) -> Result<EntityHandle> {
        let duration = self.container.map(|c| c.duration).unwrap_or_default();
        let handle = EntityHandle::new();
        // New entities land on top of the stack and span the whole container until timed.
        self.entities.insert(
            0,
            StoredEntity {
                handle,
                start_seconds: 0.0,
                end_seconds: duration,
                text: text.to_owned(),
                position: [0.0, 0.0],
            },
        );
        Ok(handle)
    }

    fn set_text(&mut self, handle: EntityHandle, text: &str) -> Result<()> {
        self.find_mut(handle)?.text = text.to_owned();
        Ok(())
    }

    fn set_timing(
        &mut self,
        handle: EntityHandle,
        start_seconds: f64,
        end_seconds: f64,
    ) -> Result<()> {
        let entity = self.find_mut(handle)?;
        entity.start_seconds = start_seconds;
        entity.end_seconds = end_seconds;
        Ok(())
    }

    fn set_position(&mut self, handle: EntityHandle, position: [f64; 2]) -> Result<()> {
        self.find_mut(handle)?.position = position;
        Ok(())
    }

    fn text_entities(&self) -> Vec<TimedEntity> {
        (0..self.entities.len()).map(|i| self.snapshot(i)).collect()
    }

    fn entity(&self, handle: EntityHandle) -> Option<TimedEntity> {
        self.entities
            .iter()
            .position(|e| e.handle == handle)
            .map(|i| self.snapshot(i))
    }
}
