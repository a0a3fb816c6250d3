//! Keeps caption tracks and host text entities in step.
//!
//! Import turns captions into positioned, frame-aligned text entities. Enumerate goes the other
//! way and lists existing entities bottom-to-top (oldest first), which keeps list positions
//! stable as new captions are stacked on top. Edits are written back by [`EntityHandle`], never
//! by list position.
//!
//! Nothing here is cached: every call reads the host afresh, so the list can't drift from the
//! document after edits made directly in the host.

use tracing::{debug, info};

use crate::caption::Caption;
use crate::timecode::{format_clock, format_timestamp, parse_timestamp_lenient, quantize_to_frame};
use crate::timeline::{ContainerInfo, EntityHandle, TimedEntity, Timeline};
use crate::{Error, Result};

/// Distance in pixels between the bottom of the container and where captions are placed.
pub const DEFAULT_BOTTOM_MARGIN: f64 = 100.0;

const IMPORT_UNDO_GROUP: &str = "Import SRT Subtitles";
const UPDATE_UNDO_GROUP: &str = "Update Subtitle";

/// One row of the editable caption list.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionListItem {
    pub handle: EntityHandle,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub first_line: String,
}

impl CaptionListItem {
    /// Compact row text: `HH:MM:SS > HH:MM:SS | first line`.
    pub fn display(&self) -> String {
        format!(
            "{} > {} | {}",
            format_clock(self.start_seconds),
            format_clock(self.end_seconds),
            self.first_line
        )
    }
}

/// Editor field values for one entity. Timings use the subtitle timestamp format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditFields {
    pub text: String,
    pub start: String,
    pub end: String,
}

/// Create one text entity per caption, in index order, inside a single undo group.
///
/// Timings are snapped to the container's frame grid and every entity is centred horizontally
/// [`DEFAULT_BOTTOM_MARGIN`] pixels above the bottom edge.
///
/// Not atomic: if the host fails part-way, the entities created so far stay in the document.
pub fn import_captions<T>(captions: &[Caption], timeline: &mut T) -> Result<Vec<EntityHandle>>
where
    T: Timeline + ?Sized,
{
    let container = active_container(&*timeline)?;

    let mut ordered: Vec<&Caption> = captions.iter().collect();
    ordered.sort_by_key(|c| c.index);

    let mut created = Vec::with_capacity(ordered.len());
    timeline.begin_undo_group(IMPORT_UNDO_GROUP);
    let run_res = place_all(timeline, &container, &ordered, &mut created);
    timeline.end_undo_group();
    run_res?;

    info!(count = created.len(), "imported captions");
    Ok(created)
}

fn place_all<T>(
    timeline: &mut T,
    container: &ContainerInfo,
    captions: &[&Caption],
    created: &mut Vec<EntityHandle>,
) -> Result<()>
where
    T: Timeline + ?Sized,
{
    for caption in captions {
        created.push(place_caption(timeline, container, caption)?);
    }
    Ok(())
}

fn place_caption<T>(
    timeline: &mut T,
    container: &ContainerInfo,
    caption: &Caption,
) -> Result<EntityHandle>
where
    T: Timeline + ?Sized,
{
    let handle = timeline.add_text_entity(&caption.text())?;

    let start = quantize_to_frame(caption.start_seconds, container.frame_duration);
    let end = quantize_to_frame(caption.end_seconds, container.frame_duration);
    timeline.set_timing(handle, start, end)?;

    let position = [
        container.width / 2.0,
        container.height - DEFAULT_BOTTOM_MARGIN,
    ];
    timeline.set_position(handle, position)?;

    debug!(index = caption.index, %handle, start, end, "placed caption");
    Ok(handle)
}

/// List the container's text entities bottom-to-top.
pub fn enumerate<T>(timeline: &T) -> Result<Vec<CaptionListItem>>
where
    T: Timeline + ?Sized,
{
    active_container(timeline)?;

    Ok(bottom_to_top(timeline.text_entities())
        .into_iter()
        .map(|e| CaptionListItem {
            handle: e.handle,
            start_seconds: e.start_seconds,
            end_seconds: e.end_seconds,
            first_line: e.text.lines().next().unwrap_or_default().to_owned(),
        })
        .collect())
}

/// Order entities from the bottom of the host stack to the top.
///
/// A pure function of the host's stacking index so it can be recomputed on every call.
pub fn bottom_to_top(mut entities: Vec<TimedEntity>) -> Vec<TimedEntity> {
    entities.sort_by(|a, b| b.stack_index.cmp(&a.stack_index));
    entities
}

/// Current text and timings of an entity, ready to populate an editor.
pub fn edit_fields<T>(timeline: &T, handle: EntityHandle) -> Result<EditFields>
where
    T: Timeline + ?Sized,
{
    let entity = timeline
        .entity(handle)
        .ok_or(Error::EntityVanished(handle))?;

    Ok(EditFields {
        text: entity.text,
        start: format_timestamp(entity.start_seconds),
        end: format_timestamp(entity.end_seconds),
    })
}

/// Replace an entity's text and timing in place.
///
/// Timings are snapped to the frame grid. Callers that display the list should call
/// [`enumerate`] again afterwards; nothing is pushed to them.
pub fn write_back<T>(
    timeline: &mut T,
    handle: EntityHandle,
    text: &str,
    start_seconds: f64,
    end_seconds: f64,
) -> Result<()>
where
    T: Timeline + ?Sized,
{
    let container = active_container(&*timeline)?;

    if end_seconds < start_seconds {
        return Err(Error::usage(format!(
            "caption end ({}) is before its start ({})",
            format_timestamp(end_seconds),
            format_timestamp(start_seconds)
        )));
    }

    if timeline.entity(handle).is_none() {
        return Err(Error::EntityVanished(handle));
    }

    let start = quantize_to_frame(start_seconds, container.frame_duration);
    let end = quantize_to_frame(end_seconds, container.frame_duration);

    timeline.begin_undo_group(UPDATE_UNDO_GROUP);
    let run_res = timeline
        .set_text(handle, text)
        .and_then(|()| timeline.set_timing(handle, start, end));
    timeline.end_undo_group();
    run_res?;

    debug!(%handle, start, end, "updated caption");
    Ok(())
}

/// [`write_back`] taking timings as typed into an editor (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`).
pub fn write_back_fields<T>(
    timeline: &mut T,
    handle: EntityHandle,
    text: &str,
    start: &str,
    end: &str,
) -> Result<()>
where
    T: Timeline + ?Sized,
{
    write_back(
        timeline,
        handle,
        text,
        parse_timestamp_lenient(start),
        parse_timestamp_lenient(end),
    )
}

/// Rebuild a caption track from the container's entities, bottom-to-top, numbered from 1.
pub fn export_track<T>(timeline: &T) -> Result<Vec<Caption>>
where
    T: Timeline + ?Sized,
{
    active_container(timeline)?;

    Ok(bottom_to_top(timeline.text_entities())
        .into_iter()
        .enumerate()
        .map(|(i, e)| Caption::new(i + 1, e.start_seconds, e.end_seconds, &e.text))
        .collect())
}

fn active_container<T>(timeline: &T) -> Result<ContainerInfo>
where
    T: Timeline + ?Sized,
{
    timeline
        .container()
        .ok_or_else(|| Error::usage("no active container: open or select a composition first"))
}
