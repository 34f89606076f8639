use std::collections::BTreeMap;

use super::model::{SeriesGroup, SeriesKind, XAxis};
use super::partition::{partition_group, GroupCycle};
use super::transform::{angle_to_momentum_transfer, momentum_transfer_to_angle};
use crate::error::SeriesError;

// ---------------------------------------------------------------------------
// SeriesStore – tag → series group
// ---------------------------------------------------------------------------

/// Owns every loaded series group for one session, keyed by a unique tag.
///
/// Lookups go through a `BTreeMap` index; iteration follows insertion order
/// so plots keep a stable layering and colour assignment.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    groups: Vec<SeriesGroup>,
    index: BTreeMap<String, usize>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the group produced by `load` under `tag`.
    ///
    /// The tag is checked before `load` runs, so a duplicate never touches
    /// the filesystem. Load failures come back as [`SeriesError::SourceRead`].
    pub fn labeled_import<F>(&mut self, tag: &str, load: F) -> Result<&SeriesGroup, SeriesError>
    where
        F: FnOnce() -> anyhow::Result<SeriesKind>,
    {
        if self.contains(tag) {
            return Err(SeriesError::DuplicateTag(tag.to_string()));
        }
        let kind = load().map_err(|source| SeriesError::SourceRead {
            tag: tag.to_string(),
            source,
        })?;
        let group = SeriesGroup::new(tag, kind)?;
        log::info!(
            "Imported '{tag}' ({}, {} samples)",
            group.kind().name(),
            group.len()
        );
        self.insert(group)
    }

    /// Add an already-built group.
    pub fn insert(&mut self, group: SeriesGroup) -> Result<&SeriesGroup, SeriesError> {
        if self.contains(group.tag()) {
            return Err(SeriesError::DuplicateTag(group.tag().to_string()));
        }
        let slot = self.groups.len();
        self.index.insert(group.tag().to_string(), slot);
        self.groups.push(group);
        Ok(&self.groups[slot])
    }

    pub fn get(&self, tag: &str) -> Option<&SeriesGroup> {
        self.index.get(tag).map(|&i| &self.groups[i])
    }

    /// Like [`get`](Self::get) but reports a missing tag as an error.
    pub fn require(&self, tag: &str) -> Result<&SeriesGroup, SeriesError> {
        self.get(tag)
            .ok_or_else(|| SeriesError::UnknownTag(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    pub fn remove(&mut self, tag: &str) -> Option<SeriesGroup> {
        let slot = self.index.remove(tag)?;
        let group = self.groups.remove(slot);
        for i in self.index.values_mut() {
            if *i > slot {
                *i -= 1;
            }
        }
        Some(group)
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(|g| g.tag())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesGroup> + '_ {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.index.clear();
    }

    // -- derived views, never mutating the stored groups --

    /// Cycles of every column stored under `tag`.
    pub fn partition(&self, tag: &str, cycle_pts: usize) -> Result<Vec<GroupCycle<'_>>, SeriesError> {
        partition_group(self.require(tag)?, cycle_pts)
    }

    /// Copy of the diffraction pattern under `tag` expressed on `target` x-axis.
    pub fn with_axis(
        &self,
        tag: &str,
        target: XAxis,
        wavelength: f64,
    ) -> Result<SeriesGroup, SeriesError> {
        let group = self.require(tag)?;
        convert_axis(group, target, wavelength)
    }

    /// Copy of the group under `tag` with samples reordered by time.
    pub fn sorted_by_time(&self, tag: &str) -> Result<SeriesGroup, SeriesError> {
        Ok(self.require(tag)?.sorted_by_time())
    }
}

/// Convert an XRD group's x column to `target`, copying the other columns.
pub fn convert_axis(
    group: &SeriesGroup,
    target: XAxis,
    wavelength: f64,
) -> Result<SeriesGroup, SeriesError> {
    let SeriesKind::Xrd {
        axis,
        x,
        intensity,
        uncertainty,
    } = group.kind()
    else {
        return Err(SeriesError::KindMismatch {
            tag: group.tag().to_string(),
            expected: "XRD",
            actual: group.kind().name(),
        });
    };

    let x = match (axis, target) {
        (XAxis::TwoTheta, XAxis::Q) => angle_to_momentum_transfer(x, wavelength)?,
        (XAxis::Q, XAxis::TwoTheta) => momentum_transfer_to_angle(x, wavelength)?,
        _ => x.clone(),
    };
    SeriesGroup::new(
        group.tag(),
        SeriesKind::Xrd {
            axis: target,
            x,
            intensity: intensity.clone(),
            uncertainty: uncertainty.clone(),
        },
    )
}
