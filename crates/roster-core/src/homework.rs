//! Per-student homework tracking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{EntityKind, Error, Result, id::AssignmentId};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HomeworkStatus {
  Complete,
  #[default]
  Incomplete,
  Late,
}

/// Assignment id → status. Immutable: every operation returns a new tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HomeworkTracker {
  entries: BTreeMap<AssignmentId, HomeworkStatus>,
}

impl HomeworkTracker {
  pub fn new() -> Self { Self::default() }

  pub fn contains(&self, assignment: AssignmentId) -> bool {
    self.entries.contains_key(&assignment)
  }

  pub fn status(&self, assignment: AssignmentId) -> Option<HomeworkStatus> {
    self.entries.get(&assignment).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (AssignmentId, HomeworkStatus)> + '_ {
    self.entries.iter().map(|(id, status)| (*id, *status))
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Track a new assignment as [`HomeworkStatus::Incomplete`].
  pub fn with_added(&self, assignment: AssignmentId) -> Result<Self> {
    if self.contains(assignment) {
      return Err(Error::duplicate(
        EntityKind::Homework,
        format!("assignment {assignment}"),
      ));
    }
    let mut entries = self.entries.clone();
    entries.insert(assignment, HomeworkStatus::default());
    Ok(Self { entries })
  }

  pub fn with_removed(&self, assignment: AssignmentId) -> Result<Self> {
    if !self.contains(assignment) {
      return Err(Error::not_found(
        EntityKind::Homework,
        format!("assignment {assignment}"),
      ));
    }
    let mut entries = self.entries.clone();
    entries.remove(&assignment);
    Ok(Self { entries })
  }

  pub fn with_status(
    &self,
    assignment: AssignmentId,
    status: HomeworkStatus,
  ) -> Result<Self> {
    if !self.contains(assignment) {
      return Err(Error::not_found(
        EntityKind::Homework,
        format!("assignment {assignment}"),
      ));
    }
    let mut entries = self.entries.clone();
    entries.insert(assignment, status);
    Ok(Self { entries })
  }
}

impl FromIterator<(AssignmentId, HomeworkStatus)> for HomeworkTracker {
  fn from_iter<I: IntoIterator<Item = (AssignmentId, HomeworkStatus)>>(
    iter: I,
  ) -> Self {
    Self { entries: iter.into_iter().collect() }
  }
}
