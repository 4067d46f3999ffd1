//! Per-student weekly attendance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::id::Week;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
  Present,
  Absent,
  Excused,
}

/// Week → status. Marking a week that is already marked overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceSheet {
  weeks: BTreeMap<Week, AttendanceStatus>,
}

impl AttendanceSheet {
  pub fn new() -> Self { Self::default() }

  pub fn status(&self, week: Week) -> Option<AttendanceStatus> {
    self.weeks.get(&week).copied()
  }

  /// Marked weeks in ascending order.
  pub fn iter(&self) -> impl Iterator<Item = (Week, AttendanceStatus)> + '_ {
    self.weeks.iter().map(|(w, s)| (*w, *s))
  }

  pub fn len(&self) -> usize { self.weeks.len() }

  pub fn is_empty(&self) -> bool { self.weeks.is_empty() }

  /// Rebuild the sheet by replaying every recorded week, then `week`.
  pub fn with_marked(&self, week: Week, status: AttendanceStatus) -> Self {
    let mut rebuilt = Self::new();
    for (w, s) in self.iter() {
      rebuilt.weeks.insert(w, s);
    }
    rebuilt.weeks.insert(week, status);
    rebuilt
  }
}

impl FromIterator<(Week, AttendanceStatus)> for AttendanceSheet {
  fn from_iter<I: IntoIterator<Item = (Week, AttendanceStatus)>>(iter: I) -> Self {
    Self { weeks: iter.into_iter().collect() }
  }
}
