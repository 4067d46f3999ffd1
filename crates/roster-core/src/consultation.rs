//! Consultation slots and the overlap rule that governs booking them.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, id::StudentId, identity::Identity};

/// Text form of a consultation boundary, e.g. `20251010 1800`.
pub const TIME_FORMAT: &str = "%Y%m%d %H%M";

/// Parse a boundary in [`TIME_FORMAT`].
///
/// A string of the wrong shape and a well-shaped string naming a date that
/// does not exist are reported differently.
pub fn parse_time(raw: &str) -> Result<NaiveDateTime> {
  let raw = raw.trim();
  let shaped = raw.len() == 13
    && raw.char_indices().all(|(i, c)| {
      if i == 8 { c == ' ' } else { c.is_ascii_digit() }
    });
  if !shaped {
    return Err(Error::invalid(format!(
      "incorrect date & time format {raw:?}; use yyyyMMdd HHmm (e.g. 20251010 1800)"
    )));
  }
  NaiveDateTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| {
    Error::invalid(format!(
      "invalid date or time {raw:?}; make sure the date exists and the time is valid"
    ))
  })
}

pub fn format_time(time: NaiveDateTime) -> String {
  time.format(TIME_FORMAT).to_string()
}

/// A booked consultation between the TA and one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConsultationFields")]
pub struct Consultation {
  student_id: StudentId,
  #[serde(with = "time_text")]
  from:       NaiveDateTime,
  #[serde(with = "time_text")]
  to:         NaiveDateTime,
}

impl Consultation {
  /// `to` must be strictly after `from`.
  pub fn new(
    student_id: StudentId,
    from: NaiveDateTime,
    to: NaiveDateTime,
  ) -> Result<Self> {
    if to <= from {
      return Err(Error::invalid(format!(
        "consultation must end after it starts ({} to {})",
        format_time(from),
        format_time(to)
      )));
    }
    Ok(Self { student_id, from, to })
  }

  /// Build from the text forms used by commands and storage.
  pub fn parse(student_id: &str, from: &str, to: &str) -> Result<Self> {
    Self::new(student_id.parse()?, parse_time(from)?, parse_time(to)?)
  }

  pub fn student_id(&self) -> &StudentId { &self.student_id }

  pub fn start(&self) -> NaiveDateTime { self.from }

  pub fn end(&self) -> NaiveDateTime { self.to }

  /// The same slot reassigned to another student.
  pub fn with_student_id(&self, student_id: StudentId) -> Self {
    Self { student_id, ..self.clone() }
  }

  /// True iff both boundaries match; the student is ignored.
  pub fn is_same_consultation(&self, other: &Self) -> bool {
    self.from == other.from && self.to == other.to
  }

  /// Half-open interval intersection; touching endpoints do not overlap.
  pub fn overlaps(&self, other: &Self) -> bool {
    self.from < other.to && other.from < self.to
  }
}

impl Identity for Consultation {
  fn is_same(&self, other: &Self) -> bool { self.is_same_consultation(other) }

  fn describe(&self) -> String { self.to_string() }
}

impl fmt::Display for Consultation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} from {} to {}",
      self.student_id,
      format_time(self.from),
      format_time(self.to)
    )
  }
}

/// Unvalidated shape used only during deserialisation.
#[derive(Deserialize)]
struct ConsultationFields {
  student_id: StudentId,
  #[serde(with = "time_text")]
  from:       NaiveDateTime,
  #[serde(with = "time_text")]
  to:         NaiveDateTime,
}

impl TryFrom<ConsultationFields> for Consultation {
  type Error = Error;

  fn try_from(f: ConsultationFields) -> Result<Self> {
    Self::new(f.student_id, f.from, f.to)
  }
}

mod time_text {
  use chrono::NaiveDateTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(
    time: &NaiveDateTime,
    ser: S,
  ) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&super::format_time(*time))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    de: D,
  ) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(de)?;
    super::parse_time(&raw).map_err(D::Error::custom)
  }
}
