//! The on-disk document and its conversion to and from [`Roster`].
//!
//! Persons and consultations are stored whole, through their validating serde
//! impls. Groups are stored as a group id plus member student ids; member
//! copies are rebuilt from the person list on load so they cannot drift.

use roster_core::{
  consultation::Consultation,
  id::{GroupId, StudentId},
  person::Person,
};
use roster_model::Roster;
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RawRoster {
  #[serde(default)]
  pub persons:       Vec<Person>,
  #[serde(default)]
  pub groups:        Vec<RawGroup>,
  #[serde(default)]
  pub consultations: Vec<Consultation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RawGroup {
  pub group_id: GroupId,
  #[serde(default)]
  pub members:  Vec<StudentId>,
}

impl RawRoster {
  pub fn from_roster(roster: &Roster) -> Self {
    Self {
      persons:       roster.persons().iter().cloned().collect(),
      groups:        roster
        .groups()
        .iter()
        .map(|g| RawGroup {
          group_id: g.group_id().clone(),
          members:  g.members().iter().map(|m| m.student_id().clone()).collect(),
        })
        .collect(),
      consultations: roster.consultations().iter().cloned().collect(),
    }
  }

  pub fn into_roster(self) -> Result<Roster> {
    let groups = self
      .groups
      .into_iter()
      .map(|g| (g.group_id, g.members))
      .collect();
    Ok(Roster::rebuild(self.persons, groups, self.consultations)?)
  }
}
