//! Group — a tutorial group and denormalized copies of its members.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  EntityKind, Error, Result,
  id::{GroupId, StudentId},
  identity::Identity,
  person::Person,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GroupFields")]
pub struct Group {
  group_id: GroupId,
  members:  Vec<Person>,
}

impl Group {
  /// An empty group.
  pub fn new(group_id: GroupId) -> Self { Self { group_id, members: Vec::new() } }

  /// Rebuild a group with the given members, checking that each belongs here
  /// and none is listed twice.
  pub fn with_members(group_id: GroupId, members: Vec<Person>) -> Result<Self> {
    let mut group = Self::new(group_id);
    for person in members {
      group = group.with_member(person)?;
    }
    Ok(group)
  }

  pub fn group_id(&self) -> &GroupId { &self.group_id }

  pub fn members(&self) -> &[Person] { &self.members }

  pub fn len(&self) -> usize { self.members.len() }

  pub fn is_empty(&self) -> bool { self.members.is_empty() }

  pub fn contains(&self, person: &Person) -> bool {
    self.members.iter().any(|m| m.is_same_person(person))
  }

  pub fn member(&self, id: &StudentId) -> Option<&Person> {
    self.members.iter().find(|m| m.has_student_id(id))
  }

  /// Append `person`. Fails if a same-identity member is already listed or
  /// `person` names a different group.
  pub fn with_member(&self, person: Person) -> Result<Self> {
    if person.group_id() != &self.group_id {
      return Err(Error::invalid(format!(
        "{} belongs to group {}, not {}",
        person.student_id(),
        person.group_id(),
        self.group_id
      )));
    }
    if self.contains(&person) {
      return Err(Error::duplicate(
        EntityKind::Person,
        format!("{} is already in group {}", person.describe(), self.group_id),
      ));
    }
    let mut members = self.members.clone();
    members.push(person);
    Ok(Self { members, ..self.clone() })
  }

  /// Drop the member with student id `id`, if listed.
  pub fn without_member(&self, id: &StudentId) -> Self {
    Self {
      members: self
        .members
        .iter()
        .filter(|m| !m.has_student_id(id))
        .cloned()
        .collect(),
      ..self.clone()
    }
  }

  /// Swap the copy of member `id` for `person`, in place.
  pub fn with_replaced_member(&self, id: &StudentId, person: Person) -> Result<Self> {
    let pos = self
      .members
      .iter()
      .position(|m| m.has_student_id(id))
      .ok_or_else(|| {
        Error::not_found(
          EntityKind::Person,
          format!("{id} in group {}", self.group_id),
        )
      })?;
    let mut members = self.members.clone();
    members[pos] = person;
    Ok(Self { members, ..self.clone() })
  }
}

#[derive(Deserialize)]
struct GroupFields {
  group_id: GroupId,
  members:  Vec<Person>,
}

impl TryFrom<GroupFields> for Group {
  type Error = Error;

  fn try_from(f: GroupFields) -> Result<Self> { Self::with_members(f.group_id, f.members) }
}

impl Identity for Group {
  fn is_same(&self, other: &Self) -> bool { self.group_id == other.group_id }

  fn describe(&self) -> String { self.group_id.to_string() }
}

impl fmt::Display for Group {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({} students)", self.group_id, self.members.len())
  }
}
