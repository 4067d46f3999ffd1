//! [`Roster`] — the aggregate owning every person, group and consultation.
//!
//! Groups and persons both carry copies of the same facts (group membership,
//! embedded consultations). The helpers here keep those copies in step; the
//! [`Model`](crate::Model) decides which helpers a given command needs.

use roster_core::{
  EntityKind, Error, Result,
  consultation::Consultation,
  group::Group,
  id::{GroupId, StudentId},
  person::Person,
};

use crate::unique_list::UniqueList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
  persons:       UniqueList<Person>,
  groups:        UniqueList<Group>,
  consultations: UniqueList<Consultation>,
}

impl Default for Roster {
  fn default() -> Self {
    Self {
      persons:       UniqueList::new(EntityKind::Person),
      groups:        UniqueList::new(EntityKind::Group),
      consultations: UniqueList::new(EntityKind::Consultation),
    }
  }
}

impl Roster {
  pub fn new() -> Self { Self::default() }

  /// Rebuild a roster from stored records, checking every cross-entity
  /// invariant along the way.
  ///
  /// `groups` lists each group's member student ids; member copies are taken
  /// from `persons`.
  pub fn rebuild(
    persons: Vec<Person>,
    groups: Vec<(GroupId, Vec<StudentId>)>,
    consultations: Vec<Consultation>,
  ) -> Result<Self> {
    let mut roster = Self::new();
    roster.persons.set_all(persons)?;
    roster.consultations.set_all(consultations)?;
    for (i, a) in roster.consultations.iter().enumerate() {
      if let Some(b) = roster.consultations.iter().skip(i + 1).find(|b| a.overlaps(b)) {
        return Err(Error::duplicate(
          EntityKind::Consultation,
          format!("{a} overlaps {b}"),
        ));
      }
    }

    let mut rebuilt = Vec::with_capacity(groups.len());
    for (group_id, member_ids) in groups {
      let mut members = Vec::with_capacity(member_ids.len());
      for id in member_ids {
        let person = roster.require_person(&id)?;
        members.push(person.clone());
      }
      rebuilt.push(Group::with_members(group_id, members)?);
    }
    roster.groups.set_all(rebuilt)?;

    for person in &roster.persons {
      let listed = roster
        .group(person.group_id())
        .is_some_and(|g| g.member(person.student_id()).is_some());
      if !listed {
        return Err(Error::invalid(format!(
          "{} is not listed as a member of group {}",
          person.student_id(),
          person.group_id()
        )));
      }
      if let Some(c) = person.consultation()
        && !roster.consultations.iter().any(|existing| existing == c)
      {
        return Err(Error::invalid(format!(
          "consultation {c} held by {} is missing from the schedule",
          person.student_id()
        )));
      }
    }

    Ok(roster)
  }

  pub fn persons(&self) -> &UniqueList<Person> { &self.persons }

  pub fn groups(&self) -> &UniqueList<Group> { &self.groups }

  pub fn consultations(&self) -> &UniqueList<Consultation> { &self.consultations }

  // ── Persons ───────────────────────────────────────────────────────────────

  pub fn has_person(&self, person: &Person) -> bool { self.persons.contains(person) }

  pub fn has_student(&self, id: &StudentId) -> bool { self.find_person(id).is_some() }

  pub fn find_person(&self, id: &StudentId) -> Option<&Person> {
    self.persons.find(|p| p.has_student_id(id))
  }

  pub fn require_person(&self, id: &StudentId) -> Result<&Person> {
    self
      .find_person(id)
      .ok_or_else(|| Error::not_found(EntityKind::Person, id.to_string()))
  }

  pub fn add_person(&mut self, person: Person) -> Result<()> { self.persons.add(person) }

  pub fn remove_person(&mut self, target: &Person) -> Result<Person> {
    self.persons.remove(target)
  }

  pub fn set_person(&mut self, target: &Person, edited: Person) -> Result<()> {
    self.persons.replace(target, edited)
  }

  /// Swap each `(target, updated)` pair and refresh the matching group
  /// copies. Every pair is applied or none is.
  pub fn replace_persons(&mut self, changes: &[(Person, Person)]) -> Result<()> {
    let mut staged = self.clone();
    for (target, updated) in changes {
      staged.set_person(target, updated.clone())?;
      staged
        .refresh_group_copy(updated)
        .map_err(|e| e.during("group membership"))?;
    }
    *self = staged;
    Ok(())
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  pub fn has_group(&self, id: &GroupId) -> bool { self.group(id).is_some() }

  pub fn group(&self, id: &GroupId) -> Option<&Group> {
    self.groups.find(|g| g.group_id() == id)
  }

  pub fn require_group(&self, id: &GroupId) -> Result<&Group> {
    self
      .group(id)
      .ok_or_else(|| Error::not_found(EntityKind::Group, id.to_string()))
  }

  pub fn add_group(&mut self, group: Group) -> Result<()> { self.groups.add(group) }

  /// Create `person`'s group with them as sole member, or append them to it.
  pub fn update_group_when_add_person(&mut self, person: &Person) -> Result<()> {
    match self.group(person.group_id()).cloned() {
      None => {
        let group = Group::new(person.group_id().clone()).with_member(person.clone())?;
        self.groups.add(group)
      }
      Some(existing) => {
        let updated = existing.with_member(person.clone())?;
        self.groups.replace(&existing, updated)
      }
    }
  }

  /// Move the membership copy of `old` to wherever `current` now belongs.
  ///
  /// Both group values are computed before either is written, so a failure
  /// leaves every group untouched. A group emptied by the move is kept.
  pub fn move_membership(&mut self, old: &Person, current: &Person) -> Result<()> {
    let old_group = self.group(old.group_id()).cloned();

    if old.group_id() == current.group_id()
      && let Some(group) = &old_group
      && group.member(old.student_id()).is_some()
    {
      let updated = group.with_replaced_member(old.student_id(), current.clone())?;
      return self.groups.replace(group, updated);
    }

    let vacated = old_group
      .as_ref()
      .map(|g| (g.clone(), g.without_member(old.student_id())));

    let target = match self.group(current.group_id()) {
      Some(g) if old.group_id() != current.group_id() => {
        Some((g.clone(), g.with_member(current.clone())?))
      }
      // Same group, but `old` was never listed in it.
      Some(g) => Some((g.clone(), g.without_member(old.student_id()).with_member(current.clone())?)),
      None => None,
    };

    match target {
      Some((before, after)) => {
        if let Some((vacated_before, vacated_after)) = vacated
          && vacated_before.group_id() != before.group_id()
        {
          self.groups.replace(&vacated_before, vacated_after)?;
        }
        self.groups.replace(&before, after)
      }
      None => {
        let created = Group::new(current.group_id().clone()).with_member(current.clone())?;
        if let Some((vacated_before, vacated_after)) = vacated {
          self.groups.replace(&vacated_before, vacated_after)?;
        }
        self.groups.add(created)
      }
    }
  }

  /// Re-read the stored value of the person `old` was edited into and move
  /// its membership copy accordingly.
  ///
  /// The stored value is found by `old`'s student id, falling back to
  /// identity when the id itself was edited.
  pub fn update_group_when_edit_person(&mut self, old: &Person) -> Result<()> {
    let current = self
      .find_person(old.student_id())
      .or_else(|| self.persons.find(|p| p.is_same_person(old)))
      .cloned()
      .ok_or_else(|| Error::not_found(EntityKind::Person, old.student_id().to_string()))?;
    self.move_membership(old, &current)
  }

  /// Refresh the membership copy of `person` after a field other than the
  /// group changed.
  pub fn refresh_group_copy(&mut self, person: &Person) -> Result<()> {
    let group = self.require_group(person.group_id())?.clone();
    let updated = group.with_replaced_member(person.student_id(), person.clone())?;
    self.groups.replace(&group, updated)
  }

  /// Drop `person` from their group's member list, if the group exists.
  pub fn remove_from_group(&mut self, person: &Person) -> Result<()> {
    if let Some(group) = self.group(person.group_id()).cloned() {
      let updated = group.without_member(person.student_id());
      self.groups.replace(&group, updated)?;
    }
    Ok(())
  }

  // ── Consultations ─────────────────────────────────────────────────────────

  pub fn has_consultation(&self, consultation: &Consultation) -> bool {
    self.consultations.contains(consultation)
  }

  /// True if `consultation` overlaps any booked slot, whoever holds it.
  pub fn has_overlapping_consultation(&self, consultation: &Consultation) -> bool {
    self.consultations.iter().any(|c| c.overlaps(consultation))
  }

  /// Add a new slot. Rejected if it duplicates or overlaps any booked slot,
  /// whoever holds it.
  pub fn add_consultation(&mut self, consultation: Consultation) -> Result<()> {
    if let Some(existing) = self.consultations.find(|c| c.overlaps(&consultation)) {
      return Err(Error::duplicate(
        EntityKind::Consultation,
        format!("{consultation} overlaps {existing}"),
      ));
    }
    self.consultations.add(consultation)
  }

  pub fn remove_consultation(&mut self, consultation: &Consultation) -> Result<Consultation> {
    self.consultations.remove(consultation)
  }

  /// Embed `consultation` in student `id`'s record. Returns the updated
  /// person.
  pub fn add_consultation_to_person(
    &mut self,
    id: &StudentId,
    consultation: Consultation,
  ) -> Result<Person> {
    let target = self.require_person(id)?.clone();
    let updated = target.with_consultation(consultation)?;
    self.persons.replace(&target, updated.clone())?;
    Ok(updated)
  }

  /// Clear the embedded consultation of student `id` and return it.
  pub fn delete_consultation_from_person(
    &mut self,
    id: &StudentId,
  ) -> Result<(Person, Consultation)> {
    let target = self.require_person(id)?.clone();
    let removed = target.consultation().cloned().ok_or_else(|| {
      Error::precondition(format!("{id} does not have a consultation"))
    })?;
    let updated = target.without_consultation();
    self.persons.replace(&target, updated.clone())?;
    Ok((updated, removed))
  }

  /// Rewrite every booked consultation held by `old_id` to `new_id`.
  pub fn update_consultations_for_edited_person(
    &mut self,
    old_id: &StudentId,
    new_id: &StudentId,
  ) -> Result<()> {
    let held: Vec<Consultation> = self
      .consultations
      .iter()
      .filter(|c| c.student_id() == old_id)
      .cloned()
      .collect();
    for c in held {
      self.consultations.replace(&c, c.with_student_id(new_id.clone()))?;
    }
    Ok(())
  }
}
