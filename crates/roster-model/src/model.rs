//! [`Model`] — the single mutation surface over a [`Roster`].
//!
//! Two layers of operations live here:
//!
//! - Primitives (`add_person`, `set_person`, `update_group_when_*`,
//!   `add_consultation`, `add_consultation_to_person`, ...) each touch one side
//!   of a denormalized fact. Callers combining them are responsible for
//!   keeping the copies in step.
//! - Transactions (`add_student`, `edit_student`, `delete_student`,
//!   `book_consultation`, `cancel_consultation`) update every copy.
//!
//! Any operation with more than one step runs against a staged copy of the
//! roster, which replaces the live one only once every step has succeeded.
//! A failed operation therefore changes nothing and notifies nobody; a
//! successful one notifies subscribers before returning.

use roster_core::{
  Error, Result,
  attendance::AttendanceStatus,
  consultation::Consultation,
  group::Group,
  homework::HomeworkStatus,
  id::{AssignmentId, GroupId, StudentId, Week},
  payment::{Payment, PaymentEdit},
  person::{Person, PersonEdit},
};
use tracing::{debug, warn};

use crate::{
  event::{Listener, RosterEvent, RosterEvent::*},
  roster::Roster,
  unique_list::UniqueList,
  view::{self, Filter},
};

#[derive(Default)]
pub struct Model {
  roster:              Roster,
  person_filter:       Filter<Person>,
  consultation_filter: Filter<Consultation>,
  listeners:           Vec<Listener>,
}

impl Model {
  pub fn new(roster: Roster) -> Self { Self { roster, ..Self::default() } }

  pub fn roster(&self) -> &Roster { &self.roster }

  /// Replace all data and show everything.
  pub fn reset(&mut self, roster: Roster) {
    self.roster = roster;
    self.person_filter = Filter::all();
    self.consultation_filter = Filter::all();
    self.emit(&[
      PersonsChanged,
      GroupsChanged,
      ConsultationsChanged,
      PersonFilterChanged,
      ConsultationFilterChanged,
    ]);
  }

  // ── Observers ─────────────────────────────────────────────────────────────

  pub fn subscribe(&mut self, listener: impl FnMut(RosterEvent) + 'static) {
    self.listeners.push(Box::new(listener));
  }

  fn emit(&mut self, events: &[RosterEvent]) {
    for listener in &mut self.listeners {
      for event in events {
        listener(*event);
      }
    }
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  pub fn filtered_persons(&self) -> Vec<&Person> {
    view::filtered(self.roster.persons(), &self.person_filter)
  }

  /// Filtered consultations, sorted by start time.
  pub fn filtered_consultations(&self) -> Vec<&Consultation> {
    view::sorted_consultations(self.roster.consultations(), &self.consultation_filter)
  }

  pub fn person_filter(&self) -> &Filter<Person> { &self.person_filter }

  pub fn consultation_filter(&self) -> &Filter<Consultation> { &self.consultation_filter }

  pub fn update_person_filter(&mut self, filter: Filter<Person>) {
    debug!(filter = filter.label(), "person filter updated");
    self.person_filter = filter;
    self.emit(&[PersonFilterChanged]);
  }

  pub fn update_consultation_filter(&mut self, filter: Filter<Consultation>) {
    debug!(filter = filter.label(), "consultation filter updated");
    self.consultation_filter = filter;
    self.emit(&[ConsultationFilterChanged]);
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  pub fn has_person(&self, person: &Person) -> bool { self.roster.has_person(person) }

  pub fn has_student(&self, id: &StudentId) -> bool { self.roster.has_student(id) }

  pub fn find_person(&self, id: &StudentId) -> Option<&Person> { self.roster.find_person(id) }

  pub fn has_group(&self, id: &GroupId) -> bool { self.roster.has_group(id) }

  pub fn group(&self, id: &GroupId) -> Option<&Group> { self.roster.group(id) }

  pub fn groups(&self) -> &UniqueList<Group> { self.roster.groups() }

  pub fn has_consultation(&self, consultation: &Consultation) -> bool {
    self.roster.has_consultation(consultation)
  }

  pub fn has_overlapping_consultation(&self, consultation: &Consultation) -> bool {
    self.roster.has_overlapping_consultation(consultation)
  }

  // ── Person primitives ─────────────────────────────────────────────────────

  /// Add `person` and reset the person view to show everyone. Group
  /// membership is not touched; see [`Self::update_group_when_add_person`].
  pub fn add_person(&mut self, person: Person) -> Result<()> {
    debug!(student = %person.student_id(), "adding person");
    self.roster.add_person(person)?;
    self.person_filter = Filter::all();
    self.emit(&[PersonsChanged, PersonFilterChanged]);
    Ok(())
  }

  /// Remove the person equal in every field to `target`.
  pub fn delete_person(&mut self, target: &Person) -> Result<Person> {
    debug!(student = %target.student_id(), "deleting person");
    let removed = self.roster.remove_person(target)?;
    self.emit(&[PersonsChanged]);
    Ok(removed)
  }

  /// Replace `target` with `edited` in the person list only.
  pub fn set_person(&mut self, target: &Person, edited: Person) -> Result<()> {
    debug!(student = %target.student_id(), "setting person");
    self.roster.set_person(target, edited)?;
    self.emit(&[PersonsChanged]);
    Ok(())
  }

  pub fn update_group_when_add_person(&mut self, person: &Person) -> Result<()> {
    debug!(student = %person.student_id(), group = %person.group_id(), "adding group membership");
    self.roster.update_group_when_add_person(person)?;
    self.emit(&[GroupsChanged]);
    Ok(())
  }

  pub fn update_group_when_edit_person(&mut self, old: &Person) -> Result<()> {
    debug!(student = %old.student_id(), "moving group membership");
    self.roster.update_group_when_edit_person(old)?;
    self.emit(&[GroupsChanged]);
    Ok(())
  }

  /// Create an empty group.
  pub fn add_group(&mut self, group: Group) -> Result<()> {
    debug!(group = %group.group_id(), "adding group");
    self.roster.add_group(group)?;
    self.emit(&[GroupsChanged]);
    Ok(())
  }

  /// Run `steps` against a copy of the roster and keep the result only if
  /// every step succeeds.
  fn transact<T>(&mut self, steps: impl FnOnce(&mut Roster) -> Result<T>) -> Result<T> {
    let mut staged = self.roster.clone();
    let out = steps(&mut staged)?;
    self.roster = staged;
    Ok(out)
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  /// Mark one student's attendance for `week`, resetting the person view to
  /// show everyone. Returns the updated person.
  pub fn mark_attendance(
    &mut self,
    id: &StudentId,
    week: Week,
    status: AttendanceStatus,
  ) -> Result<Person> {
    debug!(student = %id, %week, %status, "marking attendance");
    let target = self.roster.require_person(id)?.clone();
    let updated = target.with_attendance(week, status);
    self.roster.replace_persons(&[(target, updated.clone())])?;
    self.person_filter = Filter::all();
    self.emit(&[PersonsChanged, GroupsChanged, PersonFilterChanged]);
    Ok(updated)
  }

  /// Mark every member of `group_id`, then narrow the person view to that
  /// group. Returns the updated members.
  pub fn mark_all_attendance(
    &mut self,
    group_id: &GroupId,
    week: Week,
    status: AttendanceStatus,
  ) -> Result<Vec<Person>> {
    debug!(group = %group_id, %week, %status, "marking group attendance");
    let group = self.roster.require_group(group_id)?;
    let changes = group
      .members()
      .iter()
      .map(|m| {
        let target = self.roster.require_person(m.student_id())?.clone();
        let next = target.with_attendance(week, status);
        Ok((target, next))
      })
      .collect::<Result<Vec<_>>>()?;

    self.roster.replace_persons(&changes)?;
    self.person_filter = Filter::in_group(group_id.clone());
    self.emit(&[PersonsChanged, GroupsChanged, PersonFilterChanged]);
    Ok(changes.into_iter().map(|(_, next)| next).collect())
  }

  // ── Homework ──────────────────────────────────────────────────────────────

  /// Apply `change` to one student, or to every person in the current view
  /// when `id` is `None`.
  ///
  /// Every target is checked before any is written, and the writes are
  /// staged together: if any target fails, no person is modified.
  fn apply_to_targets(
    &mut self,
    id: Option<&StudentId>,
    what: &'static str,
    change: impl Fn(&Person) -> Result<Person>,
  ) -> Result<Vec<Person>> {
    let targets: Vec<Person> = match id {
      Some(id) => vec![self.roster.require_person(id)?.clone()],
      None => self.filtered_persons().into_iter().cloned().collect(),
    };
    if targets.is_empty() {
      return Err(Error::precondition(format!("no students to {what}")));
    }

    let mut changes = Vec::with_capacity(targets.len());
    for target in targets {
      match change(&target) {
        Ok(next) => changes.push((target, next)),
        Err(e) => {
          if id.is_none() {
            warn!(student = %target.student_id(), error = %e, "bulk {what} rejected");
          }
          return Err(Error::precondition(format!(
            "cannot {what} for {}: {e}",
            target.student_id()
          )));
        }
      }
    }

    if let Err(e) = self.roster.replace_persons(&changes) {
      if id.is_none() {
        warn!(error = %e, "bulk {what} rejected");
      }
      return Err(e);
    }
    self.emit(&[PersonsChanged, GroupsChanged]);
    Ok(changes.into_iter().map(|(_, next)| next).collect())
  }

  pub fn add_homework(
    &mut self,
    id: Option<&StudentId>,
    assignment: AssignmentId,
  ) -> Result<Vec<Person>> {
    debug!(student = ?id, %assignment, "adding homework");
    self.apply_to_targets(id, "add homework", |p| p.with_added_homework(assignment))
  }

  pub fn delete_homework(
    &mut self,
    id: Option<&StudentId>,
    assignment: AssignmentId,
  ) -> Result<Vec<Person>> {
    debug!(student = ?id, %assignment, "deleting homework");
    self.apply_to_targets(id, "delete homework", |p| p.with_deleted_homework(assignment))
  }

  pub fn mark_homework(
    &mut self,
    id: Option<&StudentId>,
    assignment: AssignmentId,
    status: HomeworkStatus,
  ) -> Result<Vec<Person>> {
    debug!(student = ?id, %assignment, %status, "marking homework");
    self.apply_to_targets(id, "mark homework", |p| {
      p.with_homework_status(assignment, status)
    })
  }

  // ── Consultation primitives ───────────────────────────────────────────────

  /// Add to the schedule only. Rejected if the slot duplicates or overlaps
  /// any booked slot, whoever holds it; the person's embedded copy is not
  /// touched.
  pub fn add_consultation(&mut self, consultation: Consultation) -> Result<()> {
    debug!(%consultation, "adding consultation");
    self.roster.add_consultation(consultation)?;
    self.consultation_filter = Filter::all();
    self.emit(&[ConsultationsChanged, ConsultationFilterChanged]);
    Ok(())
  }

  /// Remove from the schedule only.
  pub fn delete_consultation(&mut self, consultation: &Consultation) -> Result<Consultation> {
    debug!(%consultation, "deleting consultation");
    let removed = self.roster.remove_consultation(consultation)?;
    self.consultation_filter = Filter::all();
    self.emit(&[ConsultationsChanged, ConsultationFilterChanged]);
    Ok(removed)
  }

  /// Embed `consultation` in student `id`'s record (and group copy).
  pub fn add_consultation_to_person(
    &mut self,
    id: &StudentId,
    consultation: Consultation,
  ) -> Result<Person> {
    debug!(student = %id, "embedding consultation");
    let updated = self.transact(|r| embed_consultation(r, id, consultation))?;
    self.person_filter = Filter::all();
    self.emit(&[PersonsChanged, GroupsChanged, PersonFilterChanged]);
    Ok(updated)
  }

  /// Clear student `id`'s embedded consultation and return it.
  pub fn delete_consultation_from_person(&mut self, id: &StudentId) -> Result<Consultation> {
    debug!(student = %id, "clearing consultation");
    let removed = self.transact(|r| clear_consultation(r, id))?;
    self.person_filter = Filter::all();
    self.emit(&[PersonsChanged, GroupsChanged, PersonFilterChanged]);
    Ok(removed)
  }

  /// Reassign every scheduled consultation of `old_id` to `new_id`.
  pub fn update_consultations_for_edited_person(
    &mut self,
    old_id: &StudentId,
    new_id: &StudentId,
  ) -> Result<()> {
    debug!(%old_id, %new_id, "reassigning consultations");
    self.transact(|r| r.update_consultations_for_edited_person(old_id, new_id))?;
    self.emit(&[ConsultationsChanged]);
    Ok(())
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  /// Add a new student together with their group membership.
  pub fn add_student(&mut self, person: Person) -> Result<()> {
    debug!(student = %person.student_id(), "adding student");
    if person.has_consultation() {
      return Err(Error::invalid(
        "a new student cannot carry a consultation; book it separately",
      ));
    }

    self.transact(|r| {
      r.add_person(person.clone())?;
      r.update_group_when_add_person(&person)
        .map_err(|e| e.during("group membership"))
    })?;

    self.person_filter = Filter::all();
    self.emit(&[PersonsChanged, GroupsChanged, PersonFilterChanged]);
    Ok(())
  }

  /// Edit student `id`, moving group membership and reassigning their
  /// consultation if the student id changed. Returns the edited person.
  pub fn edit_student(&mut self, id: &StudentId, edit: &PersonEdit) -> Result<Person> {
    debug!(student = %id, "editing student");
    if edit.is_empty() {
      return Err(Error::invalid("at least one field must be edited"));
    }
    let target = self.roster.require_person(id)?.clone();
    let edited = target.edited(edit);

    self.transact(|r| {
      r.set_person(&target, edited.clone())?;
      r.move_membership(&target, &edited)
        .map_err(|e| e.during("group membership"))?;
      if edited.student_id() != target.student_id() {
        r.update_consultations_for_edited_person(target.student_id(), edited.student_id())
          .map_err(|e| e.during("consultation owner"))?;
      }
      Ok(())
    })?;

    self.emit(&[PersonsChanged, GroupsChanged, ConsultationsChanged]);
    Ok(edited)
  }

  /// Remove student `id` with their group membership and consultation.
  pub fn delete_student(&mut self, id: &StudentId) -> Result<Person> {
    debug!(student = %id, "deleting student");
    let target = self.roster.require_person(id)?.clone();

    let removed = self.transact(|r| {
      let removed = r.remove_person(&target)?;
      r.remove_from_group(&removed)
        .map_err(|e| e.during("group membership"))?;
      if let Some(c) = removed.consultation() {
        r.remove_consultation(c)
          .map_err(|e| e.during("consultation schedule"))?;
      }
      Ok(removed)
    })?;

    self.emit(&[PersonsChanged, GroupsChanged, ConsultationsChanged]);
    Ok(removed)
  }

  /// Book `consultation` on the schedule and in its student's record.
  pub fn book_consultation(&mut self, consultation: Consultation) -> Result<Person> {
    debug!(%consultation, "booking consultation");
    let id = consultation.student_id().clone();
    if self.roster.require_person(&id)?.has_consultation() {
      return Err(Error::precondition(format!("{id} already has a consultation")));
    }

    let updated = self.transact(|r| {
      r.add_consultation(consultation.clone())?;
      embed_consultation(r, &id, consultation).map_err(|e| e.during("student record"))
    })?;

    self.person_filter = Filter::all();
    self.consultation_filter = Filter::all();
    self.emit(&[
      PersonsChanged,
      GroupsChanged,
      ConsultationsChanged,
      PersonFilterChanged,
      ConsultationFilterChanged,
    ]);
    Ok(updated)
  }

  /// Remove student `id`'s consultation from both their record and the
  /// schedule. Returns the cancelled consultation.
  pub fn cancel_consultation(&mut self, id: &StudentId) -> Result<Consultation> {
    debug!(student = %id, "cancelling consultation");
    let removed = self.transact(|r| {
      let removed = clear_consultation(r, id)?;
      r.remove_consultation(&removed)
        .map_err(|e| e.during("consultation schedule"))
    })?;

    self.person_filter = Filter::all();
    self.consultation_filter = Filter::all();
    self.emit(&[
      PersonsChanged,
      GroupsChanged,
      ConsultationsChanged,
      PersonFilterChanged,
      ConsultationFilterChanged,
    ]);
    Ok(removed)
  }

  // ── Payments ──────────────────────────────────────────────────────────────

  pub fn add_payment(&mut self, id: &StudentId, payment: Payment) -> Result<Person> {
    debug!(student = %id, %payment, "adding payment");
    let target = self.roster.require_person(id)?.clone();
    let updated = target.with_added_payment(payment);
    self.roster.replace_persons(&[(target, updated.clone())])?;
    self.emit(&[PersonsChanged, GroupsChanged]);
    Ok(updated)
  }

  /// Edit the payment at zero-based `display_index` in display order.
  pub fn edit_payment(
    &mut self,
    id: &StudentId,
    display_index: usize,
    edit: &PaymentEdit,
  ) -> Result<Payment> {
    debug!(student = %id, display_index, "editing payment");
    let target = self.roster.require_person(id)?.clone();
    let (updated, payment) = target.with_edited_payment(display_index, edit)?;
    self.roster.replace_persons(&[(target, updated)])?;
    self.emit(&[PersonsChanged, GroupsChanged]);
    Ok(payment)
  }

  /// Delete the payment at zero-based `display_index` in display order.
  pub fn delete_payment(&mut self, id: &StudentId, display_index: usize) -> Result<Payment> {
    debug!(student = %id, display_index, "deleting payment");
    let target = self.roster.require_person(id)?.clone();
    let (updated, payment) = target.with_deleted_payment(display_index)?;
    self.roster.replace_persons(&[(target, updated)])?;
    self.emit(&[PersonsChanged, GroupsChanged]);
    Ok(payment)
  }
}

fn embed_consultation(
  roster: &mut Roster,
  id: &StudentId,
  consultation: Consultation,
) -> Result<Person> {
  let updated = roster.add_consultation_to_person(id, consultation)?;
  roster
    .refresh_group_copy(&updated)
    .map_err(|e| e.during("group membership"))?;
  Ok(updated)
}

fn clear_consultation(roster: &mut Roster, id: &StudentId) -> Result<Consultation> {
  let (updated, removed) = roster.delete_consultation_from_person(id)?;
  roster
    .refresh_group_copy(&updated)
    .map_err(|e| e.during("group membership"))?;
  Ok(removed)
}
