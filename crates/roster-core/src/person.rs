//! Person — a student on the roster.
//!
//! A `Person` is an immutable value. Every change (homework, attendance, group,
//! consultation, payments) produces a new value through one of the `with_*`
//! methods; the coordinator swaps it in for the old one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  EntityKind, Error, Result,
  attendance::{AttendanceSheet, AttendanceStatus},
  consultation::Consultation,
  homework::{HomeworkStatus, HomeworkTracker},
  id::{AssignmentId, Email, GroupId, Name, Phone, StudentId, TelegramHandle, Week},
  identity::Identity,
  payment::{Payment, PaymentEdit},
};

// ─── PersonParts ─────────────────────────────────────────────────────────────

/// Every semantic attribute of a [`Person`], unchecked.
///
/// Used to rebuild a person from storage; [`Person::from_parts`] applies the
/// same checks as the interactive path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonParts {
  pub name:         Name,
  pub phone:        Option<Phone>,
  pub email:        Option<Email>,
  pub student_id:   StudentId,
  pub telegram:     TelegramHandle,
  pub group_id:     GroupId,
  #[serde(default)]
  pub homework:     HomeworkTracker,
  #[serde(default)]
  pub attendance:   AttendanceSheet,
  pub consultation: Option<Consultation>,
  #[serde(default)]
  pub payments:     Vec<Payment>,
}

// ─── PersonEdit ──────────────────────────────────────────────────────────────

/// Identity and contact fields to change; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonEdit {
  pub name:       Option<Name>,
  pub phone:      Option<Phone>,
  pub email:      Option<Email>,
  pub student_id: Option<StudentId>,
  pub telegram:   Option<TelegramHandle>,
  pub group_id:   Option<GroupId>,
}

impl PersonEdit {
  pub fn is_empty(&self) -> bool { self == &Self::default() }
}

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersonParts", into = "PersonParts")]
pub struct Person {
  name:         Name,
  phone:        Option<Phone>,
  email:        Option<Email>,
  student_id:   StudentId,
  telegram:     TelegramHandle,
  group_id:     GroupId,
  homework:     HomeworkTracker,
  attendance:   AttendanceSheet,
  consultation: Option<Consultation>,
  payments:     Vec<Payment>,
}

impl Person {
  /// A new student with no homework, attendance, consultation or payments.
  pub fn new(
    name: Name,
    student_id: StudentId,
    telegram: TelegramHandle,
    group_id: GroupId,
  ) -> Self {
    Self {
      name,
      phone: None,
      email: None,
      student_id,
      telegram,
      group_id,
      homework: HomeworkTracker::new(),
      attendance: AttendanceSheet::new(),
      consultation: None,
      payments: Vec::new(),
    }
  }

  pub fn from_parts(parts: PersonParts) -> Result<Self> {
    if let Some(c) = &parts.consultation
      && c.student_id() != &parts.student_id
    {
      return Err(Error::invalid(format!(
        "consultation {c} does not belong to {}",
        parts.student_id
      )));
    }
    Ok(Self {
      name:         parts.name,
      phone:        parts.phone,
      email:        parts.email,
      student_id:   parts.student_id,
      telegram:     parts.telegram,
      group_id:     parts.group_id,
      homework:     parts.homework,
      attendance:   parts.attendance,
      consultation: parts.consultation,
      payments:     parts.payments,
    })
  }

  pub fn into_parts(self) -> PersonParts {
    PersonParts {
      name:         self.name,
      phone:        self.phone,
      email:        self.email,
      student_id:   self.student_id,
      telegram:     self.telegram,
      group_id:     self.group_id,
      homework:     self.homework,
      attendance:   self.attendance,
      consultation: self.consultation,
      payments:     self.payments,
    }
  }

  pub fn with_phone(self, phone: Option<Phone>) -> Self { Self { phone, ..self } }

  pub fn with_email(self, email: Option<Email>) -> Self { Self { email, ..self } }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn name(&self) -> &Name { &self.name }

  pub fn phone(&self) -> Option<&Phone> { self.phone.as_ref() }

  pub fn email(&self) -> Option<&Email> { self.email.as_ref() }

  pub fn student_id(&self) -> &StudentId { &self.student_id }

  pub fn telegram(&self) -> &TelegramHandle { &self.telegram }

  pub fn group_id(&self) -> &GroupId { &self.group_id }

  pub fn homework(&self) -> &HomeworkTracker { &self.homework }

  pub fn attendance(&self) -> &AttendanceSheet { &self.attendance }

  pub fn consultation(&self) -> Option<&Consultation> { self.consultation.as_ref() }

  pub fn has_consultation(&self) -> bool { self.consultation.is_some() }

  /// Payments in storage order.
  pub fn payments(&self) -> &[Payment] { &self.payments }

  // ── Identity ──────────────────────────────────────────────────────────────

  /// True if ANY of student id, telegram handle, phone or email match.
  /// Phone and email only count when both sides have one.
  pub fn is_same_person(&self, other: &Self) -> bool {
    fn both_eq<T: PartialEq>(a: Option<&T>, b: Option<&T>) -> bool {
      matches!((a, b), (Some(a), Some(b)) if a == b)
    }

    self.student_id == other.student_id
      || self.telegram == other.telegram
      || both_eq(self.phone(), other.phone())
      || both_eq(self.email(), other.email())
  }

  pub fn has_student_id(&self, id: &StudentId) -> bool { &self.student_id == id }

  // ── Transformations ───────────────────────────────────────────────────────

  pub fn with_added_homework(&self, assignment: AssignmentId) -> Result<Self> {
    Ok(Self {
      homework: self.homework.with_added(assignment)?,
      ..self.clone()
    })
  }

  pub fn with_deleted_homework(&self, assignment: AssignmentId) -> Result<Self> {
    Ok(Self {
      homework: self.homework.with_removed(assignment)?,
      ..self.clone()
    })
  }

  pub fn with_homework_status(
    &self,
    assignment: AssignmentId,
    status: HomeworkStatus,
  ) -> Result<Self> {
    Ok(Self {
      homework: self.homework.with_status(assignment, status)?,
      ..self.clone()
    })
  }

  pub fn with_attendance(&self, week: Week, status: AttendanceStatus) -> Self {
    Self {
      attendance: self.attendance.with_marked(week, status),
      ..self.clone()
    }
  }

  pub fn with_group(&self, group_id: GroupId) -> Self {
    Self { group_id, ..self.clone() }
  }

  /// Embed `consultation`, which must be booked for this student.
  pub fn with_consultation(&self, consultation: Consultation) -> Result<Self> {
    if consultation.student_id() != &self.student_id {
      return Err(Error::invalid(format!(
        "consultation {consultation} does not belong to {}",
        self.student_id
      )));
    }
    Ok(Self {
      consultation: Some(consultation),
      ..self.clone()
    })
  }

  pub fn without_consultation(&self) -> Self {
    Self { consultation: None, ..self.clone() }
  }

  /// Apply `edit`. A changed student id is carried into the embedded
  /// consultation so the value stays self-consistent.
  pub fn edited(&self, edit: &PersonEdit) -> Self {
    let student_id = edit
      .student_id
      .clone()
      .unwrap_or_else(|| self.student_id.clone());
    let consultation = self
      .consultation
      .as_ref()
      .map(|c| c.with_student_id(student_id.clone()));
    Self {
      name: edit.name.clone().unwrap_or_else(|| self.name.clone()),
      phone: edit.phone.clone().or_else(|| self.phone.clone()),
      email: edit.email.clone().or_else(|| self.email.clone()),
      student_id,
      telegram: edit.telegram.clone().unwrap_or_else(|| self.telegram.clone()),
      group_id: edit.group_id.clone().unwrap_or_else(|| self.group_id.clone()),
      consultation,
      ..self.clone()
    }
  }

  // ── Payments ──────────────────────────────────────────────────────────────

  pub fn with_added_payment(&self, payment: Payment) -> Self {
    let mut payments = self.payments.clone();
    payments.push(payment);
    Self { payments, ..self.clone() }
  }

  /// Map a zero-based display index to a storage index.
  fn payment_storage_index(&self, display_index: usize) -> Result<usize> {
    Payment::display_order(&self.payments)
      .get(display_index)
      .copied()
      .ok_or_else(|| {
        Error::not_found(
          EntityKind::Payment,
          format!(
            "payment #{} of {} (has {})",
            display_index + 1,
            self.student_id,
            self.payments.len()
          ),
        )
      })
  }

  /// Replace the payment at `display_index` (display order, zero-based),
  /// keeping its original `recorded_at`. Returns the new person and the
  /// edited payment.
  pub fn with_edited_payment(
    &self,
    display_index: usize,
    edit: &PaymentEdit,
  ) -> Result<(Self, Payment)> {
    if edit.is_empty() {
      return Err(Error::invalid("at least one payment field must be edited"));
    }
    let raw = self.payment_storage_index(display_index)?;
    let edited = self.payments[raw].edited(edit);
    let mut payments = self.payments.clone();
    payments[raw] = edited.clone();
    Ok((Self { payments, ..self.clone() }, edited))
  }

  /// Remove the payment at `display_index`. Returns the new person and the
  /// removed payment.
  pub fn with_deleted_payment(&self, display_index: usize) -> Result<(Self, Payment)> {
    let raw = self.payment_storage_index(display_index)?;
    let mut payments = self.payments.clone();
    let removed = payments.remove(raw);
    Ok((Self { payments, ..self.clone() }, removed))
  }
}

impl TryFrom<PersonParts> for Person {
  type Error = Error;

  fn try_from(parts: PersonParts) -> Result<Self> { Self::from_parts(parts) }
}

impl From<Person> for PersonParts {
  fn from(person: Person) -> Self { person.into_parts() }
}

impl Identity for Person {
  fn is_same(&self, other: &Self) -> bool { self.is_same_person(other) }

  fn describe(&self) -> String { format!("{} ({})", self.name, self.student_id) }
}

impl fmt::Display for Person {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}; id: {}; telegram: @{}; group: {}",
      self.name, self.student_id, self.telegram, self.group_id
    )?;
    if let Some(phone) = &self.phone {
      write!(f, "; phone: {phone}")?;
    }
    if let Some(email) = &self.email {
      write!(f, "; email: {email}")?;
    }
    if let Some(c) = &self.consultation {
      write!(f, "; consultation: {c}")?;
    }
    Ok(())
  }
}
