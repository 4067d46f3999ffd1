//! Subcommands. Each maps onto one `Model` operation and reports what it did
//! as lines of text.

use std::num::NonZeroUsize;

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use roster_core::{
  attendance::AttendanceStatus,
  consultation::Consultation,
  group::Group,
  homework::HomeworkStatus,
  id::{AssignmentId, Email, GroupId, Name, Phone, StudentId, TelegramHandle, Week},
  identity::Identity,
  payment::{Amount, Payment, PaymentEdit},
  person::{Person, PersonEdit},
};
use roster_model::{Filter, Model};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Add a student.
  Add {
    #[arg(long)]
    name:     Name,
    #[arg(long)]
    id:       StudentId,
    #[arg(long)]
    telegram: TelegramHandle,
    #[arg(long)]
    group:    GroupId,
    #[arg(long)]
    phone:    Option<Phone>,
    #[arg(long)]
    email:    Option<Email>,
  },

  /// Edit a student's details. Changing the group moves their membership.
  Edit {
    id:         StudentId,
    #[arg(long)]
    name:       Option<Name>,
    #[arg(long)]
    phone:      Option<Phone>,
    #[arg(long)]
    email:      Option<Email>,
    #[arg(long = "new-id")]
    new_id:     Option<StudentId>,
    #[arg(long)]
    telegram:   Option<TelegramHandle>,
    #[arg(long)]
    group:      Option<GroupId>,
  },

  /// Delete a student with their group membership and consultation.
  Delete { id: StudentId },

  /// Create an empty tutorial group.
  CreateGroup { group: GroupId },

  /// List students, optionally narrowed.
  List {
    #[arg(long)]
    group:             Option<GroupId>,
    #[arg(long)]
    with_consultation: bool,
  },

  /// List groups and their sizes.
  Groups,

  /// Book a consultation. Times use `yyyyMMdd HHmm`.
  AddConsult {
    #[arg(long)]
    id:   StudentId,
    #[arg(long)]
    from: String,
    #[arg(long)]
    to:   String,
  },

  /// Cancel a student's consultation.
  DeleteConsult { id: StudentId },

  /// List booked consultations in start order.
  ListConsult {
    #[arg(long)]
    id: Option<StudentId>,
  },

  /// Mark one student's attendance for a week.
  MarkAttendance {
    id:     StudentId,
    #[arg(long)]
    week:   Week,
    #[arg(long)]
    status: AttendanceStatus,
  },

  /// Mark attendance for every member of a group.
  MarkAllAttendance {
    group:  GroupId,
    #[arg(long)]
    week:   Week,
    #[arg(long)]
    status: AttendanceStatus,
  },

  /// Add an assignment, for one student or every listed student.
  AddHw {
    #[command(flatten)]
    target:     HomeworkTarget,
    #[arg(long)]
    assignment: AssignmentId,
  },

  /// Delete an assignment, for one student or every listed student.
  DeleteHw {
    #[command(flatten)]
    target:     HomeworkTarget,
    #[arg(long)]
    assignment: AssignmentId,
  },

  /// Set an assignment's status, for one student or every listed student.
  MarkHw {
    #[command(flatten)]
    target:     HomeworkTarget,
    #[arg(long)]
    assignment: AssignmentId,
    #[arg(long)]
    status:     HomeworkStatus,
  },

  /// Record a payment.
  AddPayment {
    id:      StudentId,
    #[arg(long)]
    amount:  Amount,
    /// `YYYY-MM-DD`
    #[arg(long)]
    date:    NaiveDate,
    #[arg(long)]
    remarks: Option<String>,
  },

  /// Edit the payment at a 1-based position, as listed by `roster payments`.
  EditPayment {
    id:      StudentId,
    index:   NonZeroUsize,
    #[arg(long)]
    amount:  Option<Amount>,
    #[arg(long)]
    date:    Option<NaiveDate>,
    #[arg(long)]
    remarks: Option<String>,
  },

  /// Delete the payment at a 1-based position, as listed by `roster payments`.
  DeletePayment { id: StudentId, index: NonZeroUsize },

  /// List a student's payments, oldest first.
  Payments { id: StudentId },
}

/// Who a homework command applies to: one student, or everyone in the
/// (optionally group-narrowed) list.
#[derive(clap::Args, Debug)]
pub struct HomeworkTarget {
  #[arg(long, conflicts_with = "group")]
  id:    Option<StudentId>,
  #[arg(long)]
  group: Option<GroupId>,
}

impl HomeworkTarget {
  fn apply(&self, model: &mut Model) -> Option<&StudentId> {
    if let Some(group) = &self.group {
      model.update_person_filter(Filter::in_group(group.clone()));
    }
    self.id.as_ref()
  }
}

impl Command {
  /// Whether the command only reads.
  pub fn is_query(&self) -> bool {
    matches!(
      self,
      Self::List { .. } | Self::Groups | Self::ListConsult { .. } | Self::Payments { .. }
    )
  }

  pub fn run(self, model: &mut Model) -> anyhow::Result<Vec<String>> {
    let lines = match self {
      Self::Add { name, id, telegram, group, phone, email } => {
        let person = Person::new(name, id, telegram, group)
          .with_phone(phone)
          .with_email(email);
        model.add_student(person.clone())?;
        vec![format!("New student added: {person}")]
      }

      Self::Edit { id, name, phone, email, new_id, telegram, group } => {
        let edit = PersonEdit { name, phone, email, student_id: new_id, telegram, group_id: group };
        let edited = model.edit_student(&id, &edit)?;
        vec![format!("Edited student: {edited}")]
      }

      Self::Delete { id } => {
        let removed = model.delete_student(&id)?;
        vec![format!("Deleted student: {removed}")]
      }

      Self::CreateGroup { group } => {
        model.add_group(Group::new(group.clone()))?;
        vec![format!("New group created: {group}")]
      }

      Self::List { group, with_consultation } => {
        if let Some(group) = group {
          model.update_person_filter(Filter::in_group(group));
        } else if with_consultation {
          model.update_person_filter(Filter::with_consultation());
        }
        numbered(model.filtered_persons())
      }

      Self::Groups => model.groups().iter().map(ToString::to_string).collect(),

      Self::AddConsult { id, from, to } => {
        let consultation = Consultation::parse(id.as_str(), &from, &to)?;
        model.book_consultation(consultation.clone())?;
        vec![format!("New consultation added: {consultation}")]
      }

      Self::DeleteConsult { id } => {
        let removed = model.cancel_consultation(&id)?;
        vec![format!("Deleted consultation: {removed}")]
      }

      Self::ListConsult { id } => {
        if let Some(id) = id {
          model.update_consultation_filter(Filter::for_student(id));
        }
        numbered(model.filtered_consultations())
      }

      Self::MarkAttendance { id, week, status } => {
        let updated = model.mark_attendance(&id, week, status)?;
        vec![format!("Marked {} as {status} for week {week}", updated.describe())]
      }

      Self::MarkAllAttendance { group, week, status } => {
        let updated = model.mark_all_attendance(&group, week, status)?;
        vec![format!(
          "Marked {} students in {group} as {status} for week {week}",
          updated.len()
        )]
      }

      Self::AddHw { target, assignment } => {
        let id = target.apply(model);
        let updated = model.add_homework(id, assignment)?;
        vec![format!("Added assignment {assignment} for {}", who(&updated))]
      }

      Self::DeleteHw { target, assignment } => {
        let id = target.apply(model);
        let updated = model.delete_homework(id, assignment)?;
        vec![format!("Deleted assignment {assignment} for {}", who(&updated))]
      }

      Self::MarkHw { target, assignment, status } => {
        let id = target.apply(model);
        let updated = model.mark_homework(id, assignment, status)?;
        vec![format!("Marked assignment {assignment} as {status} for {}", who(&updated))]
      }

      Self::AddPayment { id, amount, date, remarks } => {
        let payment = Payment::new(amount, date, remarks, Utc::now());
        model.add_payment(&id, payment.clone())?;
        vec![format!("Payment added for {id}: {payment}")]
      }

      Self::EditPayment { id, index, amount, date, remarks } => {
        let edit = PaymentEdit { amount, date, remarks };
        let payment = model.edit_payment(&id, index.get() - 1, &edit)?;
        vec![format!("Payment {index} edited for {id}: {payment}")]
      }

      Self::DeletePayment { id, index } => {
        let payment = model.delete_payment(&id, index.get() - 1)?;
        vec![format!("Payment {index} deleted for {id}: {payment}")]
      }

      Self::Payments { id } => {
        let person = model
          .find_person(&id)
          .with_context(|| format!("no student with id {id}"))?;
        numbered(Payment::in_display_order(person.payments()))
      }
    };
    Ok(lines)
  }
}

fn numbered<T: std::fmt::Display>(items: Vec<&T>) -> Vec<String> {
  if items.is_empty() {
    return vec!["(none)".to_string()];
  }
  items
    .into_iter()
    .enumerate()
    .map(|(i, item)| format!("{}. {item}", i + 1))
    .collect()
}

fn who(updated: &[Person]) -> String {
  match updated {
    [one] => one.describe(),
    many => format!("{} students", many.len()),
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;

  #[derive(Parser)]
  struct Harness {
    #[command(subcommand)]
    command: Command,
  }

  fn run(model: &mut Model, args: &[&str]) -> anyhow::Result<Vec<String>> {
    let argv = std::iter::once("roster").chain(args.iter().copied());
    Harness::try_parse_from(argv)?.command.run(model)
  }

  fn seeded() -> Model {
    let mut m = Model::default();
    for (name, id, tg, group) in [
      ("Alice Pauline", "E1234567", "alice_p", "T01"),
      ("Bob Choo", "E2345678", "bob_choo", "T01"),
      ("Carl Kurz", "E3456789", "carl_k", "T02"),
    ] {
      run(&mut m, &["add", "--name", name, "--id", id, "--telegram", tg, "--group", group])
        .unwrap();
    }
    m
  }

  #[test]
  fn add_rejects_malformed_ids_at_parse_time() {
    let mut m = Model::default();
    let err = run(
      &mut m,
      &["add", "--name", "Alice", "--id", "A1234567", "--telegram", "alice_p", "--group", "T01"],
    );
    assert!(err.is_err());
    assert!(m.roster().persons().is_empty());
  }

  #[test]
  fn list_narrows_by_group() {
    let mut m = seeded();
    let lines = run(&mut m, &["list", "--group", "T02"]).unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("1. Carl Kurz"));
  }

  #[test]
  fn bulk_homework_respects_group() {
    let mut m = seeded();
    let lines = run(&mut m, &["add-hw", "--group", "T01", "--assignment", "2"]).unwrap();
    assert_eq!(lines, vec!["Added assignment 2 for 2 students"]);
    assert!(
      !m.find_person(&"E3456789".parse().unwrap())
        .unwrap()
        .homework()
        .contains(AssignmentId::new(2).unwrap())
    );
  }

  #[test]
  fn homework_id_and_group_conflict() {
    let mut m = seeded();
    assert!(
      run(&mut m, &["add-hw", "--id", "E1234567", "--group", "T01", "--assignment", "1"])
        .is_err()
    );
  }

  #[test]
  fn consultation_round_trip() {
    let mut m = seeded();
    run(&mut m, &["add-consult", "--id", "E2345678", "--from", "20251010 1000", "--to", "20251010 1100"])
      .unwrap();
    let lines = run(&mut m, &["list-consult"]).unwrap();
    assert_eq!(lines.len(), 1);

    let err = run(
      &mut m,
      &["add-consult", "--id", "E1234567", "--from", "20251010 1030", "--to", "20251010 1130"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("overlaps"));

    run(&mut m, &["delete-consult", "E2345678"]).unwrap();
    assert_eq!(run(&mut m, &["list-consult"]).unwrap(), vec!["(none)"]);
  }

  #[test]
  fn bad_consultation_time_reports_format() {
    let mut m = seeded();
    let err = run(
      &mut m,
      &["add-consult", "--id", "E2345678", "--from", "2025-10-10 10:00", "--to", "20251010 1100"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("format"));
  }

  #[test]
  fn payment_indices_are_one_based() {
    let mut m = seeded();
    run(&mut m, &["add-payment", "E1234567", "--amount", "20", "--date", "2025-10-20"]).unwrap();
    run(&mut m, &["add-payment", "E1234567", "--amount", "10", "--date", "2025-10-05"]).unwrap();

    let lines = run(&mut m, &["payments", "E1234567"]).unwrap();
    assert_eq!(lines, vec!["1. 10.00 on 2025-10-05", "2. 20.00 on 2025-10-20"]);

    run(&mut m, &["delete-payment", "E1234567", "1"]).unwrap();
    let lines = run(&mut m, &["payments", "E1234567"]).unwrap();
    assert_eq!(lines, vec!["1. 20.00 on 2025-10-20"]);

    assert!(run(&mut m, &["delete-payment", "E1234567", "0"]).is_err());
  }

  #[test]
  fn queries_are_flagged() {
    let cmd = Harness::try_parse_from(["roster", "groups"]).unwrap().command;
    assert!(cmd.is_query());
    let cmd = Harness::try_parse_from(["roster", "delete", "E1234567"]).unwrap().command;
    assert!(!cmd.is_query());
  }
}
