//! Behavioural tests for `Model` over an in-memory `Roster`.

use std::{cell::RefCell, rc::Rc};

use chrono::{NaiveDate, TimeZone, Utc};
use roster_core::{
  Error,
  attendance::AttendanceStatus,
  consultation::Consultation,
  group::Group,
  homework::HomeworkStatus,
  id::{AssignmentId, GroupId, StudentId, Week},
  payment::{Amount, Payment, PaymentEdit},
  person::{Person, PersonEdit},
};

use crate::{Filter, Model, Roster, RosterEvent};

fn sid(raw: &str) -> StudentId { raw.parse().unwrap() }

fn gid(raw: &str) -> GroupId { raw.parse().unwrap() }

fn student(name: &str, id: &str, telegram: &str, group: &str) -> Person {
  Person::new(name.parse().unwrap(), sid(id), telegram.parse().unwrap(), gid(group))
}

fn alice() -> Person { student("Alice Pauline", "E1234567", "alice_p", "T01") }

fn bob() -> Person { student("Bob Choo", "E2345678", "bob_choo", "T01") }

fn carl() -> Person { student("Carl Kurz", "E3456789", "carl_k", "T02") }

fn consult(id: &str, from: &str, to: &str) -> Consultation {
  Consultation::parse(id, from, to).unwrap()
}

fn hw(n: u8) -> AssignmentId { AssignmentId::new(n).unwrap() }

fn week(n: u8) -> Week { Week::new(n).unwrap() }

/// A model holding Alice and Bob in T01 and Carl in T02.
fn model() -> Model {
  let mut m = Model::default();
  m.add_student(alice()).unwrap();
  m.add_student(bob()).unwrap();
  m.add_student(carl()).unwrap();
  m
}

fn get(m: &Model, id: &str) -> Person { m.find_person(&sid(id)).unwrap().clone() }

fn member(m: &Model, group: &str, id: &str) -> Option<Person> {
  m.group(&gid(group))?.member(&sid(id)).cloned()
}

// ─── Students ────────────────────────────────────────────────────────────────

#[test]
fn add_student_creates_and_joins_groups() {
  let m = model();
  assert_eq!(m.roster().persons().len(), 3);
  assert_eq!(m.groups().len(), 2);
  assert_eq!(m.group(&gid("T01")).unwrap().len(), 2);
  assert_eq!(member(&m, "T02", "E3456789"), Some(carl()));
}

#[test]
fn add_student_rejects_any_shared_key() {
  let mut m = model();
  let clash = student("Someone Else", "E9999999", "alice_p", "T03");
  assert!(m.add_student(clash).unwrap_err().is_duplicate());
  assert_eq!(m.roster().persons().len(), 3);
  assert!(!m.has_group(&gid("T03")));
}

#[test]
fn add_person_alone_leaves_groups_untouched() {
  let mut m = Model::default();
  m.add_person(alice()).unwrap();
  assert!(m.has_person(&alice()));
  assert!(!m.has_group(&gid("T01")));

  m.update_group_when_add_person(&alice()).unwrap();
  assert_eq!(member(&m, "T01", "E1234567"), Some(alice()));
}

#[test]
fn edit_student_moves_group_membership() {
  let mut m = model();
  let edit = PersonEdit { group_id: Some(gid("T02")), ..Default::default() };
  let edited = m.edit_student(&sid("E1234567"), &edit).unwrap();

  assert_eq!(edited.group_id(), &gid("T02"));
  assert!(member(&m, "T01", "E1234567").is_none());
  assert_eq!(member(&m, "T02", "E1234567"), Some(edited));
}

#[test]
fn edit_student_into_new_group_creates_it_and_keeps_emptied_group() {
  let mut m = model();
  let edit = PersonEdit { group_id: Some(gid("T05")), ..Default::default() };
  m.edit_student(&sid("E3456789"), &edit).unwrap();

  assert!(m.group(&gid("T02")).unwrap().is_empty());
  assert!(member(&m, "T05", "E3456789").is_some());
}

#[test]
fn edit_student_with_nothing_to_change_is_rejected() {
  let mut m = model();
  let err = m.edit_student(&sid("E1234567"), &PersonEdit::default()).unwrap_err();
  assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn edit_student_into_existing_identity_is_duplicate_and_changes_nothing() {
  let mut m = model();
  let edit = PersonEdit { telegram: Some("bob_choo".parse().unwrap()), ..Default::default() };
  assert!(m.edit_student(&sid("E1234567"), &edit).unwrap_err().is_duplicate());
  assert_eq!(get(&m, "E1234567"), alice());
}

#[test]
fn edit_student_id_carries_consultation() {
  let mut m = model();
  m.book_consultation(consult("E1234567", "20251010 1000", "20251010 1200"))
    .unwrap();

  let edit = PersonEdit { student_id: Some(sid("E7654321")), ..Default::default() };
  let edited = m.edit_student(&sid("E1234567"), &edit).unwrap();

  let expected = consult("E7654321", "20251010 1000", "20251010 1200");
  assert_eq!(edited.consultation(), Some(&expected));
  assert_eq!(m.roster().consultations().as_slice(), &[expected]);
  assert!(member(&m, "T01", "E7654321").is_some());
  assert!(!m.has_student(&sid("E1234567")));
}

#[test]
fn update_group_when_edit_person_follows_set_person() {
  let mut m = model();
  let old = get(&m, "E2345678");
  let moved = old.with_group(gid("T02"));
  m.set_person(&old, moved.clone()).unwrap();
  // Only the person list has changed so far.
  assert!(member(&m, "T01", "E2345678").is_some());

  m.update_group_when_edit_person(&old).unwrap();
  assert!(member(&m, "T01", "E2345678").is_none());
  assert_eq!(member(&m, "T02", "E2345678"), Some(moved));
}

#[test]
fn delete_student_removes_every_copy() {
  let mut m = model();
  m.book_consultation(consult("E2345678", "20251010 1000", "20251010 1200"))
    .unwrap();

  let removed = m.delete_student(&sid("E2345678")).unwrap();
  assert_eq!(removed.student_id(), &sid("E2345678"));
  assert!(!m.has_student(&sid("E2345678")));
  assert!(member(&m, "T01", "E2345678").is_none());
  assert!(m.roster().consultations().is_empty());
}

#[test]
fn delete_unknown_student_is_not_found() {
  let mut m = model();
  assert!(m.delete_student(&sid("E0000000")).unwrap_err().is_not_found());
}

#[test]
fn stale_person_cannot_be_removed() {
  let mut m = model();
  let stale = get(&m, "E1234567");
  m.mark_attendance(&sid("E1234567"), week(1), AttendanceStatus::Present)
    .unwrap();

  assert!(m.delete_person(&stale).unwrap_err().is_not_found());
  assert!(m.has_student(&sid("E1234567")));
}

#[test]
fn create_group_rejects_duplicate() {
  let mut m = Model::default();
  m.add_group(Group::new(gid("T04"))).unwrap();
  assert!(m.add_group(Group::new(gid("T04"))).unwrap_err().is_duplicate());
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[test]
fn mark_attendance_is_idempotent_and_updates_group_copy() {
  let mut m = model();
  let once = m
    .mark_attendance(&sid("E1234567"), week(3), AttendanceStatus::Absent)
    .unwrap();
  let twice = m
    .mark_attendance(&sid("E1234567"), week(3), AttendanceStatus::Absent)
    .unwrap();
  assert_eq!(once, twice);
  assert_eq!(once.attendance().status(week(3)), Some(AttendanceStatus::Absent));
  assert_eq!(member(&m, "T01", "E1234567"), Some(once));
}

#[test]
fn mark_all_attendance_marks_group_and_narrows_view() {
  let mut m = model();
  let updated = m
    .mark_all_attendance(&gid("T01"), week(2), AttendanceStatus::Present)
    .unwrap();
  assert_eq!(updated.len(), 2);

  for id in ["E1234567", "E2345678"] {
    let p = get(&m, id);
    assert_eq!(p.attendance().status(week(2)), Some(AttendanceStatus::Present));
    assert_eq!(member(&m, "T01", id), Some(p));
  }
  assert!(get(&m, "E3456789").attendance().is_empty());

  let view: Vec<_> = m.filtered_persons().iter().map(|p| p.student_id().clone()).collect();
  assert_eq!(view, vec![sid("E1234567"), sid("E2345678")]);

  // Marking a single student resets the view.
  m.mark_attendance(&sid("E3456789"), week(2), AttendanceStatus::Excused)
    .unwrap();
  assert_eq!(m.filtered_persons().len(), 3);
}

#[test]
fn mark_all_attendance_unknown_group_is_not_found() {
  let mut m = model();
  let err = m
    .mark_all_attendance(&gid("T09"), week(1), AttendanceStatus::Present)
    .unwrap_err();
  assert!(err.is_not_found());
}

// ─── Homework ────────────────────────────────────────────────────────────────

#[test]
fn add_homework_for_one_student() {
  let mut m = model();
  m.add_homework(Some(&sid("E1234567")), hw(1)).unwrap();
  assert_eq!(
    get(&m, "E1234567").homework().status(hw(1)),
    Some(HomeworkStatus::Incomplete)
  );
  assert!(get(&m, "E2345678").homework().is_empty());

  let err = m.add_homework(Some(&sid("E1234567")), hw(1)).unwrap_err();
  assert!(matches!(err, Error::PreconditionViolated(_)));
}

#[test]
fn bulk_homework_is_all_or_nothing() {
  let mut m = model();
  // Alice and Bob pass the check; Carl, last in the view, fails it.
  m.add_homework(Some(&sid("E3456789")), hw(2)).unwrap();
  let before: Vec<Person> = m.roster().persons().iter().cloned().collect();

  let err = m.add_homework(None, hw(2)).unwrap_err();
  assert!(matches!(err, Error::PreconditionViolated(_)));
  let after: Vec<Person> = m.roster().persons().iter().cloned().collect();
  assert_eq!(before, after);
  assert!(!get(&m, "E1234567").homework().contains(hw(2)));
  assert!(!get(&m, "E2345678").homework().contains(hw(2)));

  m.add_homework(None, hw(1)).unwrap();
  assert!(m.roster().persons().iter().all(|p| p.homework().contains(hw(1))));
}

/// Moves Bob to T02 in the person list only, leaving T01's copy behind, so
/// refreshing Bob's group copy fails.
fn split_bob(m: &mut Model) {
  let bob = get(m, "E2345678");
  m.set_person(&bob, bob.with_group(gid("T02"))).unwrap();
}

#[test]
fn bulk_homework_failing_mid_view_changes_nobody() {
  let mut m = model();
  split_bob(&mut m);
  let before: Vec<Person> = m.roster().persons().iter().cloned().collect();
  let groups_before = m.groups().clone();

  assert!(m.add_homework(None, hw(1)).is_err());
  let after: Vec<Person> = m.roster().persons().iter().cloned().collect();
  assert_eq!(before, after);
  assert_eq!(m.groups(), &groups_before);
  assert!(m.roster().persons().iter().all(|p| !p.homework().contains(hw(1))));
}

#[test]
fn failed_attendance_changes_nothing_and_notifies_nobody() {
  let mut m = model();
  split_bob(&mut m);
  let seen = Rc::new(RefCell::new(Vec::new()));
  let sink = Rc::clone(&seen);
  m.subscribe(move |event| sink.borrow_mut().push(event));

  let err = m
    .mark_attendance(&sid("E2345678"), week(1), AttendanceStatus::Present)
    .unwrap_err();
  assert!(matches!(err, Error::Propagation { .. }));
  assert!(get(&m, "E2345678").attendance().is_empty());

  // Alice is marked before Bob fails; she must not keep the mark.
  assert!(
    m.mark_all_attendance(&gid("T01"), week(1), AttendanceStatus::Present)
      .is_err()
  );
  assert!(get(&m, "E1234567").attendance().is_empty());
  assert!(seen.borrow().is_empty());
}

#[test]
fn bulk_homework_only_touches_the_view() {
  let mut m = model();
  m.update_person_filter(Filter::in_group(gid("T02")));
  let updated = m.add_homework(None, hw(3)).unwrap();
  assert_eq!(updated.len(), 1);
  assert!(get(&m, "E3456789").homework().contains(hw(3)));
  assert!(!get(&m, "E1234567").homework().contains(hw(3)));
}

#[test]
fn mark_and_delete_homework() {
  let mut m = model();
  let id = sid("E3456789");
  let err = m.mark_homework(Some(&id), hw(1), HomeworkStatus::Late).unwrap_err();
  assert!(matches!(err, Error::PreconditionViolated(_)));

  m.add_homework(Some(&id), hw(1)).unwrap();
  m.mark_homework(Some(&id), hw(1), HomeworkStatus::Late).unwrap();
  assert_eq!(get(&m, "E3456789").homework().status(hw(1)), Some(HomeworkStatus::Late));
  assert_eq!(
    member(&m, "T02", "E3456789").unwrap().homework().status(hw(1)),
    Some(HomeworkStatus::Late)
  );

  m.delete_homework(Some(&id), hw(1)).unwrap();
  assert!(get(&m, "E3456789").homework().is_empty());
}

// ─── Consultations ───────────────────────────────────────────────────────────

#[test]
fn overlapping_consultation_is_rejected() {
  let mut m = model();
  m.book_consultation(consult("E1234567", "20251010 1000", "20251010 1200"))
    .unwrap();

  let err = m
    .book_consultation(consult("E2345678", "20251010 1100", "20251010 1300"))
    .unwrap_err();
  assert!(err.is_duplicate());
  assert_eq!(m.roster().consultations().len(), 1);
  assert!(!get(&m, "E2345678").has_consultation());

  // Back-to-back slots do not overlap.
  m.book_consultation(consult("E2345678", "20251010 1200", "20251010 1300"))
    .unwrap();
}

#[test]
fn book_consultation_checks_the_student() {
  let mut m = model();
  let err = m
    .book_consultation(consult("E0000000", "20251010 1000", "20251010 1100"))
    .unwrap_err();
  assert!(err.is_not_found());

  m.book_consultation(consult("E1234567", "20251010 1000", "20251010 1100"))
    .unwrap();
  let err = m
    .book_consultation(consult("E1234567", "20251011 1000", "20251011 1100"))
    .unwrap_err();
  assert!(matches!(err, Error::PreconditionViolated(_)));
}

#[test]
fn book_consultation_updates_person_and_group_copy() {
  let mut m = model();
  let c = consult("E3456789", "20251010 1000", "20251010 1100");
  let updated = m.book_consultation(c.clone()).unwrap();
  assert_eq!(updated.consultation(), Some(&c));
  assert_eq!(member(&m, "T02", "E3456789"), Some(updated));
  assert!(m.has_consultation(&c));
}

#[test]
fn cancel_consultation_clears_both_sides() {
  let mut m = model();
  let c = consult("E1234567", "20251010 1000", "20251010 1100");
  m.book_consultation(c.clone()).unwrap();

  assert_eq!(m.cancel_consultation(&sid("E1234567")).unwrap(), c);
  assert!(!get(&m, "E1234567").has_consultation());
  assert!(!m.has_consultation(&c));

  let err = m.cancel_consultation(&sid("E1234567")).unwrap_err();
  assert!(matches!(err, Error::PreconditionViolated(_)));
}

#[test]
fn consultation_view_is_sorted_and_filterable() {
  let mut m = model();
  m.book_consultation(consult("E1234567", "20251012 1000", "20251012 1100"))
    .unwrap();
  m.book_consultation(consult("E2345678", "20251010 1000", "20251010 1100"))
    .unwrap();
  m.book_consultation(consult("E3456789", "20251011 1000", "20251011 1100"))
    .unwrap();

  let order: Vec<_> = m
    .filtered_consultations()
    .iter()
    .map(|c| c.student_id().clone())
    .collect();
  assert_eq!(order, vec![sid("E2345678"), sid("E3456789"), sid("E1234567")]);

  m.update_consultation_filter(Filter::for_student(sid("E1234567")));
  assert_eq!(m.filtered_consultations().len(), 1);

  m.update_person_filter(Filter::with_consultation());
  assert_eq!(m.filtered_persons().len(), 3);
  m.cancel_consultation(&sid("E3456789")).unwrap();
  m.update_person_filter(Filter::with_consultation());
  assert_eq!(m.filtered_persons().len(), 2);
}

#[test]
fn primitive_consultation_ops_touch_one_side() {
  let mut m = model();
  let c = consult("E1234567", "20251010 1000", "20251010 1100");
  m.add_consultation(c.clone()).unwrap();
  assert!(!get(&m, "E1234567").has_consultation());

  m.add_consultation_to_person(&sid("E1234567"), c.clone()).unwrap();
  assert_eq!(m.delete_consultation_from_person(&sid("E1234567")).unwrap(), c);
  assert!(m.has_consultation(&c));

  assert_eq!(m.delete_consultation(&c).unwrap(), c);
  assert!(m.delete_consultation(&c).unwrap_err().is_not_found());
}

#[test]
fn update_consultations_for_edited_person_rewrites_owner() {
  let mut m = model();
  m.add_consultation(consult("E1234567", "20251010 1000", "20251010 1100"))
    .unwrap();
  m.update_consultations_for_edited_person(&sid("E1234567"), &sid("E7654321"))
    .unwrap();
  assert_eq!(
    m.roster().consultations().as_slice(),
    &[consult("E7654321", "20251010 1000", "20251010 1100")]
  );
}

// ─── Payments ────────────────────────────────────────────────────────────────

fn payment(amount: &str, day: u32, secs: i64) -> Payment {
  Payment::new(
    amount.parse::<Amount>().unwrap(),
    NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
    None,
    Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap(),
  )
}

#[test]
fn payments_use_display_order() {
  let mut m = model();
  let id = sid("E1234567");
  m.add_payment(&id, payment("30", 20, 0)).unwrap();
  m.add_payment(&id, payment("10", 5, 1)).unwrap();

  // Index 0 in display order is the earlier-dated payment.
  let edit = PaymentEdit { amount: Some("12.50".parse().unwrap()), ..Default::default() };
  let edited = m.edit_payment(&id, 0, &edit).unwrap();
  assert_eq!(edited.amount, Amount::from_cents(1250));
  assert_eq!(edited.recorded_at, payment("10", 5, 1).recorded_at);

  let removed = m.delete_payment(&id, 1).unwrap();
  assert_eq!(removed.amount, Amount::from_cents(3000));
  assert_eq!(get(&m, "E1234567").payments().len(), 1);
  assert_eq!(member(&m, "T01", "E1234567").unwrap().payments().len(), 1);

  assert!(m.delete_payment(&id, 5).unwrap_err().is_not_found());
  let err = m.edit_payment(&id, 0, &PaymentEdit::default()).unwrap_err();
  assert!(matches!(err, Error::InvalidArgument(_)));
}

// ─── Observers ───────────────────────────────────────────────────────────────

#[test]
fn listeners_see_every_change() {
  let mut m = model();
  let seen = Rc::new(RefCell::new(Vec::new()));
  let sink = Rc::clone(&seen);
  m.subscribe(move |event| sink.borrow_mut().push(event));

  m.mark_all_attendance(&gid("T01"), week(1), AttendanceStatus::Present)
    .unwrap();
  assert!(seen.borrow().contains(&RosterEvent::PersonsChanged));
  assert!(seen.borrow().contains(&RosterEvent::PersonFilterChanged));

  seen.borrow_mut().clear();
  m.book_consultation(consult("E1234567", "20251010 1000", "20251010 1100"))
    .unwrap();
  assert!(seen.borrow().contains(&RosterEvent::ConsultationsChanged));

  // A rejected command notifies nobody.
  seen.borrow_mut().clear();
  assert!(m.add_student(alice()).is_err());
  assert!(seen.borrow().is_empty());
}

#[test]
fn reset_replaces_everything() {
  let mut m = model();
  m.update_person_filter(Filter::in_group(gid("T02")));
  m.reset(Roster::new());
  assert!(m.filtered_persons().is_empty());
  assert_eq!(m.person_filter().label(), "all");
}
