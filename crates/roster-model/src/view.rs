//! Filters for the person and consultation views.
//!
//! A view is recomputed from the containers on every query, so it can never
//! be stale. Setting a filter replaces the previous one outright.

use std::{fmt, rc::Rc};

use roster_core::{
  consultation::Consultation,
  id::{GroupId, StudentId},
  person::Person,
};

/// A caller-supplied predicate over `T`.
pub struct Filter<T> {
  label: String,
  pred:  Rc<dyn Fn(&T) -> bool>,
}

impl<T> Filter<T> {
  pub fn new(label: impl Into<String>, pred: impl Fn(&T) -> bool + 'static) -> Self {
    Self { label: label.into(), pred: Rc::new(pred) }
  }

  /// Matches everything.
  pub fn all() -> Self { Self::new("all", |_| true) }

  pub fn matches(&self, item: &T) -> bool { (self.pred)(item) }

  pub fn label(&self) -> &str { &self.label }
}

impl<T> Clone for Filter<T> {
  fn clone(&self) -> Self {
    Self { label: self.label.clone(), pred: Rc::clone(&self.pred) }
  }
}

impl<T> Default for Filter<T> {
  fn default() -> Self { Self::all() }
}

impl<T> fmt::Debug for Filter<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Filter").field(&self.label).finish()
  }
}

impl Filter<Person> {
  pub fn with_consultation() -> Self {
    Self::new("with consultation", Person::has_consultation)
  }

  pub fn in_group(group_id: GroupId) -> Self {
    Self::new(format!("group {group_id}"), move |p: &Person| p.group_id() == &group_id)
  }
}

impl Filter<Consultation> {
  pub fn for_student(id: StudentId) -> Self {
    Self::new(format!("student {id}"), move |c: &Consultation| c.student_id() == &id)
  }
}

/// Items of `items` matching `filter`, in their original order.
pub fn filtered<'a, T>(items: impl IntoIterator<Item = &'a T>, filter: &Filter<T>) -> Vec<&'a T>
where
  T: 'a,
{
  items.into_iter().filter(|item| filter.matches(item)).collect()
}

/// Consultations matching `filter`, sorted by start time. Slots starting at
/// the same time keep their container order.
pub fn sorted_consultations<'a>(
  items: impl IntoIterator<Item = &'a Consultation>,
  filter: &Filter<Consultation>,
) -> Vec<&'a Consultation> {
  let mut view = filtered(items, filter);
  view.sort_by_key(|c| c.start());
  view
}
