//! [`UniqueList`] — an ordered list with identity-based uniqueness.

use roster_core::{EntityKind, Error, Result, identity::Identity};

/// An ordered list in which no two elements are [`Identity::is_same`].
///
/// Adding and replacing check identity so that the list never holds two
/// records for the same entity. Removal uses full-value equality, so a stale
/// copy of an element that has since been replaced is not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueList<T> {
  kind:  EntityKind,
  items: Vec<T>,
}

impl<T: Identity + PartialEq + Clone> UniqueList<T> {
  pub fn new(kind: EntityKind) -> Self { Self { kind, items: Vec::new() } }

  /// True if an identity-equivalent element is present.
  pub fn contains(&self, item: &T) -> bool {
    self.items.iter().any(|existing| existing.is_same(item))
  }

  pub fn add(&mut self, item: T) -> Result<()> {
    if self.contains(&item) {
      return Err(Error::duplicate(self.kind, item.describe()));
    }
    self.items.push(item);
    Ok(())
  }

  /// Remove the element equal in every field to `item`.
  pub fn remove(&mut self, item: &T) -> Result<T> {
    let pos = self
      .items
      .iter()
      .position(|existing| existing == item)
      .ok_or_else(|| Error::not_found(self.kind, item.describe()))?;
    Ok(self.items.remove(pos))
  }

  /// Swap `target` (found by identity) for `replacement`, keeping its
  /// position.
  pub fn replace(&mut self, target: &T, replacement: T) -> Result<()> {
    let pos = self
      .items
      .iter()
      .position(|existing| existing.is_same(target))
      .ok_or_else(|| Error::not_found(self.kind, target.describe()))?;

    let collides = self
      .items
      .iter()
      .enumerate()
      .any(|(i, existing)| i != pos && existing.is_same(&replacement));
    if collides {
      return Err(Error::duplicate(self.kind, replacement.describe()));
    }

    self.items[pos] = replacement;
    Ok(())
  }

  /// Replace the whole contents. The list is left untouched if any two
  /// `items` share an identity.
  pub fn set_all(&mut self, items: Vec<T>) -> Result<()> {
    for (i, a) in items.iter().enumerate() {
      if let Some(b) = items[i + 1..].iter().find(|b| a.is_same(*b)) {
        return Err(Error::duplicate(
          self.kind,
          format!("{} and {}", a.describe(), b.describe()),
        ));
      }
    }
    self.items = items;
    Ok(())
  }

  pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
    self.items.iter().find(|item| pred(*item))
  }

  pub fn as_slice(&self) -> &[T] { &self.items }

  pub fn iter(&self) -> std::slice::Iter<'_, T> { self.items.iter() }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

impl<'a, T> IntoIterator for &'a UniqueList<T> {
  type IntoIter = std::slice::Iter<'a, T>;
  type Item = &'a T;

  fn into_iter(self) -> Self::IntoIter { self.items.iter() }
}
