//! The weaker, identity-based notion of equality used by unique containers.

/// Implemented by every entity kept in a uniqueness container.
///
/// `is_same` is the identity check used for duplicate detection on add and
/// replace; it is usually looser than `PartialEq`, which containers use for
/// exact-value removal.
pub trait Identity {
  fn is_same(&self, other: &Self) -> bool;

  /// Short human-readable label for error messages.
  fn describe(&self) -> String;
}
