//! The `RosterStore` trait.
//!
//! Storage backends (e.g. `roster-store-json`) implement it; the CLI depends
//! on this abstraction rather than on a concrete backend.

use crate::roster::Roster;

/// Loads and saves a whole [`Roster`] at once.
pub trait RosterStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the stored roster. `Ok(None)` means nothing has been saved yet.
  ///
  /// Implementations must re-validate every record and cross-entity
  /// invariant rather than trusting the stored data.
  fn load(&self) -> Result<Option<Roster>, Self::Error>;

  /// Persist `roster`, replacing whatever was stored before.
  fn save(&self, roster: &Roster) -> Result<(), Self::Error>;
}
