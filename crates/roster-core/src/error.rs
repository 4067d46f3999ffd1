//! Error types for `roster-core`.

use strum::Display;
use thiserror::Error;

/// The entity type an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Person,
  Group,
  Consultation,
  Payment,
  Homework,
}

#[derive(Debug, Error)]
pub enum Error {
  /// An identity-equivalent entity is already present.
  #[error("duplicate {kind}: {detail}")]
  DuplicateEntity { kind: EntityKind, detail: String },

  /// The target of a replace, remove or lookup is absent.
  #[error("{kind} not found: {detail}")]
  EntityNotFound { kind: EntityKind, detail: String },

  /// A value failed construction-time validation.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// The operation is well-formed but the current state forbids it.
  #[error("precondition violated: {0}")]
  PreconditionViolated(String),

  /// A follow-up step of a multi-step operation failed. None of the
  /// operation's steps are kept.
  #[error("failed to propagate {step}: {source}")]
  Propagation {
    step:   &'static str,
    #[source]
    source: Box<Error>,
  },
}

impl Error {
  pub fn duplicate(kind: EntityKind, detail: impl Into<String>) -> Self {
    Self::DuplicateEntity { kind, detail: detail.into() }
  }

  pub fn not_found(kind: EntityKind, detail: impl Into<String>) -> Self {
    Self::EntityNotFound { kind, detail: detail.into() }
  }

  pub fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidArgument(msg.into())
  }

  pub fn precondition(msg: impl Into<String>) -> Self {
    Self::PreconditionViolated(msg.into())
  }

  /// Wrap `self` as the cause of a failed propagation step.
  pub fn during(self, step: &'static str) -> Self {
    Self::Propagation { step, source: Box::new(self) }
  }

  pub fn is_duplicate(&self) -> bool {
    matches!(self, Self::DuplicateEntity { .. })
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::EntityNotFound { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
