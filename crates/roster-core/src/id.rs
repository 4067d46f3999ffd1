//! Validated identifier and attribute value types.
//!
//! Every type here is immutable and can only be built through its validating
//! constructor. Deserialisation goes through the same constructor, so data
//! read back from disk is held to the same rules as interactive input.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

macro_rules! validated_string {
  ($(#[$meta:meta])* $name:ident, $check:path, $normalize:path) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub struct $name(String);

    impl $name {
      pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let value = $normalize(raw.as_ref());
        if $check(&value) {
          Ok(Self(value))
        } else {
          Err(Error::invalid(format!(
            concat!(stringify!($name), " {:?} is not valid"),
            raw.as_ref()
          )))
        }
      }

      pub fn as_str(&self) -> &str { &self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl FromStr for $name {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self> { Self::new(s) }
    }

    impl TryFrom<String> for $name {
      type Error = Error;

      fn try_from(value: String) -> Result<Self> { Self::new(value) }
    }

    impl From<$name> for String {
      fn from(value: $name) -> Self { value.0 }
    }
  };
}

fn trimmed(raw: &str) -> String { raw.trim().to_owned() }

fn verbatim(raw: &str) -> String { raw.to_owned() }

fn without_at(raw: &str) -> String {
  let raw = raw.trim();
  raw.strip_prefix('@').unwrap_or(raw).to_owned()
}

// ─── Identity keys ───────────────────────────────────────────────────────────

validated_string!(
  /// A university network id: `E` followed by seven digits.
  StudentId,
  is_valid_student_id,
  verbatim
);

validated_string!(
  /// A tutorial group id: `T` followed by two digits.
  GroupId,
  is_valid_group_id,
  verbatim
);

pub fn is_valid_student_id(s: &str) -> bool {
  let mut chars = s.chars();
  chars.next() == Some('E')
    && s.len() == 8
    && chars.all(|c| c.is_ascii_digit())
}

pub fn is_valid_group_id(s: &str) -> bool {
  let mut chars = s.chars();
  chars.next() == Some('T')
    && s.len() == 3
    && chars.all(|c| c.is_ascii_digit())
}

// ─── Contact attributes ──────────────────────────────────────────────────────

validated_string!(
  /// A display name.
  Name,
  is_valid_name,
  trimmed
);

validated_string!(
  /// A phone number of at least three digits.
  Phone,
  is_valid_phone,
  verbatim
);

validated_string!(Email, is_valid_email, verbatim);

validated_string!(
  /// A Telegram username, stored without the leading `@`.
  TelegramHandle,
  is_valid_telegram,
  without_at
);

pub fn is_valid_name(s: &str) -> bool {
  !s.is_empty()
    && s.chars().any(char::is_alphanumeric)
    && s
      .chars()
      .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '\'' | '-' | '.'))
}

pub fn is_valid_phone(s: &str) -> bool {
  s.len() >= 3 && s.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_email(s: &str) -> bool {
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  let local_ok = !local.is_empty()
    && !local.starts_with('.')
    && !local.ends_with('.')
    && local
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || "+_.-".contains(c));
  let labels: Vec<&str> = domain.split('.').collect();
  let domain_ok = labels.len() >= 2
    && labels.iter().all(|label| {
      !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
    && labels.last().is_some_and(|tld| tld.len() >= 2);
  local_ok && domain_ok
}

pub fn is_valid_telegram(s: &str) -> bool {
  (5..=32).contains(&s.len())
    && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─── Small integer keys ──────────────────────────────────────────────────────

/// A homework assignment number, 1 to 3.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct AssignmentId(u8);

impl AssignmentId {
  pub const MAX: u8 = 3;

  pub fn new(value: u8) -> Result<Self> {
    if (1..=Self::MAX).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::invalid(format!(
        "assignment id must be between 1 and {}, got {value}",
        Self::MAX
      )))
    }
  }

  pub fn get(self) -> u8 { self.0 }
}

/// A teaching week, 1 to 13.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Week(u8);

impl Week {
  pub const MAX: u8 = 13;

  pub fn new(value: u8) -> Result<Self> {
    if (1..=Self::MAX).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::invalid(format!(
        "week must be between 1 and {}, got {value}",
        Self::MAX
      )))
    }
  }

  pub fn get(self) -> u8 { self.0 }
}

macro_rules! small_key_impls {
  ($name:ident) => {
    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl TryFrom<u8> for $name {
      type Error = Error;

      fn try_from(value: u8) -> Result<Self> { Self::new(value) }
    }

    impl From<$name> for u8 {
      fn from(value: $name) -> Self { value.0 }
    }

    impl FromStr for $name {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self> {
        let n: u8 = s.trim().parse().map_err(|_| {
          Error::invalid(format!(
            concat!(stringify!($name), " {:?} is not a number"),
            s
          ))
        })?;
        Self::new(n)
      }
    }
  };
}

small_key_impls!(AssignmentId);
small_key_impls!(Week);
