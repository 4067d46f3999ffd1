//! Payments recorded against a student.
//!
//! Payments have no identity of their own. A student's payments are stored in
//! the order they were added, but always shown (and addressed by index)
//! chronologically by `date`, ties broken by `recorded_at`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Amount ──────────────────────────────────────────────────────────────────

/// A non-negative amount of money with at most two decimal places.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount {
  cents: u64,
}

impl Amount {
  pub fn from_cents(cents: u64) -> Self { Self { cents } }

  pub fn cents(self) -> u64 { self.cents }
}

impl FromStr for Amount {
  type Err = Error;

  /// Accepts `12`, `12.5` and `12.50`.
  fn from_str(s: &str) -> Result<Self> {
    let raw = s.trim();
    let invalid =
      || Error::invalid(format!("amount {s:?} must be a non-negative number with at most 2 decimals"));

    let (whole, frac) = raw.split_once('.').unwrap_or((raw, ""));
    if whole.is_empty()
      || !whole.chars().all(|c| c.is_ascii_digit())
      || frac.len() > 2
      || !frac.chars().all(|c| c.is_ascii_digit())
      || (raw.contains('.') && frac.is_empty())
    {
      return Err(invalid());
    }

    let whole: u64 = whole.parse().map_err(|_| invalid())?;
    let frac: u64 = match frac.len() {
      0 => 0,
      1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
      _ => frac.parse().map_err(|_| invalid())?,
    };
    whole
      .checked_mul(100)
      .and_then(|c| c.checked_add(frac))
      .map(Self::from_cents)
      .ok_or_else(invalid)
  }
}

impl fmt::Display for Amount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
  }
}

// ─── Payment ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
  pub amount:      Amount,
  pub date:        NaiveDate,
  pub remarks:     Option<String>,
  /// Set when the payment is first entered; never changes afterwards.
  pub recorded_at: DateTime<Utc>,
}

impl Payment {
  pub fn new(
    amount: Amount,
    date: NaiveDate,
    remarks: Option<String>,
    recorded_at: DateTime<Utc>,
  ) -> Self {
    let remarks = remarks
      .map(|r| r.trim().to_owned())
      .filter(|r| !r.is_empty());
    Self { amount, date, remarks, recorded_at }
  }

  /// Apply an edit, keeping the original `recorded_at`.
  pub fn edited(&self, edit: &PaymentEdit) -> Self {
    Self::new(
      edit.amount.unwrap_or(self.amount),
      edit.date.unwrap_or(self.date),
      edit.remarks.clone().or_else(|| self.remarks.clone()),
      self.recorded_at,
    )
  }

  /// Storage indices of `payments`, in display order.
  pub fn display_order(payments: &[Payment]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..payments.len()).collect();
    order.sort_by_key(|&i| (payments[i].date, payments[i].recorded_at));
    order
  }

  /// `payments` sorted into display order.
  pub fn in_display_order(payments: &[Payment]) -> Vec<&Payment> {
    Self::display_order(payments)
      .into_iter()
      .map(|i| &payments[i])
      .collect()
  }
}

impl fmt::Display for Payment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} on {}", self.amount, self.date)?;
    if let Some(remarks) = &self.remarks {
      write!(f, " ({remarks})")?;
    }
    Ok(())
  }
}

/// Fields to change on an existing payment; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentEdit {
  pub amount:  Option<Amount>,
  pub date:    Option<NaiveDate>,
  pub remarks: Option<String>,
}

impl PaymentEdit {
  pub fn is_empty(&self) -> bool {
    self.amount.is_none() && self.date.is_none() && self.remarks.is_none()
  }
}
