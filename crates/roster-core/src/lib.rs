//! Core types for the Roster teaching-assistant tool.
//!
//! Validated identifiers, the immutable entity records (`Person`, `Group`,
//! `Consultation`, `Payment`) and the [`Identity`](identity::Identity) trait
//! that unique containers build on. No storage or I/O lives here.

pub mod attendance;
pub mod consultation;
pub mod error;
pub mod group;
pub mod homework;
pub mod id;
pub mod identity;
pub mod payment;
pub mod person;

pub use error::{EntityKind, Error, Result};
