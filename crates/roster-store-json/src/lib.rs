//! JSON file backend for the roster.
//!
//! The whole roster is read and written as one document. Loading re-validates
//! every identifier and cross-entity invariant; nothing on disk is trusted.

mod encode;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::JsonStore;
