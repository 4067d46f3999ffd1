//! The in-memory roster model.
//!
//! [`Roster`] owns the three containers (persons, groups, consultations);
//! [`Model`] wraps it with the filtered views, change notifications and the
//! command-level operations that keep denormalized copies consistent.

pub mod event;
pub mod model;
pub mod roster;
pub mod store;
pub mod unique_list;
pub mod view;

pub use event::RosterEvent;
pub use model::Model;
pub use roster::Roster;
pub use store::RosterStore;
pub use unique_list::UniqueList;
pub use view::Filter;

#[cfg(test)]
mod tests;
