//! Change notifications pushed to observers of a [`Model`](crate::Model).

use strum::Display;

/// What changed. Listeners are called synchronously, once per event, before
/// the mutating call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RosterEvent {
  PersonsChanged,
  GroupsChanged,
  ConsultationsChanged,
  PersonFilterChanged,
  ConsultationFilterChanged,
}

pub type Listener = Box<dyn FnMut(RosterEvent)>;
