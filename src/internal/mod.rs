//! Internal implementation details.

pub(crate) mod creation;
pub(crate) mod in_flight;

pub(crate) use creation::CreationGuard;
pub(crate) use in_flight::InFlight;
