//! Core data models for the pool tracker.

mod ids;
mod participant;
mod race;
mod ranking;
mod rider;
mod roster;
mod snapshot;
mod stage;

pub use ids::*;
pub use participant::*;
pub use race::*;
pub use ranking::*;
pub use rider::*;
pub use roster::*;
pub use snapshot::*;
pub use stage::*;
