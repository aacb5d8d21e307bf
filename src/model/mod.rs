//! The data model the reduction engine operates over: distributions,
//! events, the ACTMC itself, and the reward structure attached to it.
//! [`provider`] defines the trait surface ("external interfaces", per the
//! design) so a caller's own model representation can be reduced without
//! adapting into [`Actmc`] first.

pub mod actmc;
pub mod distribution;
pub mod event;
pub mod provider;
pub mod reward;

pub use actmc::Actmc;
pub use distribution::{Distribution, PotatoCapability};
pub use event::Event;
pub use provider::{Model, RewardProvider};
pub use reward::RewardStructure;
