//! Data structures for ship class definitions.
//!
//! Templates are plain serde types meant to be written in RON. A
//! [`ShipCatalogue`] holds them by class name and turns them into
//! fully-populated [`Ship`](crate::ship::Ship)s.
//!
//! **Note:** This module contains no IO. It parses text handed to it;
//! reading files is left to the host.

mod catalogue;
mod ship_template;

pub use catalogue::ShipCatalogue;
pub use ship_template::{OfficerPost, ShipTemplate, TorpedoMount, WeaponMount};
