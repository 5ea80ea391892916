//! # Tactical Development Tools
//!
//! Command-line tools for development:
//! - Data validators for ship catalogues and combat rules
//! - Seeded AI-vs-AI skirmish runner and batch statistics
//! - Encounter record writer and verifier
//!
//! All file IO for the workspace lives here; `tactical_core` only parses
//! and encodes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod skirmish;
pub mod validate;
