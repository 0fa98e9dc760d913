//! Domain layer types and invariants.

pub mod error;
pub mod films;
pub mod genres;
pub mod ids;
pub mod persons;
