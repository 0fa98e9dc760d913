//! Application services: query composition, cache-aside reads and entity assembly.

pub mod error;
pub mod films;
pub mod genres;
pub mod pagination;
pub mod persons;
pub mod query;
pub mod repos;
