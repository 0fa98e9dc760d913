//! Kinoteka: a read-only film catalogue served from a search index behind a
//! cache-aside layer.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
