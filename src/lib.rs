//! Downloads the newest package version reported by a set of version-check
//! endpoints, exactly once per version.

pub mod config;
pub mod event;
pub mod schema;
pub mod sync;
pub mod version;
