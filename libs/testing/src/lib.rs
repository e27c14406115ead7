//! Test support for capalloc crates.
//!
//! Fixtures are plain JSON capacity documents so that every crate can
//! exercise its own parsing path. Nothing here depends on the capalloc
//! libraries themselves.

mod builder;
pub mod fixtures;
pub mod strategies;

pub use builder::CapacityDocBuilder;
