//! Plan display for brocade
//!
//! Planning and applying live in the `reconcile` crate; this module renders
//! what they found.

pub mod differ;

pub use differ::{display_orphans, display_plan};
