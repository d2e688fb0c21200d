//! Cross-island plumbing shared by every view.

pub mod config;
pub mod format;
pub mod platform;
