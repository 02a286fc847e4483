//! Command implementations for the provisioner CLI

pub mod cache;
pub mod compile;
pub mod completions;
pub mod detect;
pub mod helpers;
pub mod release;
pub mod version;
