//! Lighting system
//!
//! Light types, the lighting environment, and its uniform upload.

pub mod lighting;

// Re-export all lighting types
pub use lighting::*;
