//! Active rendering systems
//!
//! Stateful runtime systems that feed the passes. Currently only lighting.

pub mod lighting;
