//! Graphics backend implementations
//!
//! Real GPU backends live outside this crate and implement the traits in
//! [`crate::render::api`]. The headless backend here records calls instead of
//! issuing them.

pub mod headless;

pub use headless::{BackendCall, DrawCall, HeadlessBackend, ResourceKind};
