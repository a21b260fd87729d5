//! # Rendering System
//!
//! Forward rendering of an ECS scene through an abstract graphics backend.
//!
//! ## Architecture
//!
//! - [`api`]: collaborator traits a backend implements, plus handle types
//! - [`resources`]: materials, pipeline state, and scoped GPU ownership
//! - [`systems::lighting`]: the lighting environment uploaded to lit shaders
//! - [`render_queue`]: per-frame command buckets and transparency ordering
//! - [`frame_collector`]: scene traversal producing the camera and buckets
//! - [`sky`] / [`postprocess`]: optional renderer-owned resource bundles
//! - [`forward_renderer`]: the pass executor and resource lifecycle
//! - [`backends`]: the recording headless backend
//!
//! ## Frame Flow
//!
//! ```text
//! Scene ──▶ FrameCollector ──▶ RenderQueue (opaque / lighted / transparent)
//!                                   │
//!                                   ▼
//!   clear ─▶ opaque ─▶ lighted ─▶ sky ─▶ transparent ─▶ post-process composite
//! ```

pub mod api;
pub mod backends;
pub mod forward_renderer;
pub mod frame_collector;
pub mod postprocess;
pub mod render_queue;
pub mod resources;
pub mod sky;
pub mod systems;

pub use api::{RenderBackend, UniformValue};
pub use forward_renderer::{ForwardRenderer, FrameStats};
pub use frame_collector::{ActiveCamera, CollectedFrame, FrameCollector};
pub use render_queue::{CommandType, RenderCommand, RenderQueue};
pub use resources::{Material, PipelineState};
pub use systems::lighting::{Light, LightType, LightingEnvironment, SkyGradient};

use thiserror::Error;

/// Result type for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Rendering system errors
///
/// Errors that can occur while setting up renderer resources or talking to
/// the graphics backend. A missing camera or a missing optional bundle is not
/// an error.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    ///
    /// Raised when a configured bundle cannot be assembled. Anything created
    /// before the failure has already been released.
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// Resource creation failed
    ///
    /// Occurs when the backend cannot create a mesh, texture, sampler,
    /// program, framebuffer, or vertex array.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),
}
