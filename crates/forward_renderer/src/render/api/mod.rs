//! Public rendering API
//!
//! The collaborator traits a graphics backend implements, and the handle and
//! descriptor types that cross that boundary.

pub mod render_backend;

// Re-export commonly used types
pub use render_backend::{
    Attachment, BackendResult, ClearFlags, FilterMode, FramebufferHandle, FramebufferTarget,
    GraphicsContext, MeshHandle, MeshProvider, RenderBackend, SamplerDescriptor, SamplerHandle,
    ShaderHandle, ShaderProvider, ShaderStage, ShaderStageKind, TextureFormat, TextureHandle,
    TextureProvider, UniformValue, VertexArrayHandle, WrapMode,
};
