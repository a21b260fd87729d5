//! Backend abstraction traits for the rendering system
//!
//! This module defines the traits a graphics backend must implement for the
//! forward renderer to drive it. They model a GL-style immediate context:
//! global binding state, named uniforms on the active program, and one draw
//! call per mesh. Resource creation is fallible; state changes and draws are
//! not, since a bad handle there is a caller bug rather than a runtime
//! condition.
//!
//! The traits are split along the collaborator boundaries the renderer uses:
//! - [`GraphicsContext`]: context state, framebuffers, vertex arrays, draws
//! - [`MeshProvider`]: procedural meshes and mesh draws
//! - [`TextureProvider`]: image textures, empty render targets, samplers
//! - [`ShaderProvider`]: program creation and named uniforms
//!
//! [`RenderBackend`] is the union and is implemented for every type that
//! provides all four.

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::resources::PipelineState;
use crate::render::RenderError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a mesh resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Handle to a texture stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a sampler object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerHandle(pub u64);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Handle to an offscreen framebuffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u64);

/// Handle to a vertex array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u64);

/// Draw target selected by [`GraphicsContext::bind_framebuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    /// The window's framebuffer
    Default,
    /// An offscreen framebuffer created by the renderer
    Offscreen(FramebufferHandle),
}

/// Framebuffer attachment points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// First color attachment
    Color0,
    /// Depth attachment
    Depth,
}

bitflags! {
    /// Buffers affected by [`GraphicsContext::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        /// Clear the color buffer
        const COLOR = 0b01;
        /// Clear the depth buffer
        const DEPTH = 0b10;
    }
}

/// Pixel formats for empty textures used as render targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8 bits per channel RGBA color
    Rgba8,
    /// 24-bit depth
    Depth24,
}

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapMode {
    /// Tile the texture
    Repeat,
    /// Tile with mirroring
    MirroredRepeat,
    /// Clamp coordinates to the edge texels
    ClampToEdge,
}

/// Sampler creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SamplerDescriptor {
    /// Minification filter
    pub min_filter: FilterMode,
    /// Magnification filter
    pub mag_filter: FilterMode,
    /// Wrap mode along U
    pub wrap_s: WrapMode,
    /// Wrap mode along V
    pub wrap_t: WrapMode,
}

impl SamplerDescriptor {
    /// Linear filtering, clamped on both axes
    pub const LINEAR_CLAMP: Self = Self {
        min_filter: FilterMode::Linear,
        mag_filter: FilterMode::Linear,
        wrap_s: WrapMode::ClampToEdge,
        wrap_t: WrapMode::ClampToEdge,
    };

    /// Linear filtering, repeating around the horizon and clamped at the poles
    pub const EQUIRECTANGULAR: Self = Self {
        min_filter: FilterMode::Linear,
        mag_filter: FilterMode::Linear,
        wrap_s: WrapMode::Repeat,
        wrap_t: WrapMode::ClampToEdge,
    };
}

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStageKind {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

/// One source file attached to a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderStage<'a> {
    /// Which stage the source compiles to
    pub kind: ShaderStageKind,
    /// Path to the source file
    pub path: &'a Path,
}

impl<'a> ShaderStage<'a> {
    /// Vertex stage from a source file
    pub fn vertex(path: &'a Path) -> Self {
        Self {
            kind: ShaderStageKind::Vertex,
            path,
        }
    }

    /// Fragment stage from a source file
    pub fn fragment(path: &'a Path) -> Self {
        Self {
            kind: ShaderStageKind::Fragment,
            path,
        }
    }
}

/// Value uploaded to a named uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Signed integer (also used for sampler unit indices)
    Int(i32),
    /// Scalar float
    Float(f32),
    /// 2-component vector
    Vec2(Vec2),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// 4x4 matrix, column-major
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

/// Context state and draw submission
pub trait GraphicsContext {
    /// Set the viewport rectangle in pixels
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Set the color used by subsequent color clears
    fn set_clear_color(&mut self, color: Vec4);

    /// Set the depth used by subsequent depth clears
    fn set_clear_depth(&mut self, depth: f32);

    /// Enable or disable color (all channels) and depth writes
    fn set_write_masks(&mut self, color: bool, depth: bool);

    /// Clear the selected buffers of the bound framebuffer
    fn clear(&mut self, flags: ClearFlags);

    /// Bind the draw framebuffer
    fn bind_framebuffer(&mut self, target: FramebufferTarget);

    /// Apply a complete pipeline state in one step
    fn apply_pipeline_state(&mut self, state: &PipelineState);

    /// Bind a texture (and optionally a sampler) to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle, sampler: Option<SamplerHandle>);

    /// Bind a vertex array object
    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Draw `count` vertices from the bound vertex array as triangles
    fn draw_arrays(&mut self, first: u32, count: u32);

    /// Create an empty framebuffer object
    fn create_framebuffer(&mut self) -> BackendResult<FramebufferHandle>;

    /// Attach a texture to the currently bound offscreen framebuffer
    fn attach_texture(&mut self, attachment: Attachment, texture: TextureHandle);

    /// Delete a framebuffer object
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Create a vertex array object with no attributes
    fn create_vertex_array(&mut self) -> BackendResult<VertexArrayHandle>;

    /// Delete a vertex array object
    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);
}

/// Mesh geometry provider
pub trait MeshProvider {
    /// Build a unit sphere with `segments` (longitude, latitude) subdivisions
    fn create_sphere(&mut self, segments: (u32, u32)) -> BackendResult<MeshHandle>;

    /// Draw a mesh with the current state and program
    fn draw_mesh(&mut self, mesh: MeshHandle);

    /// Release a mesh
    fn destroy_mesh(&mut self, mesh: MeshHandle);
}

/// Texture and sampler provider
pub trait TextureProvider {
    /// Load an image file into a texture
    fn load_texture(&mut self, path: &Path, generate_mipmap: bool) -> BackendResult<TextureHandle>;

    /// Allocate an uninitialized texture of the given format and size
    fn create_empty_texture(&mut self, format: TextureFormat, size: (u32, u32)) -> BackendResult<TextureHandle>;

    /// Release a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Create a sampler object
    fn create_sampler(&mut self, descriptor: &SamplerDescriptor) -> BackendResult<SamplerHandle>;

    /// Release a sampler object
    fn destroy_sampler(&mut self, sampler: SamplerHandle);
}

/// Shader program provider
pub trait ShaderProvider {
    /// Compile and link a program from its stages
    fn create_program(&mut self, stages: &[ShaderStage<'_>]) -> BackendResult<ShaderHandle>;

    /// Make a program current
    fn use_program(&mut self, program: ShaderHandle);

    /// Set a named uniform on a program. Unknown names are ignored.
    fn set_uniform(&mut self, program: ShaderHandle, name: &str, value: UniformValue);

    /// Release a program
    fn destroy_program(&mut self, program: ShaderHandle);
}

/// Everything the forward renderer needs from a graphics backend
pub trait RenderBackend: GraphicsContext + MeshProvider + TextureProvider + ShaderProvider {}

impl<T> RenderBackend for T where T: GraphicsContext + MeshProvider + TextureProvider + ShaderProvider + ?Sized {}
