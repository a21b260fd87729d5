//! Scoped ownership of renderer-created GPU objects
//!
//! Every object a renderer bundle creates is recorded in an
//! [`OwnedResources`] list the moment creation succeeds. If a later creation
//! fails, [`OwnedResources::acquire`] releases everything recorded so far
//! before returning the error, so a half-built bundle never leaks. Releasing
//! walks the list in reverse creation order.
//!
//! Scene-owned meshes, textures and programs never enter this list.

use crate::render::api::{
    BackendResult, FramebufferHandle, MeshHandle, RenderBackend, SamplerHandle, ShaderHandle, TextureHandle,
    VertexArrayHandle,
};

/// Any GPU object the renderer can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuResource {
    /// Mesh
    Mesh(MeshHandle),
    /// Texture
    Texture(TextureHandle),
    /// Sampler
    Sampler(SamplerHandle),
    /// Shader program
    Shader(ShaderHandle),
    /// Framebuffer
    Framebuffer(FramebufferHandle),
    /// Vertex array
    VertexArray(VertexArrayHandle),
}

impl GpuResource {
    /// Release the object through the matching destroy call
    pub fn release<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        match self {
            Self::Mesh(mesh) => backend.destroy_mesh(mesh),
            Self::Texture(texture) => backend.destroy_texture(texture),
            Self::Sampler(sampler) => backend.destroy_sampler(sampler),
            Self::Shader(shader) => backend.destroy_program(shader),
            Self::Framebuffer(framebuffer) => backend.destroy_framebuffer(framebuffer),
            Self::VertexArray(vertex_array) => backend.destroy_vertex_array(vertex_array),
        }
    }
}

macro_rules! impl_from_handle {
    ($($handle:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$handle> for GpuResource {
                fn from(handle: $handle) -> Self {
                    Self::$variant(handle)
                }
            }
        )*
    };
}

impl_from_handle! {
    MeshHandle => Mesh,
    TextureHandle => Texture,
    SamplerHandle => Sampler,
    ShaderHandle => Shader,
    FramebufferHandle => Framebuffer,
    VertexArrayHandle => VertexArray,
}

/// Ordered list of GPU objects owned by one bundle
#[derive(Debug)]
pub struct OwnedResources {
    label: &'static str,
    resources: Vec<GpuResource>,
}

impl OwnedResources {
    /// Create an empty list; `label` names the owner in log output
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            resources: Vec::new(),
        }
    }

    /// Run a creation call and record its result
    ///
    /// On failure every object recorded so far is released and the list is
    /// left empty before the error is returned.
    pub fn acquire<B, H, F>(&mut self, backend: &mut B, create: F) -> BackendResult<H>
    where
        B: RenderBackend + ?Sized,
        H: Copy + Into<GpuResource>,
        F: FnOnce(&mut B) -> BackendResult<H>,
    {
        match create(backend) {
            Ok(handle) => {
                self.track(handle);
                Ok(handle)
            }
            Err(err) => {
                log::warn!(
                    "{}: creation failed, releasing {} resources already created",
                    self.label,
                    self.resources.len()
                );
                self.release_all(backend);
                Err(err)
            }
        }
    }

    /// Record an object created outside [`Self::acquire`]
    pub fn track(&mut self, handle: impl Into<GpuResource>) {
        let resource = handle.into();
        log::debug!("{}: created {:?}", self.label, resource);
        self.resources.push(resource);
    }

    /// Release every recorded object, newest first
    pub fn release_all<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        while let Some(resource) = self.resources.pop() {
            log::debug!("{}: releasing {:?}", self.label, resource);
            resource.release(backend);
        }
    }

    /// Recorded objects in creation order
    pub fn resources(&self) -> &[GpuResource] {
        &self.resources
    }

    /// Number of recorded objects
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Drop for OwnedResources {
    fn drop(&mut self) {
        // No backend here to release through; the owner must call release_all
        if !self.resources.is_empty() {
            log::warn!(
                "{}: dropped with {} unreleased GPU resources",
                self.label,
                self.resources.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{GraphicsContext, SamplerDescriptor, TextureFormat, TextureProvider};
    use crate::render::backends::headless::{HeadlessBackend, ResourceKind};
    use crate::render::RenderError;

    #[test]
    fn test_release_all_runs_in_reverse_order() {
        let mut backend = HeadlessBackend::new();
        let mut owned = OwnedResources::new("test");

        let texture = owned
            .acquire(&mut backend, |b| b.create_empty_texture(TextureFormat::Rgba8, (4, 4)))
            .unwrap();
        let framebuffer = owned.acquire(&mut backend, |b| b.create_framebuffer()).unwrap();
        assert_eq!(owned.len(), 2);

        owned.release_all(&mut backend);
        assert!(owned.is_empty());
        assert_eq!(
            backend.destroyed_resources(),
            [GpuResource::Framebuffer(framebuffer), GpuResource::Texture(texture)]
        );
        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn test_failed_acquire_releases_previous_objects() {
        let mut backend = HeadlessBackend::new().failing_on(ResourceKind::Sampler);
        let mut owned = OwnedResources::new("test");

        owned.acquire(&mut backend, |b| b.create_framebuffer()).unwrap();
        owned.acquire(&mut backend, |b| b.create_vertex_array()).unwrap();
        let result = owned.acquire(&mut backend, |b| b.create_sampler(&SamplerDescriptor::LINEAR_CLAMP));

        assert!(matches!(result, Err(RenderError::ResourceCreationFailed(_))));
        assert!(owned.is_empty());
        assert_eq!(backend.live_count(), 0);
    }
}
