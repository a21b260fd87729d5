//! Post-process stage
//!
//! When configured, the frame is drawn into an offscreen framebuffer with a
//! window-sized color and depth target. After the last scene pass the color
//! target is composited back onto the default framebuffer by a fullscreen
//! triangle running the configured fragment shader. The triangle is generated
//! in the vertex shader from the vertex index, so the bound vertex array has
//! no attributes.

use crate::config::ShaderPaths;
use crate::render::api::{
    Attachment, FramebufferHandle, FramebufferTarget, RenderBackend, SamplerDescriptor, ShaderStage, TextureFormat,
    VertexArrayHandle,
};
use crate::render::resources::{Material, OwnedResources, PipelineState};
use crate::render::RenderResult;
use std::path::Path;

/// Vertices in the fullscreen triangle
pub const FULLSCREEN_VERTEX_COUNT: u32 = 3;

/// Renderer-owned resources of the post-process stage
#[derive(Debug)]
pub struct PostProcessBundle {
    framebuffer: FramebufferHandle,
    vertex_array: VertexArrayHandle,
    material: Material,
    size: (u32, u32),
    owned: OwnedResources,
}

impl PostProcessBundle {
    /// Build the offscreen target and composite program for `fragment`
    ///
    /// Leaves the default framebuffer bound. On failure anything already
    /// created is released before the error is returned.
    pub fn create<B>(backend: &mut B, fragment: &Path, shaders: &ShaderPaths, size: (u32, u32)) -> RenderResult<Self>
    where
        B: RenderBackend + ?Sized,
    {
        log::debug!(
            "Creating post-process bundle {}x{} with {}",
            size.0,
            size.1,
            fragment.display()
        );
        let mut owned = OwnedResources::new("postprocess");

        let framebuffer = owned.acquire(backend, |b| b.create_framebuffer())?;
        let color_target = owned.acquire(backend, |b| b.create_empty_texture(TextureFormat::Rgba8, size))?;
        let depth_target = owned.acquire(backend, |b| b.create_empty_texture(TextureFormat::Depth24, size))?;

        backend.bind_framebuffer(FramebufferTarget::Offscreen(framebuffer));
        backend.attach_texture(Attachment::Color0, color_target);
        backend.attach_texture(Attachment::Depth, depth_target);
        backend.bind_framebuffer(FramebufferTarget::Default);

        let vertex_array = owned.acquire(backend, |b| b.create_vertex_array())?;
        let sampler = owned.acquire(backend, |b| b.create_sampler(&SamplerDescriptor::LINEAR_CLAMP))?;
        let shader = owned.acquire(backend, |b| {
            b.create_program(&[
                ShaderStage::vertex(&shaders.fullscreen_vertex),
                ShaderStage::fragment(fragment),
            ])
        })?;

        let material = Material::textured(shader, color_target, Some(sampler))
            .with_name("postprocess")
            .with_pipeline_state(PipelineState::fullscreen());

        Ok(Self {
            framebuffer,
            vertex_array,
            material,
            size,
            owned,
        })
    }

    /// Route subsequent draws into the offscreen target
    pub fn begin_capture<B>(&self, backend: &mut B)
    where
        B: RenderBackend + ?Sized,
    {
        backend.bind_framebuffer(FramebufferTarget::Offscreen(self.framebuffer));
    }

    /// Draw the captured color target onto the default framebuffer
    pub fn composite<B>(&self, backend: &mut B)
    where
        B: RenderBackend + ?Sized,
    {
        backend.bind_framebuffer(FramebufferTarget::Default);
        backend.bind_vertex_array(self.vertex_array);
        self.material.setup(backend);
        backend.draw_arrays(0, FULLSCREEN_VERTEX_COUNT);
    }

    /// Offscreen framebuffer
    pub fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    /// Composite material
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Size of the render targets in pixels
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Release everything the bundle created
    pub fn release<B>(mut self, backend: &mut B)
    where
        B: RenderBackend + ?Sized,
    {
        log::debug!("Releasing post-process bundle");
        self.owned.release_all(backend);
    }
}
