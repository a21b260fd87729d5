//! Headless recording backend
//!
//! Implements every collaborator trait without a GPU. Each call is appended
//! to an in-memory log, created handles are tracked until destroyed, and the
//! most recent value of every uniform is kept per program. Creation of any
//! [`ResourceKind`] can be made to fail on demand.
//!
//! Used by the test suite and by the demo binary to drive the renderer
//! without a window.

use crate::foundation::math::Vec4;
use crate::render::api::{
    Attachment, BackendResult, ClearFlags, FramebufferHandle, FramebufferTarget, GraphicsContext, MeshHandle,
    MeshProvider, SamplerDescriptor, SamplerHandle, ShaderHandle, ShaderProvider, ShaderStage, ShaderStageKind,
    TextureFormat, TextureHandle, TextureProvider, UniformValue, VertexArrayHandle,
};
use crate::render::resources::{GpuResource, PipelineState};
use crate::render::RenderError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Kinds of GPU object the backend can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Meshes
    Mesh,
    /// Image-backed textures
    ImageTexture,
    /// Empty render-target textures
    TargetTexture,
    /// Samplers
    Sampler,
    /// Shader programs
    Shader,
    /// Framebuffers
    Framebuffer,
    /// Vertex arrays
    VertexArray,
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum BackendCall {
    SetViewport { x: i32, y: i32, width: u32, height: u32 },
    SetClearColor(Vec4),
    SetClearDepth(f32),
    SetWriteMasks { color: bool, depth: bool },
    Clear(ClearFlags),
    BindFramebuffer(FramebufferTarget),
    ApplyPipelineState(PipelineState),
    BindTexture(u32, TextureHandle, Option<SamplerHandle>),
    BindVertexArray(VertexArrayHandle),
    DrawArrays { first: u32, count: u32 },
    AttachTexture(Attachment, TextureHandle),
    CreateFramebuffer(FramebufferHandle),
    CreateVertexArray(VertexArrayHandle),
    CreateSphere { mesh: MeshHandle, segments: (u32, u32) },
    DrawMesh(MeshHandle),
    LoadTexture { texture: TextureHandle, path: PathBuf, generate_mipmap: bool },
    CreateEmptyTexture { texture: TextureHandle, format: TextureFormat, size: (u32, u32) },
    CreateSampler { sampler: SamplerHandle, descriptor: SamplerDescriptor },
    CreateProgram { program: ShaderHandle, stages: Vec<(ShaderStageKind, PathBuf)> },
    UseProgram(ShaderHandle),
    SetUniform { program: ShaderHandle, name: String, value: UniformValue },
    Destroy(GpuResource),
}

/// A draw submitted to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    /// Mesh draw with the program that was current
    Mesh {
        /// Mesh drawn
        mesh: MeshHandle,
        /// Current program, if any
        program: Option<ShaderHandle>,
    },
    /// Non-indexed vertex array draw
    Arrays {
        /// Vertex count
        count: u32,
        /// Current program, if any
        program: Option<ShaderHandle>,
    },
}

/// Backend that records instead of rendering
#[derive(Debug)]
pub struct HeadlessBackend {
    calls: Vec<BackendCall>,
    next_handle: u64,
    live: HashSet<GpuResource>,
    created: Vec<GpuResource>,
    destroyed: Vec<GpuResource>,
    invalid_releases: usize,
    failing: HashSet<ResourceKind>,
    bound_framebuffer: FramebufferTarget,
    current_program: Option<ShaderHandle>,
    uniforms: HashMap<(ShaderHandle, String), UniformValue>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// Create a backend with an empty log and nothing alive
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            next_handle: 1,
            live: HashSet::new(),
            created: Vec::new(),
            destroyed: Vec::new(),
            invalid_releases: 0,
            failing: HashSet::new(),
            bound_framebuffer: FramebufferTarget::Default,
            current_program: None,
            uniforms: HashMap::new(),
        }
    }

    /// Builder pattern: make every creation of `kind` fail
    pub fn failing_on(mut self, kind: ResourceKind) -> Self {
        self.failing.insert(kind);
        self
    }

    /// Stop failing creations of `kind`
    pub fn stop_failing(&mut self, kind: ResourceKind) {
        self.failing.remove(&kind);
    }

    /// Every call in order
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forget the call log; resource tracking and uniforms are kept
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Draws in submission order
    pub fn draws(&self) -> Vec<DrawCall> {
        let mut program = None;
        let mut draws = Vec::new();
        for call in &self.calls {
            match call {
                BackendCall::UseProgram(shader) => program = Some(*shader),
                BackendCall::DrawMesh(mesh) => draws.push(DrawCall::Mesh { mesh: *mesh, program }),
                BackendCall::DrawArrays { count, .. } => draws.push(DrawCall::Arrays { count: *count, program }),
                _ => {}
            }
        }
        draws
    }

    /// Latest value set for `name` on `program`
    pub fn uniform(&self, program: ShaderHandle, name: &str) -> Option<UniformValue> {
        self.uniforms.get(&(program, name.to_owned())).copied()
    }

    /// Objects currently alive
    pub fn live_resources(&self) -> &HashSet<GpuResource> {
        &self.live
    }

    /// Number of objects currently alive
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Every object ever created, in creation order
    pub fn created_resources(&self) -> &[GpuResource] {
        &self.created
    }

    /// Every object destroyed, in destruction order
    pub fn destroyed_resources(&self) -> &[GpuResource] {
        &self.destroyed
    }

    /// Destroy calls on handles that were not alive
    pub fn invalid_release_count(&self) -> usize {
        self.invalid_releases
    }

    /// Framebuffer currently bound for drawing
    pub fn bound_framebuffer(&self) -> FramebufferTarget {
        self.bound_framebuffer
    }

    fn allocate(&mut self, kind: ResourceKind) -> BackendResult<u64> {
        if self.failing.contains(&kind) {
            log::debug!("Headless backend failing {:?} creation", kind);
            return Err(RenderError::ResourceCreationFailed(format!("{kind:?} creation disabled")));
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        Ok(handle)
    }

    fn created(&mut self, resource: GpuResource, call: BackendCall) {
        self.live.insert(resource);
        self.created.push(resource);
        self.calls.push(call);
    }

    fn release(&mut self, resource: GpuResource) {
        if self.live.remove(&resource) {
            self.destroyed.push(resource);
        } else {
            log::warn!("Headless backend: release of dead handle {:?}", resource);
            self.invalid_releases += 1;
        }
        self.calls.push(BackendCall::Destroy(resource));
    }
}

impl GraphicsContext for HeadlessBackend {
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.calls.push(BackendCall::SetViewport { x, y, width, height });
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.calls.push(BackendCall::SetClearColor(color));
    }

    fn set_clear_depth(&mut self, depth: f32) {
        self.calls.push(BackendCall::SetClearDepth(depth));
    }

    fn set_write_masks(&mut self, color: bool, depth: bool) {
        self.calls.push(BackendCall::SetWriteMasks { color, depth });
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.calls.push(BackendCall::Clear(flags));
    }

    fn bind_framebuffer(&mut self, target: FramebufferTarget) {
        self.bound_framebuffer = target;
        self.calls.push(BackendCall::BindFramebuffer(target));
    }

    fn apply_pipeline_state(&mut self, state: &PipelineState) {
        self.calls.push(BackendCall::ApplyPipelineState(*state));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle, sampler: Option<SamplerHandle>) {
        self.calls.push(BackendCall::BindTexture(unit, texture, sampler));
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.calls.push(BackendCall::BindVertexArray(vertex_array));
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        self.calls.push(BackendCall::DrawArrays { first, count });
    }

    fn create_framebuffer(&mut self) -> BackendResult<FramebufferHandle> {
        let framebuffer = FramebufferHandle(self.allocate(ResourceKind::Framebuffer)?);
        self.created(framebuffer.into(), BackendCall::CreateFramebuffer(framebuffer));
        Ok(framebuffer)
    }

    fn attach_texture(&mut self, attachment: Attachment, texture: TextureHandle) {
        if self.bound_framebuffer == FramebufferTarget::Default {
            log::warn!("Headless backend: attaching {:?} to the default framebuffer", attachment);
        }
        self.calls.push(BackendCall::AttachTexture(attachment, texture));
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.release(framebuffer.into());
    }

    fn create_vertex_array(&mut self) -> BackendResult<VertexArrayHandle> {
        let vertex_array = VertexArrayHandle(self.allocate(ResourceKind::VertexArray)?);
        self.created(vertex_array.into(), BackendCall::CreateVertexArray(vertex_array));
        Ok(vertex_array)
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.release(vertex_array.into());
    }
}

impl MeshProvider for HeadlessBackend {
    fn create_sphere(&mut self, segments: (u32, u32)) -> BackendResult<MeshHandle> {
        let mesh = MeshHandle(self.allocate(ResourceKind::Mesh)?);
        self.created(mesh.into(), BackendCall::CreateSphere { mesh, segments });
        Ok(mesh)
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) {
        self.calls.push(BackendCall::DrawMesh(mesh));
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        self.release(mesh.into());
    }
}

impl TextureProvider for HeadlessBackend {
    fn load_texture(&mut self, path: &Path, generate_mipmap: bool) -> BackendResult<TextureHandle> {
        let texture = TextureHandle(self.allocate(ResourceKind::ImageTexture)?);
        self.created(
            texture.into(),
            BackendCall::LoadTexture {
                texture,
                path: path.to_path_buf(),
                generate_mipmap,
            },
        );
        Ok(texture)
    }

    fn create_empty_texture(&mut self, format: TextureFormat, size: (u32, u32)) -> BackendResult<TextureHandle> {
        let texture = TextureHandle(self.allocate(ResourceKind::TargetTexture)?);
        self.created(texture.into(), BackendCall::CreateEmptyTexture { texture, format, size });
        Ok(texture)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.release(texture.into());
    }

    fn create_sampler(&mut self, descriptor: &SamplerDescriptor) -> BackendResult<SamplerHandle> {
        let sampler = SamplerHandle(self.allocate(ResourceKind::Sampler)?);
        self.created(
            sampler.into(),
            BackendCall::CreateSampler {
                sampler,
                descriptor: *descriptor,
            },
        );
        Ok(sampler)
    }

    fn destroy_sampler(&mut self, sampler: SamplerHandle) {
        self.release(sampler.into());
    }
}

impl ShaderProvider for HeadlessBackend {
    fn create_program(&mut self, stages: &[ShaderStage<'_>]) -> BackendResult<ShaderHandle> {
        let program = ShaderHandle(self.allocate(ResourceKind::Shader)?);
        let stages = stages
            .iter()
            .map(|stage| (stage.kind, stage.path.to_path_buf()))
            .collect();
        self.created(program.into(), BackendCall::CreateProgram { program, stages });
        Ok(program)
    }

    fn use_program(&mut self, program: ShaderHandle) {
        self.current_program = Some(program);
        self.calls.push(BackendCall::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ShaderHandle, name: &str, value: UniformValue) {
        self.uniforms.insert((program, name.to_owned()), value);
        self.calls.push(BackendCall::SetUniform {
            program,
            name: name.to_owned(),
            value,
        });
    }

    fn destroy_program(&mut self, program: ShaderHandle) {
        self.release(program.into());
    }
}
