//! # Forward Renderer
//!
//! Draws a [`Scene`] in a fixed sequence of passes:
//!
//! 1. clear (offscreen target when post-processing is configured)
//! 2. opaque commands, traversal order, `transform = VP * M`
//! 3. lighted commands, traversal order, with the lighting environment
//! 4. sky sphere pinned to the far plane, when configured
//! 5. transparent commands, ascending forward-axis projection, `transform = VP * M`
//! 6. fullscreen composite onto the default framebuffer, when configured
//!
//! The renderer owns only what it creates for the sky and post-process
//! stages. Meshes, materials and textures referenced by the scene are
//! borrowed for the frame and never released here.
//!
//! ## Usage
//!
//! ```no_run
//! use forward_renderer::config::RendererConfig;
//! use forward_renderer::ecs::World;
//! use forward_renderer::render::backends::HeadlessBackend;
//! use forward_renderer::render::ForwardRenderer;
//!
//! # fn main() -> Result<(), forward_renderer::render::RenderError> {
//! let mut backend = HeadlessBackend::new();
//! let world = World::new();
//! let mut renderer = ForwardRenderer::new();
//! renderer.initialize(&mut backend, (1280, 720), RendererConfig::new().with_sky("assets/sky.jpg"))?;
//! let stats = renderer.render(&mut backend, &world);
//! assert!(!stats.camera_found);
//! renderer.destroy(&mut backend);
//! # Ok(())
//! # }
//! ```

use crate::config::RendererConfig;
use crate::ecs::{Entity, Scene};
use crate::foundation::math::{utils, Mat4, Vec4};
use crate::render::api::{ClearFlags, FramebufferTarget, RenderBackend};
use crate::render::frame_collector::{ActiveCamera, FrameCollector};
use crate::render::postprocess::PostProcessBundle;
use crate::render::render_queue::RenderCommand;
use crate::render::sky::SkyBundle;
use crate::render::systems::lighting::{uniform_names, LightingEnvironment};
use crate::render::{RenderError, RenderResult};

/// Counters describing one rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// A camera was found; when false nothing else happened
    pub camera_found: bool,
    /// Draws in the opaque pass
    pub opaque_draws: usize,
    /// Draws in the lighted pass
    pub lighted_draws: usize,
    /// Draws in the transparent pass
    pub transparent_draws: usize,
    /// The sky sphere was drawn
    pub sky_drawn: bool,
    /// The frame went through the post-process composite
    pub postprocess_applied: bool,
}

impl FrameStats {
    /// Mesh draws across the scene passes, sky excluded
    pub fn scene_draws(&self) -> usize {
        self.opaque_draws + self.lighted_draws + self.transparent_draws
    }
}

/// Forward rendering pipeline with optional sky and post-process stages
#[derive(Debug)]
pub struct ForwardRenderer {
    window_size: (u32, u32),
    config: RendererConfig,
    collector: FrameCollector,
    lighting: LightingEnvironment,
    sky: Option<SkyBundle>,
    postprocess: Option<PostProcessBundle>,
    initialized: bool,
    frame_count: u64,
}

impl Default for ForwardRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ForwardRenderer {
    /// Clear color of every frame (opaque black)
    pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    /// Clear depth of every frame
    pub const CLEAR_DEPTH: f32 = 1.0;

    /// Create an uninitialized renderer with the default lighting environment
    pub fn new() -> Self {
        Self {
            window_size: (0, 0),
            config: RendererConfig::default(),
            collector: FrameCollector::new(),
            lighting: LightingEnvironment::default(),
            sky: None,
            postprocess: None,
            initialized: false,
            frame_count: 0,
        }
    }

    /// Create the resources `config` asks for
    ///
    /// Calling this again first destroys the resources of the previous call.
    /// If any bundle fails to build, everything created by this call is
    /// released and the renderer is left uninitialized.
    pub fn initialize<B>(&mut self, backend: &mut B, window_size: (u32, u32), config: RendererConfig) -> RenderResult<()>
    where
        B: RenderBackend + ?Sized,
    {
        if self.initialized {
            log::info!("Re-initializing forward renderer, releasing previous resources");
            self.destroy(backend);
        }

        log::info!(
            "Initializing forward renderer {}x{} (sky: {}, postprocess: {})",
            window_size.0,
            window_size.1,
            config.sky.is_some(),
            config.postprocess.is_some()
        );

        let sky = match &config.sky {
            Some(image) => Some(
                SkyBundle::create(backend, image, &config.shaders, config.sky_segments)
                    .map_err(|e| RenderError::InitializationFailed(format!("sky from {}: {e}", image.display())))?,
            ),
            None => None,
        };

        let postprocess = match &config.postprocess {
            Some(fragment) => match PostProcessBundle::create(backend, fragment, &config.shaders, window_size) {
                Ok(bundle) => Some(bundle),
                Err(e) => {
                    if let Some(sky) = sky {
                        sky.release(backend);
                    }
                    return Err(RenderError::InitializationFailed(format!(
                        "post-process with {}: {e}",
                        fragment.display()
                    )));
                }
            },
            None => None,
        };

        self.window_size = window_size;
        self.config = config;
        self.sky = sky;
        self.postprocess = postprocess;
        self.initialized = true;
        self.frame_count = 0;
        Ok(())
    }

    /// Release every resource the renderer created
    ///
    /// A no-op when nothing was created.
    pub fn destroy<B>(&mut self, backend: &mut B)
    where
        B: RenderBackend + ?Sized,
    {
        if let Some(sky) = self.sky.take() {
            sky.release(backend);
        }
        if let Some(postprocess) = self.postprocess.take() {
            postprocess.release(backend);
        }
        if self.initialized {
            log::info!("Forward renderer destroyed after {} frames", self.frame_count);
        }
        self.initialized = false;
    }

    /// Adopt a new window size, rebuilding the post-process targets
    ///
    /// If the rebuild fails the previous targets and size are kept.
    pub fn resize<B>(&mut self, backend: &mut B, window_size: (u32, u32)) -> RenderResult<()>
    where
        B: RenderBackend + ?Sized,
    {
        if window_size == self.window_size {
            return Ok(());
        }

        if self.postprocess.is_some() {
            if let Some(fragment) = &self.config.postprocess {
                log::debug!("Resizing post-process targets to {}x{}", window_size.0, window_size.1);
                let rebuilt = PostProcessBundle::create(backend, fragment, &self.config.shaders, window_size)?;
                if let Some(old) = self.postprocess.replace(rebuilt) {
                    old.release(backend);
                }
            }
        }

        self.window_size = window_size;
        Ok(())
    }

    /// Render a frame from the first camera in the scene
    pub fn render<B, S>(&mut self, backend: &mut B, scene: &S) -> FrameStats
    where
        B: RenderBackend + ?Sized,
        S: Scene,
    {
        self.render_with_camera(backend, scene, None)
    }

    /// Render a frame from `camera`, or from the first camera when `None`
    ///
    /// Without a usable camera nothing is cleared, bound or drawn.
    pub fn render_with_camera<B, S>(&mut self, backend: &mut B, scene: &S, camera: Option<Entity>) -> FrameStats
    where
        B: RenderBackend + ?Sized,
        S: Scene,
    {
        let mut frame = self.collector.collect_with_camera(scene, camera);
        let Some(camera) = frame.camera else {
            log::trace!("No camera, skipping frame");
            return FrameStats::default();
        };

        frame.queue.sort_transparent(&camera.forward());
        let view_projection = camera.view_projection(self.window_size);
        let mut stats = FrameStats {
            camera_found: true,
            ..FrameStats::default()
        };

        self.begin_frame(backend);

        for command in frame.queue.opaque_commands() {
            Self::draw_unlit(backend, command, &view_projection);
            stats.opaque_draws += 1;
        }

        for command in frame.queue.lighted_commands() {
            self.draw_lit(backend, command, &view_projection, &camera);
            stats.lighted_draws += 1;
        }

        if let Some(sky) = &self.sky {
            sky.draw(backend, &view_projection, &camera.eye());
            stats.sky_drawn = true;
        }

        for command in frame.queue.transparent_commands() {
            Self::draw_unlit(backend, command, &view_projection);
            stats.transparent_draws += 1;
        }

        if let Some(postprocess) = &self.postprocess {
            postprocess.composite(backend);
            stats.postprocess_applied = true;
        }

        self.collector.set_capacity_hint(frame.queue.command_count());
        self.frame_count += 1;
        log::trace!("Frame {} rendered: {:?}", self.frame_count, stats);
        stats
    }

    fn begin_frame<B>(&self, backend: &mut B)
    where
        B: RenderBackend + ?Sized,
    {
        let (width, height) = self.window_size;
        backend.set_viewport(0, 0, width, height);
        backend.set_clear_color(Vec4::from(Self::CLEAR_COLOR));
        backend.set_clear_depth(Self::CLEAR_DEPTH);
        // Masks left by the previous frame's last material would mask the clear
        backend.set_write_masks(true, true);

        match &self.postprocess {
            Some(postprocess) => postprocess.begin_capture(backend),
            None => backend.bind_framebuffer(FramebufferTarget::Default),
        }

        backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
    }

    fn draw_unlit<B>(backend: &mut B, command: &RenderCommand<'_>, view_projection: &Mat4)
    where
        B: RenderBackend + ?Sized,
    {
        command.material.setup(backend);
        backend.set_uniform(
            command.material.shader,
            uniform_names::TRANSFORM,
            (view_projection * command.local_to_world).into(),
        );
        backend.draw_mesh(command.mesh);
    }

    fn draw_lit<B>(&self, backend: &mut B, command: &RenderCommand<'_>, view_projection: &Mat4, camera: &ActiveCamera<'_>)
    where
        B: RenderBackend + ?Sized,
    {
        let material = command.material;
        let shader = material.shader;
        material.setup(backend);

        let model = command.local_to_world;
        backend.set_uniform(shader, uniform_names::MODEL, model.into());
        backend.set_uniform(
            shader,
            uniform_names::MODEL_INVERSE_TRANSPOSE,
            utils::inverse_transpose(&model).into(),
        );
        backend.set_uniform(shader, uniform_names::VIEW_PROJECTION, (*view_projection).into());
        backend.set_uniform(shader, uniform_names::EYE, camera.eye().into());
        self.lighting.upload(backend, shader);

        backend.draw_mesh(command.mesh);
    }

    /// Replace the lighting environment used by the lighted pass
    pub fn set_lighting(&mut self, lighting: LightingEnvironment) {
        self.lighting = lighting;
    }

    /// Current lighting environment
    pub fn lighting(&self) -> &LightingEnvironment {
        &self.lighting
    }

    /// Whether [`Self::initialize`] has succeeded since the last destroy
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a sky sphere is drawn
    pub fn has_sky(&self) -> bool {
        self.sky.is_some()
    }

    /// Whether frames are post-processed
    pub fn has_postprocess(&self) -> bool {
        self.postprocess.is_some()
    }

    /// Window size frames are rendered at
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Frames rendered with a camera since initialization
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Configuration of the last successful initialization
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{CameraComponent, MeshRendererComponent, TransformComponent};
    use crate::ecs::World;
    use crate::foundation::math::Vec3;
    use crate::config::ShaderPaths;
    use crate::render::api::{MeshHandle, ShaderHandle, ShaderStageKind, UniformValue};
    use crate::render::backends::headless::{BackendCall, DrawCall, HeadlessBackend, ResourceKind};
    use crate::render::resources::{GpuResource, Material};
    use crate::render::systems::lighting::{Light, SkyGradient};
    use approx::assert_relative_eq;
    use std::path::PathBuf;
    use std::sync::Arc;

    const SIZE: (u32, u32) = (800, 600);
    const OPAQUE_SHADER: ShaderHandle = ShaderHandle(1001);
    const LIT_SHADER: ShaderHandle = ShaderHandle(1002);
    const GLASS_SHADER: ShaderHandle = ShaderHandle(1003);

    struct Fixture {
        world: World,
        camera: Entity,
        opaque: Arc<Material>,
        lit: Arc<Material>,
        glass: Arc<Material>,
    }

    impl Fixture {
        /// Camera at `eye` looking down -Z
        fn new(eye: Vec3) -> Self {
            let mut world = World::new();
            let camera = world.create_entity();
            world.add_component(camera, TransformComponent::from_position(eye));
            world.add_component(camera, CameraComponent::perspective(60.0, 0.1, 100.0));

            Self {
                world,
                camera,
                opaque: Arc::new(Material::new(OPAQUE_SHADER)),
                lit: Arc::new(Material::new(LIT_SHADER).with_lighted(true)),
                glass: Arc::new(Material::new(GLASS_SHADER).with_transparent(true)),
            }
        }

        fn add(&mut self, material: &Arc<Material>, mesh: u64, position: Vec3) -> Entity {
            let entity = self.world.create_entity();
            self.world
                .add_component(entity, TransformComponent::from_position(position));
            self.world
                .add_component(entity, MeshRendererComponent::new(MeshHandle(mesh), Arc::clone(material)));
            entity
        }

        fn populated() -> Self {
            let mut fixture = Self::new(Vec3::zeros());
            let (opaque, lit, glass) = (fixture.opaque.clone(), fixture.lit.clone(), fixture.glass.clone());
            fixture.add(&glass, 2, Vec3::new(0.0, 0.0, -2.0));
            fixture.add(&opaque, 10, Vec3::new(1.0, 0.0, -4.0));
            fixture.add(&lit, 20, Vec3::new(-1.0, 0.0, -4.0));
            fixture.add(&glass, 8, Vec3::new(0.0, 0.0, -8.0));
            fixture.add(&glass, 5, Vec3::new(0.5, 0.0, -5.0));
            fixture
        }

        fn view_projection(&self) -> Mat4 {
            let camera = self.world.get_component::<CameraComponent>(self.camera).unwrap();
            camera.view_projection_matrix(&self.world.local_to_world_matrix(self.camera), SIZE)
        }
    }

    fn full_config() -> RendererConfig {
        RendererConfig::new()
            .with_sky("assets/textures/sky.jpg")
            .with_postprocess("assets/shaders/postprocess/vignette.frag")
    }

    fn created_programs(backend: &HeadlessBackend) -> Vec<ShaderHandle> {
        backend
            .created_resources()
            .iter()
            .filter_map(|resource| match resource {
                GpuResource::Shader(shader) => Some(*shader),
                _ => None,
            })
            .collect()
    }

    fn mat4_uniform(backend: &HeadlessBackend, shader: ShaderHandle, name: &str) -> Mat4 {
        match backend.uniform(shader, name) {
            Some(UniformValue::Mat4(matrix)) => matrix,
            other => panic!("{name} is not a matrix: {other:?}"),
        }
    }

    #[test]
    fn test_no_camera_touches_nothing() {
        let mut fixture = Fixture::populated();
        fixture.world.remove_entity(fixture.camera);

        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, full_config()).unwrap();
        backend.clear_calls();

        for _ in 0..2 {
            let stats = renderer.render(&mut backend, &fixture.world);
            assert_eq!(stats, FrameStats::default());
        }
        assert!(backend.calls().is_empty());
        assert_eq!(renderer.frame_count(), 0);
        renderer.destroy(&mut backend);
    }

    #[test]
    fn test_passes_run_in_order() {
        let fixture = Fixture::populated();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, full_config()).unwrap();
        let programs = created_programs(&backend);
        let (sky_shader, post_shader) = (programs[0], programs[1]);
        backend.clear_calls();

        let stats = renderer.render(&mut backend, &fixture.world);
        assert!(stats.camera_found && stats.sky_drawn && stats.postprocess_applied);
        assert_eq!((stats.opaque_draws, stats.lighted_draws, stats.transparent_draws), (1, 1, 3));

        let passes: Vec<Option<ShaderHandle>> = backend
            .draws()
            .iter()
            .map(|draw| match draw {
                DrawCall::Mesh { program, .. } | DrawCall::Arrays { program, .. } => *program,
            })
            .collect();
        assert_eq!(
            passes,
            vec![
                Some(OPAQUE_SHADER),
                Some(LIT_SHADER),
                Some(sky_shader),
                Some(GLASS_SHADER),
                Some(GLASS_SHADER),
                Some(GLASS_SHADER),
                Some(post_shader),
            ]
        );
        renderer.destroy(&mut backend);
    }

    #[test]
    fn test_transparent_drawn_by_ascending_forward_projection() {
        let fixture = Fixture::populated();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, RendererConfig::new()).unwrap();

        renderer.render(&mut backend, &fixture.world);
        let glass_meshes: Vec<u64> = backend
            .draws()
            .iter()
            .filter_map(|draw| match draw {
                DrawCall::Mesh {
                    mesh,
                    program: Some(GLASS_SHADER),
                } => Some(mesh.0),
                _ => None,
            })
            .collect();
        assert_eq!(glass_meshes, vec![2, 5, 8]);
    }

    #[test]
    fn test_frame_setup_precedes_clear() {
        let fixture = Fixture::populated();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, RendererConfig::new()).unwrap();
        backend.clear_calls();

        renderer.render(&mut backend, &fixture.world);
        assert_eq!(
            backend.calls()[..6],
            [
                BackendCall::SetViewport {
                    x: 0,
                    y: 0,
                    width: 800,
                    height: 600
                },
                BackendCall::SetClearColor(Vec4::new(0.0, 0.0, 0.0, 1.0)),
                BackendCall::SetClearDepth(1.0),
                BackendCall::SetWriteMasks {
                    color: true,
                    depth: true
                },
                BackendCall::BindFramebuffer(FramebufferTarget::Default),
                BackendCall::Clear(ClearFlags::COLOR | ClearFlags::DEPTH),
            ]
        );
    }

    #[test]
    fn test_unlit_passes_upload_model_view_projection() {
        let mut fixture = Fixture::new(Vec3::new(0.0, 1.0, 3.0));
        let opaque = fixture.opaque.clone();
        let entity = fixture.add(&opaque, 10, Vec3::new(2.0, 0.0, -1.0));
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, RendererConfig::new()).unwrap();

        renderer.render(&mut backend, &fixture.world);
        let expected = fixture.view_projection() * fixture.world.local_to_world_matrix(entity);
        assert_relative_eq!(
            mat4_uniform(&backend, OPAQUE_SHADER, "transform"),
            expected,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_lighted_pass_uploads_matrices_eye_and_lights() {
        let mut fixture = Fixture::new(Vec3::zeros());
        // Parent the camera so its world position differs from its local one
        let rig = fixture.world.create_entity();
        fixture
            .world
            .add_component(rig, TransformComponent::from_position(Vec3::new(0.0, 0.0, 4.0)));
        assert!(fixture.world.set_parent(fixture.camera, Some(rig)));
        let lit = fixture.lit.clone();
        let entity = fixture.add(&lit, 20, Vec3::new(1.0, 2.0, -3.0));

        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, RendererConfig::new()).unwrap();
        renderer.render(&mut backend, &fixture.world);

        let model = fixture.world.local_to_world_matrix(entity);
        assert_relative_eq!(mat4_uniform(&backend, LIT_SHADER, "M"), model);
        assert_relative_eq!(
            mat4_uniform(&backend, LIT_SHADER, "M_IT"),
            model.try_inverse().unwrap().transpose(),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            mat4_uniform(&backend, LIT_SHADER, "VP"),
            fixture.view_projection(),
            epsilon = 1e-6
        );
        assert_eq!(
            backend.uniform(LIT_SHADER, "eye"),
            Some(UniformValue::Vec3(Vec3::new(0.0, 0.0, 4.0)))
        );
        assert_eq!(backend.uniform(LIT_SHADER, "light_count"), Some(UniformValue::Int(3)));
        assert_eq!(
            backend.uniform(LIT_SHADER, "sky.top"),
            Some(UniformValue::Vec3(Vec3::new(0.3, 0.6, 1.0)))
        );
        // Lighting never reaches the unlit materials
        assert!(backend.uniform(OPAQUE_SHADER, "light_count").is_none());
    }

    #[test]
    fn test_custom_lighting_environment_is_uploaded() {
        let mut fixture = Fixture::new(Vec3::zeros());
        let lit = fixture.lit.clone();
        fixture.add(&lit, 20, Vec3::new(0.0, 0.0, -2.0));

        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.set_lighting(
            LightingEnvironment::new(SkyGradient::default())
                .with_light(Light::directional(-Vec3::y(), Vec3::repeat(1.0), Vec3::repeat(0.5))),
        );
        renderer.render(&mut backend, &fixture.world);

        assert_eq!(renderer.lighting().light_count(), 1);
        assert_eq!(backend.uniform(LIT_SHADER, "light_count"), Some(UniformValue::Int(1)));
        assert!(backend.uniform(LIT_SHADER, "lights[1].type").is_none());
    }

    #[test]
    fn test_sky_follows_camera_translation() {
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer
            .initialize(&mut backend, SIZE, RendererConfig::new().with_sky("sky.png"))
            .unwrap();
        let sky_shader = created_programs(&backend)[0];

        let near = Fixture::new(Vec3::zeros());
        renderer.render(&mut backend, &near.world);
        let at_origin = mat4_uniform(&backend, sky_shader, "transform");

        let far = Fixture::new(Vec3::new(40.0, -12.0, 90.0));
        renderer.render(&mut backend, &far.world);
        let far_away = mat4_uniform(&backend, sky_shader, "transform");

        assert_relative_eq!(at_origin, far_away, epsilon = 1e-4);
        renderer.destroy(&mut backend);
    }

    #[test]
    fn test_resources_released_symmetrically() {
        let configs = [
            (RendererConfig::new(), 0),
            (RendererConfig::new().with_sky("sky.png"), 4),
            (RendererConfig::new().with_postprocess("post.frag"), 6),
            (full_config(), 10),
        ];

        for (config, expected) in configs {
            let mut backend = HeadlessBackend::new();
            let mut renderer = ForwardRenderer::new();
            renderer.initialize(&mut backend, SIZE, config).unwrap();
            assert_eq!(backend.live_count(), expected);

            renderer.render(&mut backend, &Fixture::populated().world);
            renderer.destroy(&mut backend);
            renderer.destroy(&mut backend);

            assert_eq!(backend.live_count(), 0);
            assert_eq!(backend.destroyed_resources().len(), expected);
            assert_eq!(backend.invalid_release_count(), 0);
            assert!(!renderer.is_initialized());
        }
    }

    #[test]
    fn test_scene_resources_are_never_released() {
        let fixture = Fixture::populated();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, full_config()).unwrap();
        renderer.render(&mut backend, &fixture.world);
        renderer.destroy(&mut backend);

        let scene_programs = [OPAQUE_SHADER, LIT_SHADER, GLASS_SHADER];
        assert!(!backend.destroyed_resources().iter().any(|resource| matches!(
            resource,
            GpuResource::Shader(shader) if scene_programs.contains(shader)
        )));
    }

    #[test]
    fn test_without_postprocess_draws_straight_to_window() {
        let fixture = Fixture::populated();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, RendererConfig::new()).unwrap();

        let stats = renderer.render(&mut backend, &fixture.world);
        assert!(!stats.postprocess_applied);
        assert!(!backend.calls().iter().any(|call| matches!(
            call,
            BackendCall::BindFramebuffer(FramebufferTarget::Offscreen(_)) | BackendCall::DrawArrays { .. }
        )));
    }

    #[test]
    fn test_with_postprocess_captures_then_composites() {
        let fixture = Fixture::populated();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer
            .initialize(&mut backend, SIZE, RendererConfig::new().with_postprocess("post.frag"))
            .unwrap();
        backend.clear_calls();

        renderer.render(&mut backend, &fixture.world);
        let calls = backend.calls();
        let capture = calls
            .iter()
            .position(|call| matches!(call, BackendCall::BindFramebuffer(FramebufferTarget::Offscreen(_))))
            .unwrap();
        let clear = calls.iter().position(|call| matches!(call, BackendCall::Clear(_))).unwrap();
        assert!(capture < clear);

        assert_eq!(calls.last(), Some(&BackendCall::DrawArrays { first: 0, count: 3 }));
        assert_eq!(backend.bound_framebuffer(), FramebufferTarget::Default);
        renderer.destroy(&mut backend);
    }

    #[test]
    fn test_failed_postprocess_releases_sky_too() {
        let mut backend = HeadlessBackend::new().failing_on(ResourceKind::TargetTexture);
        let mut renderer = ForwardRenderer::new();

        let result = renderer.initialize(&mut backend, SIZE, full_config());
        assert!(matches!(result, Err(RenderError::InitializationFailed(_))));
        assert!(!renderer.is_initialized());
        assert!(!renderer.has_sky());
        assert_eq!(backend.live_count(), 0);
        assert!(!backend.created_resources().is_empty());
    }

    #[test]
    fn test_failed_sky_creates_nothing_else() {
        let mut backend = HeadlessBackend::new().failing_on(ResourceKind::Sampler);
        let mut renderer = ForwardRenderer::new();

        assert!(renderer.initialize(&mut backend, SIZE, full_config()).is_err());
        assert_eq!(backend.live_count(), 0);
        assert!(!backend
            .created_resources()
            .iter()
            .any(|resource| matches!(resource, GpuResource::Framebuffer(_))));
    }

    #[test]
    fn test_reinitialize_replaces_previous_bundles() {
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer
            .initialize(&mut backend, SIZE, RendererConfig::new().with_sky("sky.png"))
            .unwrap();
        renderer
            .initialize(&mut backend, SIZE, RendererConfig::new().with_postprocess("post.frag"))
            .unwrap();

        assert!(!renderer.has_sky());
        assert!(renderer.has_postprocess());
        assert_eq!(backend.live_count(), 6);
        assert_eq!(backend.destroyed_resources().len(), 4);
        renderer.destroy(&mut backend);
        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn test_resize_rebuilds_targets_at_new_size() {
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer
            .initialize(&mut backend, SIZE, RendererConfig::new().with_postprocess("post.frag"))
            .unwrap();
        backend.clear_calls();

        renderer.resize(&mut backend, (1024, 768)).unwrap();
        assert_eq!(renderer.window_size(), (1024, 768));
        assert_eq!(backend.live_count(), 6);
        let sizes: Vec<_> = backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                BackendCall::CreateEmptyTexture { size, .. } => Some(*size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![(1024, 768), (1024, 768)]);
        renderer.destroy(&mut backend);
    }

    #[test]
    fn test_failed_resize_keeps_previous_targets() {
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer
            .initialize(&mut backend, SIZE, RendererConfig::new().with_postprocess("post.frag"))
            .unwrap();

        backend = backend.failing_on(ResourceKind::Framebuffer);
        assert!(renderer.resize(&mut backend, (320, 240)).is_err());
        assert_eq!(renderer.window_size(), SIZE);
        assert!(renderer.has_postprocess());
        assert_eq!(backend.live_count(), 6);
        renderer.destroy(&mut backend);
    }

    #[test]
    fn test_explicit_camera_selects_view() {
        let mut fixture = Fixture::populated();
        let second = fixture.world.create_entity();
        fixture
            .world
            .add_component(second, TransformComponent::from_position(Vec3::new(0.0, 0.0, -20.0)));
        fixture.world.add_component(second, CameraComponent::default());

        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, RendererConfig::new()).unwrap();
        renderer.render_with_camera(&mut backend, &fixture.world, Some(second));

        assert_eq!(
            backend.uniform(LIT_SHADER, "eye"),
            Some(UniformValue::Vec3(Vec3::new(0.0, 0.0, -20.0)))
        );
    }

    #[test]
    fn test_collector_sized_from_previous_frame() {
        let fixture = Fixture::populated();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer.initialize(&mut backend, SIZE, RendererConfig::new()).unwrap();
        assert_eq!(renderer.collector.capacity_hint(), 0);

        let stats = renderer.render(&mut backend, &fixture.world);
        assert_eq!(renderer.collector.capacity_hint(), stats.scene_draws());
        assert_eq!(renderer.collector.capacity_hint(), 5);
    }

    #[test]
    fn test_configured_shader_paths_build_the_sky_and_composite() {
        let shaders = ShaderPaths {
            textured_vertex: PathBuf::from("engine/sky.vert"),
            textured_fragment: PathBuf::from("engine/sky.frag"),
            fullscreen_vertex: PathBuf::from("engine/blit.vert"),
        };
        let mut backend = HeadlessBackend::new();
        let mut renderer = ForwardRenderer::new();
        renderer
            .initialize(&mut backend, SIZE, full_config().with_shaders(shaders))
            .unwrap();

        let vertex_stages: Vec<PathBuf> = backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                BackendCall::CreateProgram { stages, .. } => stages
                    .iter()
                    .find(|(kind, _)| *kind == ShaderStageKind::Vertex)
                    .map(|(_, path)| path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            vertex_stages,
            vec![PathBuf::from("engine/sky.vert"), PathBuf::from("engine/blit.vert")]
        );
        renderer.destroy(&mut backend);
    }
}
