//! # Frame Collector
//!
//! Walks a [`Scene`] once per frame and produces the active camera together
//! with freshly built render buckets. Renderables are collected whether or not
//! a camera exists; deciding what to do without one is the renderer's job.

use crate::ecs::components::CameraComponent;
use crate::ecs::{Entity, Scene};
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::render::render_queue::{RenderCommand, RenderQueue};

/// The camera a frame is rendered from, resolved to world space
#[derive(Debug, Clone, Copy)]
pub struct ActiveCamera<'a> {
    /// Entity owning the camera
    pub entity: Entity,
    /// Projection parameters
    pub camera: &'a CameraComponent,
    /// Camera pose
    pub local_to_world: Mat4,
}

impl ActiveCamera<'_> {
    /// Camera position in world space
    pub fn eye(&self) -> Vec3 {
        utils::origin_of(&self.local_to_world)
    }

    /// World-space viewing direction, normalized
    pub fn forward(&self) -> Vec3 {
        CameraComponent::forward(&self.local_to_world)
    }

    /// `P * V` for a viewport of `viewport_size` pixels
    pub fn view_projection(&self, viewport_size: (u32, u32)) -> Mat4 {
        self.camera
            .view_projection_matrix(&self.local_to_world, viewport_size)
    }
}

/// Output of one collection
#[derive(Debug)]
pub struct CollectedFrame<'a> {
    /// Camera to render from, `None` when the scene has none
    pub camera: Option<ActiveCamera<'a>>,
    /// Renderables bucketed by pass
    pub queue: RenderQueue<'a>,
}

/// System that gathers cameras and renderables from a scene
#[derive(Debug, Clone, Default)]
pub struct FrameCollector {
    capacity_hint: usize,
}

impl FrameCollector {
    /// Create a new frame collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the buckets of the next collection for roughly `capacity`
    /// renderables
    pub fn set_capacity_hint(&mut self, capacity: usize) {
        self.capacity_hint = capacity;
    }

    /// Renderables the next collection is pre-sized for
    pub fn capacity_hint(&self) -> usize {
        self.capacity_hint
    }

    /// Collect using the first camera in traversal order
    pub fn collect<'s, S: Scene>(&self, scene: &'s S) -> CollectedFrame<'s> {
        self.collect_with_camera(scene, None)
    }

    /// Collect using `camera_entity` when given, otherwise the first camera
    /// in traversal order
    ///
    /// An explicit entity without a camera component yields no camera.
    pub fn collect_with_camera<'s, S: Scene>(&self, scene: &'s S, camera_entity: Option<Entity>) -> CollectedFrame<'s> {
        let mut queue = RenderQueue::with_capacity(self.capacity_hint);
        let mut camera = camera_entity.and_then(|entity| {
            let resolved = Self::resolve_camera(scene, entity);
            if resolved.is_none() {
                log::warn!("Entity {:?} has no camera component", entity);
            }
            resolved
        });
        let search_camera = camera_entity.is_none();

        for entity in scene.entities() {
            if search_camera && camera.is_none() {
                camera = Self::resolve_camera(scene, entity);
            }

            if let Some(renderer) = scene.mesh_renderer(entity) {
                queue.add_command(RenderCommand::new(
                    entity,
                    scene.local_to_world(entity),
                    renderer.mesh,
                    renderer.material.as_ref(),
                ));
            }
        }

        log::trace!(
            "Collected {} renderables, camera: {:?}",
            queue.command_count(),
            camera.map(|c| c.entity)
        );

        CollectedFrame { camera, queue }
    }

    fn resolve_camera<S: Scene>(scene: &S, entity: Entity) -> Option<ActiveCamera<'_>> {
        scene.camera(entity).map(|camera| ActiveCamera {
            entity,
            camera,
            local_to_world: scene.local_to_world(entity),
        })
    }
}

/// First entity carrying a camera, in traversal order
pub fn find_first_camera<S: Scene>(scene: &S) -> Option<Entity> {
    scene.entities().find(|&entity| scene.camera(entity).is_some())
}
