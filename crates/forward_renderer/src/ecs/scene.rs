//! Scene boundary consumed by the renderer
//!
//! The renderer never reaches into a concrete store. It walks entities in the
//! scene's natural order and asks for the two component kinds it cares about,
//! plus the composed world transform. [`World`](super::World) is the store this
//! crate ships; any other scene graph can implement the trait.

use super::components::{CameraComponent, MeshRendererComponent};
use super::Entity;
use crate::foundation::math::Mat4;

/// Read-only view of a scene as seen by the frame collector
pub trait Scene {
    /// All entities in traversal order
    fn entities(&self) -> impl Iterator<Item = Entity> + '_;

    /// Camera attached to an entity, if any
    fn camera(&self, entity: Entity) -> Option<&CameraComponent>;

    /// Mesh renderer attached to an entity, if any
    fn mesh_renderer(&self, entity: Entity) -> Option<&MeshRendererComponent>;

    /// Composed local-to-world transform of an entity
    fn local_to_world(&self, entity: Entity) -> Mat4;
}
