//! Mesh renderer component
//!
//! Marks an entity as drawable. Both the mesh and the material are owned
//! elsewhere (mesh by the graphics backend, material by the asset layer); the
//! component only refers to them.

use crate::ecs::Component;
use crate::render::api::MeshHandle;
use crate::render::resources::Material;
use std::sync::Arc;

/// Component for entities that are drawn by the forward renderer
#[derive(Debug, Clone)]
pub struct MeshRendererComponent {
    /// Geometry to draw
    pub mesh: MeshHandle,

    /// Material used to draw it; shared with every entity using the same look
    pub material: Arc<Material>,
}

impl Component for MeshRendererComponent {}

impl MeshRendererComponent {
    /// Create a new mesh renderer component
    pub fn new(mesh: MeshHandle, material: Arc<Material>) -> Self {
        Self { mesh, material }
    }
}
