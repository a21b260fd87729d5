//! ECS Components module
//!
//! Contains the components the forward renderer reads

pub mod camera;
pub mod mesh_renderer;
pub mod transform;

pub use camera::{CameraComponent, Projection};
pub use mesh_renderer::MeshRendererComponent;
pub use transform::TransformComponent;
