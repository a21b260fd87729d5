//! # Forward Renderer
//!
//! A forward rendering pipeline over a pluggable graphics backend.
//!
//! ## Features
//!
//! - **Pass Classification**: opaque, lighted and transparent buckets per frame
//! - **Painter's Ordering**: transparent geometry sorted along the camera forward axis
//! - **Multi-Light Shading**: directional, point and spot lights for lit materials
//! - **Sky Sphere**: equirectangular sky pinned behind all geometry
//! - **Post-Processing**: offscreen capture and fullscreen composite shader
//! - **Headless Backend**: records every call for tests and tooling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forward_renderer::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RendererConfig::load_from_file("config/renderer.toml")?;
//!     let mut backend = HeadlessBackend::new();
//!     let mut renderer = ForwardRenderer::new();
//!     renderer.initialize(&mut backend, (1280, 720), config)?;
//!
//!     let mut world = World::new();
//!     let camera = world.create_entity();
//!     world.add_component(camera, CameraComponent::default());
//!     world.add_component(camera, TransformComponent::from_position(Vec3::new(0.0, 1.0, 5.0)));
//!
//!     let ball = world.create_entity();
//!     let material = Arc::new(Material::new(ShaderHandle(1)).with_lighted(true));
//!     world.add_component(ball, MeshRendererComponent::new(MeshHandle(1), material));
//!
//!     let stats = renderer.render(&mut backend, &world);
//!     assert_eq!(stats.lighted_draws, 1);
//!
//!     renderer.destroy(&mut backend);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod render;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        config::{AppConfig, Config, ConfigError, RendererConfig, ShaderPaths},
        ecs::{
            components::{CameraComponent, MeshRendererComponent, Projection, TransformComponent},
            Entity, Scene, World,
        },
        foundation::math::{Mat4, Quat, Transform, Vec3, Vec4},
        render::{
            api::{MeshHandle, RenderBackend, SamplerHandle, ShaderHandle, TextureHandle},
            backends::HeadlessBackend,
            resources::{LitTextures, Material, PipelineState},
            ForwardRenderer, FrameStats, Light, LightingEnvironment, RenderError, RenderResult, SkyGradient,
        },
    };
}
