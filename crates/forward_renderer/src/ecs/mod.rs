//! Entity-Component-System implementation
//!
//! Provides the scene store the renderer collects from: entities, a typed
//! component map, a parent hierarchy for world transforms, and the [`Scene`]
//! trait that is the renderer's only view of it.

pub mod component;
pub mod components;
pub mod entity;
pub mod scene;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use scene::Scene;
pub use world::World;

