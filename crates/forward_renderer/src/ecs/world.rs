//! ECS World implementation
//!
//! Entities are kept in creation order, which is the traversal order the frame
//! collector sees. Components live in one type-erased map per component type.
//! Entities may be parented to form a transform hierarchy.

use super::components::{CameraComponent, MeshRendererComponent, TransformComponent};
use super::{Component, Entity, Scene};
use crate::foundation::math::Mat4;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// ECS World containing all entities and components
pub struct World {
    next_entity_id: u32,
    entities: Vec<Entity>,
    parents: HashMap<Entity, Entity>,
    component_storages: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    component_removers: HashMap<TypeId, fn(&mut World, Entity)>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            next_entity_id: 0,
            entities: Vec::new(),
            parents: HashMap::new(),
            component_storages: HashMap::new(),
            component_removers: HashMap::new(),
        }
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.push(entity);
        entity
    }

    /// Remove an entity, its components and any parent link pointing at it.
    ///
    /// Children of the removed entity become roots.
    pub fn remove_entity(&mut self, entity: Entity) {
        self.entities.retain(|e| *e != entity);
        self.parents.remove(&entity);
        self.parents.retain(|_, parent| *parent != entity);
        let removers: Vec<fn(&mut Self, Entity)> = self.component_removers.values().copied().collect();
        for remove in removers {
            remove(self, entity);
        }
    }

    /// Check whether an entity is alive
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Add a component to an entity, replacing any previous one of the same type
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        self.component_removers
            .entry(TypeId::of::<T>())
            .or_insert(|world: &mut Self, entity: Entity| {
                world.remove_component::<T>(entity);
            });
        self.storage_mut::<T>().insert(entity, component);
    }

    /// Remove a component from an entity
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.downcast_mut::<HashMap<Entity, T>>())
            .and_then(|storage| storage.remove(&entity))
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.component_storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.downcast_ref::<HashMap<Entity, T>>())
            .and_then(|storage| storage.get(&entity))
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.downcast_mut::<HashMap<Entity, T>>())
            .and_then(|storage| storage.get_mut(&entity))
    }

    /// Attach `child` under `parent`, or detach it when `parent` is `None`.
    ///
    /// Returns `false` and leaves the hierarchy unchanged if the link would
    /// create a cycle.
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> bool {
        match parent {
            None => {
                self.parents.remove(&child);
                true
            }
            Some(parent) => {
                if self.ancestors(parent).any(|ancestor| ancestor == child) || parent == child {
                    log::warn!(
                        "Rejected parent link {} -> {}: would create a cycle",
                        child.id(),
                        parent.id()
                    );
                    return false;
                }
                self.parents.insert(child, parent);
                true
            }
        }
    }

    /// Parent of an entity, if any
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.parents.get(&entity).copied()
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Compose the local-to-world matrix by walking up the parent chain
    pub fn local_to_world_matrix(&self, entity: Entity) -> Mat4 {
        let local = self.local_matrix(entity);
        self.ancestors(entity)
            .fold(local, |matrix, ancestor| self.local_matrix(ancestor) * matrix)
    }

    fn local_matrix(&self, entity: Entity) -> Mat4 {
        self.get_component::<TransformComponent>(entity)
            .map_or_else(Mat4::identity, TransformComponent::to_matrix)
    }

    fn ancestors(&self, entity: Entity) -> impl Iterator<Item = Entity> + '_ {
        std::iter::successors(self.parent(entity), move |current| self.parent(*current))
    }

    fn storage_mut<T: Component>(&mut self) -> &mut HashMap<Entity, T> {
        self.component_storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(HashMap::<Entity, T>::new()) as Box<dyn Any + Send + Sync>)
            .downcast_mut::<HashMap<Entity, T>>()
            .expect("component storage registered under the wrong TypeId")
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for World {
    fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    fn camera(&self, entity: Entity) -> Option<&CameraComponent> {
        self.get_component::<CameraComponent>(entity)
    }

    fn mesh_renderer(&self, entity: Entity) -> Option<&MeshRendererComponent> {
        self.get_component::<MeshRendererComponent>(entity)
    }

    fn local_to_world(&self, entity: Entity) -> Mat4 {
        self.local_to_world_matrix(entity)
    }
}
