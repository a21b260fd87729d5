//! # Render Queue System
//!
//! Per-frame buckets of render commands, one per pass class.
//!
//! ## Architecture
//!
//! - **RenderCommand**: one drawable for one frame (transform, sort center,
//!   mesh, borrowed material)
//! - **CommandType**: the bucket a material belongs to
//! - **RenderQueue**: the three buckets, with the transparent bucket sorted
//!   by ascending projection on the camera forward axis
//!
//! Commands borrow their material from the scene, so a queue cannot outlive
//! the frame it was collected for.

use crate::ecs::Entity;
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::render::api::MeshHandle;
use crate::render::resources::Material;

/// Pass class of a render command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Unlit, non-blended geometry drawn first
    Opaque,
    /// Geometry shaded with the lighting environment
    Lighted,
    /// Blended geometry drawn in painter's order after the sky
    Transparent,
}

impl CommandType {
    /// Bucket for a material
    ///
    /// Transparency wins over lighting: a transparent lit material goes to
    /// the transparent bucket and is drawn without light uniforms.
    pub fn classify(material: &Material) -> Self {
        if material.transparent {
            Self::Transparent
        } else if material.lighted {
            Self::Lighted
        } else {
            Self::Opaque
        }
    }
}

/// Individual render command containing all data needed to draw an object
#[derive(Debug, Clone, Copy)]
pub struct RenderCommand<'a> {
    /// Entity the command was collected from
    pub entity: Entity,

    /// World transform matrix
    pub local_to_world: Mat4,

    /// World position of the local origin, used only for sorting
    pub center: Vec3,

    /// Geometry to draw
    pub mesh: MeshHandle,

    /// Material to draw with
    pub material: &'a Material,
}

impl<'a> RenderCommand<'a> {
    /// Create a command; the sort center is taken from the matrix
    pub fn new(entity: Entity, local_to_world: Mat4, mesh: MeshHandle, material: &'a Material) -> Self {
        Self {
            entity,
            local_to_world,
            center: utils::origin_of(&local_to_world),
            mesh,
            material,
        }
    }

    /// Bucket this command belongs to
    pub fn command_type(&self) -> CommandType {
        CommandType::classify(self.material)
    }

    /// Painter's-order key: projection of the center on the camera's
    /// forward axis
    ///
    /// Commands with a smaller key are drawn first.
    pub fn depth_key(&self, camera_forward: &Vec3) -> f32 {
        self.center.dot(camera_forward)
    }
}

/// The three per-frame buckets
#[derive(Debug, Default)]
pub struct RenderQueue<'a> {
    opaque_commands: Vec<RenderCommand<'a>>,
    lighted_commands: Vec<RenderCommand<'a>>,
    transparent_commands: Vec<RenderCommand<'a>>,
}

impl<'a> RenderQueue<'a> {
    /// Create a new empty render queue
    pub fn new() -> Self {
        Self {
            opaque_commands: Vec::new(),
            lighted_commands: Vec::new(),
            transparent_commands: Vec::new(),
        }
    }

    /// Create a render queue with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            opaque_commands: Vec::with_capacity(capacity),
            lighted_commands: Vec::with_capacity(capacity),
            transparent_commands: Vec::with_capacity(capacity / 4),
        }
    }

    /// Add a render command to the bucket its material selects
    pub fn add_command(&mut self, command: RenderCommand<'a>) -> CommandType {
        let command_type = command.command_type();
        match command_type {
            CommandType::Opaque => self.opaque_commands.push(command),
            CommandType::Lighted => self.lighted_commands.push(command),
            CommandType::Transparent => self.transparent_commands.push(command),
        }
        command_type
    }

    /// Sort the transparent bucket for a camera looking along
    /// `camera_forward` (world space)
    ///
    /// Ascending by the forward-axis projection ([`RenderCommand::depth_key`]);
    /// ties keep no particular order. Opaque and lighted buckets keep traversal order.
    pub fn sort_transparent(&mut self, camera_forward: &Vec3) {
        self.transparent_commands
            .sort_unstable_by(|a, b| a.depth_key(camera_forward).total_cmp(&b.depth_key(camera_forward)));
    }

    /// Opaque commands in traversal order
    pub fn opaque_commands(&self) -> &[RenderCommand<'a>] {
        &self.opaque_commands
    }

    /// Lighted commands in traversal order
    pub fn lighted_commands(&self) -> &[RenderCommand<'a>] {
        &self.lighted_commands
    }

    /// Transparent commands, ascending forward projection once sorted
    pub fn transparent_commands(&self) -> &[RenderCommand<'a>] {
        &self.transparent_commands
    }

    /// Get total number of commands
    pub fn command_count(&self) -> usize {
        self.opaque_commands.len() + self.lighted_commands.len() + self.transparent_commands.len()
    }

    /// Clear all commands, keeping capacity
    pub fn clear(&mut self) {
        self.opaque_commands.clear();
        self.lighted_commands.clear();
        self.transparent_commands.clear();
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.command_count() == 0
    }
}
