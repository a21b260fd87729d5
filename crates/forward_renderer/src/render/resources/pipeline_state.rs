//! Pipeline state descriptors
//!
//! A [`PipelineState`] is a plain value describing face culling, depth testing,
//! blending and write masks. It is never mutated incrementally: binding a
//! material hands the whole value to the backend, so the state a draw sees
//! does not depend on which material was bound before it.

use crate::foundation::math::Vec4;
use serde::{Deserialize, Serialize};

/// Which faces are discarded when culling is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CullFace {
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
    /// Cull everything
    FrontAndBack,
}

/// Winding order of front-facing triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrontFace {
    /// Counter-clockwise winding is front-facing
    CounterClockwise,
    /// Clockwise winding is front-facing
    Clockwise,
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunction {
    /// Never pass
    Never,
    /// Pass if nearer
    Less,
    /// Pass if equal
    Equal,
    /// Pass if nearer or equal
    LessEqual,
    /// Pass if farther
    Greater,
    /// Pass if different
    NotEqual,
    /// Pass if farther or equal
    GreaterEqual,
    /// Always pass
    Always,
}

/// Blend equation combining source and destination terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendEquation {
    /// `src + dst`
    Add,
    /// `src - dst`
    Subtract,
    /// `dst - src`
    ReverseSubtract,
    /// `min(src, dst)`
    Min,
    /// `max(src, dst)`
    Max,
}

/// Blend factor applied to a source or destination term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

/// Face culling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceCulling {
    /// Enable culling
    pub enabled: bool,
    /// Faces to discard
    pub culled_face: CullFace,
    /// Winding considered front-facing
    pub front_face: FrontFace,
}

impl Default for FaceCulling {
    fn default() -> Self {
        Self {
            enabled: false,
            culled_face: CullFace::Back,
            front_face: FrontFace::CounterClockwise,
        }
    }
}

/// Depth test configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthTesting {
    /// Enable depth testing
    pub enabled: bool,
    /// Comparison against the stored depth
    pub function: CompareFunction,
}

impl Default for DepthTesting {
    fn default() -> Self {
        Self {
            enabled: false,
            function: CompareFunction::LessEqual,
        }
    }
}

/// Blending configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blending {
    /// Enable blending
    pub enabled: bool,
    /// Blend equation
    pub equation: BlendEquation,
    /// Factor applied to the incoming fragment
    pub source_factor: BlendFactor,
    /// Factor applied to the stored color
    pub destination_factor: BlendFactor,
    /// Constant color for the constant-color factors
    pub constant_color: Vec4,
}

impl Default for Blending {
    fn default() -> Self {
        Self {
            enabled: false,
            equation: BlendEquation::Add,
            source_factor: BlendFactor::SrcAlpha,
            destination_factor: BlendFactor::OneMinusSrcAlpha,
            constant_color: Vec4::zeros(),
        }
    }
}

/// Complete fixed-function state for one material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineState {
    /// Face culling
    pub face_culling: FaceCulling,
    /// Depth test
    pub depth_testing: DepthTesting,
    /// Blending
    pub blending: Blending,
    /// Per-channel color write mask (RGBA)
    pub color_mask: [bool; 4],
    /// Depth write mask
    pub depth_mask: bool,
}

impl Default for PipelineState {
    /// Everything disabled, all writes enabled
    fn default() -> Self {
        Self {
            face_culling: FaceCulling::default(),
            depth_testing: DepthTesting::default(),
            blending: Blending::default(),
            color_mask: [true; 4],
            depth_mask: true,
        }
    }
}

impl PipelineState {
    /// Solid geometry: back-face culling, depth test `<=`, depth writes
    pub fn opaque() -> Self {
        Self {
            face_culling: FaceCulling {
                enabled: true,
                ..FaceCulling::default()
            },
            depth_testing: DepthTesting {
                enabled: true,
                function: CompareFunction::LessEqual,
            },
            ..Self::default()
        }
    }

    /// Alpha-blended geometry: depth tested but not written, no culling
    pub fn transparent() -> Self {
        Self {
            depth_testing: DepthTesting {
                enabled: true,
                function: CompareFunction::LessEqual,
            },
            blending: Blending {
                enabled: true,
                ..Blending::default()
            },
            depth_mask: false,
            ..Self::default()
        }
    }

    /// Inside of the sky sphere: front faces culled, depth test `<=`
    pub fn sky() -> Self {
        Self {
            face_culling: FaceCulling {
                enabled: true,
                culled_face: CullFace::Front,
                front_face: FrontFace::CounterClockwise,
            },
            depth_testing: DepthTesting {
                enabled: true,
                function: CompareFunction::LessEqual,
            },
            ..Self::default()
        }
    }

    /// Fullscreen composite: no depth interaction at all
    pub fn fullscreen() -> Self {
        Self::default().with_depth_mask(false)
    }

    /// Builder pattern: replace the depth write mask
    pub fn with_depth_mask(mut self, depth_mask: bool) -> Self {
        self.depth_mask = depth_mask;
        self
    }
}
