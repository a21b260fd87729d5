//! Materials
//!
//! A [`Material`] bundles a shader program, the textures it samples, and the
//! pipeline state it draws with. Materials belong to the scene or asset layer
//! and are shared between entities through `Arc`; the renderer only borrows
//! them for the duration of a frame.
//!
//! Classification into render passes depends only on the `transparent` and
//! `lighted` flags.

use crate::foundation::math::Vec4;
use crate::render::api::{GraphicsContext, SamplerHandle, ShaderHandle, ShaderProvider, TextureHandle};
use crate::render::resources::PipelineState;
use crate::render::systems::lighting::uniform_names;

/// One texture sampled by a material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBinding {
    /// Name of the sampler uniform in the shader
    pub uniform: String,
    /// Texture bound to the unit
    pub texture: TextureHandle,
    /// Sampler object; `None` keeps the texture's own sampling state
    pub sampler: Option<SamplerHandle>,
}

impl TextureBinding {
    /// Create a binding for `uniform`
    pub fn new(uniform: impl Into<String>, texture: TextureHandle, sampler: Option<SamplerHandle>) -> Self {
        Self {
            uniform: uniform.into(),
            texture,
            sampler,
        }
    }
}

/// Texture maps of a lit material
///
/// Each map is bound as `material.<map>` on consecutive texture units in
/// field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LitTextures {
    /// Base color
    pub albedo: TextureHandle,
    /// Specular color
    pub specular: TextureHandle,
    /// Roughness
    pub roughness: TextureHandle,
    /// Ambient occlusion
    pub ambient_occlusion: TextureHandle,
    /// Emission
    pub emissive: TextureHandle,
}

/// Shader, textures, flags and fixed-function state used to draw a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Debug name
    pub name: String,
    /// Shader program
    pub shader: ShaderHandle,
    /// State applied before every draw with this material
    pub pipeline_state: PipelineState,
    /// Drawn in the sorted transparent pass
    pub transparent: bool,
    /// Drawn in the lit pass with the lighting environment
    pub lighted: bool,
    /// Uploaded as `tint` when set
    pub tint: Option<Vec4>,
    /// Uploaded as `alphaThreshold` when set
    pub alpha_threshold: Option<f32>,
    /// Textures in unit order
    pub textures: Vec<TextureBinding>,
}

impl Material {
    /// Untextured, unlit, opaque material with default pipeline state
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            name: String::from("material"),
            shader,
            pipeline_state: PipelineState::default(),
            transparent: false,
            lighted: false,
            tint: None,
            alpha_threshold: None,
            textures: Vec::new(),
        }
    }

    /// Flat-color material
    pub fn tinted(shader: ShaderHandle, tint: Vec4) -> Self {
        Self::new(shader).with_tint(tint)
    }

    /// Single-texture material sampled through the `tex` uniform
    ///
    /// White tint and a zero alpha threshold, so nothing is discarded until
    /// the caller raises it.
    pub fn textured(shader: ShaderHandle, texture: TextureHandle, sampler: Option<SamplerHandle>) -> Self {
        Self::new(shader)
            .with_tint(Vec4::new(1.0, 1.0, 1.0, 1.0))
            .with_alpha_threshold(0.0)
            .with_texture(TextureBinding::new("tex", texture, sampler))
    }

    /// Lit material drawn in the lighted pass with its five maps
    pub fn lit(shader: ShaderHandle, maps: LitTextures, sampler: Option<SamplerHandle>) -> Self {
        let mut material = Self::new(shader).with_lighted(true);
        for (map, texture) in [
            ("albedo", maps.albedo),
            ("specular", maps.specular),
            ("roughness", maps.roughness),
            ("ambient_occlusion", maps.ambient_occlusion),
            ("emissive", maps.emissive),
        ] {
            material = material.with_texture(TextureBinding::new(format!("material.{map}"), texture, sampler));
        }
        material
    }

    /// Builder pattern: set the debug name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder pattern: set the pipeline state
    pub fn with_pipeline_state(mut self, pipeline_state: PipelineState) -> Self {
        self.pipeline_state = pipeline_state;
        self
    }

    /// Builder pattern: mark as transparent
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Builder pattern: mark as lit
    pub fn with_lighted(mut self, lighted: bool) -> Self {
        self.lighted = lighted;
        self
    }

    /// Builder pattern: set the tint
    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.tint = Some(tint);
        self
    }

    /// Builder pattern: set the alpha threshold
    pub fn with_alpha_threshold(mut self, threshold: f32) -> Self {
        self.alpha_threshold = Some(threshold);
        self
    }

    /// Builder pattern: append a texture on the next free unit
    pub fn with_texture(mut self, binding: TextureBinding) -> Self {
        self.textures.push(binding);
        self
    }

    /// Make this material current on the backend
    ///
    /// Applies the pipeline state, activates the program, uploads `tint` and
    /// `alphaThreshold` when present, then binds texture `i` to unit `i` and
    /// points its sampler uniform at that unit.
    pub fn setup<B>(&self, backend: &mut B)
    where
        B: GraphicsContext + ShaderProvider + ?Sized,
    {
        backend.apply_pipeline_state(&self.pipeline_state);
        backend.use_program(self.shader);

        if let Some(tint) = self.tint {
            backend.set_uniform(self.shader, uniform_names::TINT, tint.into());
        }
        if let Some(threshold) = self.alpha_threshold {
            backend.set_uniform(self.shader, uniform_names::ALPHA_THRESHOLD, threshold.into());
        }

        for (unit, binding) in (0u32..).zip(&self.textures) {
            backend.bind_texture(unit, binding.texture, binding.sampler);
            let sampler_unit = i32::try_from(unit).unwrap_or(i32::MAX);
            backend.set_uniform(self.shader, &binding.uniform, sampler_unit.into());
        }
    }
}
