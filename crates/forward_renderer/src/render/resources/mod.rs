//! Renderer resources
//!
//! Materials and their pipeline state, plus the scoped ownership list used
//! for the GPU objects the renderer creates itself.

pub mod material;
pub mod owned;
pub mod pipeline_state;

pub use material::{LitTextures, Material, TextureBinding};
pub use owned::{GpuResource, OwnedResources};
pub use pipeline_state::{
    BlendEquation, BlendFactor, Blending, CompareFunction, CullFace, DepthTesting, FaceCulling, FrontFace,
    PipelineState,
};
