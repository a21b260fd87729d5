//! Lighting environment for lit materials
//!
//! Light definitions are backend-agnostic values. A [`LightingEnvironment`]
//! groups a hemispherical sky gradient with up to [`MAX_LIGHTS`] lights and
//! knows how to upload itself as named uniforms onto a lit shader program.
//!
//! ## Uniform Layout
//!
//! ```text
//! sky.top, sky.middle, sky.bottom        vec3
//! light_count                            int
//! lights[i].type                         int   (0 directional, 1 point, 2 spot)
//! lights[i].direction                    vec3  (directional, spot)
//! lights[i].position                     vec3  (point, spot)
//! lights[i].diffuse, lights[i].specular  vec3
//! lights[i].attenuation                  vec3  (point, spot)
//! lights[i].cone_angles                  vec2  (spot; inner, outer in radians)
//! ```
//!
//! Each light only sends the fields its kind reads.

use crate::foundation::math::{utils, Vec2, Vec3};
use crate::render::api::{ShaderHandle, ShaderProvider, UniformValue};
use serde::{Deserialize, Serialize};

/// Size of the `lights` array declared by the lit shader
pub const MAX_LIGHTS: usize = 8;

/// Uniform names shared by the lit shader and the renderer
pub mod uniform_names {
    /// Object-to-clip transform used by unlit passes
    pub const TRANSFORM: &str = "transform";
    /// Model (local-to-world) matrix
    pub const MODEL: &str = "M";
    /// Inverse-transpose of the model matrix, for normals
    pub const MODEL_INVERSE_TRANSPOSE: &str = "M_IT";
    /// View-projection matrix
    pub const VIEW_PROJECTION: &str = "VP";
    /// Camera position in world space
    pub const EYE: &str = "eye";
    /// Sky gradient color straight up
    pub const SKY_TOP: &str = "sky.top";
    /// Sky gradient color at the horizon
    pub const SKY_MIDDLE: &str = "sky.middle";
    /// Sky gradient color straight down
    pub const SKY_BOTTOM: &str = "sky.bottom";
    /// Number of valid entries in `lights`
    pub const LIGHT_COUNT: &str = "light_count";
    /// Material tint color
    pub const TINT: &str = "tint";
    /// Alpha-test threshold
    pub const ALPHA_THRESHOLD: &str = "alphaThreshold";

    /// Name of one field of `lights[index]`
    pub fn light_field(index: usize, field: &str) -> String {
        format!("lights[{index}].{field}")
    }
}

/// Light types, tagged with the integer the lit shader switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightType {
    /// Directional light (like sunlight)
    Directional,
    /// Point light (like a lightbulb)
    Point,
    /// Spot light (like a flashlight)
    Spot,
}

impl LightType {
    /// Integer tag uploaded as `lights[i].type`
    pub const fn shader_tag(self) -> i32 {
        match self {
            Self::Directional => 0,
            Self::Point => 1,
            Self::Spot => 2,
        }
    }
}

/// Light source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// Light position (point/spot)
    pub position: Vec3,
    /// Light direction (directional/spot)
    pub direction: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Constant, linear and quadratic attenuation (point/spot)
    pub attenuation: Vec3,
    /// Inner cone half-angle in radians (spot)
    pub inner_cone_angle: f32,
    /// Outer cone half-angle in radians (spot)
    pub outer_cone_angle: f32,
}

impl Light {
    /// Create a directional light
    pub fn directional(direction: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            light_type: LightType::Directional,
            position: Vec3::zeros(),
            direction,
            diffuse,
            specular,
            attenuation: Vec3::zeros(),
            inner_cone_angle: 0.0,
            outer_cone_angle: 0.0,
        }
    }

    /// Create a point light
    pub fn point(position: Vec3, diffuse: Vec3, specular: Vec3, attenuation: Vec3) -> Self {
        Self {
            light_type: LightType::Point,
            position,
            direction: Vec3::zeros(),
            diffuse,
            specular,
            attenuation,
            inner_cone_angle: 0.0,
            outer_cone_angle: 0.0,
        }
    }

    /// Create a spot light
    ///
    /// Cone angles are half-angles in radians; the falloff runs from
    /// `inner_cone_angle` to `outer_cone_angle`.
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        diffuse: Vec3,
        specular: Vec3,
        attenuation: Vec3,
        inner_cone_angle: f32,
        outer_cone_angle: f32,
    ) -> Self {
        Self {
            light_type: LightType::Spot,
            position,
            direction,
            diffuse,
            specular,
            attenuation,
            inner_cone_angle,
            outer_cone_angle,
        }
    }

    /// Cone angles packed as `(inner, outer)`
    pub fn cone_angles(&self) -> Vec2 {
        Vec2::new(self.inner_cone_angle, self.outer_cone_angle)
    }

    fn upload<B>(&self, backend: &mut B, shader: ShaderHandle, index: usize)
    where
        B: ShaderProvider + ?Sized,
    {
        let mut set = |field: &str, value: UniformValue| {
            backend.set_uniform(shader, &uniform_names::light_field(index, field), value);
        };

        set("type", self.light_type.shader_tag().into());
        set("diffuse", self.diffuse.into());
        set("specular", self.specular.into());

        match self.light_type {
            LightType::Directional => {
                set("direction", self.direction.into());
            }
            LightType::Point => {
                set("position", self.position.into());
                set("attenuation", self.attenuation.into());
            }
            LightType::Spot => {
                set("position", self.position.into());
                set("direction", self.direction.into());
                set("attenuation", self.attenuation.into());
                set("cone_angles", self.cone_angles().into());
            }
        }
    }
}

/// Three-band hemispherical ambient term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyGradient {
    /// Color seen looking straight up
    pub top: Vec3,
    /// Color at the horizon
    pub middle: Vec3,
    /// Color seen looking straight down
    pub bottom: Vec3,
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            top: Vec3::new(0.3, 0.6, 1.0),
            middle: Vec3::new(0.3, 0.3, 0.3),
            bottom: Vec3::new(0.1, 0.1, 0.0),
        }
    }
}

/// Lighting environment containing the sky gradient and the light list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingEnvironment {
    /// Ambient gradient
    pub sky: SkyGradient,
    lights: Vec<Light>,
}

impl LightingEnvironment {
    /// Create an environment with the given gradient and no lights
    pub fn new(sky: SkyGradient) -> Self {
        Self {
            sky,
            lights: Vec::new(),
        }
    }

    /// Add a light to the environment
    ///
    /// Lights past [`MAX_LIGHTS`] are dropped with a warning, since the lit
    /// shader could never read them.
    pub fn with_light(mut self, light: Light) -> Self {
        if self.lights.len() < MAX_LIGHTS {
            self.lights.push(light);
        } else {
            log::warn!(
                "Lighting environment already holds {} lights, dropping {:?} light",
                MAX_LIGHTS,
                light.light_type
            );
        }
        self
    }

    /// Builder pattern: replace the sky gradient
    pub fn with_sky(mut self, sky: SkyGradient) -> Self {
        self.sky = sky;
        self
    }

    /// Lights in upload order
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Number of lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Upload the gradient, the light count and every light to `shader`
    pub fn upload<B>(&self, backend: &mut B, shader: ShaderHandle)
    where
        B: ShaderProvider + ?Sized,
    {
        backend.set_uniform(shader, uniform_names::SKY_TOP, self.sky.top.into());
        backend.set_uniform(shader, uniform_names::SKY_MIDDLE, self.sky.middle.into());
        backend.set_uniform(shader, uniform_names::SKY_BOTTOM, self.sky.bottom.into());

        // Bounded by MAX_LIGHTS
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let count = self.lights.len() as i32;
        backend.set_uniform(shader, uniform_names::LIGHT_COUNT, count.into());

        for (index, light) in self.lights.iter().enumerate() {
            light.upload(backend, shader, index);
        }
    }
}

impl Default for LightingEnvironment {
    /// Warm directional key, a point light above the origin, and a spot
    /// light aimed back along -X
    fn default() -> Self {
        let warm = Vec3::new(1.0, 0.2, 0.1);
        let spot_color = Vec3::new(1.0, 0.9, 0.7);
        let unattenuated = Vec3::new(1.0, 0.0, 0.0);

        Self::new(SkyGradient::default())
            .with_light(Light::directional(Vec3::new(1.0, 0.0, 0.0), warm, warm))
            .with_light(Light::point(Vec3::new(0.0, 1.5, 0.0), warm, warm, unattenuated))
            .with_light(Light::spot(
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
                spot_color,
                spot_color,
                unattenuated,
                utils::deg_to_rad(10.0),
                utils::deg_to_rad(11.0),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::headless::HeadlessBackend;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_environment_is_the_fixed_triple() {
        let env = LightingEnvironment::default();
        let kinds: Vec<_> = env.lights().iter().map(|light| light.light_type).collect();
        assert_eq!(kinds, vec![LightType::Directional, LightType::Point, LightType::Spot]);
        assert_relative_eq!(env.sky.top, Vec3::new(0.3, 0.6, 1.0));

        let spot = &env.lights()[2];
        assert_relative_eq!(spot.inner_cone_angle, 10.0_f32.to_radians(), epsilon = 1e-6);
        assert_relative_eq!(spot.outer_cone_angle, 11.0_f32.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn test_lights_past_capacity_are_dropped() {
        let mut env = LightingEnvironment::new(SkyGradient::default());
        for _ in 0..MAX_LIGHTS + 3 {
            env = env.with_light(Light::directional(Vec3::y(), Vec3::x(), Vec3::x()));
        }
        assert_eq!(env.light_count(), MAX_LIGHTS);
    }

    #[test]
    fn test_upload_sends_only_fields_of_each_kind() {
        let mut backend = HeadlessBackend::new();
        let shader = ShaderHandle(7);
        LightingEnvironment::default().upload(&mut backend, shader);

        assert_eq!(backend.uniform(shader, "light_count"), Some(UniformValue::Int(3)));
        assert_eq!(backend.uniform(shader, "lights[0].type"), Some(UniformValue::Int(0)));
        assert_eq!(backend.uniform(shader, "lights[1].type"), Some(UniformValue::Int(1)));
        assert_eq!(backend.uniform(shader, "lights[2].type"), Some(UniformValue::Int(2)));

        assert!(backend.uniform(shader, "lights[0].position").is_none());
        assert!(backend.uniform(shader, "lights[0].attenuation").is_none());
        assert!(backend.uniform(shader, "lights[1].direction").is_none());
        assert!(backend.uniform(shader, "lights[1].cone_angles").is_none());
        assert!(backend.uniform(shader, "lights[2].cone_angles").is_some());

        assert_eq!(
            backend.uniform(shader, "sky.bottom"),
            Some(UniformValue::Vec3(Vec3::new(0.1, 0.1, 0.0)))
        );
    }
}
