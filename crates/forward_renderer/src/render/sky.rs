//! Sky sphere
//!
//! An equirectangular image mapped onto the inside of a unit sphere that is
//! re-centered on the camera every frame. The sphere's clip-space depth is
//! pinned to the far plane, so it sits behind everything regardless of its
//! actual size, and with a `<=` depth test it only fills pixels nothing else
//! has covered.

use crate::config::ShaderPaths;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{MeshHandle, RenderBackend, SamplerDescriptor, ShaderStage};
use crate::render::resources::{Material, OwnedResources, PipelineState};
use crate::render::systems::lighting::uniform_names;
use crate::render::RenderResult;
use std::path::Path;

/// Clip-space remap that copies `w` into `z`
///
/// After the perspective divide every vertex lands at NDC depth 1.
pub fn always_behind_transform() -> Mat4 {
    Mat4::new(
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Renderer-owned resources of the sky pass
#[derive(Debug)]
pub struct SkyBundle {
    mesh: MeshHandle,
    material: Material,
    owned: OwnedResources,
}

impl SkyBundle {
    /// Build the sphere, program, texture and sampler for `image`
    ///
    /// On failure anything already created is released before the error is
    /// returned.
    pub fn create<B>(backend: &mut B, image: &Path, shaders: &ShaderPaths, segments: (u32, u32)) -> RenderResult<Self>
    where
        B: RenderBackend + ?Sized,
    {
        log::debug!("Creating sky bundle from {}", image.display());
        let mut owned = OwnedResources::new("sky");

        let mesh = owned.acquire(backend, |b| b.create_sphere(segments))?;
        let shader = owned.acquire(backend, |b| {
            b.create_program(&[
                ShaderStage::vertex(&shaders.textured_vertex),
                ShaderStage::fragment(&shaders.textured_fragment),
            ])
        })?;
        let texture = owned.acquire(backend, |b| b.load_texture(image, false))?;
        let sampler = owned.acquire(backend, |b| b.create_sampler(&SamplerDescriptor::EQUIRECTANGULAR))?;

        let material = Material::textured(shader, texture, Some(sampler))
            .with_name("sky")
            .with_alpha_threshold(1.0)
            .with_pipeline_state(PipelineState::sky());

        Ok(Self { mesh, material, owned })
    }

    /// Material the sphere is drawn with
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Sphere model matrix: a translation to the eye
    pub fn model_matrix(eye: &Vec3) -> Mat4 {
        Mat4::new_translation(eye)
    }

    /// Full object-to-clip transform of the sphere
    pub fn transform(view_projection: &Mat4, eye: &Vec3) -> Mat4 {
        always_behind_transform() * view_projection * Self::model_matrix(eye)
    }

    /// Draw the sphere around `eye`
    pub fn draw<B>(&self, backend: &mut B, view_projection: &Mat4, eye: &Vec3)
    where
        B: RenderBackend + ?Sized,
    {
        self.material.setup(backend);
        backend.set_uniform(
            self.material.shader,
            uniform_names::TRANSFORM,
            Self::transform(view_projection, eye).into(),
        );
        backend.draw_mesh(self.mesh);
    }

    /// Release everything the bundle created
    pub fn release<B>(mut self, backend: &mut B)
    where
        B: RenderBackend + ?Sized,
    {
        log::debug!("Releasing sky bundle");
        self.owned.release_all(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::CameraComponent;
    use crate::foundation::math::{Point3, Vec4};
    use crate::render::api::{FilterMode, WrapMode};
    use crate::render::backends::headless::{BackendCall, HeadlessBackend, ResourceKind};
    use approx::assert_relative_eq;

    #[test]
    fn test_always_behind_projects_to_far_plane() {
        let camera = CameraComponent::perspective(70.0, 0.1, 20.0);
        let eye = Vec3::new(3.0, -2.0, 7.0);
        let pose = Mat4::new_translation(&eye);
        let vp = camera.view_projection_matrix(&pose, (1280, 720));
        let transform = SkyBundle::transform(&vp, &eye);

        for point in [
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(0.3, 0.2, -0.9),
            Point3::new(-0.5, 0.1, -0.8),
        ] {
            let clip = transform * point.to_homogeneous();
            assert_relative_eq!(clip.z / clip.w, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sky_transform_ignores_camera_translation() {
        let camera = CameraComponent::default();
        let near_eye = Vec3::zeros();
        let far_eye = Vec3::new(100.0, 50.0, -30.0);
        let vp_near = camera.view_projection_matrix(&Mat4::new_translation(&near_eye), (800, 600));
        let vp_far = camera.view_projection_matrix(&Mat4::new_translation(&far_eye), (800, 600));

        let direction = Vec4::new(0.2, 0.4, -1.0, 1.0);
        let a = SkyBundle::transform(&vp_near, &near_eye) * direction;
        let b = SkyBundle::transform(&vp_far, &far_eye) * direction;
        assert_relative_eq!(a, b, epsilon = 1e-3);
    }

    #[test]
    fn test_create_loads_texture_without_mipmaps() {
        let mut backend = HeadlessBackend::new();
        let bundle = SkyBundle::create(&mut backend, Path::new("sky.png"), &ShaderPaths::default(), (16, 16)).unwrap();

        assert!(backend.calls().iter().any(|call| matches!(
            call,
            BackendCall::LoadTexture { generate_mipmap: false, .. }
        )));
        assert!(backend.calls().iter().any(|call| matches!(
            call,
            BackendCall::CreateSampler { descriptor, .. }
                if descriptor.wrap_s == WrapMode::Repeat
                    && descriptor.wrap_t == WrapMode::ClampToEdge
                    && descriptor.min_filter == FilterMode::Linear
        )));
        assert!(backend
            .calls()
            .iter()
            .any(|call| matches!(call, BackendCall::CreateSphere { segments: (16, 16), .. })));
        assert_eq!(bundle.material().alpha_threshold, Some(1.0));

        bundle.release(&mut backend);
        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn test_failed_texture_load_releases_mesh_and_program() {
        let mut backend = HeadlessBackend::new().failing_on(ResourceKind::ImageTexture);
        let result = SkyBundle::create(&mut backend, Path::new("missing.png"), &ShaderPaths::default(), (16, 16));
        assert!(result.is_err());
        assert_eq!(backend.created_resources().len(), 2);
        assert_eq!(backend.live_count(), 0);
    }
}
