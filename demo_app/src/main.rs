//! Forward renderer demo
//!
//! Builds a small scene (a camera on an orbiting rig, a ring of lit spheres,
//! a couple of flat-colored markers and a stack of glass panes), renders it
//! for a number of frames through the headless backend, and logs what each
//! pass drew. After shutdown it checks that every renderer-owned resource was
//! released.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use forward_renderer::prelude::*;
use forward_renderer::render::api::MeshProvider;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_FRAMES: u32 = 3;
const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;
const RING_SIZE: usize = 6;
const PANE_COUNT: usize = 3;

struct DemoScene {
    world: World,
    rig: Entity,
    meshes: Vec<MeshHandle>,
}

fn main() -> Result<()> {
    let matches = Command::new("forward_demo")
        .about("Renders a demo scene with the forward renderer on the headless backend")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Application config (.toml, .ron or .json) with a `renderer` section"),
        )
        .arg(
            Arg::new("frames")
                .short('f')
                .long("frames")
                .value_name("COUNT")
                .value_parser(value_parser!(u32))
                .default_value("3")
                .help("Number of frames to render"),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .value_name("WIDTHxHEIGHT")
                .help("Window size, e.g. 1280x720"),
        )
        .arg(
            Arg::new("sky")
                .long("sky")
                .value_name("IMAGE")
                .value_parser(value_parser!(PathBuf))
                .help("Sky texture, overrides the config"),
        )
        .arg(
            Arg::new("postprocess")
                .long("postprocess")
                .value_name("SHADER")
                .value_parser(value_parser!(PathBuf))
                .help("Post-process fragment shader, overrides the config"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log every backend call of the last frame"),
        )
        .get_matches();

    forward_renderer::foundation::logging::init();

    let mut app_config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(sky) = matches.get_one::<PathBuf>("sky") {
        app_config.renderer.sky = Some(sky.clone());
    }
    if let Some(postprocess) = matches.get_one::<PathBuf>("postprocess") {
        app_config.renderer.postprocess = Some(postprocess.clone());
    }

    let window_size = match matches.get_one::<String>("size") {
        Some(size) => parse_size(size)?,
        None => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
    };
    let frames = matches.get_one::<u32>("frames").copied().unwrap_or(DEFAULT_FRAMES);

    let mut backend = HeadlessBackend::new();
    let mut renderer = ForwardRenderer::new();
    renderer
        .initialize(&mut backend, window_size, app_config.renderer)
        .context("failed to initialize the forward renderer")?;
    log::info!(
        "Renderer ready: sky {}, post-process {}",
        renderer.has_sky(),
        renderer.has_postprocess()
    );

    let mut scene = build_scene(&mut backend)?;

    for frame in 0..frames {
        orbit_camera(&mut scene, frame);
        backend.clear_calls();
        let stats = renderer.render(&mut backend, &scene.world);
        log::info!(
            "Frame {}: opaque {}, lighted {}, transparent {}, sky {}, post-process {}",
            frame,
            stats.opaque_draws,
            stats.lighted_draws,
            stats.transparent_draws,
            stats.sky_drawn,
            stats.postprocess_applied
        );
    }

    if matches.get_flag("verbose") {
        for call in backend.calls() {
            log::info!("  {:?}", call);
        }
    }

    renderer.destroy(&mut backend);
    for mesh in scene.meshes.drain(..) {
        backend.destroy_mesh(mesh);
    }

    if backend.live_count() != 0 {
        bail!("{} GPU resources leaked: {:?}", backend.live_count(), backend.live_resources());
    }
    log::info!("All resources released");
    Ok(())
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .split_once('x')
        .with_context(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    Ok((
        width.trim().parse().context("invalid width")?,
        height.trim().parse().context("invalid height")?,
    ))
}

fn build_scene(backend: &mut HeadlessBackend) -> Result<DemoScene> {
    let mut world = World::new();
    let mut meshes = Vec::new();

    let rig = world.create_entity();
    world.add_component(rig, TransformComponent::identity());
    let camera = world.create_entity();
    world.add_component(camera, CameraComponent::perspective(60.0, 0.1, 100.0));
    world.add_component(camera, TransformComponent::from_position(Vec3::new(0.0, 1.5, 8.0)));
    world.set_parent(camera, Some(rig));

    let sphere = backend.create_sphere((32, 16))?;
    meshes.push(sphere);

    // Scene-owned shader handles stand in for programs an asset layer would build
    let lit = Arc::new(Material::new(ShaderHandle(100)).with_lighted(true).with_name("lit"));
    let marker = Arc::new(
        Material::tinted(ShaderHandle(101), Vec4::new(1.0, 0.8, 0.1, 1.0))
            .with_pipeline_state(PipelineState::opaque())
            .with_name("marker"),
    );
    let glass = Arc::new(
        Material::tinted(ShaderHandle(102), Vec4::new(0.4, 0.7, 1.0, 0.35))
            .with_transparent(true)
            .with_pipeline_state(PipelineState::transparent())
            .with_name("glass"),
    );

    for index in 0..RING_SIZE {
        let angle = index as f32 / RING_SIZE as f32 * std::f32::consts::TAU;
        let entity = world.create_entity();
        world.add_component(
            entity,
            TransformComponent::from_position(Vec3::new(angle.cos() * 3.0, 0.0, angle.sin() * 3.0)),
        );
        world.add_component(entity, MeshRendererComponent::new(sphere, Arc::clone(&lit)));
    }

    for x in [-5.0, 5.0] {
        let entity = world.create_entity();
        world.add_component(
            entity,
            TransformComponent::from_position(Vec3::new(x, 2.0, 0.0)).with_uniform_scale(0.25),
        );
        world.add_component(entity, MeshRendererComponent::new(sphere, Arc::clone(&marker)));
    }

    for index in 0..PANE_COUNT {
        let entity = world.create_entity();
        world.add_component(
            entity,
            TransformComponent::from_position(Vec3::new(0.0, 0.5, index as f32 * -1.5)),
        );
        world.add_component(entity, MeshRendererComponent::new(sphere, Arc::clone(&glass)));
    }

    log::info!("Demo scene built with {} entities", world.entity_count());
    Ok(DemoScene { world, rig, meshes })
}

fn orbit_camera(scene: &mut DemoScene, frame: u32) {
    let yaw = frame as f32 * 15.0_f32.to_radians();
    if let Some(transform) = scene.world.get_component_mut::<TransformComponent>(scene.rig) {
        transform.rotation = Quat::from_axis_angle(&Vec3::y_axis(), yaw);
    }
}
