//! Museum room demo
//!
//! Builds the museum scene, configures directional and point shadows from a
//! renderer config, and renders a short camera fly-by on the headless backend.
//! Frame statistics are logged so the pass sequence can be inspected without a
//! GPU.
//!
//! Usage: `museum [config.toml|config.ron]`

mod scene;

use std::rc::Rc;

use lumen_engine::config::{Config, RendererConfig};
use lumen_engine::foundation::logging;
use lumen_engine::foundation::math::Vec3;
use lumen_engine::render::{CameraView, GraphicsContext, HeadlessContext, RenderPipeline, Viewport};

use scene::MuseumScene;

const DEFAULT_CONFIG: &str = "museum_app/museum.toml";
const FLY_BY_FRAMES: usize = 4;

fn load_config() -> Result<RendererConfig, Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => RendererConfig::load_from_file(&path)?,
        None if std::path::Path::new(DEFAULT_CONFIG).exists() => {
            RendererConfig::load_from_file(DEFAULT_CONFIG)?
        }
        None => RendererConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init(config.log_filter());
    log::info!("Starting museum demo with {:?}", config);

    let (width, height) = (config.window.width, config.window.height);
    let headless = Rc::new(HeadlessContext::new(Viewport::from_size(width, height)));
    let lit_shader = headless.create_program("lit");
    let shadow_shader = headless.create_program("shadow_depth");
    let point_shadow_shader = headless.create_program("point_shadow_depth");

    let scene = MuseumScene::build(&headless);
    let ctx: Rc<dyn GraphicsContext> = headless.clone();
    let mut pipeline = RenderPipeline::new(ctx, lit_shader, width, height);

    // Failures are logged by the pipeline; the demo keeps going unshadowed
    let dir = &config.directional_shadow;
    if dir.enabled {
        let _ = pipeline.configure_directional_shadow(shadow_shader, dir.width, dir.height);
    }
    let point = &config.point_shadows;
    if point.enabled {
        let _ = pipeline.configure_point_shadows(point_shadow_shader, point.size, point.far_plane);
    }
    log::info!("Pipeline state: {:?}", pipeline.state());

    for item in &scene.items {
        match item.texture {
            Some(texture) => pipeline.add_textured_object(
                &item.geometry,
                item.transform,
                item.material,
                item.color,
                texture,
            ),
            None => pipeline.add_object(&item.geometry, item.transform, item.material, item.color),
        }
    }
    for light in &scene.lights {
        pipeline.add_light(*light);
    }

    let aspect = CameraView::aspect(width, height);
    let target = Vec3::new(0.0, 2.0, 0.0);
    for frame in 0..FLY_BY_FRAMES {
        if frame == FLY_BY_FRAMES / 2 {
            log::info!("Switching on gallery lights");
            for light in MuseumScene::gallery_lights() {
                pipeline.add_light(light);
            }
        }

        let angle = frame as f32 * 0.25;
        let eye = Vec3::new(8.0 * angle.sin(), 2.0, 8.0 * angle.cos());
        pipeline.set_camera(CameraView::look_at(eye, target, 45.0, aspect, 0.1, 1000.0));

        headless.reset_frame_log();
        pipeline.render();

        let stats = pipeline.last_frame();
        log::info!(
            "Frame {}: {:?} path, {} draws ({} recorded), {} point shadows, {} lights",
            frame,
            stats.path,
            stats.draw_submissions,
            headless.draw_count(),
            stats.point_shadows,
            stats.lights_uploaded
        );
    }

    drop(pipeline);
    log::info!(
        "Shut down with {} live textures and {} live framebuffers",
        headless.live_depth_textures(),
        headless.live_framebuffers()
    );
    Ok(())
}
