use anyhow::Result;
use glam::{Mat4, Vec3, Vec4};
use merlin_render::camera::Camera3D;
use merlin_render::cli::CliOverrides;
use merlin_render::environment::{self, EnvironmentMaps};
use merlin_render::lights::{DirectionalLight, PointLight, SceneLights};
use merlin_render::material::{Material, MaterialArray};
use merlin_render::mesh::Mesh;
use merlin_render::renderer::{DeferredRenderer, DrawParams, RenderTarget};

fn main() {
    env_logger::init();
    let overrides = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(overrides) {
        eprintln!("Render error: {err:?}");
        std::process::exit(1);
    }
}

fn run(overrides: CliOverrides) -> Result<()> {
    let settings = overrides.into_settings()?;

    let panorama = match settings.panorama.as_deref() {
        Some(path) => environment::load_panorama(path)?,
        None => environment::generated_default(),
    };
    log::info!("building environment maps ({}^2 cube, {}^2 irradiance)", settings.cubemap_size, settings.irradiance_size);
    let maps = EnvironmentMaps::from_panorama(&panorama, settings.cubemap_size, settings.irradiance_size);

    let mut materials = MaterialArray::new();
    let floor = materials.push(Material::solid_color(Vec3::new(0.6, 0.6, 0.62), 0.0, 0.9));
    let clay = materials.push(Material::solid_color(Vec3::new(0.8, 0.3, 0.25), 0.0, 0.6));
    let steel = materials.push(Material::solid_color(Vec3::new(0.9, 0.9, 0.95), 1.0, 0.25));
    let brass = materials.push(Material::solid_color(Vec3::new(0.95, 0.75, 0.3), 1.0, 0.45));

    let mut lights = SceneLights::new();
    lights.directional.push(DirectionalLight::new(
        Vec3::new(-0.4, -1.0, -0.3).normalize(),
        Vec4::new(0.25, 0.24, 0.22, 1.0),
    ));
    lights.point.push(PointLight::new(Vec3::new(2.5, 3.0, 2.0), Vec4::new(18.0, 17.0, 16.0, 1.0)));
    lights.point.push(PointLight::new(Vec3::new(-3.0, 2.0, 1.0), Vec4::new(4.0, 5.0, 8.0, 1.0)));

    let camera = Camera3D::new(Vec3::new(4.0, 2.5, 5.0), Vec3::new(0.0, 0.5, 0.0), 55f32.to_radians(), 0.1, 100.0);
    let camera_info = camera.info(settings.width, settings.height);

    let plane = Mesh::plane(20.0);
    let cube = Mesh::cube(1.0);

    let mut renderer = DeferredRenderer::new(settings.width, settings.height);
    renderer.begin_frame();
    renderer.draw(&plane, &DrawParams::from_model(Mat4::IDENTITY, floor), &materials, &camera_info);
    renderer.draw(
        &cube,
        &DrawParams::from_model(Mat4::from_translation(Vec3::new(-1.2, 0.5, 0.0)), clay),
        &materials,
        &camera_info,
    );
    renderer.draw(
        &cube,
        &DrawParams::from_model(
            Mat4::from_rotation_translation(
                glam::Quat::from_rotation_y(0.6),
                Vec3::new(0.4, 0.5, -0.8),
            ),
            steel,
        ),
        &materials,
        &camera_info,
    );
    renderer.draw(
        &cube,
        &DrawParams::from_model(
            Mat4::from_scale_rotation_translation(
                Vec3::splat(0.7),
                glam::Quat::from_rotation_y(-0.3),
                Vec3::new(1.6, 0.35, 1.0),
            ),
            brass,
        ),
        &materials,
        &camera_info,
    );

    let mut target = RenderTarget::new(settings.width, settings.height);
    renderer.resolve(&camera_info, &lights, Some(&maps.irradiance), &mut target);
    target.save_png(&settings.output)?;
    log::info!("wrote {}", settings.output);
    Ok(())
}
