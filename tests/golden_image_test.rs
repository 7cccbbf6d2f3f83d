#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
fn render(scene: &sphere_shell::scene::Scene, config: &sphere_shell::SceneConfig) -> image::RgbaImage {
    use sphere_shell::context::Renderer;

    use crate::common::test_utils::default_camera;

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let camera = default_camera(128, 128);
        let mut renderer = Renderer::headless([128, 128], config, &camera, &scene.lights)
            .await
            .unwrap();
        renderer.render_to_image(scene, &camera).await.unwrap()
    })
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour_for_empty_scene() {
    use sphere_shell::{SceneConfig, light::LightSet, scene::Scene};

    let config = SceneConfig {
        clear_colour: wgpu::Color::WHITE,
        ..Default::default()
    };
    let scene = Scene::new(LightSet {
        hemisphere: config.hemisphere,
        directional: config.directional,
    });

    let image = render(&scene, &config);

    for pixel in image.pixels() {
        assert_eq!(*pixel, image::Rgba([255, 255, 255, 255]));
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_shade_sphere_in_front_of_camera() {
    use sphere_shell::{
        SceneConfig,
        data_structures::{
            geometry::make_sphere_geometry, instance::Instance, instanced_mesh::InstancedMesh,
            material::make_glossy_material,
        },
        light::LightSet,
        scene::Scene,
    };

    let config = SceneConfig::default();
    let mut scene = Scene::new(LightSet {
        hemisphere: config.hemisphere,
        directional: config.directional,
    });
    let mut sphere = InstancedMesh::new(
        "sphere",
        make_sphere_geometry(1.0, 32, 32),
        make_glossy_material(config.material),
        1,
    );
    sphere.set_transform(
        0,
        Instance {
            scale: 5.0,
            ..Instance::new()
        },
    );
    scene.add(sphere);

    let image = render(&scene, &config);

    let centre = image.get_pixel(64, 64);
    assert_ne!(*centre, image::Rgba([0, 0, 0, 255]), "centre {:?}", centre);
    // Corners look past the sphere into the clear colour
    assert_eq!(*image.get_pixel(0, 0), image::Rgba([0, 0, 0, 255]));
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_default_shell() {
    use sphere_shell::SceneConfig;

    use crate::common::test_utils::seeded_scene;

    let config = SceneConfig::default();
    let scene = seeded_scene(&config, 3);

    let image = render(&scene, &config);

    let lit = image
        .pixels()
        .filter(|p| p.0[..3] != [0, 0, 0])
        .count();
    assert!(lit > 0, "no sphere visible in the shell render");
}
