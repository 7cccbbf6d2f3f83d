use cgmath::{InnerSpace, Vector3};
use sphere_shell::{
    config::SceneConfig,
    data_structures::{
        geometry::make_sphere_geometry,
        material::{GlossyParams, Rgb, make_glossy_material},
    },
    light::DirectionalLight,
};

#[test]
fn should_build_sphere_with_expected_counts() {
    let geometry = make_sphere_geometry(1.0, 64, 64);

    assert_eq!(geometry.vertices.len(), 65 * 65);
    assert_eq!(geometry.indices.len(), 6 * 64 * 63);
    assert_eq!(geometry.num_triangles(), 2 * 64 * 63);
    let vertex_count = geometry.vertices.len() as u32;
    assert!(geometry.indices.iter().all(|&i| i < vertex_count));
}

#[test]
fn should_place_vertices_on_radius_with_unit_normals() {
    let geometry = make_sphere_geometry(2.5, 16, 12);

    for vertex in &geometry.vertices {
        let position = Vector3::from(vertex.position);
        let normal = Vector3::from(vertex.normal);
        approx::assert_relative_eq!(position.magnitude(), 2.5, max_relative = 1e-5);
        approx::assert_relative_eq!(normal.magnitude(), 1.0, max_relative = 1e-5);
        approx::assert_relative_eq!(normal.dot(position.normalize()), 1.0, max_relative = 1e-5);
    }
}

#[test]
fn should_raise_segment_counts_to_minimum() {
    let geometry = make_sphere_geometry(1.0, 0, 1);

    assert_eq!(geometry.vertices.len(), 4 * 3);
    assert_eq!(geometry.indices.len(), 6 * 3 * 1);
}

#[test]
fn should_wind_triangles_outwards() {
    let geometry = make_sphere_geometry(1.0, 12, 8);

    for tri in geometry.indices.chunks(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vector3::from(geometry.vertices[i as usize].position));
        let face_normal = (b - a).cross(c - a);
        let centroid = (a + b + c) / 3.0;
        assert!(face_normal.dot(centroid) > 0.0, "inward face at {:?}", centroid);
    }
}

#[test]
fn should_pass_material_values_through_unclamped() {
    let params = GlossyParams {
        color: Rgb::new(0.2, 0.4, 0.6),
        metalness: 1.5,
        roughness: -0.25,
        clearcoat: 2.0,
        clearcoat_roughness: 0.03,
    };

    let material = make_glossy_material(params);

    assert_eq!(material.params, params);
}

#[test]
fn should_configure_default_material_as_glossy_white() {
    let config = SceneConfig::default();

    assert_eq!(config.material.color, Rgb::WHITE);
    assert_eq!(config.material.metalness, 0.2);
    assert_eq!(config.material.roughness, 0.1);
    assert_eq!(config.material.clearcoat, 1.0);
    assert_eq!(config.material.clearcoat_roughness, 0.03);
}

#[test]
fn should_unpack_hex_colours() {
    assert_eq!(Rgb::from_hex(0xffffff), Rgb::WHITE);
    assert_eq!(Rgb::from_hex(0x000000), Rgb::new(0.0, 0.0, 0.0));

    let c = Rgb::from_hex(0x404050);
    approx::assert_relative_eq!(c.r, 64.0 / 255.0);
    approx::assert_relative_eq!(c.g, 64.0 / 255.0);
    approx::assert_relative_eq!(c.b, 80.0 / 255.0);
}

#[test]
fn should_convert_srgb_endpoints_to_linear() {
    assert_eq!(Rgb::WHITE.to_linear(), [1.0, 1.0, 1.0]);
    assert_eq!(Rgb::new(0.0, 0.0, 0.0).to_linear(), [0.0, 0.0, 0.0]);
    let [mid, _, _] = Rgb::new(0.5, 0.5, 0.5).to_linear();
    approx::assert_relative_eq!(mid, 0.214, epsilon = 1e-3);
}

#[test]
fn should_point_directional_light_from_its_position() {
    let light = DirectionalLight {
        position: [5.0, 10.0, 5.0],
        color: Rgb::WHITE,
        intensity: 1.0,
    };

    let direction = light.direction();

    approx::assert_relative_eq!(direction.magnitude(), 1.0, max_relative = 1e-5);
    assert!(direction.y > direction.x && direction.x > 0.0);
}
