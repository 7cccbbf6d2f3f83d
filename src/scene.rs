//! Flat scene container and the startup scene builder.

use rand::Rng;

use crate::{
    config::SceneConfig,
    data_structures::{
        geometry::make_sphere_geometry,
        instance::TransformGenerator,
        instanced_mesh::InstancedMesh,
        material::make_glossy_material,
    },
    light::LightSet,
};

/// Drawable instanced meshes plus the lights shining on them.
#[derive(Clone, Debug)]
pub struct Scene {
    meshes: Vec<InstancedMesh>,
    pub lights: LightSet,
}

impl Scene {
    pub fn new(lights: LightSet) -> Self {
        Self {
            meshes: Vec::new(),
            lights,
        }
    }

    /// Add a mesh and return its index.
    pub fn add(&mut self, mesh: InstancedMesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn meshes(&self) -> &[InstancedMesh] {
        &self.meshes
    }

    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut InstancedMesh> {
        self.meshes.get_mut(index)
    }
}

/// Build the sphere shell described by `config`, drawing transforms from
/// `generator`.
pub fn build_scene<R: Rng>(config: &SceneConfig, generator: &mut TransformGenerator<R>) -> Scene {
    let geometry = make_sphere_geometry(
        config.sphere_radius,
        config.sphere_width_segments,
        config.sphere_height_segments,
    );
    let material = make_glossy_material(config.material);
    let mut spheres = InstancedMesh::new("spheres", geometry, material, config.instance_count);
    spheres.populate(generator.by_ref());

    let mut scene = Scene::new(LightSet {
        hemisphere: config.hemisphere,
        directional: config.directional,
    });
    scene.add(spheres);
    log::info!(
        "scene ready: {} spheres on a shell of radius {:?}",
        config.instance_count,
        config.shell_radius
    );
    scene
}
