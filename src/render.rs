//! Render composition.
//!
//! Scene contents are turned into a [`Render`] tree before drawing. The
//! render surface flattens the tree into a batch of [`Instanced`] draws that
//! share the physical pipeline.

use crate::data_structures::{instanced_mesh::GpuInstancedMesh, model::GpuMesh};

/// Data for one instanced draw: mesh, material, instance buffer and count.
#[derive(Clone, Copy)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a GpuMesh,
    pub material: &'a wgpu::BindGroup,
    pub amount: usize,
}

/// Specifies how a scene object should be rendered.
///
/// - `Default(Instanced)` renders a single opaque instanced object
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    Default(Instanced<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Flatten the tree into `basics`, skipping draws without instances.
    pub(crate) fn collect(self, basics: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Default(instanced) => push_drawable(basics, instanced),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect(basics)),
        }
    }
}

fn push_drawable<'a>(basics: &mut Vec<Instanced<'a>>, instanced: Instanced<'a>) {
    if instanced.amount == 0 || instanced.instance.size() == 0 {
        log::warn!("you attempted to render something with zero instances");
        return;
    }
    basics.push(instanced);
}

impl<'a> From<&'a GpuInstancedMesh> for Render<'a> {
    fn from(mesh: &'a GpuInstancedMesh) -> Self {
        Render::Default(Instanced {
            instance: &mesh.instance_buffer,
            mesh: &mesh.mesh,
            material: &mesh.material.bind_group,
            amount: mesh.amount,
        })
    }
}

impl<'a> From<&'a [GpuInstancedMesh]> for Render<'a> {
    fn from(meshes: &'a [GpuInstancedMesh]) -> Self {
        Render::Composed(meshes.iter().map(Render::from).collect())
    }
}
