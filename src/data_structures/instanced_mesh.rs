//! One geometry and one material drawn N times.
//!
//! [`InstancedMesh`] is the CPU-side aggregate: a fixed number of transform
//! slots, each written independently. [`GpuInstancedMesh`] mirrors it on the
//! GPU and re-uploads the instance buffer whenever the aggregate's
//! generation counter moves.

use wgpu::util::DeviceExt;

use crate::data_structures::{
    geometry::Geometry,
    instance::{Instance, InstanceRaw},
    material::{GlossyMaterial, MaterialResources},
    model::GpuMesh,
};

#[derive(Clone, Debug)]
pub struct InstancedMesh {
    pub name: String,
    geometry: Geometry,
    material: GlossyMaterial,
    instances: Vec<Instance>,
    generation: u64,
}

impl InstancedMesh {
    /// Create an aggregate with `count` slots, all starting at the identity
    /// transform so every slot is valid before the first render.
    pub fn new(name: &str, geometry: Geometry, material: GlossyMaterial, count: usize) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material,
            instances: vec![Instance::new(); count],
            generation: 0,
        }
    }

    /// Overwrite slot `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not below [`len`](Self::len). The slot count is fixed at
    /// construction, so an out-of-range write is a bug in the caller.
    pub fn set_transform(&mut self, index: usize, transform: Instance) {
        assert!(
            index < self.instances.len(),
            "instance index {} out of range for {:?} with {} slots",
            index,
            self.name,
            self.instances.len()
        );
        self.instances[index] = transform;
        self.generation += 1;
    }

    pub fn transform(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    pub fn transforms(&self) -> &[Instance] {
        &self.instances
    }

    /// Fill every slot, in order, from `source`.
    ///
    /// Stops early if `source` runs dry; the remaining slots keep their
    /// previous transform.
    pub fn populate<I: IntoIterator<Item = Instance>>(&mut self, source: I) {
        let len = self.instances.len();
        for (index, transform) in source.into_iter().take(len).enumerate() {
            self.set_transform(index, transform);
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> &GlossyMaterial {
        &self.material
    }

    /// Incremented on every slot write.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn to_raw(&self) -> Vec<InstanceRaw> {
        self.instances.iter().map(Instance::to_raw).collect()
    }
}

/// GPU resources backing one [`InstancedMesh`].
pub struct GpuInstancedMesh {
    pub mesh: GpuMesh,
    pub material: MaterialResources,
    pub instance_buffer: wgpu::Buffer,
    pub amount: usize,
    uploaded_generation: u64,
}

impl GpuInstancedMesh {
    pub fn new(
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
        source: &InstancedMesh,
    ) -> Self {
        let mesh = GpuMesh::new(device, &source.name, source.geometry());
        let material = MaterialResources::new(device, material_layout, source.material());
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&source.to_raw()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        log::debug!(
            "uploaded {:?}: {} triangles, {} instances",
            source.name,
            source.geometry().num_triangles(),
            source.len()
        );
        Self {
            mesh,
            material,
            instance_buffer,
            amount: source.len(),
            uploaded_generation: source.generation(),
        }
    }

    /// Copy the slots of `source` into the instance buffer if they changed
    /// since the last upload.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, source: &InstancedMesh) {
        if self.uploaded_generation == source.generation() || source.is_empty() {
            return;
        }
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&source.to_raw()));
        self.uploaded_generation = source.generation();
    }
}
