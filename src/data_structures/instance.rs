//! Instance transformation data for GPU rendering.
//!
//! Per-instance data like position, rotation, and scale is packed into a
//! GPU buffer and read by the vertex shader, so every sphere of the shell is
//! drawn by one instanced draw call.
//!
//! [`TransformGenerator`] produces the randomized transforms that scatter the
//! instances over a spherical shell.

use std::{f32::consts::PI, ops::RangeInclusive};

use cgmath::{Euler, Matrix3, Matrix4, Rad, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::data_structures::model;

/// Scale range used when none is configured.
pub const DEFAULT_SCALE: RangeInclusive<f32> = 0.5..=1.2;

/// Per-instance transformation: position, Euler rotation (XYZ order) and a
/// uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: f32,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: 1.0,
        }
    }

    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        Matrix3::from_angle_x(self.rotation.x)
            * Matrix3::from_angle_y(self.rotation.y)
            * Matrix3::from_angle_z(self.rotation.z)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation_matrix())
            * Matrix4::from_scale(self.scale)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            // Uniform scale keeps the rotation a valid normal matrix
            normal: self.rotation_matrix().into(),
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Instance {
    fn from(position: Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

/// Sample a direction uniformly over the unit sphere's surface.
///
/// The polar angle goes through the inverse CDF `acos(2u - 1)`; sampling it
/// uniformly instead would crowd points around the poles.
pub fn sample_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f32> {
    let phi = (2.0 * rng.r#gen::<f32>() - 1.0).acos();
    let theta = 2.0 * PI * rng.r#gen::<f32>();
    Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

fn rand_float<R: Rng + ?Sized>(rng: &mut R, range: &RangeInclusive<f32>) -> f32 {
    range.start() + rng.r#gen::<f32>() * (range.end() - range.start())
}

/// Draw one transform for an instance on the shell between `radius.start()`
/// and `radius.end()`.
///
/// The radius is interpolated linearly, so density is higher near the inner
/// radius than a volume-uniform draw would give.
pub fn sample_transform<R: Rng + ?Sized>(
    rng: &mut R,
    radius: &RangeInclusive<f32>,
    scale: &RangeInclusive<f32>,
) -> Instance {
    let direction = sample_unit_sphere(rng);
    let r = rand_float(rng, radius);
    let rotation = Euler::new(
        Rad(rng.r#gen::<f32>() * PI),
        Rad(rng.r#gen::<f32>() * PI),
        Rad(rng.r#gen::<f32>() * PI),
    );
    let scale = rand_float(rng, scale);
    Instance {
        position: direction * r,
        rotation,
        scale,
    }
}

/// Transform on the shell `[min_radius, max_radius]` with the default scale range.
pub fn generate_transform<R: Rng + ?Sized>(
    rng: &mut R,
    min_radius: f32,
    max_radius: f32,
) -> Instance {
    sample_transform(rng, &(min_radius..=max_radius), &DEFAULT_SCALE)
}

/// Stateful transform source with an injectable random generator.
///
/// Production code uses [`TransformGenerator::from_entropy`]; tests seed a
/// [`StdRng`] to get a reproducible sequence.
#[derive(Debug)]
pub struct TransformGenerator<R: Rng = StdRng> {
    rng: R,
    radius: RangeInclusive<f32>,
    scale: RangeInclusive<f32>,
}

impl TransformGenerator<StdRng> {
    pub fn from_entropy(radius: RangeInclusive<f32>, scale: RangeInclusive<f32>) -> Self {
        Self::new(StdRng::from_entropy(), radius, scale)
    }

    pub fn seeded(seed: u64, radius: RangeInclusive<f32>, scale: RangeInclusive<f32>) -> Self {
        Self::new(StdRng::seed_from_u64(seed), radius, scale)
    }
}

impl<R: Rng> TransformGenerator<R> {
    pub fn new(rng: R, radius: RangeInclusive<f32>, scale: RangeInclusive<f32>) -> Self {
        Self { rng, radius, scale }
    }

    pub fn generate(&mut self) -> Instance {
        sample_transform(&mut self.rng, &self.radius, &self.scale)
    }
}

impl<R: Rng> Iterator for TransformGenerator<R> {
    type Item = Instance;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl InstanceRaw {
    pub fn model(&self) -> [[f32; 4]; 4] {
        self.model
    }
}

/**
 * The instance matrix occupies four vec4 vertex slots, the normal matrix three
 * vec3 slots. Locations start at 5 to leave room for the per-vertex attributes.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // The shader only advances to the next instance once it starts a new one
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}
