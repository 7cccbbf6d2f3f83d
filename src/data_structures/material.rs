//! Glossy physically-based material shared by every instance of a mesh.
//!
//! Values are handed to the shader as-is. Nothing here clamps metalness,
//! roughness or clearcoat into [0, 1]; the shading code is responsible for
//! whatever it does with out-of-range input.

use wgpu::util::DeviceExt;

/// An sRGB colour with components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` colour.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Convert to linear space for lighting maths.
    pub fn to_linear(self) -> [f32; 3] {
        let linearize = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [linearize(self.r), linearize(self.g), linearize(self.b)]
    }
}

/// Recognized options of a glossy material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlossyParams {
    pub color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
}

impl Default for GlossyParams {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlossyMaterial {
    pub params: GlossyParams,
}

pub fn make_glossy_material(params: GlossyParams) -> GlossyMaterial {
    GlossyMaterial { params }
}

impl GlossyMaterial {
    pub fn to_uniform(&self) -> MaterialUniform {
        let p = &self.params;
        MaterialUniform {
            color: p.color.to_linear(),
            metalness: p.metalness,
            roughness: p.roughness,
            clearcoat: p.clearcoat,
            clearcoat_roughness: p.clearcoat_roughness,
            _padding: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    color: [f32; 3],
    metalness: f32,
    roughness: f32,
    clearcoat: f32,
    clearcoat_roughness: f32,
    // Uniform structs are sized in multiples of 16 bytes
    _padding: u32,
}

/// The material uniform uploaded to the GPU together with its bind group.
pub struct MaterialResources {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl MaterialResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        material: &GlossyMaterial,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[material.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("material_bind_group"),
        });
        Self { buffer, bind_group }
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("material_bind_group_layout"),
    })
}
