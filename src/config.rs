//! Startup configuration.
//!
//! Every constant the scene is built from lives in [`SceneConfig`]. The
//! `Default` impl reproduces the shipped scene; embedders and tests override
//! individual fields with struct update syntax.

use std::ops::RangeInclusive;

use crate::{
    data_structures::material::{GlossyParams, Rgb},
    light::{DirectionalLight, HemisphereLight},
    pipelines::physical::ToneMapping,
};

/// Camera placement and projection parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 25.0],
            target: [0.0, 0.0, 0.0],
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// Orbit controller tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub instance_count: usize,
    /// Band of distances from the origin that instance centers are placed in.
    pub shell_radius: RangeInclusive<f32>,
    pub scale: RangeInclusive<f32>,
    pub sphere_radius: f32,
    pub sphere_width_segments: u32,
    pub sphere_height_segments: u32,
    pub material: GlossyParams,
    pub hemisphere: HemisphereLight,
    pub directional: DirectionalLight,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub clear_colour: wgpu::Color,
    pub tone_mapping: ToneMapping,
    /// 1 disables multisampling.
    pub msaa_samples: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            instance_count: 25,
            shell_radius: 8.0..=18.0,
            scale: 0.5..=1.2,
            sphere_radius: 1.0,
            sphere_width_segments: 64,
            sphere_height_segments: 64,
            material: GlossyParams {
                color: Rgb::from_hex(0xffffff),
                metalness: 0.2,
                roughness: 0.1,
                clearcoat: 1.0,
                clearcoat_roughness: 0.03,
            },
            hemisphere: HemisphereLight {
                sky: Rgb::from_hex(0x404050),
                ground: Rgb::from_hex(0x202030),
                intensity: 0.5,
            },
            directional: DirectionalLight {
                position: [5.0, 10.0, 5.0],
                color: Rgb::from_hex(0xffffff),
                intensity: 1.0,
            },
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            clear_colour: wgpu::Color::BLACK,
            tone_mapping: ToneMapping::AcesFilmic,
            msaa_samples: 4,
        }
    }
}
