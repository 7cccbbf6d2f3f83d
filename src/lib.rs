//! sphere-shell
//!
//! A real-time 3D viewer for a field of glossy spheres scattered through a
//! spherical shell around the origin. All spheres share one geometry and one
//! material and are drawn with a single instanced draw call. The camera orbits
//! the origin under damped mouse control. Runs natively and in the browser.
//!
//! High-level modules
//! - `app`: winit application shell and startup sequence
//! - `camera`: perspective camera and its GPU uniform
//! - `config`: startup constants for the scene, camera and controls
//! - `context`: GPU device, window surface and the instanced renderer
//! - `controls`: damped orbit controls driven by pointer and wheel input
//! - `data_structures`: geometry, material and instance data models
//! - `flow`: application context and the frame scheduler
//! - `light`: hemisphere and directional lights
//! - `pipelines`: the physically-based render pipeline
//! - `render`: batching of instanced draws
//! - `scene`: scene container and scene construction
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod flow;
pub mod light;
pub mod pipelines;
pub mod render;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use config::SceneConfig;
pub use flow::{AppContext, FrameScheduler};
pub use wgpu;
pub use winit;
