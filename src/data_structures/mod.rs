//! Engine data structures: geometry, materials, instances and render targets.
//!
//! - `geometry` builds the procedural sphere mesh description
//! - `material` describes the glossy surface shared by all instances
//! - `instance` holds per-instance transforms and the shell transform generator
//! - `instanced_mesh` aggregates one geometry, one material and N transforms
//! - `model` contains the vertex layout and GPU-resident meshes
//! - `texture` wraps depth and multisample render targets

pub mod geometry;
pub mod instance;
pub mod instanced_mesh;
pub mod material;
pub mod model;
pub mod texture;
