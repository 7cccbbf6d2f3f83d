//! Procedural sphere geometry.
//!
//! The sphere is a latitude/longitude grid of `(width_segments + 1) *
//! (height_segments + 1)` vertices. The seam column is duplicated so the uv
//! coordinates wrap cleanly, and the first/last rows collapse onto the poles
//! where the degenerate half of each quad is skipped.

use std::f32::consts::PI;

use crate::data_structures::model::ModelVertex;

/// Shape-only mesh description. It carries no transform; instances place it.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build a UV sphere centred on the origin.
///
/// Segment counts below 3 (around) and 2 (top to bottom) cannot close a
/// sphere and are raised to those minimums.
pub fn make_sphere_geometry(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices =
        Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        // Pole vertices sit in the middle of their uv cell
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };
        let theta = v * PI;
        let mut row = Vec::with_capacity(width_segments as usize + 1);

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;
            let normal = [-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()];
            row.push(vertices.len() as u32);
            vertices.push(ModelVertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                tex_coords: [u + u_offset, 1.0 - v],
            });
        }
        grid.push(row);
    }

    let mut indices = Vec::with_capacity((6 * width_segments * (height_segments - 1)) as usize);
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry { vertices, indices }
}
