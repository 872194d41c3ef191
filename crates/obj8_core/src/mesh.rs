//! Vertex storage and per-batch triangle meshes.
//!
//! An OBJ8 file has one shared vertex table and one shared index table.
//! Each `TRIS` directive draws a slice of the index table. [`Mesh`] is the
//! self-contained form of one such slice, with its own compacted vertices,
//! which is what a host scene usually wants to create a mesh object from.

use std::collections::HashMap;

use obj8_math::{DVec2, DVec3};
use serde::Serialize;

/// Index value allowed in the index table that refers to no vertex.
pub const INDEX_SENTINEL: i32 = -1;

/// One entry of the vertex table, already in scene axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vertex {
    pub position: DVec3,
    pub normal: DVec3,
    pub uv: DVec2,
}

impl Vertex {
    pub fn new(position: DVec3, normal: DVec3, uv: DVec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Axis-aligned bounds of a set of points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    /// Bounds that contain nothing.
    pub fn empty() -> Self {
        Self {
            min: DVec3::splat(f64::INFINITY),
            max: DVec3::splat(f64::NEG_INFINITY),
        }
    }

    /// Smallest bounds containing every point.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.min = bounds.min.min(*p);
            bounds.max = bounds.max.max(*p);
        }
        bounds
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Diagonal length.
    pub fn size(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).length()
        }
    }
}

/// A standalone triangle mesh extracted from one batch.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub positions: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    pub uvs: Vec<DVec2>,
    /// Triangle indices into the compacted vertex arrays (every 3 form a triangle)
    pub indices: Vec<u32>,
    pub bounds: Bounds,
}

impl Mesh {
    /// Build a mesh from a slice of the shared index table.
    ///
    /// Triangles that touch the sentinel or an index outside `vertices`
    /// are dropped. Vertices are compacted in first-use order.
    pub fn from_indices(vertices: &[Vertex], indices: &[i32]) -> Self {
        let mut remap: HashMap<usize, u32> = HashMap::new();
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut out_indices = Vec::with_capacity(indices.len());

        for tri in indices.chunks(3) {
            if tri.len() < 3 {
                continue;
            }

            let valid = tri
                .iter()
                .all(|&i| i >= 0 && (i as usize) < vertices.len());
            if !valid {
                log::warn!(
                    "Dropping triangle [{}, {}, {}], vertex count: {}",
                    tri[0],
                    tri[1],
                    tri[2],
                    vertices.len()
                );
                continue;
            }

            for &i in tri {
                let global = i as usize;
                let local = *remap.entry(global).or_insert_with(|| {
                    let v = &vertices[global];
                    positions.push(v.position);
                    normals.push(v.normal);
                    uvs.push(v.uv);
                    (positions.len() - 1) as u32
                });
                out_indices.push(local);
            }
        }

        let bounds = Bounds::from_points(&positions);
        Self {
            positions,
            normals,
            uvs,
            indices: out_indices,
            bounds,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Center of the bounding box.
    pub fn center(&self) -> DVec3 {
        self.bounds.center()
    }
}
