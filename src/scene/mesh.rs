use glam::Vec3;

use crate::bounds::{BoundingBox, BoundingSphere};
use crate::skinning::skin::{Deformer, Skin};

/// One polygon of a polygon mesh: a run of `size` entries in `indices`
/// starting at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polygon {
    pub index: usize,
    pub size: usize,
}

/// Control-point mesh with optional per-vertex normals.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub is_triangle_mesh: bool,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub indices: Vec<u32>,
    /// Only for polygon meshes; may be absent when `is_triangle_mesh`.
    pub polygons: Option<Vec<Polygon>>,
    pub deformers: Vec<Deformer>,
}

impl Mesh {
    #[must_use]
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// The first skin deformer, if any.
    #[must_use]
    pub fn skin(&self) -> Option<&Skin> {
        self.deformers.iter().find_map(|d| match d {
            Deformer::Skin(skin) => Some(skin),
            Deformer::Unsupported(_) => None,
        })
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.positions)
    }

    /// Centroid sphere over the raw vertex positions.
    #[must_use]
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::from_centroid(&self.positions)
    }

    /// Fan-triangulates every polygon. Polygons with fewer than three
    /// vertices are dropped. A triangle mesh is returned as a clone.
    ///
    /// Returns `None` for a polygon mesh without polygon definitions.
    #[must_use]
    pub fn triangulate(&self) -> Option<Mesh> {
        if self.is_triangle_mesh {
            return Some(self.clone());
        }
        let polygons = self.polygons.as_ref()?;

        let mut indices = Vec::with_capacity(self.indices.len());
        for polygon in polygons {
            if polygon.size < 3 {
                continue;
            }
            let Some(corners) = self.indices.get(polygon.index..polygon.index + polygon.size) else {
                log::warn!(
                    "Polygon at {} (size {}) exceeds index buffer of {}, skipping",
                    polygon.index,
                    polygon.size,
                    self.indices.len()
                );
                continue;
            };
            let first = corners[0];
            for pair in corners[1..].windows(2) {
                indices.extend_from_slice(&[first, pair[0], pair[1]]);
            }
        }

        let triangles = (0..indices.len() / 3)
            .map(|i| Polygon { index: i * 3, size: 3 })
            .collect();

        Some(Mesh {
            is_triangle_mesh: true,
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            indices,
            polygons: Some(triangles),
            deformers: self.deformers.clone(),
        })
    }

    pub fn scale_lengths(&mut self, factor: f32) {
        for p in &mut self.positions {
            *p *= factor;
        }
        for deformer in &mut self.deformers {
            deformer.scale_lengths(factor);
        }
    }
}
