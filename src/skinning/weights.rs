//! Per-vertex bone weight tables.
//!
//! Two related tables are built from a skin's clusters:
//! - [`build_vertex_bones`]: a fixed-width top-N table for compact vertex
//!   formats, renormalized over the kept entries
//! - [`build_vertex_influences`]: every influence plus the full weight sum,
//!   used by the deformer

use smallvec::SmallVec;

use crate::errors::{PoseError, Result};
use crate::skinning::skin::Skin;

/// Largest cluster count a 16-bit bone index can address.
pub const MAX_BONES: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneWeight {
    pub bone: u16,
    pub weight: f32,
}

/// Bone slots of one vertex, inline up to the common four.
pub type VertexBones = SmallVec<[BoneWeight; 4]>;

/// Builds a `max_influences`-wide bone table for `vertex_count` vertices.
///
/// Per vertex, positive weights are ranked heaviest first (ties keep cluster
/// order), the top `max_influences` are kept, and the kept weights are
/// rescaled to sum to 1. Unused slots hold bone 0 with weight 0. Control
/// points outside the mesh are skipped with a warning.
pub fn build_vertex_bones(vertex_count: usize, skin: &Skin, max_influences: usize) -> Result<Vec<VertexBones>> {
    if skin.clusters.len() > MAX_BONES {
        return Err(PoseError::TooManyClusters {
            count: skin.clusters.len(),
            max: MAX_BONES,
        });
    }

    let mut candidates: Vec<SmallVec<[BoneWeight; 8]>> = vec![SmallVec::new(); vertex_count];

    for (cluster_index, cluster) in skin.clusters.iter().enumerate() {
        check_lengths(cluster_index, cluster.control_point_indices.len(), cluster.control_point_weights.len())?;

        let mut skipped = 0usize;
        for (vertex, weight) in cluster.influences() {
            if weight <= 0.0 {
                continue;
            }
            match usize::try_from(vertex).ok().filter(|&v| v < vertex_count) {
                Some(v) => candidates[v].push(BoneWeight {
                    bone: cluster_index as u16,
                    weight,
                }),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!(
                "Cluster {cluster_index}: skipped {skipped} control points outside {vertex_count} vertices"
            );
        }
    }

    let table = candidates
        .into_iter()
        .map(|mut list| {
            // Stable sort keeps cluster order among equal weights.
            list.sort_by(|a, b| b.weight.total_cmp(&a.weight));

            let mut bones: VertexBones = list.into_iter().take(max_influences).collect();
            let total: f32 = bones.iter().map(|b| b.weight).sum();
            if total > f32::EPSILON {
                for b in &mut bones {
                    b.weight /= total;
                }
            }
            bones.resize(max_influences, BoneWeight::default());
            bones
        })
        .collect();

    Ok(table)
}

/// Every bone influencing one vertex, with the sum of their weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexInfluences {
    pub bones: SmallVec<[(usize, f32); 4]>,
    pub weight_sum: f32,
}

impl VertexInfluences {
    /// No usable influence: the vertex keeps its rest position.
    #[inline]
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        self.bones.is_empty() || self.weight_sum == 0.0
    }

    /// `(bone, weight / weight_sum)` pairs.
    pub fn normalized(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        let sum = self.weight_sum;
        self.bones.iter().map(move |&(bone, weight)| (bone, weight / sum))
    }
}

/// Collects every influence of every cluster, weights taken as given.
///
/// Unlike [`build_vertex_bones`] an out-of-range control point is an error
/// here: the deformer cannot silently drop part of a bone's weight.
pub fn build_vertex_influences(vertex_count: usize, skin: &Skin) -> Result<Vec<VertexInfluences>> {
    let mut table = vec![VertexInfluences::default(); vertex_count];

    for (cluster_index, cluster) in skin.clusters.iter().enumerate() {
        check_lengths(cluster_index, cluster.control_point_indices.len(), cluster.control_point_weights.len())?;

        for (vertex, weight) in cluster.influences() {
            let info = usize::try_from(vertex)
                .ok()
                .and_then(|v| table.get_mut(v))
                .ok_or_else(|| PoseError::ControlPointOutOfRange {
                    cluster: cluster_index,
                    vertex: i64::from(vertex),
                    vertex_count,
                })?;
            info.bones.push((cluster_index, weight));
            info.weight_sum += weight;
        }
    }

    Ok(table)
}

fn check_lengths(cluster: usize, indices: usize, weights: usize) -> Result<()> {
    if indices == weights {
        Ok(())
    } else {
        Err(PoseError::ClusterLengthMismatch {
            cluster,
            indices,
            weights,
        })
    }
}
