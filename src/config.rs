use serde::{Deserialize, Serialize};

use crate::animation::stack::AnimStack;
use crate::animation::time::{Ticks, TimeMode};
use crate::errors::{PoseError, Result};
use crate::scene::AttributeIndex;
use crate::scene::scene::Scene;
use crate::skinning::weights::{VertexBones, build_vertex_bones};

/// Load-time and sampling settings.
///
/// Every field has a default, so `{}` is a valid settings document:
///
/// ```json
/// { "max_influences_per_vertex": 4, "convert_units": true, "time_mode_override": "frames60" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseSettings {
    /// Number of strongest influences kept per vertex by
    /// [`PoseSettings::vertex_bones`].
    pub max_influences_per_vertex: usize,
    /// Normalize centimetre scenes to metres in [`Scene::prepare`].
    pub convert_units: bool,
    /// Frame rate for sampling grids; the scene's own mode when unset.
    pub time_mode_override: Option<TimeMode>,
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            max_influences_per_vertex: 4,
            convert_units: true,
            time_mode_override: None,
        }
    }
}

impl PoseSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn time_mode(&self, scene: &Scene) -> TimeMode {
        self.time_mode_override.unwrap_or(scene.time_mode)
    }

    /// Frame grid over `stack` at the effective time mode.
    pub fn sample_times(&self, stack: &AnimStack, scene: &Scene) -> Result<Vec<Ticks>> {
        stack.sample_times(self.time_mode(scene))
    }

    /// Fixed-width bone table for the mesh attribute at `mesh`, keeping at
    /// most `max_influences_per_vertex` influences per vertex.
    pub fn vertex_bones(&self, scene: &Scene, mesh: AttributeIndex) -> Result<Vec<VertexBones>> {
        let attribute = scene.attribute(mesh).ok_or(PoseError::AttributeIndexOutOfBounds {
            index: mesh,
            count: scene.attributes.len(),
        })?;
        let missing_skin = || PoseError::MissingSkin {
            mesh: attribute.name.clone(),
        };
        let mesh = attribute.as_mesh().ok_or_else(missing_skin)?;
        let skin = mesh.skin().ok_or_else(missing_skin)?;
        build_vertex_bones(mesh.vertex_count(), skin, self.max_influences_per_vertex)
    }
}
