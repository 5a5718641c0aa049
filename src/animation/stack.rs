use rustc_hash::FxHashMap;

use crate::animation::binding::AnimNode;
use crate::animation::time::{Ticks, TimeMode, TimeSpan};
use crate::errors::Result;
use crate::scene::NodeIndex;

/// A set of node animations evaluated together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimLayer {
    pub name: Option<String>,
    pub node_animations: Vec<AnimNode>,
}

impl AnimLayer {
    #[must_use]
    pub fn new(name: Option<String>, node_animations: Vec<AnimNode>) -> Self {
        Self {
            name,
            node_animations,
        }
    }

    /// First animation targeting `node`.
    #[must_use]
    pub fn find(&self, node: NodeIndex) -> Option<&AnimNode> {
        self.node_animations.iter().find(|anim| anim.node == node)
    }

    /// Node index to position in `node_animations`. The first animation for
    /// a node wins.
    #[must_use]
    pub fn node_map(&self) -> FxHashMap<NodeIndex, usize> {
        let mut map = FxHashMap::with_capacity_and_hasher(self.node_animations.len(), Default::default());
        for (i, anim) in self.node_animations.iter().enumerate() {
            map.entry(anim.node).or_insert(i);
        }
        map
    }

    /// Ticks covered by any curve of the layer, `None` when it is empty.
    #[must_use]
    pub fn time_span(&self) -> Option<TimeSpan> {
        self.node_animations
            .iter()
            .flat_map(|anim| [anim.scaling.time_span(), anim.rotation.time_span(), anim.translation.time_span()])
            .reduce(|a, b| TimeSpan::new(a.start.min(b.start), a.stop.max(b.stop)))
    }

    pub fn scale_lengths(&mut self, factor: f32) {
        for anim in &mut self.node_animations {
            anim.scale_lengths(factor);
        }
    }
}

/// A named take: layers plus the time span they are meant to be played over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimStack {
    pub name: Option<String>,
    pub layers: Vec<AnimLayer>,
    pub local_time_span: TimeSpan,
}

impl AnimStack {
    #[must_use]
    pub fn new(name: Option<String>, local_time_span: TimeSpan) -> Self {
        Self {
            name,
            layers: Vec::new(),
            local_time_span,
        }
    }

    /// Frame times over `local_time_span` at the rate of `mode`.
    pub fn sample_times(&self, mode: TimeMode) -> Result<Vec<Ticks>> {
        self.local_time_span.sample_times(mode)
    }

    pub fn scale_lengths(&mut self, factor: f32) {
        for layer in &mut self.layers {
            layer.scale_lengths(factor);
        }
    }
}
