use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use crate::keyframe::Keyframe;

/// Morph target weights for one keyframe.
pub type MorphWeights = SmallVec<[f32; 8]>;

/// Keyframe tracks targeting one node. Any track may be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAnimation {
    pub translation: Vec<Keyframe<Vec3>>,
    pub rotation: Vec<Keyframe<Quat>>,
    pub scale: Vec<Keyframe<Vec3>>,
    /// Parsed and timed, never applied to geometry.
    pub weights: Vec<Keyframe<MorphWeights>>,
}

impl NodeAnimation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.translation.is_empty() && self.rotation.is_empty() && self.scale.is_empty() && self.weights.is_empty()
    }

    /// Latest keyframe time over all four tracks.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        [
            self.translation.last().map(|k| k.time),
            self.rotation.last().map(|k| k.time),
            self.scale.last().map(|k| k.time),
            self.weights.last().map(|k| k.time),
        ]
        .into_iter()
        .flatten()
        .fold(0.0_f32, f32::max)
    }

    #[must_use]
    pub fn keyframe_count(&self) -> usize {
        self.translation.len() + self.rotation.len() + self.scale.len() + self.weights.len()
    }
}

/// A named animation clip.
///
/// Tracks are keyed by dense model node index. `end_time` is the largest
/// keyframe time across every track, weight tracks included, and is the loop
/// length of playback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub name: String,
    pub end_time: f32,
    /// Total keyframes across all tracks.
    pub key_frames: usize,
    pub nodes: BTreeMap<usize, NodeAnimation>,
}

impl Animation {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Builds a clip from finished node tracks and derives its totals.
    #[must_use]
    pub fn from_nodes(name: impl Into<String>, nodes: BTreeMap<usize, NodeAnimation>) -> Self {
        let mut animation = Self { name: name.into(), nodes, ..Default::default() };
        animation.recompute_totals();
        animation
    }

    #[must_use]
    pub fn node(&self, node: usize) -> Option<&NodeAnimation> {
        self.nodes.get(&node)
    }

    pub fn node_mut(&mut self, node: usize) -> &mut NodeAnimation {
        self.nodes.entry(node).or_default()
    }

    /// Re-derives `end_time` and `key_frames` from the tracks.
    pub fn recompute_totals(&mut self) {
        self.end_time = self.nodes.values().map(NodeAnimation::end_time).fold(0.0_f32, f32::max);
        self.key_frames = self.nodes.values().map(NodeAnimation::keyframe_count).sum();
    }

    #[must_use]
    pub fn has_weight_tracks(&self) -> bool {
        self.nodes.values().any(|node| !node.weights.is_empty())
    }
}
