//! Skeletal animation.
//!
//! [`Animation`] clips hold per-node keyframe tracks and never change after
//! load. Playback lives in [`AnimationPlaybackState`], one per instance, and
//! [`sampler::advance_animation`] turns elapsed time into local transforms.

pub mod clip;
pub mod keyframe;
pub mod sampler;
pub mod state;
pub mod values;

pub use clip::{Animation, MorphWeights, NodeAnimation};
pub use keyframe::{Interpolation, Keyframe, Tangents};
pub use sampler::{advance_animation, sample_track};
pub use state::{AnimationPlaybackState, ChannelCursors};
pub use values::Interpolatable;
