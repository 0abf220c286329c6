//! Keyframe sampling.
//!
//! Tracks are sampled with a forward-only cursor: within one playback cycle
//! time only grows, so each channel resumes its search where the previous
//! frame stopped. Wraparound and animation selection rewind the cursors.

use glam::Mat4;
use xenon_core::math::{EPSILON, with_position, with_rotation, with_scale};

use crate::clip::Animation;
use crate::keyframe::{Interpolation, Keyframe};
use crate::state::AnimationPlaybackState;
use crate::values::Interpolatable;

/// Moves `cursor` past every keyframe whose time is `<= time`, stopping at
/// the last keyframe. Returns the new cursor.
fn advance_cursor<T>(track: &[Keyframe<T>], cursor: &mut usize, time: f32) -> Option<usize> {
    let last = track.len().checked_sub(1)?;
    let mut step = (*cursor).min(last);
    while step < last && time >= track[step].time {
        step += 1;
    }
    *cursor = step;
    Some(step)
}

/// Samples `track` at `time`.
///
/// Before the first keyframe the track blends from `rest` (the node's
/// rest-pose component, taken to sit at time 0). After the last keyframe the
/// last value is held. Returns `None` for an empty track.
pub fn sample_track<T: Interpolatable>(track: &[Keyframe<T>], cursor: &mut usize, time: f32, rest: T) -> Option<T> {
    let step = advance_cursor(track, cursor, time)?;
    let current = &track[step];

    if time >= current.time {
        return Some(current.value);
    }

    let (prev_time, prev_value, prev_out_tangent) = match step.checked_sub(1) {
        Some(prev) => (track[prev].time, track[prev].value, track[prev].out_tangent()),
        None => (0.0, rest, T::zero_tangent()),
    };
    let interval = current.time - prev_time;
    let t = ((time - prev_time) / interval.max(EPSILON)).clamp(0.0, 1.0);

    let value = match current.interpolation {
        Interpolation::Linear => T::interpolate_linear(prev_value, current.value, t),
        Interpolation::Step => current.value,
        Interpolation::CubicSpline => T::interpolate_cubic(
            prev_value,
            prev_out_tangent,
            current.in_tangent(),
            current.value,
            t,
            interval,
        ),
    };
    Some(value)
}

/// Advances playback by `delta_time` and writes the sampled pose.
///
/// `rest_pose` holds the model's load-time local transforms and supplies the
/// value each channel blends from before its first keyframe.
/// `local_transforms` is the instance's current pose; each channel replaces
/// only its own translation, rotation or scale component.
///
/// When paused, time holds but the pose at that time is written again.
/// Returns whether any transform was written.
pub fn advance_animation(
    animation: &Animation,
    state: &mut AnimationPlaybackState,
    rest_pose: &[Mat4],
    local_transforms: &mut [Mat4],
    is_playing: bool,
    delta_time: f32,
) -> bool {
    if is_playing {
        state.time += delta_time;
    }

    if state.time >= animation.end_time {
        state.reset_cursors();
        // One clip length per frame; a frame longer than the clip catches up
        // over the following frames.
        state.time = if animation.end_time > EPSILON {
            state.time - animation.end_time
        } else {
            0.0
        };
    }

    let time = state.time;
    let mut changed = false;

    for (&node, tracks) in &animation.nodes {
        let (Some(local), Some(rest), Some(cursors)) = (
            local_transforms.get_mut(node),
            rest_pose.get(node),
            state.cursors.get_mut(node),
        ) else {
            log::warn!("Animation '{}' targets node {node} outside the instance", animation.name);
            continue;
        };

        let (rest_scale, rest_rotation, rest_translation) = rest.to_scale_rotation_translation();

        if let Some(translation) = sample_track(&tracks.translation, &mut cursors.translation, time, rest_translation) {
            *local = with_position(local, translation);
            changed = true;
        }
        if let Some(rotation) = sample_track(&tracks.rotation, &mut cursors.rotation, time, rest_rotation) {
            *local = with_rotation(local, rotation);
            changed = true;
        }
        if let Some(scale) = sample_track(&tracks.scale, &mut cursors.scale, time, rest_scale) {
            *local = with_scale(local, scale);
            changed = true;
        }

        // Morph weights are not applied; the cursor still follows time.
        advance_cursor(&tracks.weights, &mut cursors.weight, time);
    }

    state.dirty |= changed;
    changed
}
