use crate::values::Interpolatable;

/// How a keyframe blends toward the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

/// In/out tangents of a cubic-spline keyframe, in value units per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tangents<T> {
    pub in_tangent: T,
    pub out_tangent: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
    pub interpolation: Interpolation,
    /// Present only for `CubicSpline` keyframes.
    pub tangents: Option<Tangents<T>>,
}

impl<T: Interpolatable> Keyframe<T> {
    #[must_use]
    pub fn linear(time: f32, value: T) -> Self {
        Self { time, value, interpolation: Interpolation::Linear, tangents: None }
    }

    #[must_use]
    pub fn step(time: f32, value: T) -> Self {
        Self { time, value, interpolation: Interpolation::Step, tangents: None }
    }

    #[must_use]
    pub fn cubic(time: f32, in_tangent: T, value: T, out_tangent: T) -> Self {
        Self {
            time,
            value,
            interpolation: Interpolation::CubicSpline,
            tangents: Some(Tangents { in_tangent, out_tangent }),
        }
    }

    #[must_use]
    pub fn in_tangent(&self) -> T {
        self.tangents.map_or_else(T::zero_tangent, |t| t.in_tangent)
    }

    #[must_use]
    pub fn out_tangent(&self) -> T {
        self.tangents.map_or_else(T::zero_tangent, |t| t.out_tangent)
    }
}
