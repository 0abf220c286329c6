use glam::{Quat, Vec3, Vec4};

/// Values a keyframe track can blend between.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    /// Cubic Hermite spline between `v0` and `v1`.
    ///
    /// Tangents are per second, so they are scaled by the keyframe interval
    /// `dt` before use.
    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self;

    /// Tangent used when one side of a cubic segment has none.
    fn zero_tangent() -> Self;
}

/// Hermite basis `[h00, h10, h01, h11]` at `t`.
#[inline]
fn hermite_basis(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    [1.0 - h01, h11 - t2 + t, h01, h11]
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_basis(t);
        h00 * v0 + h10 * out_tangent0 * dt + h01 * v1 + h11 * in_tangent1 * dt
    }

    fn zero_tangent() -> Self {
        0.0
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_basis(t);
        v0 * h00 + out_tangent0 * (h10 * dt) + v1 * h01 + in_tangent1 * (h11 * dt)
    }

    fn zero_tangent() -> Self {
        Vec3::ZERO
    }
}

impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }

    /// Evaluated component-wise on the raw quaternion and re-normalized.
    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_basis(t);
        let blended = Vec4::from(v0) * h00
            + Vec4::from(out_tangent0) * (h10 * dt)
            + Vec4::from(v1) * h01
            + Vec4::from(in_tangent1) * (h11 * dt);
        Quat::from_vec4(blended).normalize()
    }

    fn zero_tangent() -> Self {
        Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_hits_endpoints() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-1.0, 0.0, 5.0);
        let m = Vec3::splat(4.0);
        assert!(Vec3::interpolate_cubic(a, m, m, b, 0.0, 0.5).abs_diff_eq(a, 1e-6));
        assert!(Vec3::interpolate_cubic(a, m, m, b, 1.0, 0.5).abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn cubic_with_zero_tangents_is_smoothstep() {
        let v = f32::interpolate_cubic(0.0, 0.0, 0.0, 1.0, 0.5, 1.0);
        assert!((v - 0.5).abs() < 1e-6);
        let v = f32::interpolate_cubic(0.0, 0.0, 0.0, 1.0, 0.25, 1.0);
        assert!((v - 0.156_25).abs() < 1e-6);
    }

    #[test]
    fn cubic_rotation_stays_unit_length() {
        let a = Quat::from_rotation_y(0.3);
        let b = Quat::from_rotation_y(1.2);
        let q = Quat::interpolate_cubic(a, Quat::zero_tangent(), Quat::zero_tangent(), b, 0.4, 1.0);
        assert!((q.length() - 1.0).abs() < 1e-5);
    }
}
