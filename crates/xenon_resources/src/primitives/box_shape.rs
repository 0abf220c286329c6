use glam::Vec3;

use super::{ShapeGeometry, ShapeVertex};

/// A cube spanning -1..1 on every axis, four vertices per face so each face
/// carries its own normal.
#[must_use]
pub fn create_box() -> ShapeGeometry {
    // (normal, u axis, v axis); u × v == normal keeps the winding CCW.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    ];

    let mut geometry = ShapeGeometry::default();
    for (face, (normal, u, v)) in faces.into_iter().enumerate() {
        for (s, t) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = normal + u * s + v * t;
            geometry.vertices.push(ShapeVertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [(s + 1.0) * 0.5, (t + 1.0) * 0.5],
            });
        }
        let base = (face * 4) as u16;
        geometry
            .indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_wind_outward() {
        let cube = create_box();
        for tri in cube.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(cube.vertices[i as usize].position));
            let n = Vec3::from_array(cube.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
        assert_eq!(cube.bounds().size(), Vec3::splat(2.0));
    }
}
