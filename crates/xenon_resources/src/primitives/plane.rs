use super::{ShapeGeometry, ShapeVertex};

/// A single quad in the XY plane facing +Z.
#[must_use]
pub fn create_plane() -> ShapeGeometry {
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let vertices = corners
        .iter()
        .map(|&(x, y)| ShapeVertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [(x + 1.0) * 0.5, (y + 1.0) * 0.5],
        })
        .collect();

    ShapeGeometry {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}
