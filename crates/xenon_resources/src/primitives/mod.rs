//! Procedural shapes.
//!
//! Shapes are generated at unit size (spanning -1..1 on each used axis) with
//! interleaved position / normal / uv vertices. Sizing and orientation are
//! left to the owning node's local transform.

mod box_shape;
mod plane;

pub use box_shape::create_box;
pub use plane::create_plane;

use std::f32::consts::{FRAC_PI_2, PI};

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use smallvec::smallvec;

use crate::backend::{BufferHandle, GpuBackend};
use crate::bounds::BoundingBox;
use crate::primitive::{
    AttributeBinding, AttributeSlot, ComponentType, IndexBinding, IndexFormat, Primitive,
    PrimitiveMode,
};

/// Direction a generated plane faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
    #[default]
    Front,
    Back,
}

impl Facing {
    /// Rotation taking the +Z facing of a generated plane to this direction.
    #[must_use]
    pub fn rotation(self) -> Quat {
        match self {
            Facing::Front => Quat::IDENTITY,
            Facing::Back => Quat::from_rotation_x(PI),
            Facing::Up => Quat::from_rotation_x(-FRAC_PI_2),
            Facing::Down => Quat::from_rotation_x(FRAC_PI_2),
            Facing::Left => Quat::from_rotation_y(-FRAC_PI_2),
            Facing::Right => Quat::from_rotation_y(FRAC_PI_2),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShapeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl ShapeVertex {
    const STRIDE: u32 = std::mem::size_of::<ShapeVertex>() as u32;
}

/// CPU-side geometry of a generated shape.
#[derive(Debug, Clone, Default)]
pub struct ShapeGeometry {
    pub vertices: Vec<ShapeVertex>,
    pub indices: Vec<u16>,
}

/// GPU objects created by [`ShapeGeometry::upload`].
#[derive(Debug, Clone)]
pub struct UploadedShape {
    pub primitive: Primitive,
    pub buffers: Vec<BufferHandle>,
}

impl ShapeGeometry {
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| Vec3::from_array(v.position)))
    }

    /// Uploads vertices and indices into two buffers and binds position,
    /// normal and uv on a fresh vertex array.
    pub fn upload(&self, backend: &mut dyn GpuBackend, label: &str) -> UploadedShape {
        let vertex_buffer = backend.upload_buffer(Some(label), bytemuck::cast_slice(&self.vertices));
        let index_buffer = backend.upload_buffer(Some(label), bytemuck::cast_slice(&self.indices));
        let vertex_array = backend.create_vertex_array(Some(label));

        let count = self.vertices.len() as u32;
        let layout = [
            (AttributeSlot::Position, 3, 0),
            (AttributeSlot::Normal, 3, 12),
            (AttributeSlot::TexCoord0, 2, 24),
        ];
        for (slot, components, byte_offset) in layout {
            backend.bind_attribute(
                vertex_array,
                &AttributeBinding {
                    slot,
                    buffer: vertex_buffer,
                    components,
                    component_type: ComponentType::F32,
                    normalized: false,
                    byte_offset,
                    byte_stride: ShapeVertex::STRIDE,
                    count,
                },
            );
        }

        let index = IndexBinding {
            buffer: index_buffer,
            format: IndexFormat::U16,
            byte_offset: 0,
            count: self.indices.len() as u32,
        };
        backend.bind_index_buffer(vertex_array, &index);

        UploadedShape {
            primitive: Primitive {
                vertex_array,
                mode: PrimitiveMode::Triangles,
                vertex_count: count,
                index: Some(index),
                material: Some(0),
                bounds: self.bounds(),
                attributes: smallvec![
                    AttributeSlot::Position,
                    AttributeSlot::Normal,
                    AttributeSlot::TexCoord0
                ],
            },
            buffers: vec![vertex_buffer, index_buffer],
        }
    }
}
