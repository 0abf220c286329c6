//! Draw primitive and vertex binding descriptors.
//!
//! A [`Primitive`] is the unit of drawing: one vertex array, one draw mode,
//! one material. Bindings record where each attribute lives inside an
//! uploaded buffer so a backend can build its own vertex layouts.

use smallvec::SmallVec;
use wgpu::{PrimitiveTopology, VertexFormat};

use crate::backend::{BufferHandle, VertexArrayHandle};
use crate::bounds::BoundingBox;

/// Vertex attribute semantics understood by the engine.
///
/// Each slot maps to a fixed shader location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeSlot {
    Position,
    Normal,
    Tangent,
    TexCoord0,
    Joints0,
    Weights0,
}

impl AttributeSlot {
    pub const ALL: [AttributeSlot; 6] = [
        AttributeSlot::Position,
        AttributeSlot::Normal,
        AttributeSlot::Tangent,
        AttributeSlot::TexCoord0,
        AttributeSlot::Joints0,
        AttributeSlot::Weights0,
    ];

    #[must_use]
    pub const fn shader_location(self) -> u32 {
        match self {
            AttributeSlot::Position => 0,
            AttributeSlot::Normal => 1,
            AttributeSlot::Tangent => 2,
            AttributeSlot::TexCoord0 => 3,
            AttributeSlot::Joints0 => 4,
            AttributeSlot::Weights0 => 5,
        }
    }

    /// Document semantic name, e.g. `TEXCOORD_0`.
    #[must_use]
    pub const fn semantic_name(self) -> &'static str {
        match self {
            AttributeSlot::Position => "POSITION",
            AttributeSlot::Normal => "NORMAL",
            AttributeSlot::Tangent => "TANGENT",
            AttributeSlot::TexCoord0 => "TEXCOORD_0",
            AttributeSlot::Joints0 => "JOINTS_0",
            AttributeSlot::Weights0 => "WEIGHTS_0",
        }
    }
}

/// Scalar type of a single attribute or index component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    #[must_use]
    pub const fn size_in_bytes(self) -> u32 {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }
}

/// Location and format of one vertex attribute inside an uploaded buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeBinding {
    pub slot: AttributeSlot,
    pub buffer: BufferHandle,
    /// Components per element (1..=4).
    pub components: u32,
    pub component_type: ComponentType,
    pub normalized: bool,
    /// Offset of the first element inside `buffer`.
    pub byte_offset: u64,
    /// Distance between consecutive elements. Never zero: tightly packed
    /// data records its element size here.
    pub byte_stride: u32,
    pub count: u32,
}

impl AttributeBinding {
    #[must_use]
    pub const fn element_size(&self) -> u32 {
        self.components * self.component_type.size_in_bytes()
    }

    /// The matching wgpu vertex format, if wgpu has one for this
    /// (type, count, normalized) combination.
    #[must_use]
    pub fn vertex_format(&self) -> Option<VertexFormat> {
        use ComponentType as C;
        let format = match (self.component_type, self.components, self.normalized) {
            (C::F32, 1, _) => VertexFormat::Float32,
            (C::F32, 2, _) => VertexFormat::Float32x2,
            (C::F32, 3, _) => VertexFormat::Float32x3,
            (C::F32, 4, _) => VertexFormat::Float32x4,

            (C::U32, 1, false) => VertexFormat::Uint32,
            (C::U32, 2, false) => VertexFormat::Uint32x2,
            (C::U32, 3, false) => VertexFormat::Uint32x3,
            (C::U32, 4, false) => VertexFormat::Uint32x4,

            (C::U16, 1, false) => VertexFormat::Uint16,
            (C::U16, 2, false) => VertexFormat::Uint16x2,
            (C::U16, 4, false) => VertexFormat::Uint16x4,
            (C::U16, 1, true) => VertexFormat::Unorm16,
            (C::U16, 2, true) => VertexFormat::Unorm16x2,
            (C::U16, 4, true) => VertexFormat::Unorm16x4,
            (C::I16, 2, false) => VertexFormat::Sint16x2,
            (C::I16, 4, false) => VertexFormat::Sint16x4,
            (C::I16, 2, true) => VertexFormat::Snorm16x2,
            (C::I16, 4, true) => VertexFormat::Snorm16x4,

            (C::U8, 1, false) => VertexFormat::Uint8,
            (C::U8, 2, false) => VertexFormat::Uint8x2,
            (C::U8, 4, false) => VertexFormat::Uint8x4,
            (C::U8, 1, true) => VertexFormat::Unorm8,
            (C::U8, 2, true) => VertexFormat::Unorm8x2,
            (C::U8, 4, true) => VertexFormat::Unorm8x4,
            (C::I8, 2, false) => VertexFormat::Sint8x2,
            (C::I8, 4, false) => VertexFormat::Sint8x4,
            (C::I8, 2, true) => VertexFormat::Snorm8x2,
            (C::I8, 4, true) => VertexFormat::Snorm8x4,

            _ => return None,
        };
        Some(format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U8,
    U16,
    U32,
}

impl IndexFormat {
    #[must_use]
    pub const fn size_in_bytes(self) -> u32 {
        match self {
            IndexFormat::U8 => 1,
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }

    /// `None` for 8-bit indices, which wgpu cannot draw directly.
    #[must_use]
    pub const fn to_wgpu(self) -> Option<wgpu::IndexFormat> {
        match self {
            IndexFormat::U8 => None,
            IndexFormat::U16 => Some(wgpu::IndexFormat::Uint16),
            IndexFormat::U32 => Some(wgpu::IndexFormat::Uint32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexBinding {
    pub buffer: BufferHandle,
    pub format: IndexFormat,
    pub byte_offset: u64,
    pub count: u32,
}

/// Draw mode of a primitive, as declared by the model document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    /// wgpu has no loop or fan topologies.
    #[must_use]
    pub const fn topology(self) -> Option<PrimitiveTopology> {
        match self {
            PrimitiveMode::Points => Some(PrimitiveTopology::PointList),
            PrimitiveMode::Lines => Some(PrimitiveTopology::LineList),
            PrimitiveMode::LineStrip => Some(PrimitiveTopology::LineStrip),
            PrimitiveMode::Triangles => Some(PrimitiveTopology::TriangleList),
            PrimitiveMode::TriangleStrip => Some(PrimitiveTopology::TriangleStrip),
            PrimitiveMode::LineLoop | PrimitiveMode::TriangleFan => None,
        }
    }
}

/// A drawable unit: vertex array, draw mode, counts, material and bounds.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub vertex_array: VertexArrayHandle,
    pub mode: PrimitiveMode,
    /// Number of vertices, taken from the `POSITION` accessor when present.
    pub vertex_count: u32,
    pub index: Option<IndexBinding>,
    pub material: Option<usize>,
    /// Model-space bounds, already moved by the owning node's load-time
    /// global transform.
    pub bounds: BoundingBox,
    pub attributes: SmallVec<[AttributeSlot; 6]>,
}

impl Primitive {
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Element count for the draw call.
    #[must_use]
    pub fn draw_count(&self) -> u32 {
        self.index.map_or(self.vertex_count, |index| index.count)
    }

    #[must_use]
    pub fn has_attribute(&self, slot: AttributeSlot) -> bool {
        self.attributes.contains(&slot)
    }
}
