use std::ops::Range;

use glam::{Mat4, Vec3};
use xenon_animation::Animation;
use xenon_core::math::compose_trs;
use xenon_resources::primitives::{Facing, ShapeGeometry, create_box, create_plane};
use xenon_resources::{BoundingBox, BufferHandle, GpuBackend, Material, Primitive};

/// Contiguous slice of [`Model::primitives`] owned by one node's mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveRange {
    pub start: usize,
    pub count: usize,
}

impl PrimitiveRange {
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }
}

/// One node of the flattened hierarchy.
///
/// Nodes are stored parent-first: `parent`, when present, is always smaller
/// than the node's own index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelNode {
    pub parent: Option<usize>,
    pub primitives: Option<PrimitiveRange>,
    pub skin: Option<usize>,
    pub name: String,
    /// Index of the node in the source document, if it came from one.
    pub source_index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skin {
    pub name: String,
    /// Dense node indices, one per joint.
    pub joints: Vec<usize>,
    pub skeleton: Option<usize>,
    /// One per joint.
    pub inverse_bind_matrices: Vec<Mat4>,
}

/// A loaded or generated model. Immutable after construction.
///
/// The model owns the vertex arrays of its primitives and the buffers they
/// read from; [`Model::release`] frees them. Textures belong to the backend's
/// texture cache and are not released here.
///
/// A model has exactly one owner of its GPU handles; share it through `Arc`.
///
/// ```compile_fail
/// fn second_owner(model: &xenon_scene::Model) -> xenon_scene::Model {
///     Clone::clone(model)
/// }
/// ```
#[derive(Debug, Default)]
pub struct Model {
    pub name: String,
    pub nodes: Vec<ModelNode>,
    pub local_transforms: Vec<Mat4>,
    pub primitives: Vec<Primitive>,
    pub materials: Vec<Material>,
    pub skins: Vec<Skin>,
    pub animations: Vec<Animation>,
    pub bounds: BoundingBox,
    pub buffers: Vec<BufferHandle>,
}

impl Model {
    #[must_use]
    pub fn node_primitives(&self, node: usize) -> &[Primitive] {
        self.nodes
            .get(node)
            .and_then(|n| n.primitives)
            .and_then(|range| self.primitives.get(range.range()))
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }

    #[must_use]
    pub fn find_animation(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|animation| animation.name == name)
    }

    /// Frees every GPU object the model owns.
    ///
    /// Consumes the model, so a model can only ever be released once.
    pub fn release(self, backend: &mut dyn GpuBackend) {
        for primitive in &self.primitives {
            backend.release_vertex_array(primitive.vertex_array);
        }
        for buffer in self.buffers {
            backend.release_buffer(buffer);
        }
        log::debug!("Released model '{}'", self.name);
    }

    /// A `2 × 2` quad scaled to `width × height`, turned to face `facing`.
    pub fn plane(width: f32, height: f32, facing: Facing, backend: &mut dyn GpuBackend) -> Self {
        let transform = compose_trs(Vec3::ZERO, facing.rotation(), Vec3::new(width, height, 1.0));
        Self::from_shape("plane", &create_plane(), transform, backend)
    }

    /// A `2 × 2 × 2` cube scaled by `size`.
    pub fn cube(size: Vec3, backend: &mut dyn GpuBackend) -> Self {
        Self::from_shape("cube", &create_box(), Mat4::from_scale(size), backend)
    }

    fn from_shape(name: &str, shape: &ShapeGeometry, transform: Mat4, backend: &mut dyn GpuBackend) -> Self {
        let mut uploaded = shape.upload(backend, name);
        uploaded.primitive.bounds = uploaded.primitive.bounds.transform(&transform);

        Self {
            name: name.to_owned(),
            nodes: vec![ModelNode {
                name: name.to_owned(),
                primitives: Some(PrimitiveRange { start: 0, count: 1 }),
                ..Default::default()
            }],
            local_transforms: vec![transform],
            bounds: uploaded.primitive.bounds,
            primitives: vec![uploaded.primitive],
            materials: vec![Material::default()],
            buffers: uploaded.buffers,
            ..Default::default()
        }
    }
}
