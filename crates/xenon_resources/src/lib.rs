//! GPU-facing resources.
//!
//! Everything a loaded model hands to the GPU is described here: bounding
//! volumes, vertex attribute and index bindings, draw primitives, materials
//! and texture requests. The [`backend::GpuBackend`] trait is the only seam
//! through which these descriptors reach a graphics API.

pub mod backend;
pub mod bounds;
pub mod material;
pub mod primitive;
pub mod primitives;
pub mod texture;

pub use backend::{BufferHandle, GpuBackend, HeadlessBackend, TextureHandle, VertexArrayHandle};
#[cfg(feature = "wgpu-backend")]
pub use backend::WgpuBackend;
pub use bounds::BoundingBox;
pub use material::{AlphaMode, Material, TextureSlot};
pub use primitive::{
    AttributeBinding, AttributeSlot, ComponentType, IndexBinding, IndexFormat, Primitive,
    PrimitiveMode,
};
pub use texture::{DecodedImage, ImageSource, SamplerParams, TexturePurpose, TextureRequest, TextureSignature};
