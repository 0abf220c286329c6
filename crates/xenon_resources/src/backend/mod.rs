//! GPU backend seam.
//!
//! Loaders and procedural shapes talk to the graphics API exclusively through
//! [`GpuBackend`]. Handles are slotmap keys owned by the backend; a released
//! handle becomes stale and is rejected with a warning if used again.

mod headless;
#[cfg(feature = "wgpu-backend")]
mod wgpu_backend;

use std::sync::Arc;

use slotmap::new_key_type;

use crate::primitive::{AttributeBinding, IndexBinding};
use crate::texture::{DecodedImage, ImageSource, TextureRequest, TextureSignature};

pub use headless::{HeadlessBackend, HeadlessTexture, HeadlessVertexArray};
#[cfg(feature = "wgpu-backend")]
pub use wgpu_backend::{WgpuBackend, WgpuTexture, WgpuVertexArray, WgpuVertexSlot};

new_key_type! {
    pub struct BufferHandle;
    pub struct VertexArrayHandle;
    pub struct TextureHandle;
}

pub trait GpuBackend {
    /// Copies `data` into a new GPU buffer usable as vertex or index input.
    fn upload_buffer(&mut self, label: Option<&str>, data: &[u8]) -> BufferHandle;

    fn create_vertex_array(&mut self, label: Option<&str>) -> VertexArrayHandle;

    fn bind_attribute(&mut self, vertex_array: VertexArrayHandle, binding: &AttributeBinding);

    fn bind_index_buffer(&mut self, vertex_array: VertexArrayHandle, binding: &IndexBinding);

    /// Looks up a texture previously created for an equal signature.
    fn cached_texture(&self, signature: &TextureSignature) -> Option<TextureHandle>;

    /// Creates a texture and records it under the request's signature.
    fn create_texture(&mut self, request: &TextureRequest<'_>, image: &DecodedImage) -> TextureHandle;

    fn release_buffer(&mut self, buffer: BufferHandle);

    fn release_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Returns the texture for `request`, creating it on a cache miss.
    ///
    /// `image` is only invoked on a miss. `None` from it means the pixels
    /// could not be produced, and no texture is created.
    fn resolve_texture(
        &mut self,
        request: &TextureRequest<'_>,
        image: &mut ImageSource<'_>,
    ) -> Option<TextureHandle> {
        if let Some(handle) = self.cached_texture(&request.signature) {
            log::trace!("Texture cache hit: {:?}", request.signature);
            return Some(handle);
        }
        let decoded: Arc<DecodedImage> = image()?;
        Some(self.create_texture(request, &decoded))
    }
}
