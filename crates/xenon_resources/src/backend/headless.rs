use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use super::{BufferHandle, GpuBackend, TextureHandle, VertexArrayHandle};
use crate::primitive::{AttributeBinding, AttributeSlot, IndexBinding};
use crate::texture::{DecodedImage, SamplerParams, TextureRequest, TextureSignature};

#[derive(Debug, Clone)]
struct BufferRecord {
    label: Option<String>,
    data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessVertexArray {
    pub label: Option<String>,
    pub attributes: SmallVec<[AttributeBinding; 6]>,
    pub index: Option<IndexBinding>,
}

impl HeadlessVertexArray {
    #[must_use]
    pub fn attribute(&self, slot: AttributeSlot) -> Option<&AttributeBinding> {
        self.attributes.iter().find(|binding| binding.slot == slot)
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    pub signature: TextureSignature,
    pub sampler: SamplerParams,
    pub srgb: bool,
    pub width: u32,
    pub height: u32,
}

/// CPU-side backend that records every call.
///
/// Used by tests and offline tools: buffers keep their bytes, vertex arrays
/// keep their bindings, and textures keep their metadata, so callers can
/// inspect exactly what a load produced.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    buffers: SlotMap<BufferHandle, BufferRecord>,
    vertex_arrays: SlotMap<VertexArrayHandle, HeadlessVertexArray>,
    textures: SlotMap<TextureHandle, HeadlessTexture>,
    texture_cache: FxHashMap<TextureSignature, TextureHandle>,

    buffers_uploaded: usize,
    textures_created: usize,
    stale_releases: usize,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Total number of `upload_buffer` calls, released buffers included.
    #[must_use]
    pub fn buffers_uploaded(&self) -> usize {
        self.buffers_uploaded
    }

    #[must_use]
    pub fn textures_created(&self) -> usize {
        self.textures_created
    }

    /// Releases of handles that were already released or never existed.
    #[must_use]
    pub fn stale_releases(&self) -> usize {
        self.stale_releases
    }

    #[must_use]
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(buffer).map(|record| record.data.as_slice())
    }

    #[must_use]
    pub fn buffer_label(&self, buffer: BufferHandle) -> Option<&str> {
        self.buffers.get(buffer).and_then(|record| record.label.as_deref())
    }

    #[must_use]
    pub fn vertex_array(&self, vertex_array: VertexArrayHandle) -> Option<&HeadlessVertexArray> {
        self.vertex_arrays.get(vertex_array)
    }

    #[must_use]
    pub fn texture(&self, texture: TextureHandle) -> Option<&HeadlessTexture> {
        self.textures.get(texture)
    }

    /// Reads `count` elements of an `f32` attribute back from its buffer.
    #[must_use]
    pub fn read_f32_attribute<const N: usize>(&self, binding: &AttributeBinding) -> Option<Vec<[f32; N]>> {
        let data = self.buffer_data(binding.buffer)?;
        let mut out = Vec::with_capacity(binding.count as usize);
        for i in 0..binding.count as usize {
            let start = binding.byte_offset as usize + i * binding.byte_stride as usize;
            let bytes = data.get(start..start + N * 4)?;
            let mut element = [0.0f32; N];
            for (c, chunk) in bytes.chunks_exact(4).enumerate() {
                element[c] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            }
            out.push(element);
        }
        Some(out)
    }
}

impl GpuBackend for HeadlessBackend {
    fn upload_buffer(&mut self, label: Option<&str>, data: &[u8]) -> BufferHandle {
        self.buffers_uploaded += 1;
        self.buffers.insert(BufferRecord {
            label: label.map(str::to_owned),
            data: data.to_vec(),
        })
    }

    fn create_vertex_array(&mut self, label: Option<&str>) -> VertexArrayHandle {
        self.vertex_arrays.insert(HeadlessVertexArray {
            label: label.map(str::to_owned),
            ..Default::default()
        })
    }

    fn bind_attribute(&mut self, vertex_array: VertexArrayHandle, binding: &AttributeBinding) {
        let Some(record) = self.vertex_arrays.get_mut(vertex_array) else {
            log::warn!("bind_attribute on unknown vertex array {vertex_array:?}");
            return;
        };
        if !self.buffers.contains_key(binding.buffer) {
            log::warn!("Attribute {:?} bound to unknown buffer {:?}", binding.slot, binding.buffer);
        }
        record.attributes.retain(|existing| existing.slot != binding.slot);
        record.attributes.push(*binding);
    }

    fn bind_index_buffer(&mut self, vertex_array: VertexArrayHandle, binding: &IndexBinding) {
        let Some(record) = self.vertex_arrays.get_mut(vertex_array) else {
            log::warn!("bind_index_buffer on unknown vertex array {vertex_array:?}");
            return;
        };
        record.index = Some(*binding);
    }

    fn cached_texture(&self, signature: &TextureSignature) -> Option<TextureHandle> {
        self.texture_cache
            .get(signature)
            .copied()
            .filter(|handle| self.textures.contains_key(*handle))
    }

    fn create_texture(&mut self, request: &TextureRequest<'_>, image: &DecodedImage) -> TextureHandle {
        self.textures_created += 1;
        let handle = self.textures.insert(HeadlessTexture {
            signature: request.signature,
            sampler: request.sampler,
            srgb: request.srgb,
            width: image.width,
            height: image.height,
        });
        self.texture_cache.insert(request.signature, handle);
        handle
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(buffer).is_none() {
            self.stale_releases += 1;
            log::warn!("Release of stale buffer handle {buffer:?}");
        }
    }

    fn release_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if self.vertex_arrays.remove(vertex_array).is_none() {
            self.stale_releases += 1;
            log::warn!("Release of stale vertex array handle {vertex_array:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TexturePurpose;
    use std::sync::Arc;
    use uuid::Uuid;

    #[test]
    fn double_release_is_counted_not_applied() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.upload_buffer(Some("vb"), &[1, 2, 3, 4]);
        assert_eq!(backend.live_buffers(), 1);

        backend.release_buffer(buffer);
        backend.release_buffer(buffer);
        assert_eq!(backend.live_buffers(), 0);
        assert_eq!(backend.stale_releases(), 1);
    }

    #[test]
    fn resolve_texture_decodes_only_on_miss() {
        let mut backend = HeadlessBackend::new();
        let request = TextureRequest {
            signature: TextureSignature::new(Uuid::nil(), 0, TexturePurpose::BaseColor),
            sampler: SamplerParams::default(),
            srgb: true,
            label: None,
        };

        let mut decodes = 0;
        let mut source = || {
            decodes += 1;
            Some(Arc::new(DecodedImage::new(1, 1, vec![255; 4])))
        };

        let first = backend.resolve_texture(&request, &mut source);
        let second = backend.resolve_texture(&request, &mut source);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(decodes, 1);
        assert_eq!(backend.textures_created(), 1);
    }

    #[test]
    fn undecodable_image_yields_no_texture() {
        let mut backend = HeadlessBackend::new();
        let request = TextureRequest {
            signature: TextureSignature::new(Uuid::nil(), 3, TexturePurpose::Normal),
            sampler: SamplerParams::default(),
            srgb: false,
            label: None,
        };
        assert!(backend.resolve_texture(&request, &mut || -> Option<Arc<DecodedImage>> { None }).is_none());
        assert_eq!(backend.live_textures(), 0);
    }
}
