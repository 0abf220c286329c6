use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use wgpu::util::DeviceExt;

use super::{BufferHandle, GpuBackend, TextureHandle, VertexArrayHandle};
use crate::primitive::{AttributeBinding, IndexBinding};
use crate::texture::{DecodedImage, TextureRequest, TextureSignature};
use xenon_core::{Result, XenonError};

/// One vertex attribute expressed as a wgpu vertex buffer slot.
#[derive(Debug, Clone)]
pub struct WgpuVertexSlot {
    pub buffer: BufferHandle,
    pub byte_offset: u64,
    pub array_stride: u64,
    attribute: [wgpu::VertexAttribute; 1],
}

impl WgpuVertexSlot {
    #[must_use]
    pub fn layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attribute,
        }
    }
}

/// wgpu has no vertex array objects; the bindings are kept so a pipeline can
/// build its vertex state and a pass can set buffers in slot order.
#[derive(Debug, Clone, Default)]
pub struct WgpuVertexArray {
    pub label: Option<String>,
    pub slots: Vec<WgpuVertexSlot>,
    pub index: Option<(BufferHandle, wgpu::IndexFormat, u64)>,
}

impl WgpuVertexArray {
    #[must_use]
    pub fn layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.slots.iter().map(WgpuVertexSlot::layout).collect()
    }
}

#[derive(Debug)]
pub struct WgpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// [`GpuBackend`] over a wgpu device and queue.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    buffers: SlotMap<BufferHandle, wgpu::Buffer>,
    vertex_arrays: SlotMap<VertexArrayHandle, WgpuVertexArray>,
    textures: SlotMap<TextureHandle, WgpuTexture>,
    texture_cache: FxHashMap<TextureSignature, TextureHandle>,
}

impl WgpuBackend {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            buffers: SlotMap::with_key(),
            vertex_arrays: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            texture_cache: FxHashMap::default(),
        }
    }

    /// Opens the default adapter without a surface, for tools and tests.
    pub fn request_headless() -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| XenonError::BackendError(e.to_string()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Xenon Device"),
            ..Default::default()
        }))
        .map_err(|e| XenonError::BackendError(e.to_string()))?;

        Ok(Self::new(device, queue))
    }

    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[must_use]
    pub fn buffer(&self, buffer: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(buffer)
    }

    #[must_use]
    pub fn vertex_array(&self, vertex_array: VertexArrayHandle) -> Option<&WgpuVertexArray> {
        self.vertex_arrays.get(vertex_array)
    }

    #[must_use]
    pub fn texture(&self, texture: TextureHandle) -> Option<&WgpuTexture> {
        self.textures.get(texture)
    }
}

impl GpuBackend for WgpuBackend {
    fn upload_buffer(&mut self, label: Option<&str>, data: &[u8]) -> BufferHandle {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label,
            contents: data,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });
        self.buffers.insert(buffer)
    }

    fn create_vertex_array(&mut self, label: Option<&str>) -> VertexArrayHandle {
        self.vertex_arrays.insert(WgpuVertexArray {
            label: label.map(str::to_owned),
            ..Default::default()
        })
    }

    fn bind_attribute(&mut self, vertex_array: VertexArrayHandle, binding: &AttributeBinding) {
        let Some(format) = binding.vertex_format() else {
            log::warn!(
                "No wgpu vertex format for {:?} ({:?} x{}, normalized: {})",
                binding.slot,
                binding.component_type,
                binding.components,
                binding.normalized
            );
            return;
        };
        let Some(record) = self.vertex_arrays.get_mut(vertex_array) else {
            log::warn!("bind_attribute on unknown vertex array {vertex_array:?}");
            return;
        };

        record.slots.push(WgpuVertexSlot {
            buffer: binding.buffer,
            byte_offset: binding.byte_offset,
            array_stride: u64::from(binding.byte_stride),
            attribute: [wgpu::VertexAttribute {
                format,
                offset: 0,
                shader_location: binding.slot.shader_location(),
            }],
        });
    }

    fn bind_index_buffer(&mut self, vertex_array: VertexArrayHandle, binding: &IndexBinding) {
        let Some(format) = binding.format.to_wgpu() else {
            log::warn!("8-bit indices are not drawable with wgpu; index buffer not bound");
            return;
        };
        if let Some(record) = self.vertex_arrays.get_mut(vertex_array) {
            record.index = Some((binding.buffer, format, binding.byte_offset));
        } else {
            log::warn!("bind_index_buffer on unknown vertex array {vertex_array:?}");
        }
    }

    fn cached_texture(&self, signature: &TextureSignature) -> Option<TextureHandle> {
        self.texture_cache
            .get(signature)
            .copied()
            .filter(|handle| self.textures.contains_key(*handle))
    }

    fn create_texture(&mut self, request: &TextureRequest<'_>, image: &DecodedImage) -> TextureHandle {
        let format = if request.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: request.label,
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let params = request.sampler;
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: request.label,
            address_mode_u: params.address_mode_u,
            address_mode_v: params.address_mode_v,
            mag_filter: params.mag_filter,
            min_filter: params.min_filter,
            mipmap_filter: params.mipmap_filter,
            ..Default::default()
        });

        let handle = self.textures.insert(WgpuTexture { texture, view, sampler });
        self.texture_cache.insert(request.signature, handle);
        handle
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        match self.buffers.remove(buffer) {
            Some(buffer) => buffer.destroy(),
            None => log::warn!("Release of stale buffer handle {buffer:?}"),
        }
    }

    fn release_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if self.vertex_arrays.remove(vertex_array).is_none() {
            log::warn!("Release of stale vertex array handle {vertex_array:?}");
        }
    }
}
