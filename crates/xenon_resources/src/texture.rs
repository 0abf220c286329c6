//! Texture requests.
//!
//! The loader never creates textures itself. It describes what it needs with
//! a [`TextureSignature`] plus sampler state and lets the backend decide
//! whether an identical texture already exists.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// What a texture is used for inside a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexturePurpose {
    BaseColor,
    MetallicRoughness,
    Normal,
    Occlusion,
    Emissive,
}

impl TexturePurpose {
    /// Color data is authored in sRGB; everything else is linear.
    #[must_use]
    pub const fn is_color(self) -> bool {
        matches!(self, TexturePurpose::BaseColor | TexturePurpose::Emissive)
    }
}

impl fmt::Display for TexturePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TexturePurpose::BaseColor => "base_color",
            TexturePurpose::MetallicRoughness => "metallic_roughness",
            TexturePurpose::Normal => "normal",
            TexturePurpose::Occlusion => "occlusion",
            TexturePurpose::Emissive => "emissive",
        };
        f.write_str(name)
    }
}

/// Identity of a texture across loads.
///
/// `document` is a stable key of the source document (derived from its path,
/// or from its bytes for in-memory loads). Two requests with equal
/// signatures may share one GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSignature {
    pub document: Uuid,
    pub texture_index: usize,
    pub purpose: TexturePurpose,
}

impl TextureSignature {
    #[must_use]
    pub fn new(document: Uuid, texture_index: usize, purpose: TexturePurpose) -> Self {
        Self { document, texture_index, purpose }
    }

    /// Document key for a file on disk.
    #[must_use]
    pub fn document_key_for_path(path: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, path.as_bytes())
    }

    /// Document key for an in-memory document, derived from its contents.
    #[must_use]
    pub fn document_key_for_bytes(bytes: &[u8]) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerParams {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::MipmapFilterMode,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
        }
    }
}

/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self { width, height, pixels }
    }
}

/// Everything a backend needs to produce a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRequest<'a> {
    pub signature: TextureSignature,
    pub sampler: SamplerParams,
    /// Upload as an sRGB format.
    pub srgb: bool,
    pub label: Option<&'a str>,
}

/// Lazily produces pixels for a request. Only called on a cache miss.
pub type ImageSource<'a> = dyn FnMut() -> Option<Arc<DecodedImage>> + 'a;
