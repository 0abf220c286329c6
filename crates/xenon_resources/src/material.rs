use glam::{Vec3, Vec4};

use crate::backend::TextureHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// A resolved texture reference inside a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSlot {
    pub texture: TextureHandle,
    /// Which `TEXCOORD_n` set the texture samples.
    pub tex_coord: u32,
}

/// Metallic-roughness material.
///
/// Textures are owned by the backend's texture cache, so a material only
/// holds handles and never releases them.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,

    pub base_color_factor: Vec4,
    pub base_color_texture: Option<TextureSlot>,

    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureSlot>,

    pub normal_texture: Option<TextureSlot>,
    pub normal_scale: f32,

    pub occlusion_texture: Option<TextureSlot>,
    pub occlusion_strength: f32,

    pub emissive_texture: Option<TextureSlot>,
    pub emissive_factor: Vec3,

    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color_factor: Vec4::ONE,
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            normal_texture: None,
            normal_scale: 1.0,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            emissive_texture: None,
            emissive_factor: Vec3::ZERO,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

impl Material {
    #[must_use]
    pub fn textures(&self) -> impl Iterator<Item = &TextureSlot> {
        [
            &self.base_color_texture,
            &self.metallic_roughness_texture,
            &self.normal_texture,
            &self.occlusion_texture,
            &self.emissive_texture,
        ]
        .into_iter()
        .flatten()
    }
}
