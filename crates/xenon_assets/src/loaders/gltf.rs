//! glTF 2.0 / GLB loader.
//!
//! Produces a self-contained [`Model`]: nodes in dense parent-first order,
//! primitives bound to backend vertex arrays, materials with resolved
//! textures, skins with dense joint indices and per-node animation tracks.
//!
//! Recoverable problems (unsupported attributes, undecodable images, morph
//! weight channels) are logged and skipped. Anything that leaves the model
//! unusable aborts the load, releases what was already uploaded and returns
//! an error.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use uuid::Uuid;

use xenon_animation::{Animation, Interpolation, Keyframe, MorphWeights, Tangents};
use xenon_core::math::compose_trs;
use xenon_core::{Result, XenonError};
use xenon_resources::{
    AlphaMode, AttributeBinding, AttributeSlot, BoundingBox, BufferHandle, ComponentType,
    DecodedImage, GpuBackend, IndexBinding, IndexFormat, Material, Primitive, PrimitiveMode,
    SamplerParams, TexturePurpose, TextureRequest, TextureSignature, TextureSlot,
};
use xenon_scene::{Model, ModelNode, PrimitiveRange, Skin};

use crate::io::{self, AssetReader, FileAssetReader};
use crate::settings::{LoaderSettings, SceneSelection};

type ImageCache = FxHashMap<usize, Option<Arc<DecodedImage>>>;

/// Loads the glTF or GLB document at `path`.
///
/// External buffers and images resolve relative to the document's directory.
pub fn load_model(
    path: impl AsRef<Path>,
    backend: &mut dyn GpuBackend,
    settings: &LoaderSettings,
) -> Result<Model> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).inspect_err(|e| {
        log::error!("Failed to read model '{}': {e}", path.display());
    })?;

    let name = path
        .file_stem()
        .map_or_else(|| "model".to_owned(), |stem| stem.to_string_lossy().into_owned());
    let document_key = TextureSignature::document_key_for_path(&path.to_string_lossy());
    let reader = FileAssetReader::new(path.parent().unwrap_or(Path::new(".")));

    GltfLoader::load(&bytes, &name, document_key, &reader, backend, settings)
}

/// Loads a document held in memory. Relative URIs resolve against `base_dir`.
pub fn load_model_from_slice(
    bytes: &[u8],
    base_dir: impl AsRef<Path>,
    backend: &mut dyn GpuBackend,
    settings: &LoaderSettings,
) -> Result<Model> {
    let document_key = TextureSignature::document_key_for_bytes(bytes);
    let reader = FileAssetReader::new(base_dir);
    GltfLoader::load(bytes, "memory", document_key, &reader, backend, settings)
}

// ============================================================================
// Loader state
// ============================================================================

pub struct GltfLoader<'a> {
    backend: &'a mut dyn GpuBackend,
    settings: &'a LoaderSettings,
    reader: &'a dyn AssetReader,
    /// Distinguishes this document's textures in the backend cache.
    document_key: Uuid,
    label: String,

    buffers: Vec<Vec<u8>>,
    view_buffers: Vec<Option<BufferHandle>>,
    images: ImageCache,

    /// Document node index -> dense model node index.
    node_map: Vec<Option<usize>>,
    /// Document skin index -> dense model skin index.
    skin_map: FxHashMap<usize, usize>,

    model: Model,
}

impl<'a> GltfLoader<'a> {
    /// Parses `bytes` and builds a model through `backend`.
    ///
    /// On failure every buffer and vertex array created so far is released
    /// before the error is returned.
    pub fn load(
        bytes: &[u8],
        name: &str,
        document_key: Uuid,
        reader: &'a dyn AssetReader,
        backend: &'a mut dyn GpuBackend,
        settings: &'a LoaderSettings,
    ) -> Result<Model> {
        let result = Self::parse(bytes, settings).and_then(|gltf::Gltf { document, blob }| {
            let buffers = io::load_buffers(&document, blob, reader)?;
            let mut loader = Self {
                backend,
                settings,
                reader,
                document_key,
                label: name.to_owned(),
                buffers,
                view_buffers: vec![None; document.views().count()],
                images: ImageCache::default(),
                node_map: vec![None; document.nodes().count()],
                skin_map: FxHashMap::default(),
                model: Model { name: name.to_owned(), ..Default::default() },
            };

            match loader.build(&document) {
                Ok(()) => Ok(loader.model),
                Err(e) => {
                    std::mem::take(&mut loader.model).release(loader.backend);
                    Err(e)
                }
            }
        });

        match &result {
            Ok(model) => log::debug!(
                "Loaded model '{name}': {} nodes, {} primitives, {} materials, {} skins, {} animations",
                model.nodes.len(),
                model.primitives.len(),
                model.materials.len(),
                model.skins.len(),
                model.animations.len()
            ),
            Err(e) => log::error!("Failed to load model '{name}': {e}"),
        }
        result
    }

    fn parse(bytes: &[u8], settings: &LoaderSettings) -> Result<gltf::Gltf> {
        let parsed = if settings.validate {
            gltf::Gltf::from_slice(bytes)
        } else {
            gltf::Gltf::from_slice_without_validation(bytes)
        };
        parsed.map_err(|e| XenonError::GltfError(e.to_string()))
    }

    fn build(&mut self, document: &gltf::Document) -> Result<()> {
        if self.settings.upload_all_buffer_views {
            for view in document.views() {
                self.view_buffer(&view)?;
            }
        }

        self.load_materials(document);

        let roots = self.root_nodes(document)?;
        self.traverse(roots)?;
        self.remap_skins()?;
        self.load_animations(document);
        Ok(())
    }

    // ========================================================================
    // Buffers & views
    // ========================================================================

    /// Returns the GPU buffer for `view`, uploading it on first use.
    fn view_buffer(&mut self, view: &gltf::buffer::View<'_>) -> Result<BufferHandle> {
        if let Some(handle) = self.view_buffers.get(view.index()).copied().flatten() {
            return Ok(handle);
        }

        let bytes = view_bytes(&self.buffers, view)?;
        let label = format!("{} view {}", self.label, view.index());
        let handle = self.backend.upload_buffer(Some(&label), bytes);
        self.model.buffers.push(handle);
        if let Some(slot) = self.view_buffers.get_mut(view.index()) {
            *slot = Some(handle);
        }
        Ok(handle)
    }

    // ========================================================================
    // Materials & textures
    // ========================================================================

    fn load_materials(&mut self, document: &gltf::Document) {
        for material in document.materials() {
            let pbr = material.pbr_metallic_roughness();
            let mut engine_mat = Material {
                name: material.name().unwrap_or_default().to_owned(),
                base_color_factor: Vec4::from_array(pbr.base_color_factor()),
                metallic_factor: pbr.metallic_factor(),
                roughness_factor: pbr.roughness_factor(),
                emissive_factor: Vec3::from_array(material.emissive_factor()),
                alpha_mode: match material.alpha_mode() {
                    gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
                    gltf::material::AlphaMode::Mask => AlphaMode::Mask,
                    gltf::material::AlphaMode::Blend => AlphaMode::Blend,
                },
                alpha_cutoff: material.alpha_cutoff().unwrap_or(0.5),
                double_sided: material.double_sided(),
                ..Default::default()
            };

            if let Some(info) = pbr.base_color_texture() {
                engine_mat.base_color_texture =
                    self.texture_slot(&info.texture(), info.tex_coord(), TexturePurpose::BaseColor);
            }
            if let Some(info) = pbr.metallic_roughness_texture() {
                engine_mat.metallic_roughness_texture = self.texture_slot(
                    &info.texture(),
                    info.tex_coord(),
                    TexturePurpose::MetallicRoughness,
                );
            }
            if let Some(normal) = material.normal_texture() {
                engine_mat.normal_scale = normal.scale();
                engine_mat.normal_texture =
                    self.texture_slot(&normal.texture(), normal.tex_coord(), TexturePurpose::Normal);
            }
            if let Some(occlusion) = material.occlusion_texture() {
                engine_mat.occlusion_strength = occlusion.strength();
                engine_mat.occlusion_texture = self.texture_slot(
                    &occlusion.texture(),
                    occlusion.tex_coord(),
                    TexturePurpose::Occlusion,
                );
            }
            if let Some(info) = material.emissive_texture() {
                engine_mat.emissive_texture =
                    self.texture_slot(&info.texture(), info.tex_coord(), TexturePurpose::Emissive);
            }

            self.model.materials.push(engine_mat);
        }
    }

    fn texture_slot(
        &mut self,
        texture: &gltf::Texture<'_>,
        tex_coord: u32,
        purpose: TexturePurpose,
    ) -> Option<TextureSlot> {
        let request = TextureRequest {
            signature: TextureSignature::new(self.document_key, texture.index(), purpose),
            sampler: sampler_params(&texture.sampler()),
            srgb: purpose.is_color() && self.settings.srgb_color_textures,
            label: texture.name(),
        };

        let source = texture.source();
        let images = &mut self.images;
        let buffers = &self.buffers;
        let reader = self.reader;
        let handle = self
            .backend
            .resolve_texture(&request, &mut || decode_image(images, buffers, reader, &source));

        if handle.is_none() {
            log::warn!(
                "{}: {purpose} texture {} has no usable image, slot left empty",
                self.label,
                texture.index()
            );
        }
        handle.map(|texture| TextureSlot { texture, tex_coord })
    }

    // ========================================================================
    // Node hierarchy
    // ========================================================================

    fn root_nodes<'d>(&self, document: &'d gltf::Document) -> Result<Vec<gltf::Node<'d>>> {
        let scene = match self.settings.scene {
            SceneSelection::Default => document
                .default_scene()
                .filter(|scene| scene.nodes().next().is_some())
                .or_else(|| document.scenes().next()),
            SceneSelection::Index(index) => Some(document.scenes().nth(index).ok_or_else(|| {
                XenonError::IndexOutOfBounds { context: "scene".to_owned(), index }
            })?),
        };

        if let Some(scene) = scene {
            return Ok(scene.nodes().collect());
        }

        log::warn!("{}: document declares no scenes, using every parentless node as a root", self.label);
        let mut is_child = vec![false; document.nodes().count()];
        for node in document.nodes() {
            for child in node.children() {
                if let Some(flag) = is_child.get_mut(child.index()) {
                    *flag = true;
                }
            }
        }
        Ok(document.nodes().filter(|node| !is_child[node.index()]).collect())
    }

    /// Breadth-first walk assigning dense parent-first indices.
    fn traverse(&mut self, roots: Vec<gltf::Node<'_>>) -> Result<()> {
        let mut queue: VecDeque<(Option<usize>, Mat4, gltf::Node<'_>)> =
            roots.into_iter().map(|node| (None, Mat4::IDENTITY, node)).collect();

        while let Some((parent, parent_global, node)) = queue.pop_front() {
            let source = node.index();
            let dense = self.model.nodes.len();
            let Some(slot) = self.node_map.get_mut(source) else {
                return Err(XenonError::DanglingReference {
                    context: "node index outside the document".to_owned(),
                    index: source,
                });
            };
            if slot.is_some() {
                return Err(XenonError::DanglingReference {
                    context: "node reachable through more than one parent".to_owned(),
                    index: source,
                });
            }
            *slot = Some(dense);

            let local = local_transform(&node);
            let global = parent_global * local;

            let primitives = match node.mesh() {
                Some(mesh) => Some(self.load_mesh(&mesh, &global)?),
                None => None,
            };
            let skin = node.skin().map(|skin| self.load_skin(&skin));

            self.model.nodes.push(ModelNode {
                parent,
                primitives,
                skin,
                name: node.name().map_or_else(|| format!("node_{source}"), str::to_owned),
                source_index: Some(source),
            });
            self.model.local_transforms.push(local);

            for child in node.children() {
                queue.push_back((Some(dense), global, child));
            }
        }

        log::trace!("{}: traversed {} nodes", self.label, self.model.nodes.len());
        Ok(())
    }

    // ========================================================================
    // Meshes & primitives
    // ========================================================================

    fn load_mesh(&mut self, mesh: &gltf::Mesh<'_>, global: &Mat4) -> Result<PrimitiveRange> {
        let start = self.model.primitives.len();
        for primitive in mesh.primitives() {
            let loaded = self.load_primitive(mesh, &primitive, global)?;
            self.model.bounds = self.model.bounds.union(&loaded.bounds);
            self.model.primitives.push(loaded);
        }
        Ok(PrimitiveRange { start, count: self.model.primitives.len() - start })
    }

    fn load_primitive(
        &mut self,
        mesh: &gltf::Mesh<'_>,
        primitive: &gltf::Primitive<'_>,
        global: &Mat4,
    ) -> Result<Primitive> {
        let context = format!(
            "{}: mesh '{}' primitive {}",
            self.label,
            mesh.name().unwrap_or_default(),
            primitive.index()
        );

        let mut bindings: SmallVec<[AttributeBinding; 6]> = SmallVec::new();
        let mut bounds = BoundingBox::empty();
        let mut vertex_count = 0;

        for (semantic, accessor) in primitive.attributes() {
            let Some(slot) = attribute_slot(&semantic) else {
                log::warn!("{context}: unsupported attribute {semantic:?} skipped");
                continue;
            };
            let Some(binding) = self.attribute_binding(slot, &accessor)? else {
                log::warn!("{context}: attribute {} has no buffer view, skipped", slot.semantic_name());
                continue;
            };
            if slot == AttributeSlot::Position {
                vertex_count = binding.count;
                bounds = self.position_bounds(primitive, &accessor).transform(global);
            }
            bindings.push(binding);
        }

        let index = match primitive.indices() {
            Some(accessor) => {
                let binding = self.index_binding(&accessor)?;
                if binding.is_none() {
                    log::warn!("{context}: index accessor has no buffer view, drawing non-indexed");
                }
                binding
            }
            None => None,
        };

        let has_position = bindings.iter().any(|b| b.slot == AttributeSlot::Position);
        if index.is_none() && !has_position {
            return Err(XenonError::ContractViolation {
                mesh: mesh.index(),
                primitive: primitive.index(),
            });
        }

        let vertex_array = self.backend.create_vertex_array(Some(&context));
        for binding in &bindings {
            self.backend.bind_attribute(vertex_array, binding);
        }
        if let Some(index) = &index {
            self.backend.bind_index_buffer(vertex_array, index);
        }

        Ok(Primitive {
            vertex_array,
            mode: primitive_mode(primitive.mode()),
            vertex_count,
            index,
            material: primitive.material().index(),
            bounds,
            attributes: bindings.iter().map(|b| b.slot).collect(),
        })
    }

    fn attribute_binding(
        &mut self,
        slot: AttributeSlot,
        accessor: &gltf::Accessor<'_>,
    ) -> Result<Option<AttributeBinding>> {
        let Some(view) = accessor.view() else {
            return Ok(None);
        };
        if accessor.sparse().is_some() {
            log::warn!("{}: sparse accessor {} bound without its sparse overrides", self.label, accessor.index());
        }

        let buffer = self.view_buffer(&view)?;
        Ok(Some(AttributeBinding {
            slot,
            buffer,
            components: accessor.dimensions().multiplicity() as u32,
            component_type: component_type(accessor.data_type()),
            normalized: accessor.normalized(),
            byte_offset: accessor.offset() as u64,
            byte_stride: view.stride().unwrap_or_else(|| accessor.size()) as u32,
            count: accessor.count() as u32,
        }))
    }

    fn index_binding(&mut self, accessor: &gltf::Accessor<'_>) -> Result<Option<IndexBinding>> {
        let Some(view) = accessor.view() else {
            return Ok(None);
        };
        let format = match accessor.data_type() {
            gltf::accessor::DataType::U8 => IndexFormat::U8,
            gltf::accessor::DataType::U16 => IndexFormat::U16,
            gltf::accessor::DataType::U32 => IndexFormat::U32,
            other => {
                return Err(XenonError::GltfError(format!(
                    "index accessor {} has component type {other:?}",
                    accessor.index()
                )));
            }
        };

        let buffer = self.view_buffer(&view)?;
        Ok(Some(IndexBinding {
            buffer,
            format,
            byte_offset: accessor.offset() as u64,
            count: accessor.count() as u32,
        }))
    }

    /// Local-space bounds from the accessor's min/max, or a scan of the
    /// positions when the document omits them.
    fn position_bounds(
        &self,
        primitive: &gltf::Primitive<'_>,
        accessor: &gltf::Accessor<'_>,
    ) -> BoundingBox {
        if let (Some(min), Some(max)) = (
            accessor.min().as_ref().and_then(json_vec3),
            accessor.max().as_ref().and_then(json_vec3),
        ) {
            return BoundingBox::new(min, max);
        }

        log::trace!("{}: accessor {} has no min/max, scanning positions", self.label, accessor.index());
        let reader = primitive.reader(|buffer| self.buffers.get(buffer.index()).map(Vec::as_slice));
        reader
            .read_positions()
            .map(|positions| BoundingBox::from_points(positions.map(Vec3::from_array)))
            .unwrap_or_default()
    }

    // ========================================================================
    // Skins
    // ========================================================================

    /// Registers `skin` on first sight and returns its dense index.
    ///
    /// Joints keep document node indices until [`Self::remap_skins`].
    fn load_skin(&mut self, skin: &gltf::Skin<'_>) -> usize {
        if let Some(&dense) = self.skin_map.get(&skin.index()) {
            return dense;
        }

        let joints: Vec<usize> = skin.joints().map(|joint| joint.index()).collect();
        let reader = skin.reader(|buffer| self.buffers.get(buffer.index()).map(Vec::as_slice));
        let mut inverse_bind_matrices: Vec<Mat4> = reader
            .read_inverse_bind_matrices()
            .map(|matrices| matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_default();

        if inverse_bind_matrices.len() != joints.len() {
            if !inverse_bind_matrices.is_empty() {
                log::warn!(
                    "{}: skin {} has {} inverse bind matrices for {} joints",
                    self.label,
                    skin.index(),
                    inverse_bind_matrices.len(),
                    joints.len()
                );
            }
            inverse_bind_matrices.resize(joints.len(), Mat4::IDENTITY);
        }

        let dense = self.model.skins.len();
        self.model.skins.push(Skin {
            name: skin.name().map_or_else(|| format!("skin_{}", skin.index()), str::to_owned),
            joints,
            skeleton: skin.skeleton().map(|node| node.index()),
            inverse_bind_matrices,
        });
        self.skin_map.insert(skin.index(), dense);
        dense
    }

    fn remap_skins(&mut self) -> Result<()> {
        let node_map = &self.node_map;
        let dense = |source: usize, context: &str| {
            node_map.get(source).copied().flatten().ok_or_else(|| XenonError::DanglingReference {
                context: context.to_owned(),
                index: source,
            })
        };

        for skin in &mut self.model.skins {
            let context = format!("joint of skin '{}' outside the loaded scene", skin.name);
            for joint in &mut skin.joints {
                *joint = dense(*joint, &context)?;
            }
            if let Some(root) = skin.skeleton {
                skin.skeleton = Some(dense(root, &context)?);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Animations
    // ========================================================================

    fn load_animations(&mut self, document: &gltf::Document) {
        for animation in document.animations() {
            let name = animation
                .name()
                .map_or_else(|| format!("animation_{}", animation.index()), str::to_owned);
            let mut clip = Animation::new(name);

            for channel in animation.channels() {
                let target = channel.target();
                let source = target.node().index();
                let Some(node) = self.node_map.get(source).copied().flatten() else {
                    log::warn!(
                        "{}: animation '{}' targets node {source} outside the loaded scene, channel skipped",
                        self.label,
                        clip.name
                    );
                    continue;
                };
                let interpolation = interpolation_mode(&channel.sampler());
                let reader = channel.reader(|buffer| self.buffers.get(buffer.index()).map(Vec::as_slice));
                let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
                    log::warn!("{}: animation '{}' channel has no sampler data", self.label, clip.name);
                    continue;
                };
                let times: Vec<f32> = inputs.collect();

                let tracks = clip.node_mut(node);
                let loaded = match outputs {
                    ReadOutputs::Translations(values) => {
                        build_keyframes(&times, values.map(Vec3::from_array).collect(), interpolation)
                            .map(|keys| tracks.translation = keys)
                    }
                    ReadOutputs::Rotations(values) => build_keyframes(
                        &times,
                        values.into_f32().map(Quat::from_array).collect(),
                        interpolation,
                    )
                    .map(|keys| tracks.rotation = keys),
                    ReadOutputs::Scales(values) => {
                        build_keyframes(&times, values.map(Vec3::from_array).collect(), interpolation)
                            .map(|keys| tracks.scale = keys)
                    }
                    ReadOutputs::MorphTargetWeights(values) => {
                        let flat: Vec<f32> = values.into_f32().collect();
                        group_weights(&flat, times.len(), interpolation)
                            .and_then(|grouped| build_keyframes(&times, grouped, interpolation))
                            .map(|keys| tracks.weights = keys)
                    }
                };

                if loaded.is_none() {
                    log::warn!(
                        "{}: animation '{}' channel for node {source} has mismatched input/output counts, skipped",
                        self.label,
                        clip.name
                    );
                }
            }

            clip.nodes.retain(|_, tracks| !tracks.is_empty());
            clip.recompute_totals();
            if clip.has_weight_tracks() {
                log::warn!(
                    "{}: animation '{}' has morph weight channels, which are parsed but not applied",
                    self.label,
                    clip.name
                );
            }
            log::trace!(
                "{}: animation '{}' with {} keyframes over {:.3}s",
                self.label,
                clip.name,
                clip.key_frames,
                clip.end_time
            );
            self.model.animations.push(clip);
        }
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn view_bytes<'b>(buffers: &'b [Vec<u8>], view: &gltf::buffer::View<'_>) -> Result<&'b [u8]> {
    let index = view.buffer().index();
    let buffer = buffers.get(index).ok_or(XenonError::MissingBuffer { index })?;
    let range = view.offset().checked_add(view.length()).map(|end| view.offset()..end);
    range.and_then(|range| buffer.get(range)).ok_or_else(|| {
        XenonError::GltfError(format!(
            "buffer view {} ({} bytes at {}) exceeds buffer {index}",
            view.index(),
            view.length(),
            view.offset()
        ))
    })
}

/// Decodes an image into RGBA8 once per load, caching failures as `None`.
fn decode_image(
    cache: &mut ImageCache,
    buffers: &[Vec<u8>],
    reader: &dyn AssetReader,
    source_image: &gltf::Image<'_>,
) -> Option<Arc<DecodedImage>> {
    cache
        .entry(source_image.index())
        .or_insert_with(|| {
            let encoded = match source_image.source() {
                gltf::image::Source::View { view, .. } => view_bytes(buffers, &view).map(<[u8]>::to_vec),
                gltf::image::Source::Uri { uri, .. } => io::read_uri(uri, reader),
            };
            let decoded = encoded.and_then(|bytes| {
                image::load_from_memory(&bytes).map_err(|e| XenonError::GltfError(e.to_string()))
            });

            match decoded {
                Ok(img) => {
                    let rgba = img.to_rgba8();
                    Some(Arc::new(DecodedImage::new(rgba.width(), rgba.height(), rgba.into_raw())))
                }
                Err(e) => {
                    log::warn!("Image {} could not be decoded: {e}", source_image.index());
                    None
                }
            }
        })
        .clone()
}

fn sampler_params(sampler: &gltf::texture::Sampler<'_>) -> SamplerParams {
    use gltf::texture::{MagFilter, MinFilter, WrappingMode};

    let address_mode = |mode: WrappingMode| match mode {
        WrappingMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrappingMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrappingMode::Repeat => wgpu::AddressMode::Repeat,
    };
    let (min_filter, mipmap_filter) = match sampler.min_filter() {
        Some(MinFilter::Nearest | MinFilter::NearestMipmapNearest) => {
            (wgpu::FilterMode::Nearest, wgpu::MipmapFilterMode::Nearest)
        }
        Some(MinFilter::NearestMipmapLinear) => (wgpu::FilterMode::Nearest, wgpu::MipmapFilterMode::Linear),
        Some(MinFilter::LinearMipmapNearest) => (wgpu::FilterMode::Linear, wgpu::MipmapFilterMode::Nearest),
        Some(MinFilter::Linear | MinFilter::LinearMipmapLinear) | None => {
            (wgpu::FilterMode::Linear, wgpu::MipmapFilterMode::Linear)
        }
    };

    SamplerParams {
        address_mode_u: address_mode(sampler.wrap_s()),
        address_mode_v: address_mode(sampler.wrap_t()),
        mag_filter: match sampler.mag_filter() {
            Some(MagFilter::Nearest) => wgpu::FilterMode::Nearest,
            Some(MagFilter::Linear) | None => wgpu::FilterMode::Linear,
        },
        min_filter,
        mipmap_filter,
    }
}

fn local_transform(node: &gltf::Node<'_>) -> Mat4 {
    match node.transform() {
        gltf::scene::Transform::Matrix { matrix } => Mat4::from_cols_array_2d(&matrix),
        gltf::scene::Transform::Decomposed { translation, rotation, scale } => compose_trs(
            Vec3::from_array(translation),
            Quat::from_array(rotation),
            Vec3::from_array(scale),
        ),
    }
}

fn attribute_slot(semantic: &gltf::Semantic) -> Option<AttributeSlot> {
    match semantic {
        gltf::Semantic::Positions => Some(AttributeSlot::Position),
        gltf::Semantic::Normals => Some(AttributeSlot::Normal),
        gltf::Semantic::Tangents => Some(AttributeSlot::Tangent),
        gltf::Semantic::TexCoords(0) => Some(AttributeSlot::TexCoord0),
        gltf::Semantic::Joints(0) => Some(AttributeSlot::Joints0),
        gltf::Semantic::Weights(0) => Some(AttributeSlot::Weights0),
        _ => None,
    }
}

fn component_type(data_type: gltf::accessor::DataType) -> ComponentType {
    match data_type {
        gltf::accessor::DataType::I8 => ComponentType::I8,
        gltf::accessor::DataType::U8 => ComponentType::U8,
        gltf::accessor::DataType::I16 => ComponentType::I16,
        gltf::accessor::DataType::U16 => ComponentType::U16,
        gltf::accessor::DataType::U32 => ComponentType::U32,
        gltf::accessor::DataType::F32 => ComponentType::F32,
    }
}

fn primitive_mode(mode: gltf::mesh::Mode) -> PrimitiveMode {
    match mode {
        gltf::mesh::Mode::Points => PrimitiveMode::Points,
        gltf::mesh::Mode::Lines => PrimitiveMode::Lines,
        gltf::mesh::Mode::LineLoop => PrimitiveMode::LineLoop,
        gltf::mesh::Mode::LineStrip => PrimitiveMode::LineStrip,
        gltf::mesh::Mode::Triangles => PrimitiveMode::Triangles,
        gltf::mesh::Mode::TriangleStrip => PrimitiveMode::TriangleStrip,
        gltf::mesh::Mode::TriangleFan => PrimitiveMode::TriangleFan,
    }
}

fn interpolation_mode(sampler: &gltf::animation::Sampler<'_>) -> Interpolation {
    match sampler.interpolation() {
        gltf::animation::Interpolation::Linear => Interpolation::Linear,
        gltf::animation::Interpolation::Step => Interpolation::Step,
        gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
    }
}

/// Pairs sampler inputs with outputs. Cubic-spline outputs come as
/// `(in-tangent, value, out-tangent)` triples per input.
fn build_keyframes<T: Clone>(
    times: &[f32],
    values: Vec<T>,
    interpolation: Interpolation,
) -> Option<Vec<Keyframe<T>>> {
    if interpolation == Interpolation::CubicSpline {
        if values.len() != times.len() * 3 {
            return None;
        }
        let keys = times
            .iter()
            .zip(values.chunks_exact(3))
            .map(|(&time, triple)| Keyframe {
                time,
                value: triple[1].clone(),
                interpolation,
                tangents: Some(Tangents { in_tangent: triple[0].clone(), out_tangent: triple[2].clone() }),
            })
            .collect();
        return Some(keys);
    }

    if values.len() != times.len() {
        return None;
    }
    Some(
        times
            .iter()
            .zip(values)
            .map(|(&time, value)| Keyframe { time, value, interpolation, tangents: None })
            .collect(),
    )
}

/// Splits a flat weight stream into one group per output element.
fn group_weights(flat: &[f32], key_count: usize, interpolation: Interpolation) -> Option<Vec<MorphWeights>> {
    let elements = if interpolation == Interpolation::CubicSpline { key_count * 3 } else { key_count };
    if elements == 0 || flat.len() % elements != 0 {
        return None;
    }
    let targets = flat.len() / elements;
    if targets == 0 {
        return None;
    }
    Some(flat.chunks_exact(targets).map(MorphWeights::from_slice).collect())
}

fn json_vec3(value: &serde_json::Value) -> Option<Vec3> {
    let array = value.as_array()?;
    let component = |i: usize| array.get(i).and_then(serde_json::Value::as_f64).map(|v| v as f32);
    Some(Vec3::new(component(0)?, component(1)?, component(2)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_outputs_split_into_tangent_triples() {
        let times = [0.0, 1.0];
        let values = vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let keys = build_keyframes(&times, values, Interpolation::CubicSpline).unwrap();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].value, 5.0);
        let tangents = keys[1].tangents.unwrap();
        assert_eq!((tangents.in_tangent, tangents.out_tangent), (4.0, 6.0));
    }

    #[test]
    fn mismatched_sampler_counts_are_rejected() {
        assert!(build_keyframes(&[0.0, 1.0], vec![1.0_f32], Interpolation::Linear).is_none());
        assert!(build_keyframes(&[0.0], vec![1.0_f32, 2.0], Interpolation::CubicSpline).is_none());
    }

    #[test]
    fn weights_group_per_keyframe() {
        let grouped = group_weights(&[0.0, 1.0, 0.5, 0.5], 2, Interpolation::Linear).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[1].as_slice(), &[0.5, 0.5]);
    }

    #[test]
    fn accessor_bounds_read_from_json() {
        let value = serde_json::json!([-1.0, 0.5, 2]);
        assert_eq!(json_vec3(&value), Some(Vec3::new(-1.0, 0.5, 2.0)));
        assert_eq!(json_vec3(&serde_json::json!([1.0])), None);
    }
}
