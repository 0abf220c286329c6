//! In-memory glTF document builder shared by the integration tests.
#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

const FLOAT: u32 = 5126;
const UNSIGNED_SHORT: u32 = 5123;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Accumulates binary data and the matching `bufferViews` / `accessors`.
#[derive(Default)]
pub struct GltfBuilder {
    bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes as a new buffer view, 4-byte aligned.
    pub fn view(&mut self, bytes: &[u8]) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        self.views.push(json!({ "buffer": 0, "byteOffset": offset, "byteLength": bytes.len() }));
        self.views.len() - 1
    }

    /// Overwrites the `byteOffset` of an existing view.
    pub fn set_view_offset(&mut self, view: usize, offset: u64) {
        self.views[view]["byteOffset"] = json!(offset);
    }

    fn accessor(&mut self, bytes: &[u8], component_type: u32, count: usize, kind: &str, extra: Value) -> usize {
        let view = self.view(bytes);
        let mut accessor = json!({
            "bufferView": view,
            "componentType": component_type,
            "count": count,
            "type": kind,
        });
        if let (Some(target), Some(extra)) = (accessor.as_object_mut(), extra.as_object()) {
            target.extend(extra.clone());
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// `VEC3` float positions with `min`/`max`.
    pub fn positions(&mut self, points: &[[f32; 3]]) -> usize {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in points {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        self.accessor(
            bytemuck::cast_slice(points),
            FLOAT,
            points.len(),
            "VEC3",
            json!({ "min": min, "max": max }),
        )
    }

    /// `VEC3` float data without bounds.
    pub fn vec3(&mut self, values: &[[f32; 3]]) -> usize {
        self.accessor(bytemuck::cast_slice(values), FLOAT, values.len(), "VEC3", json!({}))
    }

    pub fn vec2(&mut self, values: &[[f32; 2]]) -> usize {
        self.accessor(bytemuck::cast_slice(values), FLOAT, values.len(), "VEC2", json!({}))
    }

    pub fn vec4(&mut self, values: &[[f32; 4]]) -> usize {
        self.accessor(bytemuck::cast_slice(values), FLOAT, values.len(), "VEC4", json!({}))
    }

    /// `SCALAR` floats with `min`/`max`, as animation inputs carry.
    pub fn scalars(&mut self, values: &[f32]) -> usize {
        let min = values.iter().copied().fold(f32::MAX, f32::min);
        let max = values.iter().copied().fold(f32::MIN, f32::max);
        self.accessor(
            bytemuck::cast_slice(values),
            FLOAT,
            values.len(),
            "SCALAR",
            json!({ "min": [min], "max": [max] }),
        )
    }

    /// `SCALAR` floats without bounds, for animation outputs.
    pub fn floats(&mut self, values: &[f32]) -> usize {
        self.accessor(bytemuck::cast_slice(values), FLOAT, values.len(), "SCALAR", json!({}))
    }

    pub fn mat4(&mut self, matrices: &[[f32; 16]]) -> usize {
        self.accessor(bytemuck::cast_slice(matrices), FLOAT, matrices.len(), "MAT4", json!({}))
    }

    pub fn indices(&mut self, indices: &[u16]) -> usize {
        self.accessor(bytemuck::cast_slice(indices), UNSIGNED_SHORT, indices.len(), "SCALAR", json!({}))
    }

    fn document(&self, mut document: Value, buffer: Value) -> Value {
        if let Some(root) = document.as_object_mut() {
            root.insert("asset".into(), json!({ "version": "2.0" }));
            if !self.bin.is_empty() {
                root.insert("buffers".into(), json!([buffer]));
                root.insert("bufferViews".into(), Value::Array(self.views.clone()));
                root.insert("accessors".into(), Value::Array(self.accessors.clone()));
            }
        }
        document
    }

    /// Binary container with the data in the `BIN` chunk.
    pub fn glb(&self, document: Value) -> Vec<u8> {
        let document = self.document(document, json!({ "byteLength": self.bin.len() }));
        encode_glb(&serde_json::to_vec(&document).unwrap(), &self.bin)
    }

    /// JSON document with the data embedded as a base64 `data:` URI.
    pub fn gltf_with_data_uri(&self, document: Value) -> Vec<u8> {
        let uri = format!("data:application/octet-stream;base64,{}", STANDARD.encode(&self.bin));
        let document = self.document(document, json!({ "byteLength": self.bin.len(), "uri": uri }));
        serde_json::to_vec(&document).unwrap()
    }

    /// JSON document referencing `bin_name`, plus the bytes to store there.
    pub fn gltf_with_external_buffer(&self, document: Value, bin_name: &str) -> (Vec<u8>, Vec<u8>) {
        let document = self.document(document, json!({ "byteLength": self.bin.len(), "uri": bin_name }));
        (serde_json::to_vec(&document).unwrap(), self.bin.clone())
    }
}

/// Packs a GLB container: 12-byte header, space-padded `JSON` chunk and an
/// optional zero-padded `BIN` chunk.
pub fn encode_glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let mut json = json.to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let bin_chunk_len = if bin.is_empty() { 0 } else { 8 + bin.len() };
    let total = 12 + 8 + json.len() + bin_chunk_len;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    if !bin.is_empty() {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
    }
    out
}

pub const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

/// One indexed triangle as mesh 0, referenced by `node`.
pub fn triangle_mesh(builder: &mut GltfBuilder) -> Value {
    let position = builder.positions(&TRIANGLE);
    let indices = builder.indices(&[0, 1, 2]);
    json!({ "primitives": [{ "attributes": { "POSITION": position }, "indices": indices }] })
}

/// A 1x1 opaque red PNG.
pub fn red_png() -> Vec<u8> {
    let pixel = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    pixel.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Column-major array of `m`.
pub fn cols(m: glam::Mat4) -> [f32; 16] {
    m.to_cols_array()
}
