//! Byte sources for documents, buffers and images.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use xenon_core::{Result, XenonError};

/// Reads resources referenced by relative URI.
pub trait AssetReader {
    fn read_bytes(&self, uri: &str) -> Result<Vec<u8>>;
}

/// Reads from the local file system, relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    /// `path` may be a directory or a file; for a file its parent is used.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        log::trace!("Reading {}", path.display());
        Ok(std::fs::read(path)?)
    }
}

/// Decodes `data:[<mediatype>][;base64],<payload>`.
///
/// Non-base64 payloads are returned as their raw bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| XenonError::DataUriError("missing 'data:' scheme".to_owned()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| XenonError::DataUriError("missing ',' separator".to_owned()))?;

    if header.ends_with(";base64") {
        STANDARD
            .decode(payload)
            .map_err(|e| XenonError::DataUriError(e.to_string()))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Resolves a URI that is either embedded (`data:`) or relative to `reader`.
pub fn read_uri(uri: &str, reader: &dyn AssetReader) -> Result<Vec<u8>> {
    if uri.starts_with("data:") {
        decode_data_uri(uri)
    } else {
        reader.read_bytes(uri)
    }
}

/// Loads the bytes of every buffer in `document`, in index order.
///
/// `blob` is the binary chunk of a GLB container, if any.
pub fn load_buffers(
    document: &gltf::Document,
    mut blob: Option<Vec<u8>>,
    reader: &dyn AssetReader,
) -> Result<Vec<Vec<u8>>> {
    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        let mut data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .take()
                .ok_or(XenonError::MissingBuffer { index: buffer.index() })?,
            gltf::buffer::Source::Uri(uri) => read_uri(uri, reader)?,
        };

        if data.len() < buffer.length() {
            return Err(XenonError::GltfError(format!(
                "buffer {} holds {} bytes but declares {}",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        // GLB chunks are padded to four bytes.
        data.truncate(buffer.length());
        buffers.push(data);
    }
    Ok(buffers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_data_uri() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,AAECAw==").unwrap();
        assert_eq!(bytes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn malformed_data_uri() {
        assert!(matches!(decode_data_uri("data:;base64"), Err(XenonError::DataUriError(_))));
        assert!(matches!(decode_data_uri("data:;base64,@@@"), Err(XenonError::DataUriError(_))));
    }
}
