use serde::{Deserialize, Serialize};
use xenon_core::{Result, XenonError};

/// Which scene of a document becomes the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneSelection {
    /// The document's default scene, else scene 0.
    #[default]
    Default,
    Index(usize),
}

/// Knobs for a single model load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Run structural validation while parsing. Turn off only for documents
    /// known to be well formed: out-of-range enum values or indices in an
    /// unvalidated document panic inside the parser's accessors.
    pub validate: bool,
    /// Upload every buffer view up front. When `false`, a view is uploaded
    /// the first time a vertex attribute or index binding reads from it, so
    /// animation and skin data never reach the GPU.
    pub upload_all_buffer_views: bool,
    pub scene: SceneSelection,
    /// Request sRGB formats for base color and emissive textures.
    pub srgb_color_textures: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            validate: true,
            upload_all_buffer_views: true,
            scene: SceneSelection::Default,
            srgb_color_textures: true,
        }
    }
}

impl LoaderSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| XenonError::ConfigError(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| XenonError::ConfigError(e.to_string()))
    }
}
