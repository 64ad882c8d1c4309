//! Known Whisper models and model-file resolution.
//!
//! `SttConfig::model` may be a registry id (`"thonburian-medium"`) or a path
//! to any GGML `.bin` file; [`resolve_model_path`] turns either into the
//! file to load.

use std::path::{Path, PathBuf};

use crate::config::AppPaths;

/// Static metadata for a single GGML model file.
#[derive(Debug)]
pub struct ModelInfo {
    /// Identifier accepted in `SttConfig::model`.
    pub id: &'static str,
    /// File name under the models directory.
    pub file_name: &'static str,
    /// Approximate file size in megabytes.
    pub file_size_mb: u64,
    /// Where to download the weights.
    pub source_url: &'static str,
}

/// Thonburian Whisper — Whisper fine-tuned on Thai speech.
///
/// The small model is enough for a dozen fixed command words and runs
/// comfortably on a Raspberry Pi 4; medium is the default on desktops.
pub const THAI_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "thonburian-small",
        file_name: "ggml-thonburian-small.bin",
        file_size_mb: 242,
        source_url: "https://huggingface.co/biodatlab/whisper-small-th-combined",
    },
    ModelInfo {
        id: "thonburian-medium",
        file_name: "ggml-thonburian-medium.bin",
        file_size_mb: 769,
        source_url: "https://huggingface.co/biodatlab/whisper-th-medium-combined",
    },
    ModelInfo {
        id: "thonburian-large",
        file_name: "ggml-thonburian-large.bin",
        file_size_mb: 1_500,
        source_url: "https://huggingface.co/biodatlab/whisper-th-large-combined",
    },
];

/// Find a [`ModelInfo`] by its `id`.
pub fn find_model_by_id(id: &str) -> Option<&'static ModelInfo> {
    THAI_MODELS.iter().find(|m| m.id == id)
}

/// Resolve the configured `model` to a file path.
///
/// - a registry id maps to its file under `paths.models_dir`;
/// - anything that looks like a path (has a separator or ends in `.bin`)
///   is used as-is;
/// - any other name is taken as `ggml-<name>.bin` under `paths.models_dir`.
pub fn resolve_model_path(model: &str, paths: &AppPaths) -> PathBuf {
    if let Some(info) = find_model_by_id(model) {
        return paths.models_dir.join(info.file_name);
    }

    let as_path = Path::new(model);
    if as_path.components().count() > 1 || model.ends_with(".bin") {
        return as_path.to_path_buf();
    }

    paths.models_dir.join(format!("ggml-{model}.bin"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
