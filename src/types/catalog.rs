//! Style and model catalogs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Styles offered when the service has none to report.
pub const DEFAULT_STYLES: [&str; 8] = [
    "realistic",
    "photorealistic",
    "cinematic",
    "portrait",
    "anime",
    "fantasy",
    "sci-fi",
    "3d-render",
];

/// Models offered when the service has none to report.
pub const DEFAULT_MODELS: [(&str, &str); 3] = [
    ("flux-realism", "Hyper-realistic (Recommended)"),
    ("flux", "High quality general"),
    ("turbo", "Fast generation"),
];

/// Models that only accept image-to-image requests.
pub const IMAGE_TO_IMAGE_ONLY_MODELS: [&str; 1] = ["kontext"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StylesResponse {
    #[serde(default)]
    pub styles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: BTreeMap<String, String>,
}

pub fn default_styles() -> Vec<String> {
    DEFAULT_STYLES.iter().map(|s| s.to_string()).collect()
}

pub fn default_models() -> BTreeMap<String, String> {
    DEFAULT_MODELS
        .iter()
        .map(|(id, desc)| (id.to_string(), desc.to_string()))
        .collect()
}

/// Drop models that cannot serve text-to-image requests.
pub fn text_to_image_models(models: BTreeMap<String, String>) -> BTreeMap<String, String> {
    models
        .into_iter()
        .filter(|(id, _)| !IMAGE_TO_IMAGE_ONLY_MODELS.contains(&id.as_str()))
        .collect()
}
