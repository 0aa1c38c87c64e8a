//! Generation request value objects.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output size, written on the wire as `"WIDTHxHEIGHT"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Sizes offered by the generation forms, square first.
    pub const PRESETS: [Resolution; 7] = [
        Resolution::new(512, 512),
        Resolution::new(512, 768),
        Resolution::new(768, 512),
        Resolution::new(768, 768),
        Resolution::new(1024, 1024),
        Resolution::new(1024, 768),
        Resolution::new(768, 1024),
    ];

    pub fn label(&self) -> &'static str {
        use std::cmp::Ordering::*;
        match (self.width.cmp(&self.height), self.width.max(self.height)) {
            (Equal, n) if n >= 1024 => "HD Square",
            (Equal, n) if n >= 768 => "Large Square",
            (Equal, _) => "Square",
            (Less, _) => "Portrait",
            (Greater, _) => "Landscape",
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::new(768, 768)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::invalid_request(
                "resolution",
                format!("Invalid resolution '{}': expected WIDTHxHEIGHT", s),
            )
        };
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Resolution { width, height })
    }
}

/// Text-to-image request.
///
/// Built once by the caller; the client only borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhance: Option<bool>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: None,
            resolution: None,
            negative_prompt: None,
            model: None,
            enhance: None,
        }
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn resolution(mut self, resolution: impl ToString) -> Self {
        self.resolution = Some(resolution.to_string());
        self
    }

    pub fn negative_prompt(mut self, text: impl Into<String>) -> Self {
        self.negative_prompt = Some(text.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn enhance(mut self, enhance: bool) -> Self {
        self.enhance = Some(enhance);
        self
    }

    /// Local checks performed before any network call.
    pub fn validate(&self) -> Result<()> {
        validate_prompt(&self.prompt)?;
        validate_resolution(self.resolution.as_deref())
    }
}

/// Image-to-image request: a prompt applied to an existing image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    pub prompt: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

impl TransformRequest {
    pub fn new(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_url: image_url.into(),
            style: None,
            resolution: None,
            negative_prompt: None,
        }
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn resolution(mut self, resolution: impl ToString) -> Self {
        self.resolution = Some(resolution.to_string());
        self
    }

    pub fn negative_prompt(mut self, text: impl Into<String>) -> Self {
        self.negative_prompt = Some(text.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_prompt(&self.prompt)?;
        let image_url = self.image_url.trim();
        if image_url.is_empty() {
            return Err(Error::invalid_request("image_url", "Source image URL is required"));
        }
        match url::Url::parse(image_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => {
                return Err(Error::invalid_request(
                    "image_url",
                    format!("Source image URL must be an http(s) URL: {}", image_url),
                ))
            }
        }
        validate_resolution(self.resolution.as_deref())
    }
}

fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(Error::invalid_request("prompt", "Prompt is required"));
    }
    Ok(())
}

fn validate_resolution(resolution: Option<&str>) -> Result<()> {
    if let Some(r) = resolution {
        r.parse::<Resolution>()?;
    }
    Ok(())
}
