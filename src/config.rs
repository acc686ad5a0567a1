use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "RenderSettings::default_width")]
    pub width: u32,
    #[serde(default = "RenderSettings::default_height")]
    pub height: u32,
    #[serde(default = "RenderSettings::default_cubemap_size")]
    pub cubemap_size: u32,
    #[serde(default = "RenderSettings::default_irradiance_size")]
    pub irradiance_size: u32,
    /// Equirectangular panorama to light the scene with; the generated
    /// default environment is used when absent.
    #[serde(default)]
    pub panorama: Option<String>,
    #[serde(default = "RenderSettings::default_output")]
    pub output: String,
}

impl RenderSettings {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading render settings '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing render settings '{}'", path.display()))
    }

    const fn default_width() -> u32 {
        960
    }

    const fn default_height() -> u32 {
        540
    }

    const fn default_cubemap_size() -> u32 {
        256
    }

    const fn default_irradiance_size() -> u32 {
        32
    }

    fn default_output() -> String {
        "render.png".to_string()
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            cubemap_size: Self::default_cubemap_size(),
            irradiance_size: Self::default_irradiance_size(),
            panorama: None,
            output: Self::default_output(),
        }
    }
}
