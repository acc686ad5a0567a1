use crate::config::RenderSettings;
use anyhow::{anyhow, bail, Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    config: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    panorama: Option<String>,
    output: Option<String>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Use --config/--width/--height/--panorama/--output with values.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(value),
                "width" => {
                    overrides.width =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid width '{value}'"))?);
                }
                "height" => {
                    overrides.height =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid height '{value}'"))?);
                }
                "panorama" => overrides.panorama = Some(value),
                "output" => overrides.output = Some(value),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --width, --height, --panorama, --output."
                ),
            }
        }
        Ok(overrides)
    }

    /// Resolves the final settings: the config file (when given), then any
    /// explicit flags on top.
    pub fn into_settings(self) -> Result<RenderSettings> {
        let mut settings = match self.config.as_deref() {
            Some(path) => RenderSettings::load_from_path(path)?,
            None => RenderSettings::default(),
        };
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(panorama) = self.panorama {
            settings.panorama = Some(panorama);
        }
        if let Some(output) = self.output {
            settings.output = output;
        }
        Ok(settings)
    }

    #[cfg(test)]
    fn as_tuple(&self) -> (Option<u32>, Option<u32>, Option<&str>, Option<&str>) {
        (self.width, self.height, self.panorama.as_deref(), self.output.as_deref())
    }
}
