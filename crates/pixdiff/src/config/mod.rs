pub mod resolve;
pub mod template;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::Rgba;
use pixdiff::{Fit, SizePolicy, parse_color};
use serde::{Deserialize, Deserializer};

pub use self::resolve::{CliOverrides, ResolvedRunConfig};
pub use self::template::{config_file_exists, write_template};

pub(crate) const CONFIG_DIR: &str = ".pixdiff";
const CONFIG_FILE: &str = "config.toml";

/// `[diff]` section. Every field is optional; `None` means "use default".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffConfig {
    #[serde(default)]
    pub threshold: Option<u8>,
    /// Written as `#rrggbb` or `#rrggbbaa`.
    #[serde(default, deserialize_with = "deserialize_color")]
    pub flag_color: Option<Rgba<u8>>,
    #[serde(default)]
    pub size_policy: Option<SizePolicy>,
    #[serde(default)]
    pub fit: Option<Fit>,
    /// Largest change ratio (0.0-1.0) that still counts as a pass.
    #[serde(default)]
    pub max_ratio: Option<f64>,
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Option<Rgba<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(s) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_color(&s).map(Some).map_err(serde::de::Error::custom)
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub parallel: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub run: RunConfig,
}

pub fn validate_max_ratio(v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("max_ratio must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    fn validate(&self) -> Result<()> {
        if let Some(ratio) = self.diff.max_ratio {
            validate_max_ratio(ratio).map_err(|e| anyhow!("diff.{e}"))?;
        }
        Ok(())
    }

    pub fn parse(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

pub fn config_path() -> std::path::PathBuf {
    Path::new(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load `.pixdiff/config.toml`, falling back to defaults when it does not exist.
pub fn load() -> Result<Config> {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Config::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.diff.threshold.is_none());
        assert!(config.diff.size_policy.is_none());
        assert!(config.run.parallel.is_none());
    }

    #[test]
    fn full_file_parses() {
        let config = Config::parse(
            r##"
            [diff]
            threshold = 12
            flag_color = "#00ff00"
            size_policy = "resize-to-smaller"
            fit = "stretch"
            max_ratio = 0.25

            [run]
            parallel = true
            "##,
        )
        .unwrap();
        assert_eq!(config.diff.threshold, Some(12));
        assert_eq!(config.diff.flag_color, Some(Rgba([0, 255, 0, 255])));
        assert_eq!(config.diff.size_policy, Some(SizePolicy::ResizeToSmaller));
        assert_eq!(config.diff.fit, Some(Fit::Stretch));
        assert_eq!(config.diff.max_ratio, Some(0.25));
        assert_eq!(config.run.parallel, Some(true));
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        assert!(Config::parse("[diff]\nthreshold = 256\n").is_err());
        assert!(Config::parse("[diff]\nthreshold = -1\n").is_err());
    }

    #[test]
    fn bad_values_rejected() {
        assert!(Config::parse("[diff]\nflag_color = \"red\"\n").is_err());
        assert!(Config::parse("[diff]\nmax_ratio = 1.5\n").is_err());
        assert!(Config::parse("[diff]\nsize_policy = \"stretch\"\n").is_err());
        assert!(Config::parse("[diff]\ntreshold = 3\n").is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(Config::parse("[dif]\nthreshold = 3\n").is_err());
        assert!(Config::parse("[runn]\nparallel = true\n").is_err());
    }

    #[test]
    fn bad_flag_color_names_the_problem() {
        let err = Config::parse("[diff]\nflag_color = \"#12\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("#rrggbb"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("nope.toml")).unwrap();
        assert!(config.diff.max_ratio.is_none());
    }

    #[test]
    fn load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[diff]\nmax_ratio = 2.0\n").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
