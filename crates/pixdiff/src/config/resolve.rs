use anyhow::{Context, Result, anyhow};
use image::Rgba;
use pixdiff::{DiffOptions, SizePolicy, parse_color};

use super::{Config, load, validate_max_ratio};

/// Values extracted from the CLI that participate in the merge.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub threshold: Option<u8>,
    pub flag_color: Option<Rgba<u8>>,
    pub size_policy: Option<SizePolicy>,
    pub fit: Option<pixdiff::Fit>,
    pub max_ratio: Option<f64>,
    /// Only ever turns parallel scanning on; the file can't be overridden off.
    pub parallel: bool,
}

/// Values read from `PIXDIFF_*` environment variables.
#[derive(Debug, Default)]
struct EnvOverrides {
    threshold: Option<u8>,
    flag_color: Option<Rgba<u8>>,
    size_policy: Option<SizePolicy>,
    max_ratio: Option<f64>,
}

impl EnvOverrides {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let threshold = lookup("PIXDIFF_THRESHOLD")
            .map(|v| v.trim().parse::<u8>())
            .transpose()
            .context("PIXDIFF_THRESHOLD must be an integer between 0 and 255")?;
        let flag_color = lookup("PIXDIFF_FLAG_COLOR")
            .map(|v| parse_color(&v))
            .transpose()
            .map_err(|e| anyhow!("PIXDIFF_FLAG_COLOR: {e}"))?;
        let size_policy = lookup("PIXDIFF_SIZE_POLICY")
            .map(|v| v.trim().parse::<SizePolicy>())
            .transpose()
            .map_err(|e| anyhow!("PIXDIFF_SIZE_POLICY: {e}"))?;
        let max_ratio = lookup("PIXDIFF_MAX_RATIO")
            .map(|v| v.trim().parse::<f64>())
            .transpose()
            .context("PIXDIFF_MAX_RATIO must be a valid float")?;

        Ok(Self {
            threshold,
            flag_color,
            size_policy,
            max_ratio,
        })
    }
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedRunConfig {
    pub options: DiffOptions,
    pub max_ratio: f64,
    pub parallel: bool,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        // 1. File layer
        let file_config = load()?;

        // 2. Env layer
        let env = EnvOverrides::from_lookup(|key| std::env::var(key).ok())?;

        Self::merge(cli, env, file_config)
    }

    fn merge(cli: CliOverrides, env: EnvOverrides, file: Config) -> Result<Self> {
        let defaults = DiffOptions::default();

        // 3. CLI > env > file (highest priority first)
        let threshold = cli
            .threshold
            .or(env.threshold)
            .or(file.diff.threshold)
            .unwrap_or(defaults.threshold);

        let flag_color = cli
            .flag_color
            .or(env.flag_color)
            .or(file.diff.flag_color)
            .unwrap_or(defaults.flag_color);

        let size_policy = cli
            .size_policy
            .or(env.size_policy)
            .or(file.diff.size_policy)
            .unwrap_or(defaults.size_policy);

        let fit = cli.fit.or(file.diff.fit).unwrap_or(defaults.fit);

        let max_ratio = cli
            .max_ratio
            .or(env.max_ratio)
            .or(file.diff.max_ratio)
            .unwrap_or(1.0);
        validate_max_ratio(max_ratio).map_err(|e| anyhow!("{e}"))?;

        let parallel = cli.parallel || file.run.parallel.unwrap_or(false);

        Ok(Self {
            options: DiffOptions {
                threshold,
                flag_color,
                size_policy,
                fit,
            },
            max_ratio,
            parallel,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pixdiff::Fit;

    fn env(pairs: &[(&str, &str)]) -> Result<EnvOverrides> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvOverrides::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let r = ResolvedRunConfig::merge(
            CliOverrides::default(),
            EnvOverrides::default(),
            Config::default(),
        )
        .unwrap();
        assert_eq!(r.options, DiffOptions::default());
        assert_eq!(r.max_ratio, 1.0);
        assert!(!r.parallel);
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = Config::parse(
            "[diff]\nthreshold = 10\nsize_policy = \"require-equal\"\nmax_ratio = 0.5\nflag_color = \"#0000ff\"\n",
        )
        .unwrap();
        let env = env(&[("PIXDIFF_THRESHOLD", "20"), ("PIXDIFF_MAX_RATIO", "0.2")]).unwrap();
        let cli = CliOverrides {
            threshold: Some(40),
            ..CliOverrides::default()
        };
        let r = ResolvedRunConfig::merge(cli, env, file).unwrap();
        assert_eq!(r.options.threshold, 40);
        assert_eq!(r.max_ratio, 0.2);
        assert_eq!(r.options.size_policy, SizePolicy::RequireEqual);
        assert_eq!(r.options.flag_color, Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn env_values_are_parsed() {
        let e = env(&[
            ("PIXDIFF_FLAG_COLOR", "#11223344"),
            ("PIXDIFF_SIZE_POLICY", "resize-to-smaller"),
        ])
        .unwrap();
        assert_eq!(e.flag_color, Some(Rgba([0x11, 0x22, 0x33, 0x44])));
        assert_eq!(e.size_policy, Some(SizePolicy::ResizeToSmaller));
    }

    #[test]
    fn bad_env_values_are_errors() {
        assert!(env(&[("PIXDIFF_THRESHOLD", "300")]).is_err());
        assert!(env(&[("PIXDIFF_FLAG_COLOR", "blue")]).is_err());
        assert!(env(&[("PIXDIFF_SIZE_POLICY", "shrink")]).is_err());
        assert!(env(&[("PIXDIFF_MAX_RATIO", "lots")]).is_err());
    }

    #[test]
    fn out_of_range_ratio_rejected_after_merge() {
        let cli = CliOverrides {
            max_ratio: Some(1.5),
            ..CliOverrides::default()
        };
        assert!(
            ResolvedRunConfig::merge(cli, EnvOverrides::default(), Config::default()).is_err()
        );
    }

    #[test]
    fn parallel_from_file_or_cli() {
        let file = Config::parse("[run]\nparallel = true\n").unwrap();
        let r = ResolvedRunConfig::merge(CliOverrides::default(), EnvOverrides::default(), file)
            .unwrap();
        assert!(r.parallel);

        let cli = CliOverrides {
            parallel: true,
            fit: Some(Fit::Stretch),
            ..CliOverrides::default()
        };
        let r = ResolvedRunConfig::merge(cli, EnvOverrides::default(), Config::default()).unwrap();
        assert!(r.parallel);
        assert_eq!(r.options.fit, Fit::Stretch);
    }
}
