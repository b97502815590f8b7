use std::path::Path;

use anyhow::{Result, bail};

use crate::config;

/// `pixdiff init` — create .pixdiff/config.toml.
pub fn init(force: bool) -> Result<()> {
    let dir = Path::new(config::CONFIG_DIR);
    init_in(dir, force)?;

    let verb = if force { "Regenerated" } else { "Created" };
    println!("{verb} {}", dir.join("config.toml").display());
    Ok(())
}

fn init_in(dir: &Path, force: bool) -> Result<()> {
    if !force && config::config_file_exists(dir) {
        bail!(
            "{} already exists (use --force to overwrite)",
            dir.join("config.toml").display()
        );
    }
    config::write_template(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_creates_config() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".pixdiff");
        init_in(&dir, false).unwrap();
        let content = std::fs::read_to_string(dir.join("config.toml")).unwrap();
        assert!(content.contains("[diff]"));
    }

    #[test]
    fn existing_config_is_kept_without_force() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".pixdiff");
        init_in(&dir, false).unwrap();
        std::fs::write(dir.join("config.toml"), "[diff]\nthreshold = 7\n").unwrap();

        let err = init_in(&dir, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        let content = std::fs::read_to_string(dir.join("config.toml")).unwrap();
        assert_eq!(content, "[diff]\nthreshold = 7\n");
    }

    #[test]
    fn force_rewrites_config() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".pixdiff");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[diff]\nthreshold = 7\n").unwrap();

        init_in(&dir, true).unwrap();
        let content = std::fs::read_to_string(dir.join("config.toml")).unwrap();
        assert!(content.contains("# threshold = 30"));
        assert!(!content.contains("threshold = 7"));
    }
}
