//! Config file IO.
//!
//! One config is one UTF-8 JSON document. Saving rotates the previous file
//! to a `.bak` sibling before overwriting, so a bad write never eats the
//! only copy.

use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use falculator_core::Config;

/// Read and parse a config document. Sanitize is the caller's step — load
/// keeps the document as written so `--sanitize-config` can show a
/// faithful correction report.
pub fn load_config(path: &Path) -> color_eyre::Result<Config> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let config: Config = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Serialize a config back to disk, rotating any existing file to `.bak`.
pub fn save_config(config: &Config, path: &Path) -> color_eyre::Result<()> {
    if path.exists() {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".bak");
        fs::copy(path, &backup)
            .wrap_err_with(|| format!("backing up {}", path.display()))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).wrap_err_with(|| format!("writing config {}", path.display()))?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_roundtrip_after_sanitize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");

        let mut config = Config::default();
        config.sim_name = "roundtrip".to_string();
        config.sanitize();

        save_config(&config, &path).unwrap();
        let reloaded = load_config(&path).unwrap();
        assert_eq!(config, reloaded);
    }

    #[test]
    fn test_save_rotates_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");

        let mut first = Config::default();
        first.sim_name = "first".to_string();
        save_config(&first, &path).unwrap();

        let mut second = Config::default();
        second.sim_name = "second".to_string();
        save_config(&second, &path).unwrap();

        let backup = dir.path().join("sim.json.bak");
        let restored = load_config(&backup).unwrap();
        assert_eq!(restored.sim_name, "first");
        assert_eq!(load_config(&path).unwrap().sim_name, "second");
    }
}
