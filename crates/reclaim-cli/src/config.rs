//! Pipeline configuration files.

use std::path::Path;

use anyhow::{Context, Result};
use reclaim_model::PipelineConfig;
use tracing::debug;

/// Read a TOML configuration; every omitted field keeps its default.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        debug!("no configuration file, using defaults");
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: PipelineConfig =
        toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Command-line overrides applied on top of the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub workers: Option<usize>,
    pub batch_size: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl Overrides {
    pub fn apply(self, config: &mut PipelineConfig) {
        if let Some(workers) = self.workers {
            config.processing.workers = workers;
        }
        if let Some(batch_size) = self.batch_size {
            config.processing.batch_size = batch_size;
        }
        if let Some(timeout) = self.timeout_secs {
            config.processing.timeout_secs = Some(timeout);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_path_uses_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn file_and_overrides() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[processing]\nbatch_size = 25\nworkers = 2").expect("write");
        let mut config = load_config(Some(file.path())).expect("config");
        assert_eq!(config.processing.batch_size, 25);

        Overrides {
            workers: Some(8),
            timeout_secs: Some(30),
            ..Overrides::default()
        }
        .apply(&mut config);
        assert_eq!(config.processing.workers, 8);
        assert_eq!(config.processing.batch_size, 25);
        assert_eq!(config.processing.timeout_secs, Some(30));
    }

    #[test]
    fn malformed_file_names_the_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[processing\nbatch_size = ").expect("write");
        let err = load_config(Some(file.path())).expect_err("parse error");
        assert!(err.to_string().contains("parse config"), "{err}");
    }
}
