use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base: String,
    pub data_dir: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub mock_port: u16,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workbench config {}", path_ref.display()))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workbench config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(api_base: String, data_dir: PathBuf, timeout_secs: u64, mock_port: u16) -> Self {
        Self {
            api_base,
            data_dir,
            timeout_secs,
            mock_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_round_trips() {
        let cfg = AppConfig::from_args(
            "http://127.0.0.1:8000".to_string(),
            PathBuf::from("data"),
            15,
            0,
        );
        assert_eq!(cfg.timeout_secs, 15);
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"api_base: http://localhost:9001\ndata_dir: captures\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.api_base, "http://localhost:9001");
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.mock_port, 0);
    }
}
