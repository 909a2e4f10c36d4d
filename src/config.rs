use crate::export::Backend;
use crate::pipeline::ExportOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional `beegen.toml` settings; command-line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BeegenConfig {
    pub output_dir: Option<String>,
    pub backends: Option<Vec<Backend>>,
    pub pretty: Option<bool>,
    pub catalog: Option<bool>,
}

impl BeegenConfig {
    /// Fill options the command line left unset
    pub fn apply_to(&self, options: &mut ExportOptions) {
        if let Some(dir) = &self.output_dir {
            options.output_folder = dir.clone();
        }
        if let Some(backends) = &self.backends {
            if !backends.is_empty() {
                options.backends = backends.clone();
            }
        }
        options.pretty |= self.pretty.unwrap_or(false);
        options.catalog |= self.catalog.unwrap_or(false);
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("beegen.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BeegenConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BeegenConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}
