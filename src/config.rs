//! Sample source configuration

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine::buffer::LoadStrategy;
use crate::error::{Result, SourceError};

/// Options for opening a recording.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```json
/// { "strategy": "map" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    pub strategy: LoadStrategy,
}

impl SourceOptions {
    pub fn with_strategy(strategy: LoadStrategy) -> Self {
        SourceOptions { strategy }
    }

    /// Load options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SourceError::Config {
            reason: format!("cannot open {}: {}", path.display(), e),
        })?;

        let options: SourceOptions =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| SourceError::Config {
                reason: format!("cannot parse {}: {}", path.display(), e),
            })?;

        info!("loaded config from {}", path.display());
        Ok(options)
    }
}
