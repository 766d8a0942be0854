// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::gate::AccessGate;
use crate::table::ColumnSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV file holding the timesheet.
    pub source: PathBuf,
    pub columns: ColumnSet,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub secret: String,
    /// Column hidden until the secret is given.
    pub column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("testc.csv"),
            columns: ColumnSet::default(),
            access: AccessConfig::default(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            secret: "admin".into(),
            column: "recurso".into(),
        }
    }
}

impl Config {
    /// Read a YAML config. Keys left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serializing config")
    }

    pub fn gate(&self) -> AccessGate {
        AccessGate::new(&self.access.secret, &self.access.column)
    }
}
