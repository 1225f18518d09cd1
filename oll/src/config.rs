use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::error::Error;

type Result<T> = std::result::Result<T, Error>;

const DEFAULT_PATH: &str = "/var/tmp/oll.db";
const DEFAULT_TABLE: &str = "oll";

/// Where a model lives and which algorithm it is trained with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    path: PathBuf,
    #[serde(default = "default_table")]
    table: String,
    #[serde(default)]
    algorithm: Algorithm,
}

fn default_table() -> String {
    DEFAULT_TABLE.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            table: default_table(),
            algorithm: Algorithm::default(),
        }
    }
}

impl Config {
    /// Model stored in the system temp directory
    pub fn development() -> Config {
        Config {
            path: std::env::temp_dir().join("oll.db"),
            ..Default::default()
        }
    }

    pub fn production<P: AsRef<Path>>(path: P) -> Config {
        Config {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Loads a configuration previously written with [`Config::to_file`]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let fs = std::fs::File::open(path)?;
        let config = serde_json::from_reader(fs)?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let fs = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(fs, self)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_mut(&mut self) -> &mut PathBuf {
        &mut self.path
    }

    /// Name of the table the model is kept in
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut String {
        &mut self.table
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn algorithm_mut(&mut self) -> &mut Algorithm {
        &mut self.algorithm
    }
}
