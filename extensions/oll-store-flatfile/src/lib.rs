pub mod error;

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use oll::config::Config;
use oll::store::WeightStore;
use oll::Extension;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, oll::error::Error>;

/// Weight store kept in a single JSON file.
///
/// Keys are written hex encoded so arbitrary bytes survive the text format.
/// The whole file is rewritten through a temporary file and a rename on every
/// `set`, which keeps it simple and atomic at the cost of write throughput.
#[derive(Default, Debug)]
pub struct FlatfileStore {
    path: PathBuf,
    entries: Option<HashMap<Vec<u8>, f64>>,
}

impl Extension for FlatfileStore {
    fn id(&self) -> String {
        String::from("oll-store-flatfile")
    }

    fn name(&self) -> String {
        String::from("Flatfile Weight Store")
    }
}

impl FlatfileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FlatfileStore {
            path: path.as_ref().to_path_buf(),
            entries: None,
        }
    }

    /// Uses the configured path. A flatfile holds a single model, so the table is not used.
    pub fn from_config(config: &Config) -> Self {
        FlatfileStore::new(config.path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut path = OsString::from(self.path.as_os_str());
        path.push(".tmp");
        PathBuf::from(path)
    }

    fn load(&self) -> std::result::Result<HashMap<Vec<u8>, f64>, Error> {
        let fs = std::fs::File::open(&self.path)?;
        let encoded: BTreeMap<String, f64> = serde_json::from_reader(fs)?;
        encoded
            .into_iter()
            .map(|(key, value)| Ok((hex::decode(key)?, value)))
            .collect()
    }

    fn persist(&self, entries: &HashMap<Vec<u8>, f64>) -> std::result::Result<(), Error> {
        let encoded = entries
            .iter()
            .map(|(key, value)| (hex::encode(key), *value))
            .collect::<BTreeMap<_, _>>();

        let temp = self.temp_path();
        {
            let fs = std::fs::File::create(&temp)?;
            let mut writer = BufWriter::new(fs);
            serde_json::to_writer(&mut writer, &encoded)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn open_file(&mut self) -> std::result::Result<(), Error> {
        let entries = if self.path.exists() {
            tracing::info!(path = %self.path.display(), "loading weight file");
            self.load()?
        } else {
            tracing::info!(path = %self.path.display(), "creating weight file");
            let entries = HashMap::new();
            self.persist(&entries)?;
            entries
        };
        self.entries = Some(entries);
        Ok(())
    }

    fn write(&mut self, key: &[u8], value: f64) -> std::result::Result<(), Error> {
        if !value.is_finite() {
            return Err(Error::UnrepresentableValue(value));
        }

        let mut entries = self
            .entries
            .take()
            .ok_or(Error::OllError(oll::error::Error::StorageNotOpened))?;
        let previous = entries.insert(key.to_vec(), value);

        let result = self.persist(&entries);
        if result.is_err() {
            // keep memory in line with what is on disk
            match previous {
                Some(previous) => entries.insert(key.to_vec(), previous),
                None => entries.remove(key),
            };
        }
        self.entries = Some(entries);
        result
    }
}

impl WeightStore for FlatfileStore {
    fn open(&mut self) -> Result<()> {
        if self.entries.is_some() {
            return Ok(());
        }
        self.open_file().map_err(oll::error::Error::from)
    }

    fn get(&self, key: &[u8]) -> Result<Option<f64>> {
        let entries = self
            .entries
            .as_ref()
            .ok_or(oll::error::Error::StorageNotOpened)?;
        Ok(entries.get(key).copied())
    }

    fn set(&mut self, key: &[u8], value: f64) -> Result<()> {
        self.write(key, value).map_err(oll::error::Error::from)
    }
}
