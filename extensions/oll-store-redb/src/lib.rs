pub mod error;

use std::path::{Path, PathBuf};

use oll::config::Config;
use oll::store::WeightStore;
use oll::Extension;
use redb::{Database, ReadableTable, TableDefinition};

use crate::error::Error;

pub type Result<T> = std::result::Result<T, oll::error::Error>;

const DEFAULT_TABLE: &str = "oll";

/// Weight store kept in a [redb](https://docs.rs/redb) database file.
///
/// Each model gets its own table of raw byte keys to `f64` values, so several
/// models can share one file. Every `set` is its own committed transaction.
pub struct RedbStore {
    path: PathBuf,
    table: String,
    db: Option<Database>,
}

impl Extension for RedbStore {
    fn id(&self) -> String {
        String::from("oll-store-redb")
    }

    fn name(&self) -> String {
        String::from("Redb Weight Store")
    }

    fn description(&self) -> String {
        String::from("Weight store implementation with redb, an embedded key-value database written in rust.")
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .field("table", &self.table)
            .field("open", &self.db.is_some())
            .finish()
    }
}

impl RedbStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_table(path, DEFAULT_TABLE)
    }

    pub fn with_table<P: AsRef<Path>, S: Into<String>>(path: P, table: S) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            table: table.into(),
            db: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_table(config.path(), config.table())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn definition(&self) -> TableDefinition<'_, &'static [u8], f64> {
        TableDefinition::new(&self.table)
    }

    fn database(&self) -> std::result::Result<&Database, Error> {
        self.db
            .as_ref()
            .ok_or(Error::OllError(oll::error::Error::StorageNotOpened))
    }

    fn open_database(&mut self) -> std::result::Result<(), Error> {
        let db = if self.path.exists() {
            tracing::info!(path = %self.path.display(), "opening existing weight database");
            Database::open(&self.path)?
        } else {
            tracing::info!(path = %self.path.display(), "creating weight database");
            Database::create(&self.path)?
        };

        // creates the table if this model has never been stored in the file
        let txn = db.begin_write()?;
        txn.open_table(self.definition())?;
        txn.commit()?;

        self.db = Some(db);
        Ok(())
    }

    fn read(&self, key: &[u8]) -> std::result::Result<Option<f64>, Error> {
        let txn = self.database()?.begin_read()?;
        let table = txn.open_table(self.definition())?;
        let value = table.get(key)?.map(|guard| guard.value());
        Ok(value)
    }

    fn write(&self, key: &[u8], value: f64) -> std::result::Result<(), Error> {
        let txn = self.database()?.begin_write()?;
        {
            let mut table = txn.open_table(self.definition())?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl WeightStore for RedbStore {
    fn open(&mut self) -> Result<()> {
        if self.db.is_some() {
            return Ok(());
        }
        self.open_database().map_err(oll::error::Error::from)
    }

    fn get(&self, key: &[u8]) -> Result<Option<f64>> {
        self.read(key).map_err(oll::error::Error::from)
    }

    fn set(&mut self, key: &[u8], value: f64) -> Result<()> {
        self.write(key, value).map_err(oll::error::Error::from)
    }
}
