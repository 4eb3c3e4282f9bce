use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::info;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Result, TrainErr, config::TrainingConfig};

/// A trained model together with the configuration that produced it. This is what gets persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle<M> {
    pub config: TrainingConfig,
    pub model: M,
}

impl<M> ModelBundle<M> {
    pub fn new(config: TrainingConfig, model: M) -> Self {
        Self { config, model }
    }
}

impl<M: Serialize> ModelBundle<M> {
    /// Writes the bundle as JSON, replacing the file if it exists.
    ///
    /// # Arguments
    /// * `path` - Where to write the bundle.
    ///
    /// # Errors
    /// `Persistence` if the file can't be created or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let err = |msg: String| TrainErr::Persistence {
            path: path.to_path_buf(),
            msg,
        };

        let file = File::create(path).map_err(|e| err(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| err(e.to_string()))?;
        writer.flush().map_err(|e| err(e.to_string()))?;

        info!("saved model to {}", path.display());
        Ok(())
    }
}

impl<M: DeserializeOwned> ModelBundle<M> {
    /// Reads a bundle written by `save`.
    ///
    /// # Errors
    /// `Persistence` if the file can't be read or doesn't hold a valid bundle.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let err = |msg: String| TrainErr::Persistence {
            path: path.to_path_buf(),
            msg,
        };

        let file = File::open(path).map_err(|e| err(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| err(e.to_string()))
    }
}
