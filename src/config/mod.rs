mod ingestor;
mod layer;

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

pub use ingestor::{IngestorConfig, IngestorKind};
pub use layer::LayerSpec;

use crate::{Result, TrainErr};

/// Everything a training session needs, loaded once before training and never modified after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingConfig {
    pub step_count: usize,
    #[serde(default)]
    pub step_reporting_mod: usize,
    pub model_path: PathBuf,
    pub optimizer: String,
    pub loss_function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f32>,
    pub layers: Vec<LayerSpec>,
    pub ingestor: IngestorConfig,
}

impl TrainingConfig {
    /// Reads a `TrainingConfig` from a JSON file.
    ///
    /// # Arguments
    /// * `path` - The location of the file.
    ///
    /// # Errors
    /// `ConfigRead` if the file can't be read, `ConfigParse` if it doesn't match the schema.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TrainErr::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Checks the values that must agree with each other before any resource is acquired.
    pub fn validate(&self) -> Result<()> {
        self.ingestor.validate()?;

        if let Some(lr) = self
            .learning_rate
            .filter(|lr| !(lr.is_finite() && *lr > 0.))
        {
            return Err(TrainErr::InvalidConfig(format!(
                "learningRate must be a positive number, got {lr}"
            )));
        }

        let (Some(first), Some(last)) = (self.layers.first(), self.layers.last()) else {
            return Err(TrainErr::InvalidConfig(
                "at least one layer is required".into(),
            ));
        };

        let inputs = self.ingestor.input_field_indices.len();
        if first.input_count != inputs {
            return Err(TrainErr::InvalidConfig(format!(
                "the first layer takes {} inputs but {inputs} input fields are configured",
                first.input_count
            )));
        }

        let expected = self.ingestor.expected_field_indices.len();
        if last.output_count != expected {
            return Err(TrainErr::InvalidConfig(format!(
                "the last layer yields {} outputs but {expected} expected fields are configured",
                last.output_count
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CONFIG: &str = r#"{
        "stepCount": 1000,
        "stepReportingMod": 100,
        "modelPath": "model.json",
        "optimizer": "Adam",
        "lossFunction": "CrossEntropy",
        "layers": [
            {"inputCount": 4, "outputCount": 8, "activations": ["Tanh"]},
            {"inputCount": 8, "outputCount": 3, "activations": []}
        ],
        "ingestor": {
            "type": "csv",
            "datasetPath": "iris.csv",
            "batchSize": 16,
            "inputFieldIndices": [0, 1, 2, 3],
            "expectedFieldIndices": [4, 5, 6],
            "fieldCount": 7
        }
    }"#;

    fn config() -> TrainingConfig {
        serde_json::from_str(CONFIG).unwrap()
    }

    #[test]
    fn load_reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = TrainingConfig::load(file.path()).unwrap();

        assert_eq!(config.step_count, 1000);
        assert_eq!(config.layers[0], LayerSpec::new(4, 8, ["Tanh"]));
        assert_eq!(config.learning_rate, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrainingConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TrainErr::ConfigRead { .. }));
    }

    #[test]
    fn load_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"stepCount\": \"many\"}").unwrap();

        let err = TrainingConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, TrainErr::ConfigParse(_)));
    }

    #[test]
    fn layers_must_match_field_counts() {
        let mut config = config();
        config.layers[0].input_count = 3;
        assert!(matches!(config.validate(), Err(TrainErr::InvalidConfig(_))));

        let mut config = self::config();
        config.layers[1].output_count = 2;
        assert!(matches!(config.validate(), Err(TrainErr::InvalidConfig(_))));

        let mut config = self::config();
        config.layers.clear();
        assert!(matches!(config.validate(), Err(TrainErr::InvalidConfig(_))));
    }

    #[test]
    fn non_positive_learning_rate_fails() {
        let mut config = config();
        config.learning_rate = Some(0.);
        assert!(matches!(config.validate(), Err(TrainErr::InvalidConfig(_))));
    }
}
