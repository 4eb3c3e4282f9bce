use std::{collections::HashSet, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, TrainErr};

/// The dataset formats an ingestor can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestorKind {
    Csv,
}

/// Where the rows come from and how a batch is cut out of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestorConfig {
    #[serde(rename = "type")]
    pub kind: IngestorKind,
    pub dataset_path: PathBuf,
    pub batch_size: usize,
    pub input_field_indices: Vec<usize>,
    pub expected_field_indices: Vec<usize>,
    pub field_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl IngestorConfig {
    /// Returns the field separator as the single byte the reader expects, `,` by default.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter {
            None => Ok(b','),
            Some(c) if c.is_ascii() => Ok(c as u8),
            Some(c) => Err(TrainErr::InvalidConfig(format!(
                "delimiter '{c}' is not a single byte character"
            ))),
        }
    }

    /// Checks the batch size and that both index sets are non empty, disjoint and within the
    /// row width.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TrainErr::InvalidConfig(
                "batchSize must be greater than zero".into(),
            ));
        }

        if self.input_field_indices.is_empty() || self.expected_field_indices.is_empty() {
            return Err(TrainErr::InvalidConfig(
                "inputFieldIndices and expectedFieldIndices must not be empty".into(),
            ));
        }

        let mut indices = self
            .input_field_indices
            .iter()
            .chain(&self.expected_field_indices);

        if let Some(i) = indices.find(|&&i| i >= self.field_count) {
            return Err(TrainErr::InvalidConfig(format!(
                "field index {i} is out of range for {} fields",
                self.field_count
            )));
        }

        let inputs: HashSet<_> = self.input_field_indices.iter().collect();
        if let Some(i) = self.expected_field_indices.iter().find(|i| inputs.contains(i)) {
            return Err(TrainErr::InvalidConfig(format!(
                "field index {i} is both an input and an expected value"
            )));
        }

        self.delimiter_byte()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IngestorConfig {
        IngestorConfig {
            kind: IngestorKind::Csv,
            dataset_path: "data.csv".into(),
            batch_size: 4,
            input_field_indices: vec![0, 1],
            expected_field_indices: vec![2],
            field_count: 3,
            delimiter: None,
            seed: None,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
        assert_eq!(config().delimiter_byte().unwrap(), b',');
    }

    #[test]
    fn zero_batch_size_fails() {
        let config = IngestorConfig {
            batch_size: 0,
            ..config()
        };
        assert!(matches!(config.validate(), Err(TrainErr::InvalidConfig(_))));
    }

    #[test]
    fn out_of_range_index_fails() {
        let config = IngestorConfig {
            expected_field_indices: vec![3],
            ..config()
        };
        assert!(matches!(config.validate(), Err(TrainErr::InvalidConfig(_))));
    }

    #[test]
    fn overlapping_indices_fail() {
        let config = IngestorConfig {
            expected_field_indices: vec![1],
            ..config()
        };
        assert!(matches!(config.validate(), Err(TrainErr::InvalidConfig(_))));
    }

    #[test]
    fn multibyte_delimiter_fails() {
        let config = IngestorConfig {
            delimiter: Some('ñ'),
            ..config()
        };
        assert!(matches!(config.validate(), Err(TrainErr::InvalidConfig(_))));
    }

    #[test]
    fn parses_camel_case_with_type_tag() {
        let json = r#"{
            "type": "csv",
            "datasetPath": "iris.csv",
            "batchSize": 16,
            "inputFieldIndices": [0, 1, 2, 3],
            "expectedFieldIndices": [4, 5, 6],
            "fieldCount": 7,
            "delimiter": ";",
            "seed": 7
        }"#;

        let config: IngestorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind, IngestorKind::Csv);
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.seed, Some(7));
    }
}
