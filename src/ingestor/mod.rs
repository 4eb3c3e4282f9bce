mod batch;
mod csv_ingestor;

pub use batch::Batch;
pub use csv_ingestor::CsvIngestor;

use crate::{
    Result,
    config::{IngestorConfig, IngestorKind},
};

/// A source of training batches.
pub trait Ingestor {
    /// Produces a fresh batch, sampled uniformly from the whole dataset.
    fn ingest(&mut self) -> Result<Batch>;

    /// Releases the underlying dataset handle. Calling it again does nothing.
    fn close(&mut self);
}

impl<T: Ingestor + ?Sized> Ingestor for Box<T> {
    fn ingest(&mut self) -> Result<Batch> {
        (**self).ingest()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Opens the ingestor the configuration asks for.
///
/// # Arguments
/// * `config` - The dataset location and sampling parameters.
///
/// # Returns
/// The ingestor, or an error if the dataset can't be opened or has malformed rows.
pub fn open(config: &IngestorConfig) -> Result<Box<dyn Ingestor>> {
    match config.kind {
        IngestorKind::Csv => Ok(Box::new(CsvIngestor::open(config)?)),
    }
}
