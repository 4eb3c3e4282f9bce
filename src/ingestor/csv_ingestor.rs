use std::{fs::File, mem, path::PathBuf};

use csv::{Position, Reader, ReaderBuilder, StringRecord};
use log::{debug, warn};
use ndarray::{Array2, ArrayViewMut1};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Batch, Ingestor};
use crate::{Result, TrainErr, config::IngestorConfig};

/// Samples batches out of a delimited text file without a header row.
///
/// Every `ingest` scans the whole file once keeping a reservoir of `batch_size` rows, so any row
/// is equally likely to end up in the batch and memory use doesn't depend on the file size. The
/// file is rewound afterwards.
pub struct CsvIngestor<R: Rng = StdRng> {
    path: PathBuf,
    reader: Option<Reader<File>>,
    rng: R,
    batch_size: usize,
    field_count: usize,
    input_field_indices: Vec<usize>,
    expected_field_indices: Vec<usize>,
    reservoir: Vec<StringRecord>,
    scratch: StringRecord,
}

impl CsvIngestor {
    /// Opens the dataset, seeding the sampler from the configuration or from the OS.
    pub fn open(config: &IngestorConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self::with_rng(config, rng)
    }
}

impl<R: Rng> CsvIngestor<R> {
    /// Opens the dataset and checks that every row has `field_count` fields.
    ///
    /// # Arguments
    /// * `config` - The dataset location and sampling parameters.
    /// * `rng` - The random number generator used for sampling.
    ///
    /// # Returns
    /// A new `CsvIngestor` positioned at the start of the file, `InvalidConfig` if the sampling
    /// parameters are inconsistent, `DataFormat` if a row has the wrong width or `Dataset` if the
    /// file can't be read.
    pub fn with_rng(config: &IngestorConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(config.delimiter_byte()?)
            .from_path(&config.dataset_path)?;

        let mut scratch = StringRecord::new();
        let mut rows = 0;
        while reader.read_record(&mut scratch)? {
            check_width(&scratch, config.field_count)?;
            rows += 1;
        }
        reader.seek(Position::new())?;

        debug!(
            "opened dataset {} with {rows} rows",
            config.dataset_path.display()
        );
        if rows < config.batch_size {
            warn!(
                "dataset {} has {rows} rows, fewer than the batch size {}",
                config.dataset_path.display(),
                config.batch_size
            );
        }

        Ok(Self {
            path: config.dataset_path.clone(),
            reader: Some(reader),
            rng,
            batch_size: config.batch_size,
            field_count: config.field_count,
            input_field_indices: config.input_field_indices.clone(),
            expected_field_indices: config.expected_field_indices.clone(),
            reservoir: vec![StringRecord::new(); config.batch_size],
            scratch,
        })
    }

    /// Parses the sampled rows into a batch.
    fn parse_reservoir(&self) -> Result<Batch> {
        let mut inputs = Array2::zeros((self.batch_size, self.input_field_indices.len()));
        let mut expected = Array2::zeros((self.batch_size, self.expected_field_indices.len()));

        for (i, record) in self.reservoir.iter().enumerate() {
            parse_fields(record, &self.input_field_indices, inputs.row_mut(i))?;
            parse_fields(record, &self.expected_field_indices, expected.row_mut(i))?;
        }

        Ok(Batch { inputs, expected })
    }
}

impl<R: Rng> Ingestor for CsvIngestor<R> {
    fn ingest(&mut self) -> Result<Batch> {
        let reader = self.reader.as_mut().ok_or(TrainErr::IngestorClosed)?;

        let scanned = fill_reservoir(
            reader,
            &mut self.reservoir,
            &mut self.scratch,
            &mut self.rng,
            self.field_count,
        );
        reader.seek(Position::new())?;
        let n = scanned?;

        debug!(
            "sampled {} of {n} rows from {}",
            self.batch_size,
            self.path.display()
        );
        self.parse_reservoir()
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("closed dataset {}", self.path.display());
        }
    }
}

/// Scans the rest of the file keeping a uniform sample of its rows in `reservoir` (algorithm R).
///
/// # Returns
/// The amount of rows scanned. The reader is left wherever the scan stopped.
fn fill_reservoir<R: Rng>(
    reader: &mut Reader<File>,
    reservoir: &mut [StringRecord],
    scratch: &mut StringRecord,
    rng: &mut R,
    field_count: usize,
) -> Result<usize> {
    let b = reservoir.len();

    for (rows, slot) in reservoir.iter_mut().enumerate() {
        if !reader.read_record(slot)? {
            return Err(TrainErr::InsufficientData {
                rows,
                batch_size: b,
            });
        }

        check_width(slot, field_count)?;
    }

    let mut n = b;
    while reader.read_record(scratch)? {
        check_width(scratch, field_count)?;

        let j = rng.random_range(0..=n);
        if j < b {
            mem::swap(&mut reservoir[j], scratch);
        }

        n += 1;
    }

    Ok(n)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, Position::line)
}

fn check_width(record: &StringRecord, field_count: usize) -> Result<()> {
    if record.len() != field_count {
        return Err(TrainErr::DataFormat {
            line: line_of(record),
            got: record.len(),
            expected: field_count,
        });
    }

    Ok(())
}

fn parse_fields(
    record: &StringRecord,
    indices: &[usize],
    mut row: ArrayViewMut1<f32>,
) -> Result<()> {
    for (dst, &field) in row.iter_mut().zip(indices) {
        let value = record.get(field).unwrap_or_default();
        *dst = value
            .trim()
            .parse()
            .map_err(|_| TrainErr::FieldParse {
                line: line_of(record),
                field,
                value: value.to_string(),
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        fs::{self, OpenOptions},
        io::Write,
    };

    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::IngestorKind;

    fn dataset(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    /// Rows `i,i*10,i*100` for `i` in `0..n`.
    fn numbered(n: usize) -> NamedTempFile {
        let content: String = (0..n)
            .map(|i| format!("{i},{},{}\n", i * 10, i * 100))
            .collect();
        dataset(&content)
    }

    fn config(file: &NamedTempFile, batch_size: usize) -> IngestorConfig {
        IngestorConfig {
            kind: IngestorKind::Csv,
            dataset_path: file.path().to_path_buf(),
            batch_size,
            input_field_indices: vec![0, 1],
            expected_field_indices: vec![2],
            field_count: 3,
            delimiter: None,
            seed: None,
        }
    }

    fn ingestor(config: &IngestorConfig) -> CsvIngestor {
        CsvIngestor::with_rng(config, StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn batch_has_configured_shape() {
        let file = numbered(10);
        let mut ingestor = ingestor(&config(&file, 4));

        let batch = ingestor.ingest().unwrap();

        assert_eq!(batch.len(), 4);
        assert_eq!(batch.inputs.dim(), (4, 2));
        assert_eq!(batch.expected.dim(), (4, 1));
        for (x, y) in batch.inputs.outer_iter().zip(batch.expected.outer_iter()) {
            assert_eq!(x[1], x[0] * 10.);
            assert_eq!(y[0], x[0] * 100.);
        }
    }

    #[test]
    fn sampling_is_without_replacement() {
        let file = numbered(20);
        let mut ingestor = ingestor(&config(&file, 8));

        for _ in 0..50 {
            let batch = ingestor.ingest().unwrap();
            let mut ids: Vec<_> = batch.inputs.column(0).iter().map(|&x| x as u32).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), 8);
        }
    }

    #[test]
    fn batch_as_large_as_the_dataset_holds_every_row() {
        let file = numbered(5);
        let mut ingestor = ingestor(&config(&file, 5));

        let batch = ingestor.ingest().unwrap();
        let ids: Vec<_> = batch.inputs.column(0).to_vec();
        assert_eq!(ids, [0., 1., 2., 3., 4.]);
    }

    #[test]
    fn every_row_is_equally_likely() {
        const ROWS: usize = 10;
        const BATCH: usize = 3;
        const TRIALS: usize = 6000;

        let file = numbered(ROWS);
        let mut ingestor = ingestor(&config(&file, BATCH));
        let mut counts = [0usize; ROWS];

        for _ in 0..TRIALS {
            let batch = ingestor.ingest().unwrap();
            for &id in batch.inputs.column(0) {
                counts[id as usize] += 1;
            }
        }

        let expected = (TRIALS * BATCH / ROWS) as f32;
        for (row, &count) in counts.iter().enumerate() {
            let freq = count as f32 / expected;
            assert!(
                (0.9..1.1).contains(&freq),
                "row {row} was sampled {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn small_dataset_is_insufficient() {
        let file = numbered(2);
        let mut ingestor = ingestor(&config(&file, 5));

        assert!(matches!(
            ingestor.ingest(),
            Err(TrainErr::InsufficientData {
                rows: 2,
                batch_size: 5
            })
        ));
    }

    #[test]
    fn wrong_width_fails_on_open() {
        let file = dataset("1,2,3\n4,5\n6,7,8\n");

        let err = CsvIngestor::open(&config(&file, 1)).err().unwrap();

        assert!(matches!(
            err,
            TrainErr::DataFormat {
                line: 2,
                got: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn non_numeric_field_reports_its_position() {
        let file = dataset("1,2,3\n4,x,6\n");
        let mut ingestor = ingestor(&config(&file, 2));

        let err = ingestor.ingest().unwrap_err();

        match err {
            TrainErr::FieldParse { line, field, value } => {
                assert_eq!((line, field, value.as_str()), (2, 1, "x"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unreferenced_fields_are_not_parsed() {
        let file = dataset("1, 2 ,3,setosa\n4,5,6,virginica\n");
        let config = IngestorConfig {
            field_count: 4,
            ..config(&file, 2)
        };

        let batch = ingestor(&config).ingest().unwrap();

        let mut firsts = batch.inputs.column(0).to_vec();
        firsts.sort_by(f32::total_cmp);
        assert_eq!(firsts, [1., 4.]);
    }

    #[test]
    fn custom_delimiter() {
        let file = dataset("1;2;3\n4;5;6\n");
        let config = IngestorConfig {
            delimiter: Some(';'),
            ..config(&file, 2)
        };

        let batch = ingestor(&config).ingest().unwrap();
        assert_eq!(batch.expected.column(0).sum(), 9.);
    }

    #[test]
    fn failed_scan_still_rewinds() {
        let file = numbered(10);
        let mut ingestor = ingestor(&config(&file, 3));

        let mut handle = OpenOptions::new().append(true).open(file.path()).unwrap();
        handle.write_all(b"1,2\n").unwrap();

        assert!(matches!(
            ingestor.ingest(),
            Err(TrainErr::DataFormat {
                line: 11,
                got: 2,
                expected: 3
            })
        ));

        let content: String = (0..10)
            .map(|i| format!("{i},{},{}\n", i * 10, i * 100))
            .collect();
        fs::write(file.path(), content).unwrap();

        let batch = ingestor.ingest().unwrap();
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn open_rejects_inconsistent_config() {
        let file = numbered(3);
        let config = IngestorConfig {
            expected_field_indices: vec![5],
            ..config(&file, 1)
        };

        assert!(matches!(
            CsvIngestor::open(&config),
            Err(TrainErr::InvalidConfig(_))
        ));
    }

    #[test]
    fn ingest_after_close_fails() {
        let file = numbered(3);
        let mut ingestor = ingestor(&config(&file, 1));

        ingestor.close();
        ingestor.close();

        assert!(matches!(ingestor.ingest(), Err(TrainErr::IngestorClosed)));
    }

    #[test]
    fn same_seed_same_batches() {
        let file = numbered(30);
        let config = IngestorConfig {
            seed: Some(11),
            ..config(&file, 4)
        };

        let mut a = CsvIngestor::open(&config).unwrap();
        let mut b = CsvIngestor::open(&config).unwrap();

        for _ in 0..5 {
            assert_eq!(a.ingest().unwrap(), b.ingest().unwrap());
        }
    }
}
