//! Document encoding.
//!
//! The conversion pipeline hands each finished [`EphemerisDocument`] to a
//! [`DocumentEncoder`] and persists whatever bytes come back. The shipped
//! encoder writes one Parquet table per document with polars.

use crate::config::CompressionAlgorithm;
use crate::constants::{COVARIANCE_FIELD_NAMES, STATE_FIELD_NAMES};
use crate::document::EphemerisDocument;
use crate::error::{EphemerisError, Result};
use polars::prelude::*;
use tracing::debug;

/// Turns a document into the bytes of one output file
pub trait DocumentEncoder: Send + Sync {
    /// File extension for encoded output, without the dot
    fn extension(&self) -> &str;

    fn encode(&self, document: &EphemerisDocument) -> Result<Vec<u8>>;
}

/// Encodes documents as Parquet, one row per epoch
#[derive(Debug, Clone)]
pub struct ParquetEncoder {
    compression: CompressionAlgorithm,
}

impl ParquetEncoder {
    pub fn new(compression: CompressionAlgorithm) -> Self {
        Self { compression }
    }

    /// Lay the document out as a DataFrame.
    ///
    /// Descriptor and header fields are repeated on every row so each output
    /// file is self-describing.
    pub fn to_dataframe(&self, document: &EphemerisDocument) -> Result<DataFrame> {
        let records = document.records();
        let rows = records.len();
        let descriptor = document.descriptor();
        let metadata = document.metadata();

        let epochs: Vec<i64> = records
            .iter()
            .map(|r| r.epoch().timestamp_millis())
            .collect();
        let epoch = Series::new("epoch".into(), epochs)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let mut columns: Vec<Column> = Vec::with_capacity(40);
        columns.push(epoch.into());

        for (i, name) in STATE_FIELD_NAMES.iter().enumerate() {
            let values: Vec<f64> = records.iter().map(|r| r.state.components()[i]).collect();
            columns.push(Column::new(name.to_lowercase().into(), values));
        }

        for (i, name) in COVARIANCE_FIELD_NAMES.iter().enumerate() {
            let values: Vec<f64> = records.iter().map(|r| r.covariance.terms[i]).collect();
            columns.push(Column::new((*name).into(), values));
        }

        let text = |name: &str, value: &str| Column::new(name.into(), vec![value; rows]);
        let optional = |name: &str, value: Option<&str>| {
            Column::new(name.into(), vec![value; rows])
        };

        columns.push(text("catalog_id", &descriptor.catalog_id));
        columns.push(text("object_name", &descriptor.object_name));
        columns.push(text("satellite_id", &descriptor.satellite_id));
        columns.push(text(
            "operational_status",
            descriptor.operational_status.as_str(),
        ));
        columns.push(Column::new(
            "file_epoch_unix_seconds".into(),
            vec![descriptor.epoch_unix_seconds; rows],
        ));
        columns.push(text("classification", &descriptor.classification));
        columns.push(text("originator", &metadata.originator));
        columns.push(optional("creation_date", metadata.creation_date.as_deref()));
        columns.push(optional("start_time", metadata.start_time.as_deref()));
        columns.push(optional("stop_time", metadata.stop_time.as_deref()));
        columns.push(Column::new(
            "step_size_seconds".into(),
            vec![metadata.step_size_seconds; rows],
        ));
        columns.push(text(
            "cov_reference_frame",
            metadata.reference_frame.as_str(),
        ));
        columns.push(optional(
            "ephemeris_source",
            metadata.ephemeris_source.as_deref(),
        ));

        Ok(DataFrame::new(columns)?)
    }
}

impl DocumentEncoder for ParquetEncoder {
    fn extension(&self) -> &str {
        "parquet"
    }

    fn encode(&self, document: &EphemerisDocument) -> Result<Vec<u8>> {
        let mut df = self.to_dataframe(document)?;
        let mut buffer = Vec::new();

        ParquetWriter::new(&mut buffer)
            .with_compression(self.compression.to_polars_compression())
            .finish(&mut df)
            .map_err(|e| EphemerisError::Encoding {
                reason: format!(
                    "Failed to write parquet for {}: {}",
                    document.descriptor().object_name,
                    e
                ),
            })?;

        debug!(
            "Encoded {} records into {} bytes",
            document.len(),
            buffer.len()
        );
        Ok(buffer)
    }
}
