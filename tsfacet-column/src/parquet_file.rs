//! On-disk segments stored in a Parquet file, one row group per segment.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use parquet::arrow::ArrowWriter;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tsfacet_result::{Error, Result};

use crate::segment::RecordBatchSegment;

/// Decode batch size used when materializing a row group.
const READ_BATCH_ROWS: usize = 8192;

/// A Parquet file whose row groups are scanned as independent segments.
///
/// Only the requested facet columns are decoded. Row group `i` becomes the
/// segment with id `i`, and row order inside the group is the document order.
#[derive(Debug)]
pub struct ParquetSegmentFile {
    path: PathBuf,
    schema: SchemaRef,
    num_row_groups: usize,
}

impl ParquetSegmentFile {
    /// Open `path` and read its footer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        let schema = builder.schema().clone();
        let num_row_groups = builder.metadata().num_row_groups();
        tracing::debug!(path = %path.display(), num_row_groups, "opened parquet segment file");
        Ok(Self {
            path,
            schema,
            num_row_groups,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn num_segments(&self) -> usize {
        self.num_row_groups
    }

    /// Decode row group `index`, projected to `fields`.
    pub fn read_segment(&self, index: usize, fields: &[&str]) -> Result<RecordBatchSegment> {
        if index >= self.num_row_groups {
            return Err(Error::InvalidArgumentError(format!(
                "row group {index} out of range ({} row groups in {})",
                self.num_row_groups,
                self.path.display()
            )));
        }
        let segment_id = u32::try_from(index)
            .map_err(|_| Error::Internal(format!("row group index {index} exceeds u32")))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&self.path)?)?;
        let mut roots = Vec::with_capacity(fields.len());
        for field in fields {
            let idx = self
                .schema
                .index_of(field)
                .map_err(|_| Error::ColumnNotFound((*field).to_string()))?;
            if !roots.contains(&idx) {
                roots.push(idx);
            }
        }
        let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
        let reader = builder
            .with_row_groups(vec![index])
            .with_projection(mask)
            .with_batch_size(READ_BATCH_ROWS)
            .build()?;
        let schema = reader.schema();
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        let batch = concat_batches(&schema, &batches)?;

        tracing::trace!(
            segment = segment_id,
            rows = batch.num_rows(),
            "decoded parquet row group"
        );
        Ok(RecordBatchSegment::new(segment_id, batch))
    }

    /// Decode every row group, projected to `fields`.
    pub fn read_segments(&self, fields: &[&str]) -> Result<Vec<RecordBatchSegment>> {
        (0..self.num_row_groups)
            .map(|index| self.read_segment(index, fields))
            .collect()
    }
}

/// Write `batches` to a Parquet file at `path`, one row group per batch.
///
/// All batches must share the first batch's schema.
pub fn write_segment_file(path: impl AsRef<Path>, batches: &[RecordBatch]) -> Result<()> {
    let Some(first) = batches.first() else {
        return Err(Error::InvalidArgumentError(
            "cannot write a segment file without batches".into(),
        ));
    };

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, first.schema(), Some(props))?;
    for batch in batches {
        writer.write(batch)?;
        // Close the row group so each batch stays its own segment.
        writer.flush()?;
    }
    writer.close()?;
    Ok(())
}
