use crate::adapters::records::{read_records, write_records, write_records_to_path, RecordFormat};
use crate::config::RecordsJob;
use crate::core::record::{CoalesceReport, RecordCoalescer};
use crate::utils::error::{CoalesceError, Result};
use std::io::Write;

/// Read, coalesce, write.
pub struct CoalesceEngine {
    job: RecordsJob,
    coalescer: RecordCoalescer,
}

impl CoalesceEngine {
    pub fn new(job: RecordsJob) -> Result<Self> {
        let coalescer = RecordCoalescer::new(job.rules.clone())?;
        Ok(Self { job, coalescer })
    }

    pub fn job(&self) -> &RecordsJob {
        &self.job
    }

    /// Runs the job, writing to the configured output or to `stdout` when
    /// there is none.
    pub fn run<W: Write>(&self, stdout: W) -> Result<CoalesceReport> {
        let records = read_records(&self.job.input, self.job.input_format)?;
        tracing::info!("Extracted {} records", records.len());

        let result = self.coalescer.process(records);

        let format = self
            .job
            .resolved_output_format()
            .ok_or_else(|| CoalesceError::ConfigError {
                message: "Cannot determine the output format; pass --output-format".to_string(),
            })?;

        match &self.job.output {
            Some(path) => write_records_to_path(path, &result.records, Some(format))?,
            None => write_records(stdout, &result.records, format)?,
        }

        Ok(result.report)
    }

    pub fn output_format(&self) -> Option<RecordFormat> {
        self.job.resolved_output_format()
    }
}
