#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::records::RecordFormat;
use crate::domain::model::CoalesceRule;
use crate::utils::error::Result;
use crate::utils::validation::{validate_min_len, validate_path, Validate};
use std::path::PathBuf;
use toml_config::TomlConfig;

/// Effective settings for one record run, after the config file and
/// command-line overrides are merged.
#[derive(Debug, Clone)]
pub struct RecordsJob {
    pub input: PathBuf,
    pub input_format: Option<RecordFormat>,
    /// `None` writes to stdout.
    pub output: Option<PathBuf>,
    pub output_format: Option<RecordFormat>,
    pub rules: Vec<CoalesceRule>,
}

impl RecordsJob {
    pub fn new(input: impl Into<PathBuf>, rules: Vec<CoalesceRule>) -> Self {
        Self {
            input: input.into(),
            input_format: None,
            output: None,
            output_format: None,
            rules,
        }
    }

    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        let input = crate::utils::validation::validate_required_field(
            "input.path",
            &config.input_path().map(str::to_string),
        )?
        .clone();

        Ok(Self {
            input: PathBuf::from(input),
            input_format: config.input_format()?,
            output: config.output_path().map(PathBuf::from),
            output_format: config.output_format()?,
            rules: config.rules.clone(),
        })
    }

    /// Output format: explicit, else from the output extension, else the
    /// input's format.
    pub fn resolved_output_format(&self) -> Option<RecordFormat> {
        self.output_format
            .or_else(|| self.output.as_deref().and_then(RecordFormat::from_path))
            .or(self.input_format)
            .or_else(|| RecordFormat::from_path(&self.input))
    }
}

impl Validate for RecordsJob {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input.to_string_lossy())?;
        if let Some(output) = &self.output {
            validate_path("output", &output.to_string_lossy())?;
        }
        validate_min_len("rules", &self.rules, 1)?;
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_requires_input() {
        let config = TomlConfig::from_toml_str("[[rules]]\ntarget = \"t\"\nsources = [\"a\"]\n").unwrap();
        assert!(RecordsJob::from_toml(&config).is_err());
    }

    #[test]
    fn test_resolved_output_format() {
        let mut job = RecordsJob::new("in.csv", vec![CoalesceRule::new("t", &["a"])]);
        assert_eq!(job.resolved_output_format(), Some(RecordFormat::Csv));

        job.output = Some(PathBuf::from("out.jsonl"));
        assert_eq!(job.resolved_output_format(), Some(RecordFormat::Jsonl));

        job.output_format = Some(RecordFormat::Json);
        assert_eq!(job.resolved_output_format(), Some(RecordFormat::Json));
        assert!(job.validate().is_ok());
    }
}
