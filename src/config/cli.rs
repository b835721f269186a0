use crate::adapters::records::RecordFormat;
use crate::config::toml_config::TomlConfig;
use crate::config::RecordsJob;
use crate::domain::model::CoalesceRule;
use crate::utils::error::{CoalesceError, Result};
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "coalesce")]
#[command(about = "Pick the first truthy value from a list of values or record fields")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the first truthy argument (`undefined` when there is none)
    Values {
        /// Values as JSON literals, `undefined`, `NaN`, `Infinity`, or bare strings.
        /// Negative numbers are accepted; pass `-Infinity` after `--`
        #[arg(allow_negative_numbers = true)]
        values: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill record fields from the first truthy of several source fields
    Records(RecordsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RecordsArgs {
    /// Input file (json, jsonl or csv)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input format, overriding the file extension
    #[arg(long)]
    pub format: Option<RecordFormat>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format, overriding the file extension
    #[arg(long)]
    pub output_format: Option<RecordFormat>,

    /// Rule as TARGET=SOURCE[,SOURCE...][:DEFAULT], repeatable
    #[arg(short, long = "rule")]
    pub rules: Vec<CoalesceRule>,

    /// TOML config file with [input], [output] and [[rules]]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Validate the settings and print the rules without processing
    #[arg(long)]
    pub dry_run: bool,
}

impl RecordsArgs {
    /// Merges the config file (if any) with command-line flags. Flags win;
    /// `--rule` entries are appended after the file's rules.
    pub fn into_job(self) -> Result<RecordsJob> {
        let mut job = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                let config = TomlConfig::from_file(path)?;
                config.validate_rules_only()?;
                match self.input.clone() {
                    Some(input) => {
                        let mut job = RecordsJob::new(input, config.rules.clone());
                        job.input_format = config.input_format()?;
                        job.output = config.output_path().map(PathBuf::from);
                        job.output_format = config.output_format()?;
                        job
                    }
                    None => RecordsJob::from_toml(&config)?,
                }
            }
            None => {
                let input = self.input.clone().ok_or_else(|| CoalesceError::MissingConfigError {
                    field: "--input".to_string(),
                })?;
                RecordsJob::new(input, Vec::new())
            }
        };

        if self.format.is_some() {
            job.input_format = self.format;
        }
        if self.output.is_some() {
            job.output = self.output;
        }
        if self.output_format.is_some() {
            job.output_format = self.output_format;
        }
        job.rules.extend(self.rules);

        job.validate()?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values_with_negative_numbers() {
        let cli = CliConfig::try_parse_from(["coalesce", "values", "undefined", "-0", "-2.5"])
            .unwrap();
        match cli.command {
            Command::Values { values, json } => {
                assert_eq!(values, vec!["undefined", "-0", "-2.5"]);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = CliConfig::try_parse_from(["coalesce", "values", "--", "-Infinity"]).unwrap();
        let Command::Values { values, .. } = cli.command else {
            panic!("expected values command");
        };
        assert_eq!(values, vec!["-Infinity"]);
    }

    #[test]
    fn test_flags_after_values_are_not_values() {
        let cli = CliConfig::try_parse_from(["coalesce", "values", "0", "--json"]).unwrap();
        let Command::Values { values, json } = cli.command else {
            panic!("expected values command");
        };
        assert_eq!(values, vec!["0"]);
        assert!(json);

        let cli = CliConfig::try_parse_from(["coalesce", "values", "0", "-v"]).unwrap();
        assert!(cli.verbose);
        let Command::Values { values, .. } = cli.command else {
            panic!("expected values command");
        };
        assert_eq!(values, vec!["0"]);
    }

    #[test]
    fn test_parse_records_rules() {
        let cli = CliConfig::try_parse_from([
            "coalesce",
            "-v",
            "records",
            "--input",
            "users.csv",
            "--rule",
            "name=nick,full_name",
            "--rule",
            "score=points:0",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Command::Records(args) = cli.command else {
            panic!("expected records command");
        };
        let job = args.into_job().unwrap();
        assert_eq!(job.input, PathBuf::from("users.csv"));
        assert_eq!(job.rules.len(), 2);
        assert_eq!(job.rules[1].default, Some(serde_json::json!(0)));
    }

    #[test]
    fn test_records_requires_input_and_rules() {
        let cli = CliConfig::try_parse_from(["coalesce", "records", "--rule", "a=b"]).unwrap();
        let Command::Records(args) = cli.command else {
            panic!("expected records command");
        };
        assert!(matches!(args.into_job(), Err(CoalesceError::MissingConfigError { .. })));

        let cli = CliConfig::try_parse_from(["coalesce", "records", "-i", "in.json"]).unwrap();
        let Command::Records(args) = cli.command else {
            panic!("expected records command");
        };
        assert!(args.into_job().is_err());
    }

    #[test]
    fn test_invalid_rule_is_a_parse_error() {
        assert!(CliConfig::try_parse_from(["coalesce", "records", "--rule", "nonsense"]).is_err());
        assert!(CliConfig::try_parse_from(["coalesce", "records", "--format", "xml"]).is_err());
    }
}
