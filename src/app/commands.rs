use crate::config::cli::{CliConfig, Command, RecordsArgs};
use crate::core::coalesce::coalesce_values;
use crate::core::engine::CoalesceEngine;
use crate::domain::value::Value;
use crate::utils::error::Result;
use std::io::Write;

/// Dispatches a parsed command line. Results go to `out`; logs go through
/// `tracing`.
pub fn run<W: Write>(config: CliConfig, out: W) -> Result<()> {
    match config.command {
        Command::Values { values, json } => run_values(out, &values, json),
        Command::Records(args) => run_records(out, args),
    }
}

/// Prints the first truthy argument, `undefined` when there is none.
pub fn run_values<W: Write>(mut out: W, values: &[String], json: bool) -> Result<()> {
    let parsed: Vec<Value> = values.iter().map(|v| Value::parse_literal(v)).collect();
    tracing::debug!("Parsed {} values", parsed.len());

    let result = coalesce_values(parsed);
    if json {
        serde_json::to_writer(&mut out, &result)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", result)?;
    }
    Ok(())
}

pub fn run_records<W: Write>(mut out: W, args: RecordsArgs) -> Result<()> {
    let dry_run = args.dry_run;
    let job = args.into_job()?;
    let engine = CoalesceEngine::new(job)?;

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return write_job_summary(&mut out, &engine);
    }

    let report = engine.run(&mut out)?;
    tracing::info!("✅ Coalesced {} records", report.records);
    if let Some(output) = &engine.job().output {
        tracing::info!("📁 Output saved to: {}", output.display());
    }
    Ok(())
}

pub fn write_job_summary<W: Write>(mut out: W, engine: &CoalesceEngine) -> Result<()> {
    let job = engine.job();
    writeln!(out, "📋 Job Summary:")?;
    writeln!(out, "  Input: {}", job.input.display())?;
    match &job.output {
        Some(output) => writeln!(out, "  Output: {}", output.display())?,
        None => writeln!(out, "  Output: stdout")?,
    }
    if let Some(format) = engine.output_format() {
        writeln!(out, "  Output format: {}", format.as_str())?;
    }

    writeln!(out)?;
    writeln!(out, "🔄 Rules:")?;
    for rule in &job.rules {
        let default = rule
            .default
            .as_ref()
            .map(|d| format!(" (default {})", d))
            .unwrap_or_default();
        let dropped = if rule.keep_sources { "" } else { ", drop sources" };
        writeln!(
            out,
            "  {} <- {}{}{}",
            rule.target,
            rule.sources.join(" | "),
            default,
            dropped
        )?;
    }

    writeln!(out)?;
    writeln!(out, "✅ Dry run complete. Remove --dry-run to process records.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CoalesceError;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn run_cli(args: &[&str]) -> Result<String> {
        let config = CliConfig::try_parse_from(args).map_err(|e| CoalesceError::ConfigError {
            message: e.to_string(),
        })?;
        let mut out = Vec::new();
        run(config, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_values_prints_first_truthy() {
        let out = run_cli(&["coalesce", "values", "undefined", "null", "0", "\"\"", "NaN", "false", "7"])
            .unwrap();
        assert_eq!(out, "7\n");
    }

    #[test]
    fn test_values_prints_undefined_when_nothing_is_truthy() {
        assert_eq!(run_cli(&["coalesce", "values", "undefined", "null"]).unwrap(), "undefined\n");
        assert_eq!(run_cli(&["coalesce", "values"]).unwrap(), "undefined\n");
    }

    #[test]
    fn test_values_flags_after_values() {
        assert_eq!(run_cli(&["coalesce", "values", "0", "--json"]).unwrap(), "null\n");
        assert_eq!(run_cli(&["coalesce", "values", "0", "\"x\"", "--json"]).unwrap(), "\"x\"\n");
        assert_eq!(run_cli(&["coalesce", "values", "", "-v"]).unwrap(), "undefined\n");
    }

    #[test]
    fn test_values_negative_numbers() {
        assert_eq!(run_cli(&["coalesce", "values", "-0", "-1.5"]).unwrap(), "-1.5\n");
        assert_eq!(run_cli(&["coalesce", "values", "0", "--", "-Infinity"]).unwrap(), "-Infinity\n");
    }

    #[test]
    fn test_records_dry_run_prints_summary_only() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("users.json");
        fs::write(&input, r#"[{"nick": "", "name": "Ada"}]"#).unwrap();
        let input = input.display().to_string();

        let out = run_cli(&[
            "coalesce",
            "records",
            "--input",
            &input,
            "--rule",
            "display=nick,name:\"anon\"",
            "--dry-run",
        ])
        .unwrap();

        assert!(out.contains("📋 Job Summary:"));
        assert!(out.contains("  Output: stdout"));
        assert!(out.contains("  Output format: json"));
        assert!(out.contains("  display <- nick | name (default \"anon\")"));
        assert!(!out.contains("Ada"));
    }

    #[test]
    fn test_records_to_stdout() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("users.jsonl");
        fs::write(&input, "{\"nick\": \"\", \"name\": \"Ada\"}\n").unwrap();
        let input = input.display().to_string();

        let out = run_cli(&["coalesce", "records", "-i", &input, "-r", "display=nick,name"]).unwrap();
        assert_eq!(out, "{\"display\":\"Ada\",\"name\":\"Ada\",\"nick\":\"\"}\n");
    }

    #[test]
    fn test_records_errors_map_to_exit_codes() {
        let err = run_cli(&["coalesce", "records", "--rule", "a=b"]).unwrap_err();
        assert!(matches!(err, CoalesceError::MissingConfigError { .. }));
        assert_eq!(err.exit_code(), 2);

        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.json").display().to_string();
        let err = run_cli(&["coalesce", "records", "-i", &missing, "-r", "a=b"]).unwrap_err();
        assert_eq!(err.exit_code(), 4);

        let broken = temp_dir.path().join("broken.json");
        fs::write(&broken, "[1]").unwrap();
        let broken = broken.display().to_string();
        let err = run_cli(&["coalesce", "records", "-i", &broken, "-r", "a=b"]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
