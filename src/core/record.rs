use crate::core::coalesce::{coalesce, coalesce_by};
use crate::domain::model::{CoalesceRule, Record};
use crate::domain::truthy::Truthy;
use crate::domain::value::Value;
use crate::utils::error::{CoalesceError, Result};
use crate::utils::validation::{validate_min_len, validate_non_empty_string, Validate};

/// First truthy field among `paths`, looked up in order.
pub fn coalesce_fields<P: AsRef<str>>(record: &Record, paths: &[P]) -> Value {
    coalesce(paths.iter().filter_map(|path| record.get_path(path.as_ref())))
        .map(Value::from)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Matched(String),
    Defaulted,
    Missing,
}

/// Applies one rule in place. A rule with no truthy source and no default
/// writes `null`, since an absent value cannot be stored in a record.
pub fn apply_rule(record: &mut Record, rule: &CoalesceRule) -> RuleOutcome {
    let matched = coalesce_by(rule.sources.iter(), |path| record.get_path(path).is_truthy());

    let (value, outcome) = match matched {
        Some(path) => (
            record.get_path(path).cloned().unwrap_or(serde_json::Value::Null),
            RuleOutcome::Matched(path.clone()),
        ),
        None => match &rule.default {
            Some(default) => (default.clone(), RuleOutcome::Defaulted),
            None => (serde_json::Value::Null, RuleOutcome::Missing),
        },
    };

    if !rule.keep_sources {
        // nested sources are left in place
        let target_root = rule.target.split('.').next().unwrap_or(&rule.target);
        for source in &rule.sources {
            if !source.contains('.') && source != target_root {
                record.remove(source);
            }
        }
    }

    record.set_path(&rule.target, value);
    outcome
}

impl Validate for CoalesceRule {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("rules.target", &self.target)?;
        validate_min_len("rules.sources", &self.sources, 1)?;

        for source in &self.sources {
            if source.split('.').any(|segment| segment.trim().is_empty()) {
                return Err(CoalesceError::InvalidRuleError {
                    rule: self.target.clone(),
                    reason: format!("source path '{}' has an empty segment", source),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStats {
    pub target: String,
    pub matched: usize,
    pub defaulted: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoalesceReport {
    pub records: usize,
    pub rules: Vec<RuleStats>,
}

#[derive(Debug, Clone)]
pub struct CoalesceResult {
    pub records: Vec<Record>,
    pub report: CoalesceReport,
}

#[derive(Debug, Clone)]
pub struct RecordCoalescer {
    rules: Vec<CoalesceRule>,
}

impl RecordCoalescer {
    pub fn new(rules: Vec<CoalesceRule>) -> Result<Self> {
        validate_min_len("rules", &rules, 1)?;
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[CoalesceRule] {
        &self.rules
    }

    /// Rules run in order, so a later rule may read a target written by an
    /// earlier one.
    pub fn process(&self, mut records: Vec<Record>) -> CoalesceResult {
        let mut stats: Vec<RuleStats> = self
            .rules
            .iter()
            .map(|rule| RuleStats {
                target: rule.target.clone(),
                ..RuleStats::default()
            })
            .collect();

        for (index, record) in records.iter_mut().enumerate() {
            for (rule, stat) in self.rules.iter().zip(stats.iter_mut()) {
                match apply_rule(record, rule) {
                    RuleOutcome::Matched(path) => {
                        tracing::debug!("record {}: {} <- {}", index, rule.target, path);
                        stat.matched += 1;
                    }
                    RuleOutcome::Defaulted => {
                        tracing::debug!("record {}: {} <- default", index, rule.target);
                        stat.defaulted += 1;
                    }
                    RuleOutcome::Missing => {
                        tracing::debug!("record {}: {} has no truthy source", index, rule.target);
                        stat.missing += 1;
                    }
                }
            }
        }

        for stat in &stats {
            tracing::info!(
                "🔄 {}: {} matched, {} defaulted, {} missing",
                stat.target,
                stat.matched,
                stat.defaulted,
                stat.missing
            );
        }

        CoalesceResult {
            report: CoalesceReport {
                records: records.len(),
                rules: stats,
            },
            records,
        }
    }
}
