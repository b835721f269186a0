use crate::utils::error::CoalesceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: BTreeMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a dot-separated path (`user.profile.name`). Numeric
    /// segments index into arrays.
    pub fn get_path(&self, path: &str) -> Option<&serde_json::Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.data.get(first)?;

        for segment in segments {
            current = match current {
                serde_json::Value::Object(map) => map.get(segment)?,
                serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    pub fn set(&mut self, field: impl Into<String>, value: serde_json::Value) {
        self.data.insert(field.into(), value);
    }

    /// Writes through a dot-separated path, creating objects for missing
    /// segments. Numeric segments index into existing arrays when in range;
    /// any other non-object along the way is replaced by an object.
    pub fn set_path(&mut self, path: &str, value: serde_json::Value) {
        let (first, rest) = match path.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };

        let Some(rest) = rest else {
            self.data.insert(first.to_string(), value);
            return;
        };

        let mut current = self
            .data
            .entry(first.to_string())
            .or_insert(serde_json::Value::Null);
        for segment in rest.split('.') {
            current = child_mut(current, segment);
        }
        *current = value;
    }

    pub fn remove(&mut self, field: &str) -> Option<serde_json::Value> {
        self.data.remove(field)
    }
}

fn child_mut<'a>(node: &'a mut serde_json::Value, segment: &str) -> &'a mut serde_json::Value {
    let index = node
        .as_array()
        .and_then(|items| segment.parse::<usize>().ok().filter(|i| *i < items.len()));
    if let Some(index) = index {
        return &mut node[index];
    }

    // indexing a null by key turns it into an object
    if !node.is_object() {
        *node = serde_json::Value::Null;
    }
    &mut node[segment]
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: map.into_iter().collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = serde_json::Value;

    fn try_from(value: serde_json::Value) -> std::result::Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Record::from(map)),
            other => Err(other),
        }
    }
}

fn default_keep_sources() -> bool {
    true
}

/// Writes the first truthy source field of a record into `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoalesceRule {
    pub target: String,
    pub sources: Vec<String>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default = "default_keep_sources")]
    pub keep_sources: bool,
}

impl CoalesceRule {
    pub fn new(target: impl Into<String>, sources: &[&str]) -> Self {
        Self {
            target: target.into(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            default: None,
            keep_sources: true,
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn drop_sources(mut self) -> Self {
        self.keep_sources = false;
        self
    }
}

/// `TARGET=SRC1,SRC2[:DEFAULT]`, where DEFAULT is JSON or a bare string.
impl FromStr for CoalesceRule {
    type Err = CoalesceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoalesceError::InvalidRuleError {
            rule: s.to_string(),
            reason: reason.to_string(),
        };

        let (target, rest) = s
            .split_once('=')
            .ok_or_else(|| invalid("expected TARGET=SOURCE[,SOURCE...][:DEFAULT]"))?;
        let target = target.trim();
        if target.is_empty() {
            return Err(invalid("target field is empty"));
        }

        let (sources, default) = match rest.split_once(':') {
            Some((sources, default)) => (
                sources,
                Some(
                    serde_json::from_str(default)
                        .unwrap_or_else(|_| serde_json::Value::String(default.to_string())),
                ),
            ),
            None => (rest, None),
        };

        let sources: Vec<String> = sources
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if sources.is_empty() {
            return Err(invalid("at least one source field is required"));
        }

        Ok(Self {
            target: target.to_string(),
            sources,
            default,
            keep_sources: true,
        })
    }
}
