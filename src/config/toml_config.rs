use crate::adapters::records::RecordFormat;
use crate::domain::model::CoalesceRule;
use crate::utils::error::{CoalesceError, Result};
use crate::utils::validation::{validate_min_len, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: Option<InputConfig>,
    pub output: Option<OutputConfig>,
    #[serde(default)]
    pub rules: Vec<CoalesceRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub format: Option<String>,
}

fn parse_format(field: &str, format: Option<&str>) -> Result<Option<RecordFormat>> {
    format
        .map(|f| {
            f.parse().map_err(|_| CoalesceError::InvalidConfigValueError {
                field: field.to_string(),
                value: f.to_string(),
                reason: "Unsupported format. Valid formats: json, jsonl, csv".to_string(),
            })
        })
        .transpose()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CoalesceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CoalesceError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn input_path(&self) -> Option<&str> {
        self.input.as_ref().map(|input| input.path.as_str())
    }

    pub fn input_format(&self) -> Result<Option<RecordFormat>> {
        parse_format(
            "input.format",
            self.input.as_ref().and_then(|input| input.format.as_deref()),
        )
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|output| output.path.as_deref())
    }

    pub fn output_format(&self) -> Result<Option<RecordFormat>> {
        parse_format(
            "output.format",
            self.output.as_ref().and_then(|output| output.format.as_deref()),
        )
    }

    /// Rule and format checks only; input and output may still come from flags.
    pub(crate) fn validate_rules_only(&self) -> Result<()> {
        for rule in &self.rules {
            rule.validate()?;
        }
        self.input_format()?;
        self.output_format()?;
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_min_len("rules", &self.rules, 1)?;
        for rule in &self.rules {
            rule.validate()?;
        }

        if let Some(path) = self.input_path() {
            validate_path("input.path", path)?;
        }
        if let Some(path) = self.output_path() {
            validate_path("output.path", path)?;
        }

        self.input_format()?;
        self.output_format()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"
[input]
path = "users.csv"

[output]
path = "out/users.json"
format = "json"

[[rules]]
target = "display_name"
sources = ["nickname", "full_name"]
default = "anonymous"

[[rules]]
target = "email"
sources = ["email", "contact.email"]
keep_sources = false
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = TomlConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.input_path(), Some("users.csv"));
        assert_eq!(config.output_path(), Some("out/users.json"));
        assert_eq!(config.output_format().unwrap(), Some(RecordFormat::Json));
        assert_eq!(config.input_format().unwrap(), None);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].default, Some(json!("anonymous")));
        assert!(config.rules[0].keep_sources);
        assert!(!config.rules[1].keep_sources);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COALESCE_TEST_INPUT_DIR", "/data");
        let config = TomlConfig::from_toml_str(
            r#"
[input]
path = "${COALESCE_TEST_INPUT_DIR}/users.json"

[[rules]]
target = "t"
sources = ["a"]
"#,
        )
        .unwrap();
        assert_eq!(config.input_path(), Some("/data/users.json"));

        let config = TomlConfig::from_toml_str(
            r#"
[input]
path = "${COALESCE_TEST_UNSET_VARIABLE}/users.json"
"#,
        )
        .unwrap();
        assert_eq!(config.input_path(), Some("${COALESCE_TEST_UNSET_VARIABLE}/users.json"));
    }

    #[test]
    fn test_validation_failures() {
        let no_rules = TomlConfig::from_toml_str("[input]\npath = \"a.json\"\n").unwrap();
        assert!(no_rules.validate().is_err());

        let bad_format = TomlConfig::from_toml_str(
            "[output]\nformat = \"xml\"\n\n[[rules]]\ntarget = \"t\"\nsources = [\"a\"]\n",
        )
        .unwrap();
        assert!(matches!(
            bad_format.validate(),
            Err(CoalesceError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            TomlConfig::from_toml_str("[[rules]\n"),
            Err(CoalesceError::ConfigValidationError { .. })
        ));
    }
}
