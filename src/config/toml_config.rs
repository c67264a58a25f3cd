use crate::utils::error::{LeadError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Merge settings file. Every section is optional; command-line flags override it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub merge: MergeSection,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputsConfig {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub primary_encoding: Option<String>,
    pub secondary_encoding: Option<String>,
    pub sniff_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnsConfig {
    pub domain: Option<String>,
    pub full_name: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeSection {
    pub normalize_keys: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| LeadError::FileReadError {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LeadError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LEADS_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LeadError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[inputs]
primary = "updated_leads.csv"
secondary = "crust_data.csv"
secondary_encoding = "windows-1252"
sniff_bytes = 4096

[output]
path = "updated_my_results_with_source.csv"

[columns]
full_name = "Name"

[sources]
primary = "my_results"
secondary = "crust_data"

[merge]
normalize_keys = true

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.inputs.primary.as_deref(), Some("updated_leads.csv"));
        assert_eq!(config.inputs.sniff_bytes, Some(4096));
        assert_eq!(config.columns.full_name.as_deref(), Some("Name"));
        assert_eq!(config.columns.domain, None);
        assert_eq!(config.sources.secondary.as_deref(), Some("crust_data"));
        assert_eq!(config.merge.normalize_keys, Some(true));
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.inputs.primary.is_none());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LEAD_MERGE_TEST_DIR", "/data/leads");

        let toml_content = r#"
[inputs]
primary = "${LEAD_MERGE_TEST_DIR}/primary.csv"
secondary = "${LEAD_MERGE_TEST_UNSET_VAR}/secondary.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.inputs.primary.as_deref(), Some("/data/leads/primary.csv"));
        assert_eq!(
            config.inputs.secondary.as_deref(),
            Some("${LEAD_MERGE_TEST_UNSET_VAR}/secondary.csv")
        );

        std::env::remove_var("LEAD_MERGE_TEST_DIR");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = TomlConfig::from_toml_str("[inputs]\nprimry = \"a.csv\"\n");
        assert!(matches!(
            result,
            Err(LeadError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\npath = \"merged.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.path.as_deref(), Some("merged.csv"));
    }
}
