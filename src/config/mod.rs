#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::adapters::encoding::{resolve_label, DEFAULT_SNIFF_BYTES};
use crate::core::ConfigProvider;
use crate::domain::model::MergeOptions;
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{
    validate_distinct, validate_file_extensions, validate_non_empty_string, validate_path,
    validate_positive_number, Validate, TABULAR_EXTENSIONS,
};
use serde::{Deserialize, Serialize};

/// Effective settings of one merge run, after the config file and flags are combined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    pub primary_path: String,
    pub secondary_path: String,
    pub output_path: String,
    pub primary_encoding: Option<String>,
    pub secondary_encoding: Option<String>,
    pub sniff_bytes: usize,
    pub options: MergeOptions,
    pub monitor: bool,
}

impl MergeConfig {
    pub fn new(primary_path: &str, secondary_path: &str, output_path: &str) -> Self {
        Self {
            primary_path: primary_path.to_string(),
            secondary_path: secondary_path.to_string(),
            output_path: output_path.to_string(),
            primary_encoding: None,
            secondary_encoding: None,
            sniff_bytes: DEFAULT_SNIFF_BYTES,
            options: MergeOptions::default(),
            monitor: false,
        }
    }
}

impl ConfigProvider for MergeConfig {
    fn primary_path(&self) -> &str {
        &self.primary_path
    }

    fn secondary_path(&self) -> &str {
        &self.secondary_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn primary_encoding(&self) -> Option<&str> {
        self.primary_encoding.as_deref()
    }

    fn secondary_encoding(&self) -> Option<&str> {
        self.secondary_encoding.as_deref()
    }

    fn sniff_bytes(&self) -> usize {
        self.sniff_bytes
    }

    fn merge_options(&self) -> &MergeOptions {
        &self.options
    }
}

impl Validate for MergeConfig {
    fn validate(&self) -> Result<()> {
        validate_path("primary", &self.primary_path)?;
        validate_path("secondary", &self.secondary_path)?;
        validate_path("output", &self.output_path)?;
        validate_file_extensions(
            "paths",
            &[
                self.primary_path.as_str(),
                self.secondary_path.as_str(),
                self.output_path.as_str(),
            ],
            TABULAR_EXTENSIONS,
        )?;

        for input in [&self.primary_path, &self.secondary_path] {
            if *input == self.output_path {
                return Err(LeadError::InvalidConfigValueError {
                    field: "output".to_string(),
                    value: self.output_path.clone(),
                    reason: "Output would overwrite an input file".to_string(),
                });
            }
        }

        validate_positive_number("sniff_bytes", self.sniff_bytes, 1)?;

        for label in [&self.primary_encoding, &self.secondary_encoding]
            .into_iter()
            .flatten()
        {
            resolve_label(label)?;
        }

        let columns = &self.options.columns;
        validate_non_empty_string("domain_column", &columns.domain)?;
        validate_non_empty_string("name_column", &columns.full_name)?;
        validate_non_empty_string("source_column", &columns.source)?;
        validate_distinct(
            "columns",
            &[
                columns.domain.as_str(),
                columns.full_name.as_str(),
                columns.source.as_str(),
            ],
        )?;

        let labels = &self.options.labels;
        validate_non_empty_string("primary_label", &labels.primary)?;
        validate_non_empty_string("secondary_label", &labels.secondary)?;
        validate_distinct(
            "labels",
            &[labels.primary.as_str(), labels.secondary.as_str()],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_merge_config_is_valid() {
        let config = MergeConfig::new("leads.csv", "crust.csv", "out.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_must_not_overwrite_input() {
        let config = MergeConfig::new("leads.csv", "crust.csv", "leads.csv");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_settings() {
        let mut config = MergeConfig::new("leads.csv", "crust.csv", "out.csv");
        config.secondary_encoding = Some("nope".to_string());
        assert!(matches!(
            config.validate(),
            Err(LeadError::UnknownEncodingError { .. })
        ));

        let mut config = MergeConfig::new("leads.csv", "crust.csv", "out.csv");
        config.options.labels.secondary = "primary".to_string();
        assert!(config.validate().is_err());

        let mut config = MergeConfig::new("leads.csv", "crust.csv", "out.csv");
        config.options.columns.source = "Domain".to_string();
        assert!(config.validate().is_err());

        let mut config = MergeConfig::new("leads.xlsx", "crust.csv", "out.csv");
        config.sniff_bytes = 0;
        assert!(config.validate().is_err());
    }
}
