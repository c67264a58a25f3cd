use crate::adapters::csv_codec::{delimiter_for, parse_table};
use crate::adapters::encoding::{decode_input, DEFAULT_SNIFF_BYTES};
use crate::core::{Pipeline, Storage};
use crate::domain::model::{MatchReport, Table};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_distinct, validate_file_extensions, validate_non_empty_string, validate_path,
    Validate, TABULAR_EXTENSIONS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRateConfig {
    pub expected_path: String,
    pub experimental_path: String,
    pub name_column: String,
    pub linkedin_column: String,
    /// Where to write the JSON report; printed only when unset.
    pub report_path: Option<String>,
}

impl Default for MatchRateConfig {
    fn default() -> Self {
        Self {
            expected_path: String::new(),
            experimental_path: String::new(),
            name_column: "Full Name".to_string(),
            linkedin_column: "LinkedIn Profile".to_string(),
            report_path: None,
        }
    }
}

impl Validate for MatchRateConfig {
    fn validate(&self) -> Result<()> {
        validate_path("expected", &self.expected_path)?;
        validate_path("experimental", &self.experimental_path)?;
        validate_file_extensions(
            "inputs",
            &[self.expected_path.as_str(), self.experimental_path.as_str()],
            TABULAR_EXTENSIONS,
        )?;
        validate_non_empty_string("name_column", &self.name_column)?;
        validate_non_empty_string("linkedin_column", &self.linkedin_column)?;
        validate_distinct(
            "columns",
            &[self.name_column.as_str(), self.linkedin_column.as_str()],
        )?;
        if let Some(report) = &self.report_path {
            validate_path("report", report)?;
        }
        Ok(())
    }
}

fn non_blank_values(table: &Table, idx: usize) -> HashSet<&str> {
    table
        .rows
        .iter()
        .filter_map(|row| row.get(idx).map(String::as_str))
        .filter(|value| !value.is_empty())
        .collect()
}

/// Share of expected rows whose full name or LinkedIn profile appears anywhere in
/// `experimental`. Blank cells never match.
pub fn compute_match_rate(
    expected: &Table,
    experimental: &Table,
    name_column: &str,
    linkedin_column: &str,
) -> Result<MatchReport> {
    let expected_name = expected.require_column(name_column)?;
    let expected_link = expected.require_column(linkedin_column)?;
    let experimental_name = experimental.require_column(name_column)?;
    let experimental_link = experimental.require_column(linkedin_column)?;

    let known_names = non_blank_values(experimental, experimental_name);
    let known_links = non_blank_values(experimental, experimental_link);

    let mut matched = 0;
    let mut unmatched_names = Vec::new();
    for row in &expected.rows {
        let name = row.get(expected_name).map(String::as_str).unwrap_or("");
        let link = row.get(expected_link).map(String::as_str).unwrap_or("");

        let hit = (!name.is_empty() && known_names.contains(name))
            || (!link.is_empty() && known_links.contains(link));
        if hit {
            matched += 1;
        } else {
            unmatched_names.push(name.to_string());
        }
    }

    let total_expected = expected.rows.len();
    let accuracy_percent =
        (total_expected > 0).then(|| matched as f64 / total_expected as f64 * 100.0);

    Ok(MatchReport {
        total_expected,
        matched,
        accuracy_percent,
        unmatched_names,
    })
}

pub struct MatchRatePipeline<S: Storage> {
    storage: S,
    config: MatchRateConfig,
}

impl<S: Storage> MatchRatePipeline<S> {
    pub fn new(storage: S, config: MatchRateConfig) -> Self {
        Self { storage, config }
    }

    async fn read_table(&self, role: &str, path: &str) -> Result<Table> {
        let input = format!("{} ({})", role, path);
        let bytes = self.storage.read_file(path).await?;
        let decoded = decode_input(&input, &bytes, None, DEFAULT_SNIFF_BYTES);
        if let Some(warning) = &decoded.warning {
            tracing::warn!("⚠️ {} - decoding as UTF-8", warning);
        }
        parse_table(&input, &decoded.text, delimiter_for(path))
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for MatchRatePipeline<S> {
    type Extracted = (Table, Table);
    type Transformed = MatchReport;

    async fn extract(&self) -> Result<(Table, Table)> {
        let expected = self
            .read_table("expected", &self.config.expected_path)
            .await?;
        let experimental = self
            .read_table("experimental", &self.config.experimental_path)
            .await?;
        Ok((expected, experimental))
    }

    async fn transform(&self, data: (Table, Table)) -> Result<MatchReport> {
        let (expected, experimental) = data;
        compute_match_rate(
            &expected,
            &experimental,
            &self.config.name_column,
            &self.config.linkedin_column,
        )
    }

    async fn load(&self, report: MatchReport) -> Result<String> {
        match report.accuracy_percent {
            Some(accuracy) => println!("Total Accuracy (Full Name or LinkedIn): {:.2}%", accuracy),
            None => println!("Total Accuracy (Full Name or LinkedIn): n/a (no expected rows)"),
        }
        println!(
            "Matched {} of {} expected rows",
            report.matched, report.total_expected
        );
        println!("Companies with missing matches: {:?}", report.unmatched_names);

        match &self.config.report_path {
            Some(path) => {
                let json = serde_json::to_string_pretty(&report)?;
                self.storage.write_file(path, json.as_bytes()).await?;
                Ok(path.clone())
            }
            None => Ok("stdout".to_string()),
        }
    }
}
