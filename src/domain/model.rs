use crate::utils::error::{LeadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Which input a lead came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Primary,
    Secondary,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Primary => write!(f, "primary"),
            Source::Secondary => write!(f, "secondary"),
        }
    }
}

/// Text written to the source column for each input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLabels {
    pub primary: String,
    pub secondary: String,
}

impl SourceLabels {
    pub fn label(&self, source: Source) -> &str {
        match source {
            Source::Primary => &self.primary,
            Source::Secondary => &self.secondary,
        }
    }
}

impl Default for SourceLabels {
    fn default() -> Self {
        Self {
            primary: "primary".to_string(),
            secondary: "secondary".to_string(),
        }
    }
}

/// Header names of the columns the merge relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub domain: String,
    pub full_name: String,
    pub source: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            domain: "Domain".to_string(),
            full_name: "Full Name".to_string(),
            source: "Source".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    pub columns: ColumnNames,
    pub labels: SourceLabels,
    /// Compare domain and name keys trimmed and ASCII-lowercased.
    pub normalize_keys: bool,
}

/// A decoded CSV: header row plus rows padded to the header width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| LeadError::MissingColumnError {
                column: column.to_string(),
                input: self.name.clone(),
            })
    }
}

/// One lead: the key columns plus every other cell of its row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub domain: String,
    pub full_name: String,
    pub source: Source,
    pub extra: HashMap<String, String>,
}

impl LeadRecord {
    pub fn new(domain: impl Into<String>, full_name: impl Into<String>, source: Source) -> Self {
        Self {
            domain: domain.into(),
            full_name: full_name.into(),
            source,
            extra: HashMap::new(),
        }
    }

    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(column.into(), value.into());
        self
    }

    /// Cell value for `column`; absent cells read as empty.
    pub fn field<'a>(
        &'a self,
        column: &str,
        columns: &ColumnNames,
        labels: &'a SourceLabels,
    ) -> &'a str {
        if column == columns.domain {
            &self.domain
        } else if column == columns.full_name {
            &self.full_name
        } else if column == columns.source {
            labels.label(self.source)
        } else {
            self.extra.get(column).map(String::as_str).unwrap_or("")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<String>,
    pub records: Vec<LeadRecord>,
}

impl Dataset {
    /// Checks the key columns and tags every row with `source`.
    ///
    /// An existing source column is kept in the schema but its values are replaced by the tag.
    pub fn from_table(table: Table, source: Source, columns: &ColumnNames) -> Result<Self> {
        let domain_idx = table.require_column(&columns.domain)?;
        let name_idx = table.require_column(&columns.full_name)?;
        let source_idx = table.column_index(&columns.source);

        let Table {
            name,
            headers,
            rows,
        } = table;

        let records = rows
            .into_iter()
            .map(|row| {
                let mut record = LeadRecord::new(
                    row.get(domain_idx).cloned().unwrap_or_default(),
                    row.get(name_idx).cloned().unwrap_or_default(),
                    source,
                );
                for (idx, (header, value)) in headers.iter().zip(row).enumerate() {
                    if idx == domain_idx || idx == name_idx || Some(idx) == source_idx {
                        continue;
                    }
                    record.extra.insert(header.clone(), value);
                }
                record
            })
            .collect();

        Ok(Self {
            name,
            columns: headers,
            records,
        })
    }

    pub fn to_table(&self, columns: &ColumnNames, labels: &SourceLabels) -> Table {
        let rows = self
            .records
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|column| record.field(column, columns, labels).to_string())
                    .collect()
            })
            .collect();

        Table {
            name: self.name.clone(),
            headers: self.columns.clone(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Output schema: primary's columns (source column appended if missing), then secondary-only columns.
pub fn merged_columns(primary: &[String], secondary: &[String], columns: &ColumnNames) -> Vec<String> {
    let mut merged: Vec<String> = primary.to_vec();
    if !merged.iter().any(|c| *c == columns.source) {
        merged.push(columns.source.clone());
    }

    let mut present: HashSet<String> = merged.iter().cloned().collect();
    for column in secondary {
        if present.insert(column.clone()) {
            merged.push(column.clone());
        }
    }
    merged
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub domains_processed: usize,
    pub records_merged: usize,
    pub primary_read: usize,
    pub secondary_read: usize,
    pub primary_emitted: usize,
    pub secondary_emitted: usize,
    pub duplicates_dropped: usize,
    /// Secondary rows whose domain never appears in primary.
    pub secondary_orphan_records: usize,
    pub secondary_orphan_domains: usize,
    pub blank_domain_primary: usize,
    pub blank_domain_secondary: usize,
}

impl MergeSummary {
    /// secondary:primary ratio of emitted rows; `None` when primary contributed nothing.
    pub fn source_ratio(&self) -> Option<f64> {
        if self.primary_emitted == 0 {
            None
        } else {
            Some(self.secondary_emitted as f64 / self.primary_emitted as f64)
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeResult {
    pub dataset: Dataset,
    pub summary: MergeSummary,
}

/// One row returned by the executive lookup API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executive {
    pub name: String,
    pub title: String,
    pub linkedin: String,
    pub source: String,
}

/// Per-domain context copied onto every scraped executive row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyContext {
    pub company_name: String,
    pub investor_reference: String,
    pub company_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub total_expected: usize,
    pub matched: usize,
    /// Percentage of expected rows matched; absent when there were no expected rows.
    pub accuracy_percent: Option<f64>,
    pub unmatched_names: Vec<String>,
}
