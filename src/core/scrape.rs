use crate::adapters::csv_codec::{delimiter_for, parse_table, write_table};
use crate::adapters::encoding::{decode_input, DEFAULT_SNIFF_BYTES};
use crate::adapters::http::ExecutiveClient;
use crate::core::{Pipeline, Storage};
use crate::domain::model::{CompanyContext, Executive, Table};
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://companyexecutivescraper.onrender.com/scrape";

pub const OUTPUT_COLUMNS: [&str; 8] = [
    "Company_Name",
    "Domain",
    "Name",
    "Title",
    "LinkedIn",
    "Source",
    "Investor_Reference",
    "Company_Reference",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub input_path: String,
    pub output_path: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub domain_column: String,
    pub company_name_column: String,
    pub investor_reference_column: String,
    pub company_reference_column: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            input_path: "totalLeads.csv".to_string(),
            output_path: "generatedLeads.csv".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            domain_column: "Domain".to_string(),
            company_name_column: "Company name".to_string(),
            investor_reference_column: "Investor reference".to_string(),
            company_reference_column: "Companies reference".to_string(),
        }
    }
}

impl Validate for ScrapeConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input_path)?;
        validate_path("output", &self.output_path)?;
        validate_url("endpoint", &self.endpoint)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 600)?;
        Ok(())
    }
}

/// Distinct domains in first-seen order, each with the context of its first row.
#[derive(Debug, Clone, Default)]
pub struct DomainList {
    pub domains: Vec<(String, CompanyContext)>,
    pub blank_domains: usize,
}

pub fn collect_domains(table: &Table, config: &ScrapeConfig) -> Result<DomainList> {
    let domain_idx = table.require_column(&config.domain_column)?;

    let optional = |column: &str| {
        let idx = table.column_index(column);
        if idx.is_none() {
            tracing::warn!("⚠️ {} has no '{}' column, leaving it blank", table.name, column);
        }
        idx
    };
    let company_idx = optional(&config.company_name_column);
    let investor_idx = optional(&config.investor_reference_column);
    let reference_idx = optional(&config.company_reference_column);

    let mut list = DomainList::default();
    let mut seen: HashSet<&str> = HashSet::new();
    for row in &table.rows {
        let domain = row.get(domain_idx).map(String::as_str).unwrap_or("");
        if domain.trim().is_empty() {
            list.blank_domains += 1;
            continue;
        }
        if seen.insert(domain) {
            list.domains.push((
                domain.to_string(),
                CompanyContext {
                    company_name: cell(row, company_idx),
                    investor_reference: cell(row, investor_idx),
                    company_reference: cell(row, reference_idx),
                },
            ));
        }
    }
    Ok(list)
}

fn cell(row: &[String], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
}

pub fn executive_row(domain: &str, context: &CompanyContext, executive: &Executive) -> Vec<String> {
    vec![
        context.company_name.clone(),
        domain.to_string(),
        executive.name.clone(),
        executive.title.clone(),
        executive.linkedin.clone(),
        executive.source.clone(),
        context.investor_reference.clone(),
        context.company_reference.clone(),
    ]
}

pub struct ScrapePipeline<S: Storage> {
    storage: S,
    config: ScrapeConfig,
    client: ExecutiveClient,
}

impl<S: Storage> ScrapePipeline<S> {
    pub fn new(storage: S, config: ScrapeConfig) -> Result<Self> {
        let client =
            ExecutiveClient::new(&config.endpoint, Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            storage,
            config,
            client,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for ScrapePipeline<S> {
    type Extracted = DomainList;
    type Transformed = Table;

    async fn extract(&self) -> Result<DomainList> {
        let path = &self.config.input_path;
        let input = format!("leads ({})", path);
        let bytes = self.storage.read_file(path).await?;
        let decoded = decode_input(&input, &bytes, None, DEFAULT_SNIFF_BYTES);
        if let Some(warning) = &decoded.warning {
            tracing::warn!("⚠️ {} - decoding as UTF-8", warning);
        }

        let table = parse_table(&input, &decoded.text, delimiter_for(path))?;
        let list = collect_domains(&table, &self.config)?;
        if list.blank_domains > 0 {
            tracing::warn!("⚠️ Skipping {} rows with a blank domain", list.blank_domains);
        }
        tracing::info!("📥 {} distinct domains to scrape", list.domains.len());
        Ok(list)
    }

    async fn transform(&self, data: DomainList) -> Result<Table> {
        let mut table = Table::new(
            "executives",
            OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        );
        let mut failed = 0;

        // 逐一查詢，單一網域失敗不影響其他網域
        for (domain, context) in &data.domains {
            tracing::info!("🔎 Scraping executives for {}...", domain);
            match self.client.fetch_executives(domain).await {
                Ok(executives) => {
                    tracing::debug!("{} executives for {}", executives.len(), domain);
                    for executive in &executives {
                        table.rows.push(executive_row(domain, context, executive));
                    }
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("❌ Error processing domain {}: {}", domain, e);
                }
            }
        }

        tracing::info!(
            "📊 Scraped {} executives from {} domains ({} failed)",
            table.rows.len(),
            data.domains.len() - failed,
            failed
        );
        Ok(table)
    }

    async fn load(&self, table: Table) -> Result<String> {
        let output_path = &self.config.output_path;
        let bytes = write_table(&table, delimiter_for(output_path))?;
        self.storage.write_file(output_path, &bytes).await?;
        Ok(output_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LeadError;

    fn leads(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            name: "leads".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_collect_domains_keeps_first_context() {
        let table = leads(
            &["Company name", "Domain", "Investor reference", "Companies reference"],
            &[
                &["Acme", "acme.com", "inv-1", "co-1"],
                &["Acme Corp", "acme.com", "inv-2", "co-2"],
                &["", "", "", ""],
                &["Beta", "beta.io", "inv-3", "co-3"],
            ],
        );

        let list = collect_domains(&table, &ScrapeConfig::default()).unwrap();

        assert_eq!(list.blank_domains, 1);
        assert_eq!(list.domains.len(), 2);
        assert_eq!(list.domains[0].0, "acme.com");
        assert_eq!(list.domains[0].1.company_name, "Acme");
        assert_eq!(list.domains[0].1.investor_reference, "inv-1");
        assert_eq!(list.domains[1].0, "beta.io");
    }

    #[test]
    fn test_missing_context_columns_are_blank() {
        let table = leads(&["Domain"], &[&["acme.com"]]);
        let list = collect_domains(&table, &ScrapeConfig::default()).unwrap();
        assert_eq!(list.domains[0].1, CompanyContext::default());
    }

    #[test]
    fn test_domain_column_is_required() {
        let table = leads(&["Company name"], &[&["Acme"]]);
        assert!(matches!(
            collect_domains(&table, &ScrapeConfig::default()),
            Err(LeadError::MissingColumnError { .. })
        ));
    }

    #[test]
    fn test_executive_row_layout() {
        let context = CompanyContext {
            company_name: "Acme".to_string(),
            investor_reference: "inv".to_string(),
            company_reference: "co".to_string(),
        };
        let executive = Executive {
            name: "Jo Smith".to_string(),
            title: "CEO".to_string(),
            linkedin: "in/jo".to_string(),
            source: "site".to_string(),
        };
        assert_eq!(
            executive_row("acme.com", &context, &executive),
            vec!["Acme", "acme.com", "Jo Smith", "CEO", "in/jo", "site", "inv", "co"]
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(ScrapeConfig::default().validate().is_ok());
        let config = ScrapeConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
