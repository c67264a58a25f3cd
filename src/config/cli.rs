use crate::adapters::encoding::DEFAULT_SNIFF_BYTES;
use crate::config::toml_config::TomlConfig;
use crate::config::MergeConfig;
use crate::core::match_rate::MatchRateConfig;
use crate::core::scrape::{ScrapeConfig, DEFAULT_ENDPOINT};
use crate::domain::model::{ColumnNames, MergeOptions, SourceLabels};
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "lead-merge")]
#[command(about = "Merge two lead CSVs by domain, keeping one row per person")]
pub struct CliConfig {
    /// Primary leads CSV; its domains decide which groups are written
    #[arg(long)]
    pub primary: Option<String>,

    /// Secondary leads CSV merged into the primary domains
    #[arg(long)]
    pub secondary: Option<String>,

    /// Merged output CSV
    #[arg(short, long)]
    pub output: Option<String>,

    /// TOML settings file; flags given here take precedence
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Encoding label for the primary input (skips detection)")]
    pub primary_encoding: Option<String>,

    #[arg(long, help = "Encoding label for the secondary input (skips detection)")]
    pub secondary_encoding: Option<String>,

    #[arg(long, help = "Bytes sampled for encoding detection [default: 10000]")]
    pub sniff_bytes: Option<usize>,

    #[arg(long)]
    pub domain_column: Option<String>,

    #[arg(long)]
    pub name_column: Option<String>,

    #[arg(long)]
    pub source_column: Option<String>,

    #[arg(long, help = "Source value written for primary rows [default: primary]")]
    pub primary_label: Option<String>,

    #[arg(long, help = "Source value written for secondary rows [default: secondary]")]
    pub secondary_label: Option<String>,

    #[arg(long, help = "Compare domains and names trimmed and case-insensitively")]
    pub normalize_keys: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    #[arg(long, help = "Emit JSON log lines instead of compact text")]
    pub log_json: bool,
}

impl CliConfig {
    /// Combines flags with the optional TOML file into the settings of one run.
    pub fn resolve(&self) -> Result<MergeConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.resolve_with(file)
    }

    pub fn resolve_with(&self, file: TomlConfig) -> Result<MergeConfig> {
        let monitor = self.monitor || file.monitoring_enabled();
        let TomlConfig {
            inputs,
            output,
            columns,
            sources,
            merge,
            ..
        } = file;

        let primary = self.primary.clone().or(inputs.primary);
        let secondary = self.secondary.clone().or(inputs.secondary);
        let output = self.output.clone().or(output.path);

        let defaults = ColumnNames::default();
        let default_labels = SourceLabels::default();

        Ok(MergeConfig {
            primary_path: validate_required_field("primary", &primary)?.clone(),
            secondary_path: validate_required_field("secondary", &secondary)?.clone(),
            output_path: validate_required_field("output", &output)?.clone(),
            primary_encoding: self.primary_encoding.clone().or(inputs.primary_encoding),
            secondary_encoding: self.secondary_encoding.clone().or(inputs.secondary_encoding),
            sniff_bytes: self
                .sniff_bytes
                .or(inputs.sniff_bytes)
                .unwrap_or(DEFAULT_SNIFF_BYTES),
            options: MergeOptions {
                columns: ColumnNames {
                    domain: pick(&self.domain_column, columns.domain, defaults.domain),
                    full_name: pick(&self.name_column, columns.full_name, defaults.full_name),
                    source: pick(&self.source_column, columns.source, defaults.source),
                },
                labels: SourceLabels {
                    primary: pick(&self.primary_label, sources.primary, default_labels.primary),
                    secondary: pick(
                        &self.secondary_label,
                        sources.secondary,
                        default_labels.secondary,
                    ),
                },
                normalize_keys: self.normalize_keys || merge.normalize_keys.unwrap_or(false),
            },
            monitor,
        })
    }
}

fn pick(flag: &Option<String>, file: Option<String>, default: String) -> String {
    flag.clone().or(file).unwrap_or(default)
}

#[derive(Debug, Clone, Parser)]
#[command(name = "exec-scrape")]
#[command(about = "Look up executives for every domain of a leads CSV")]
pub struct ScrapeArgs {
    /// Leads CSV with a Domain column
    #[arg(short, long, default_value = "totalLeads.csv")]
    pub input: String,

    #[arg(short, long, default_value = "generatedLeads.csv")]
    pub output: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ScrapeArgs {
    pub fn into_config(self) -> ScrapeConfig {
        ScrapeConfig {
            input_path: self.input,
            output_path: self.output,
            endpoint: self.endpoint,
            timeout_secs: self.timeout_secs,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "match-rate")]
#[command(about = "Share of expected leads found by name or LinkedIn profile")]
pub struct MatchRateArgs {
    #[arg(long)]
    pub expected: String,

    #[arg(long)]
    pub experimental: String,

    #[arg(long, default_value = "Full Name")]
    pub name_column: String,

    #[arg(long, default_value = "LinkedIn Profile")]
    pub linkedin_column: String,

    /// Also write the report as JSON
    #[arg(long)]
    pub report: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl MatchRateArgs {
    pub fn into_config(self) -> MatchRateConfig {
        MatchRateConfig {
            expected_path: self.expected,
            experimental_path: self.experimental,
            name_column: self.name_column,
            linkedin_column: self.linkedin_column,
            report_path: self.report,
        }
    }
}
