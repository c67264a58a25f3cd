use crate::adapters::csv_codec::{delimiter_for, parse_table, write_table};
use crate::adapters::encoding::{decode_input, resolve_label};
use crate::core::merge::merge_datasets;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{Dataset, MergeResult, MergeSummary, Source};
use crate::utils::error::Result;

/// Both inputs, decoded and schema-checked.
#[derive(Debug, Clone)]
pub struct MergeInput {
    pub primary: Dataset,
    pub secondary: Dataset,
}

pub struct MergePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> MergePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_dataset(&self, source: Source, path: &str, encoding: Option<&str>) -> Result<Dataset> {
        let input = format!("{} ({})", source, path);
        let preferred = encoding.map(resolve_label).transpose()?;

        let bytes = self.storage.read_file(path).await?;
        let decoded = decode_input(&input, &bytes, preferred, self.config.sniff_bytes());

        match &decoded.warning {
            Some(warning) => {
                tracing::warn!("⚠️ {} - decoding as UTF-8", warning);
                tracing::warn!("💡 {}", warning.recovery_suggestion());
            }
            None => tracing::info!(
                "🔤 {} encoding: {} ({:?})",
                input,
                decoded.encoding_name(),
                decoded.detection
            ),
        }

        let table = parse_table(&input, &decoded.text, delimiter_for(path))?;
        let dataset = Dataset::from_table(table, source, &self.config.merge_options().columns)?;
        tracing::info!("📥 Read {} records from {}", dataset.len(), input);
        Ok(dataset)
    }
}

fn log_summary(summary: &MergeSummary) {
    tracing::info!(
        "🔗 Merged {} domains into {} records ({} primary, {} secondary, {} duplicates dropped)",
        summary.domains_processed,
        summary.records_merged,
        summary.primary_emitted,
        summary.secondary_emitted,
        summary.duplicates_dropped
    );

    match summary.source_ratio() {
        Some(ratio) => tracing::info!(
            "📊 Source ratio (secondary : primary): {} : {} = {:.2}",
            summary.secondary_emitted,
            summary.primary_emitted,
            ratio
        ),
        None => tracing::info!("📊 No primary records emitted, source ratio not available"),
    }

    if summary.secondary_orphan_records > 0 {
        tracing::warn!(
            "⚠️ Dropped {} secondary records across {} domains that do not appear in the primary input",
            summary.secondary_orphan_records,
            summary.secondary_orphan_domains
        );
    }
    if summary.blank_domain_primary > 0 || summary.blank_domain_secondary > 0 {
        tracing::warn!(
            "⚠️ Skipped records with a blank domain: {} primary, {} secondary",
            summary.blank_domain_primary,
            summary.blank_domain_secondary
        );
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MergePipeline<S, C> {
    type Extracted = MergeInput;
    type Transformed = MergeResult;

    async fn extract(&self) -> Result<MergeInput> {
        let primary = self
            .read_dataset(
                Source::Primary,
                self.config.primary_path(),
                self.config.primary_encoding(),
            )
            .await?;
        let secondary = self
            .read_dataset(
                Source::Secondary,
                self.config.secondary_path(),
                self.config.secondary_encoding(),
            )
            .await?;

        Ok(MergeInput { primary, secondary })
    }

    async fn transform(&self, data: MergeInput) -> Result<MergeResult> {
        let result = merge_datasets(data.primary, data.secondary, self.config.merge_options());
        log_summary(&result.summary);
        Ok(result)
    }

    async fn load(&self, result: MergeResult) -> Result<String> {
        let options = self.config.merge_options();
        let output_path = self.config.output_path();

        let table = result.dataset.to_table(&options.columns, &options.labels);
        let bytes = write_table(&table, delimiter_for(output_path))?;

        tracing::debug!(
            "Writing {} rows ({} bytes) to {}",
            table.rows.len(),
            bytes.len(),
            output_path
        );
        self.storage.write_file(output_path, &bytes).await?;

        Ok(output_path.to_string())
    }
}
