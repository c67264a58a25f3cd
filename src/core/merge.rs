use crate::domain::model::{
    merged_columns, Dataset, LeadRecord, MergeOptions, MergeResult, MergeSummary, Source,
};
use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Only an empty cell is blank; whitespace is a key of its own unless keys are normalized.
fn is_blank(value: &str, normalize: bool) -> bool {
    if normalize {
        value.trim().is_empty()
    } else {
        value.is_empty()
    }
}

fn key<'a>(value: &'a str, normalize: bool) -> Cow<'a, str> {
    if normalize {
        Cow::Owned(value.trim().to_ascii_lowercase())
    } else {
        Cow::Borrowed(value)
    }
}

/// Joins `secondary` into `primary` by domain and drops repeated names within each domain.
///
/// Groups are emitted in the order their domain first appears in `primary`; inside a group
/// primary rows come before secondary rows, and the first row per full name is kept.
/// Domains that only `secondary` has are dropped and counted. Primary rows with a blank
/// domain never form a group.
pub fn merge_datasets(primary: Dataset, secondary: Dataset, options: &MergeOptions) -> MergeResult {
    let normalize = options.normalize_keys;
    let mut summary = MergeSummary {
        primary_read: primary.len(),
        secondary_read: secondary.len(),
        ..Default::default()
    };

    let columns = merged_columns(&primary.columns, &secondary.columns, &options.columns);

    // 依主資料首次出現的順序建立網域分組
    let mut domain_order: Vec<String> = Vec::new();
    let mut primary_groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, record) in primary.records.iter().enumerate() {
        if is_blank(&record.domain, normalize) {
            summary.blank_domain_primary += 1;
            continue;
        }
        match primary_groups.entry(key(&record.domain, normalize).into_owned()) {
            Entry::Occupied(mut group) => group.get_mut().push(idx),
            Entry::Vacant(slot) => {
                domain_order.push(slot.key().clone());
                slot.insert(vec![idx]);
            }
        }
    }

    let mut secondary_groups: HashMap<String, Vec<usize>> = HashMap::new();
    let mut orphan_domains: HashSet<String> = HashSet::new();
    for (idx, record) in secondary.records.iter().enumerate() {
        if is_blank(&record.domain, normalize) {
            summary.blank_domain_secondary += 1;
            continue;
        }
        let domain = key(&record.domain, normalize).into_owned();
        if primary_groups.contains_key(&domain) {
            secondary_groups.entry(domain).or_default().push(idx);
        } else {
            summary.secondary_orphan_records += 1;
            orphan_domains.insert(domain);
        }
    }
    summary.secondary_orphan_domains = orphan_domains.len();

    let mut primary_slots: Vec<Option<LeadRecord>> =
        primary.records.into_iter().map(Some).collect();
    let mut secondary_slots: Vec<Option<LeadRecord>> =
        secondary.records.into_iter().map(Some).collect();

    let mut records: Vec<LeadRecord> = Vec::new();
    for domain in &domain_order {
        let members = primary_groups
            .get(domain)
            .into_iter()
            .flatten()
            .map(|&idx| (Source::Primary, idx))
            .chain(
                secondary_groups
                    .get(domain)
                    .into_iter()
                    .flatten()
                    .map(|&idx| (Source::Secondary, idx)),
            );

        let mut seen_names: HashSet<String> = HashSet::new();
        for (source, idx) in members {
            let slot = match source {
                Source::Primary => primary_slots.get_mut(idx),
                Source::Secondary => secondary_slots.get_mut(idx),
            };
            let Some(record) = slot.and_then(Option::take) else {
                continue;
            };

            if seen_names.insert(key(&record.full_name, normalize).into_owned()) {
                match source {
                    Source::Primary => summary.primary_emitted += 1,
                    Source::Secondary => summary.secondary_emitted += 1,
                }
                records.push(record);
            } else {
                tracing::debug!(
                    "Dropping duplicate '{}' from {} for domain {}",
                    record.full_name,
                    source,
                    record.domain
                );
                summary.duplicates_dropped += 1;
            }
        }
    }

    summary.domains_processed = domain_order.len();
    summary.records_merged = records.len();

    MergeResult {
        dataset: Dataset {
            name: "merged".to_string(),
            columns,
            records,
        },
        summary,
    }
}
