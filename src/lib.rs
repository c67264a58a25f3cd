pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use config::MergeConfig;
pub use core::{
    etl::EtlEngine, match_rate::MatchRatePipeline, merge::merge_datasets,
    pipeline::MergePipeline, scrape::ScrapePipeline,
};
pub use utils::error::{LeadError, Result};
