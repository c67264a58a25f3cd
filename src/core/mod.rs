pub mod etl;
pub mod match_rate;
pub mod merge;
pub mod pipeline;
pub mod scrape;

pub use crate::domain::model::{Dataset, LeadRecord, MergeResult, Table};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
