use crate::domain::model::MergeOptions;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn primary_path(&self) -> &str;
    fn secondary_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Explicit encoding label for the primary input; `None` means sniff.
    fn primary_encoding(&self) -> Option<&str>;
    fn secondary_encoding(&self) -> Option<&str>;
    fn sniff_bytes(&self) -> usize;
    fn merge_options(&self) -> &MergeOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;
    type Transformed: Send;

    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    /// Writes the result and returns where it went.
    async fn load(&self, result: Self::Transformed) -> Result<String>;
}
