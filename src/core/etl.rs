use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load once, in order. Nothing is written unless
    /// the first two stages succeed.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting run...");
        self.monitor.log_stats("Start");

        tracing::debug!("Extracting data...");
        let extracted = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        tracing::debug!("Transforming data...");
        let transformed = self.pipeline.transform(extracted).await?;
        self.monitor.log_stats("Transform");

        tracing::debug!("Loading data...");
        let output_path = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        tracing::info!("Output saved to: {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LeadError;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Recorder {
        fail_transform: bool,
        loaded: AtomicBool,
    }

    #[async_trait::async_trait]
    impl Pipeline for Recorder {
        type Extracted = Vec<u32>;
        type Transformed = u32;

        async fn extract(&self) -> Result<Vec<u32>> {
            Ok(vec![1, 2, 3])
        }

        async fn transform(&self, data: Vec<u32>) -> Result<u32> {
            if self.fail_transform {
                return Err(LeadError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(data.iter().sum())
        }

        async fn load(&self, result: u32) -> Result<String> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok(format!("sum={}", result))
        }
    }

    #[tokio::test]
    async fn test_run_passes_stage_outputs_along() {
        let engine = EtlEngine::new(Recorder {
            fail_transform: false,
            loaded: AtomicBool::new(false),
        });
        assert_eq!(engine.run().await.unwrap(), "sum=6");
    }

    #[tokio::test]
    async fn test_failed_transform_skips_load() {
        let engine = EtlEngine::new(Recorder {
            fail_transform: true,
            loaded: AtomicBool::new(false),
        });
        assert!(engine.run().await.is_err());
        assert!(!engine.pipeline.loaded.load(Ordering::SeqCst));
    }

    #[test]
    fn test_run_with_monitoring() {
        let engine = EtlEngine::new_with_monitoring(
            Recorder {
                fail_transform: false,
                loaded: AtomicBool::new(false),
            },
            true,
        );
        let output = tokio_test::block_on(engine.run()).unwrap();
        assert_eq!(output, "sum=6");
        assert!(engine.pipeline.loaded.load(Ordering::SeqCst));
    }
}
