use clap::Parser;
use lead_merge::utils::error::LeadError;
use lead_merge::utils::{logger, validation::Validate};
use lead_merge::{CliConfig, EtlEngine, LocalStorage, MergePipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting lead-merge");
    if cli.verbose {
        tracing::debug!("CLI flags: {:?}", cli);
    }

    // 合併設定檔與命令列參數，再驗證
    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let pipeline = MergePipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Merge completed successfully!");
            println!("✅ Merge completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: LeadError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Merge failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
