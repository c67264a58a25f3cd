use clap::Parser;
use lead_merge::config::cli::MatchRateArgs;
use lead_merge::utils::{logger, validation::Validate};
use lead_merge::{EtlEngine, LocalStorage, MatchRatePipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = MatchRateArgs::parse();
    logger::init_cli_logger(args.verbose);

    let config = args.into_config();
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let pipeline = MatchRatePipeline::new(LocalStorage::default(), config);
    match EtlEngine::new(pipeline).run().await {
        Ok(destination) => tracing::info!("📁 Report written to {}", destination),
        Err(e) => {
            tracing::error!("❌ Match rate failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
