use clap::Parser;
use lead_merge::config::cli::ScrapeArgs;
use lead_merge::utils::{logger, validation::Validate};
use lead_merge::{EtlEngine, LocalStorage, ScrapePipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = ScrapeArgs::parse();
    logger::init_cli_logger(args.verbose);

    let config = args.into_config();
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("Scraping executives for domains in {}", config.input_path);

    let pipeline = match ScrapePipeline::new(LocalStorage::default(), config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    match EtlEngine::new(pipeline).run().await {
        Ok(output_path) => {
            println!("✅ Scraping completed. Results saved to {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Scrape failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
