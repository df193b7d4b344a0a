use clap::Parser;
use fxhash_verify::core::ConfigProvider;
use fxhash_verify::utils::{logger, validation::Validate};
use fxhash_verify::{run_with_config, CliConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose, None);

    tracing::info!("Starting fxhash-verify ({:?} check)", config.check());
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitoring_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run_with_config(&config).await {
        Ok(summary) => {
            tracing::info!("✅ Verification completed successfully!");
            tracing::info!("📁 Output saved to: {}", summary.output_path);
            println!(
                "✅ Checked {} artworks: {} succeeded, {} failed",
                summary.total, summary.succeeded, summary.failed
            );
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Verification failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
