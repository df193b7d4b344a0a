use clap::Parser;
use fxhash_verify::core::{CheckKind, ConfigProvider};
use fxhash_verify::domain::settings::SourceSpec;
use fxhash_verify::utils::{logger, validation::Validate};
use fxhash_verify::{run_with_config, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-verify")]
#[command(about = "fxhash token verification driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "fxhash-verify.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log output as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Dry run - show what would be checked without opening a browser or fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The config file carries the default log level, so it is read before logging starts
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if args.json_logs {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }

    tracing::info!("🚀 Starting TOML-based verification");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be checked");
        perform_dry_run(&config);
        return Ok(());
    }

    match run_with_config(&config).await {
        Ok(summary) => {
            tracing::info!("✅ Verification completed successfully!");
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run_name());
    println!("  Check: {:?}", config.check());
    println!("  Output: {}", config.output_path());
    println!("  Monitoring: {}", config.monitoring_enabled());
    if let Some(level) = config.log_level() {
        println!("  Log level: {}", level);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Artwork Source:");
    match config.source() {
        SourceSpec::Static { urls } => {
            println!("  Fixed list of {} page(s)", urls.len());
            for url in &urls {
                println!("    {}", url);
            }
        }
        SourceSpec::Range {
            start,
            end,
            url_template,
        } => {
            println!(
                "  Token IDs {}..={} ({} pages)",
                start,
                end,
                page_count(start, end)
            );
            println!("  Page template: {}", url_template);
        }
        SourceSpec::Feed {
            take,
            include_random,
            random_picks,
        } => {
            println!(
                "  Latest {} tokens from {}",
                take,
                config.endpoints().graphql_endpoint
            );
            if include_random {
                println!("  Plus one random token ({} picks at most)", random_picks);
            }
        }
    }

    println!();
    match config.check() {
        CheckKind::Render => {
            let render = config.render();
            println!("🌐 Render Check:");
            println!(
                "  Wait: {:?} per attempt, polling every {:?}",
                render.timeout, render.poll_interval
            );
            println!(
                "  Attempts: {} with {:?} between them",
                render.retries, render.backoff
            );
            println!("  Scroll first: {}", render.scroll_first);
            println!("  Headless: {}", render.headless);
            if let Some(dir) = &render.diagnostics_dir {
                println!("  Page sources of timeouts go to: {}", dir);
            }
        }
        CheckKind::Library => {
            let library = config.library();
            println!("📦 Library Check:");
            println!("  Token API: {}", config.endpoints().api_base);
            println!(
                "  Gateways: {} then {}",
                library.gateways.generic, library.gateways.service
            );
            println!(
                "  Code fetch: {} attempt(s), {:?} apart, {:?} timeout",
                library.attempts, library.retry_delay, library.request_timeout
            );
        }
    }

    println!();
    println!("💾 Columns: {}", config.check().header().join(", "));
    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}

fn page_count(start: u64, end: u64) -> u64 {
    (end - start).saturating_add(1)
}
