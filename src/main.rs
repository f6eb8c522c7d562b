use clap::Parser;
use std::path::PathBuf;
use sukashi::config::Config;

/// Sukashi - tiled text watermarking service
#[derive(Parser, Debug)]
#[command(name = "sukashi")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

fn main() {
    // Initialize logging subsystem
    sukashi::logging::init_subscriber().expect("Failed to initialize logging subsystem");

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration; a missing file means built-in defaults, a
    // malformed file is a startup error
    let config = if args.config.exists() {
        Config::from_file(&args.config).unwrap_or_else(|e| {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        })
    } else {
        tracing::info!(
            config_file = %args.config.display(),
            "Configuration file not found, using built-in defaults"
        );
        Config::default()
    };

    if args.test {
        println!("Configuration OK");
        return;
    }

    tracing::info!(
        server_address = %config.server.address,
        server_port = config.server.port,
        threads = config.server.threads,
        default_text = %config.watermark.default_text,
        spacing_strategy = ?config.watermark.spacing.strategy,
        font_candidates = config.fonts.search_paths.len(),
        "Configuration loaded successfully"
    );

    // Build the runtime by hand so the worker count follows the config
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.threads)
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to build async runtime: {}", e);
            std::process::exit(1);
        });

    if let Err(e) = runtime.block_on(sukashi::server::run(config)) {
        tracing::error!(error = %e, "Server terminated");
        std::process::exit(1);
    }
}
