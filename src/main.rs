use std::fs::File;
use std::process::ExitCode;

use atlas::cli::{self, Command};
use atlas::core::config::{self, AtlasConfig};
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "atlas", about = "Browse, search and inspect world countries")]
struct Args {
    /// Upstream API base URL (overrides config and ATLAS_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to atlas.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("atlas.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("Atlas starting up with command: {:?}", args.command);

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        eprintln!("atlas: {e}; using defaults");
        AtlasConfig::default()
    });
    let resolved = config::resolve(&file_config, args.base_url.as_deref());
    log::debug!("Resolved config: {:?}", resolved);

    match cli::run(args.command, &resolved).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("atlas: {e}");
            ExitCode::FAILURE
        }
    }
}
