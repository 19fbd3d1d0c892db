use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tender_capture::capture::CaptureService;
use tender_capture::feed::PlacspClient;
use tender_capture::models::Config;
use tender_capture::store::{CheckpointStore, RawTenderStore};

/// Run one incremental PLACSP tender capture pass.
#[derive(Parser, Debug)]
#[command(name = "tender-capture", version, about)]
struct Args {
    /// SQLite database path
    #[arg(long)]
    db_path: Option<String>,

    /// PLACSP Atom feed URL, or a file:// path to a local JSON/XML payload
    #[arg(long)]
    source_url: Option<String>,

    /// Source tag stored with every captured record
    #[arg(long)]
    source_name: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Overlap window subtracted from the checkpoint, in minutes
    #[arg(long)]
    overlap_minutes: Option<i64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::resolve(
        args.db_path,
        args.source_url,
        args.source_name,
        args.timeout,
        args.overlap_minutes,
    );

    info!(
        database_path = %config.database_path,
        source_url = %config.source_url,
        "Starting tender capture"
    );

    let client = match PlacspClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build feed client: {}", e);
            eprintln!("❌ Feed client error: {}", e);
            std::process::exit(1);
        }
    };

    let tenders = match RawTenderStore::new(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize record store: {}", e);
            eprintln!("❌ Database error: {}", e);
            std::process::exit(1);
        }
    };

    let checkpoints = match CheckpointStore::new(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize checkpoint store: {}", e);
            eprintln!("❌ Database error: {}", e);
            std::process::exit(1);
        }
    };

    let service = CaptureService::new(client, tenders, checkpoints, config.overlap_minutes);

    match service.run().await {
        Ok(result) => {
            println!(
                "✅ Capture finished: fetched={} inserted={} previous_checkpoint={} new_checkpoint={}",
                result.fetched,
                result.inserted,
                result
                    .previous_checkpoint
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "none".to_string()),
                result.new_checkpoint.to_rfc3339(),
            );
        }
        Err(e) => {
            error!("Capture run failed: {}", e);
            eprintln!("❌ Capture failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
