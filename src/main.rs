//! CLI: order/target feeds in, JSON report out.
//!
//! Usage:
//!   order-spc orders.ndjson [targets.json] [order-spc.toml] > report.json
//!
//! Feeds may be JSON arrays or NDJSON. Any `.toml` argument is read as the
//! analysis configuration. Logs go to stderr (`RUST_LOG=order_spc=debug`).

use std::path::Path;
use std::{env, io};

use order_spc::config::AnalysisConfig;
use order_spc::ingest::{load_records, RawOrderRecord, RawTargetRecord};
use order_spc::report::{build_report, Feeds};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(orders_path) = args.first() else {
        eprintln!("usage: order-spc <orders.json|ndjson> [targets.json|ndjson] [config.toml]");
        std::process::exit(2);
    };

    let mut config = AnalysisConfig::default();
    let mut targets: Vec<RawTargetRecord> = Vec::new();
    for arg in &args[1..] {
        let path = Path::new(arg);
        if path.extension().is_some_and(|ext| ext == "toml") {
            config = AnalysisConfig::load(path)?;
        } else {
            targets = load_records(path)?;
        }
    }

    let orders: Vec<RawOrderRecord> = load_records(Path::new(orders_path))?;
    let feeds = Feeds::normalize(orders, targets, &config);
    let report = build_report(&feeds, &config)?;
    serde_json::to_writer_pretty(io::stdout(), &report)?;
    Ok(())
}
