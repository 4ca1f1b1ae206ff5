//! mongo-reconcile CLI - compare two MongoDB clusters collection by collection.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use mongo_reconcile::{
    ComparisonPolicy, MongoCluster, ReconcileError, Reconciler,
};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "mongo-reconcile")]
#[command(about = "Reconcile document counts, index counts, and sampled contents between two MongoDB clusters")]
#[command(version)]
struct Cli {
    /// Source cluster connection string
    #[arg(long)]
    src: String,

    /// Destination cluster connection string
    #[arg(long)]
    dest: String,

    /// Content comparison mode: none, sample, or full
    #[arg(long, default_value = "sample")]
    comparison_mode: String,

    /// Documents to sample per collection (sample mode)
    #[arg(long, default_value = "10000")]
    count: u64,

    /// Percentage of each collection to sample; a value in (0, 100]
    /// overrides --count, 0 disables
    #[arg(long, default_value = "0")]
    check_percent: f64,

    /// Databases to exclude, comma separated (admin, local, and test are
    /// always excluded)
    #[arg(long, value_delimiter = ',')]
    exclude_dbs: Vec<String>,

    /// Collections to exclude, comma separated
    #[arg(long, value_delimiter = ',')]
    exclude_collections: Vec<String>,

    /// Only reconcile these databases, comma separated
    #[arg(long, value_delimiter = ',')]
    include_dbs: Vec<String>,

    /// Record divergences and keep going instead of stopping at the first
    #[arg(long)]
    continue_on_error: bool,

    /// Verify the N most-recently-inserted documents of each collection
    /// before sampling
    #[arg(long, default_value = "0")]
    latest_size: u64,

    /// Sample targets below this trigger an exhaustive scan instead
    #[arg(long, default_value = "1000")]
    full_scan_threshold: u64,

    /// Collection checks to run concurrently
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Documents fetched per batch (clamped to 20-50)
    #[arg(long, default_value = "30")]
    batch_size: u64,

    /// Minimum normalized engine version with native random sampling
    /// ("4.0.x" normalizes to 40)
    #[arg(long, default_value = "40")]
    sample_version_threshold: u32,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Print the report as JSON instead of the text summary
    #[arg(long)]
    output_json: bool,
}

impl Cli {
    fn policy(&self) -> Result<ComparisonPolicy, ReconcileError> {
        let policy = ComparisonPolicy {
            mode: self.comparison_mode.parse()?,
            target_count: self.count,
            check_percent: self.check_percent,
            batch_size: self.batch_size,
            latest_size: self.latest_size,
            full_scan_threshold: self.full_scan_threshold,
            sample_version_threshold: self.sample_version_threshold,
            continue_on_error: self.continue_on_error,
            threads: self.threads,
            excluded_databases: self.exclude_dbs.iter().cloned().collect(),
            excluded_collections: self.exclude_collections.iter().cloned().collect(),
            included_databases: self.include_dbs.clone(),
        }
        .normalized()
        .with_builtin_excludes();

        policy.validate()?;
        Ok(policy)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<bool, ReconcileError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| ReconcileError::Config(e.to_string()))?;

    // Fail fast on configuration before any cluster work begins.
    let policy = cli.policy()?;
    policy.log_summary();

    let source = Arc::new(MongoCluster::connect(&cli.src).await?);
    let dest = Arc::new(MongoCluster::connect(&cli.dest).await?);
    info!("Connected to both clusters");

    let report = Reconciler::new(source, dest, policy).run().await?;
    let clean = report.is_clean();

    if cli.output_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .map_err(|e| ReconcileError::Config(e.to_string()))?
        );
    } else {
        print!("{}", report.render());
    }

    Ok(clean)
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("unknown verbosity level: {}", other)),
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match format {
        "json" => builder.json().init(),
        "text" => builder.init(),
        other => return Err(format!("unknown log format: {}", other)),
    }

    Ok(())
}
