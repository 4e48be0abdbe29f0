use cardcost::application::admission::AdmissionController;
use cardcost::application::catalog::CostCatalog;
use cardcost::application::resolver::ClearingCostResolver;
use cardcost::config::AppConfig;
use cardcost::domain::cost::Cost;
use cardcost::domain::country::CountryCode;
use cardcost::domain::pan;
use cardcost::domain::ports::CostStoreRef;
use cardcost::error::CardCostError;
use cardcost::infrastructure::binlist::BinlistClient;
use cardcost::infrastructure::in_memory::InMemoryCostStore;
use cardcost::interfaces::csv::card_reader::CardReader;
use cardcost::interfaces::csv::cost_table_reader::CostTableReader;
use cardcost::interfaces::csv::cost_writer::CostWriter;
use cardcost::interfaces::csv::quote_writer::QuoteWriter;
use cardcost::interfaces::gateway::CostGateway;
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Clearing cost table to load at startup (CSV with country_code,cost)
    #[arg(long, global = true, env = "CARDCOST_COSTS")]
    costs: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "CARDCOST_DB_PATH")]
    db_path: Option<PathBuf>,

    #[command(flatten)]
    rate_limit: RateLimitArgs,

    #[command(flatten)]
    lookup: LookupArgs,

    /// Log filter directive, e.g. "info" or "cardcost=debug"
    #[arg(long, global = true, env = "CARDCOST_LOG", default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct RateLimitArgs {
    /// Maximum burst of admitted requests [default: 7000]
    #[arg(long, global = true, env = "CARDCOST_RATE_CAPACITY")]
    rate_capacity: Option<u32>,

    /// Tokens regained per refill interval [default: 600]
    #[arg(long, global = true, env = "CARDCOST_RATE_REFILL_TOKENS")]
    rate_refill_tokens: Option<u32>,

    /// Length of the refill interval in seconds [default: 60]
    #[arg(long, global = true, env = "CARDCOST_RATE_REFILL_INTERVAL_SECS")]
    rate_refill_interval_secs: Option<u64>,
}

#[derive(Args)]
struct LookupArgs {
    /// Base URL of the BIN lookup service
    #[arg(long, global = true, env = "CARDCOST_BINLIST_URL")]
    binlist_url: Option<String>,

    /// Per-request lookup timeout in milliseconds [default: 3000]
    #[arg(long, global = true, env = "CARDCOST_LOOKUP_TIMEOUT_MS")]
    lookup_timeout_ms: Option<u64>,

    /// Ignore proxy settings from the environment
    #[arg(long, global = true)]
    no_system_proxy: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate the clearing cost of every card in a CSV file (column card_number)
    Quote {
        input: PathBuf,

        /// Number of requests processed concurrently
        #[arg(long, default_value_t = 1)]
        jobs: usize,
    },
    /// Print the issuing country of a card
    Country { pan: String },
    /// Manage the clearing cost table
    #[command(subcommand)]
    Costs(CostsCommand),
}

#[derive(Subcommand)]
enum CostsCommand {
    /// List all clearing costs
    List,
    /// Show the clearing cost of a country
    Get { country: String },
    /// Add a clearing cost for a country
    Create { country: String, cost: Decimal },
    /// Replace country and cost of an existing record
    Update {
        id: u64,
        country: String,
        cost: Decimal,
    },
    /// Remove a clearing cost record
    Delete { id: u64 },
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        if let Some(capacity) = self.rate_limit.rate_capacity {
            config.rate_limit.capacity = capacity;
        }
        if let Some(tokens) = self.rate_limit.rate_refill_tokens {
            config.rate_limit.refill_tokens = tokens;
        }
        if let Some(secs) = self.rate_limit.rate_refill_interval_secs {
            config.rate_limit.refill_interval = std::time::Duration::from_secs(secs);
        }
        if let Some(url) = &self.lookup.binlist_url {
            config.lookup.base_url = url.clone();
        }
        if let Some(timeout_ms) = self.lookup.lookup_timeout_ms {
            config.lookup.timeout_ms = timeout_ms;
        }
        if self.lookup.no_system_proxy {
            config.lookup.use_system_proxy = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log))
        .with_writer(io::stderr)
        .init();

    let config = cli.app_config();
    config.validate().into_diagnostic()?;

    let store = open_store(cli.db_path.clone())?;
    let catalog = CostCatalog::new(Arc::clone(&store));

    if let Some(path) = &cli.costs {
        let file = File::open(path).into_diagnostic()?;
        let mut rows = Vec::new();
        for row in CostTableReader::new(file).rows() {
            match row {
                Ok(row) => rows.push(row),
                Err(e) => tracing::error!("Error reading cost table: {}", e),
            }
        }
        let created = catalog.seed(rows).await.into_diagnostic()?;
        tracing::debug!(created, "cost table loaded");
    }

    match cli.command {
        Command::Quote { input, jobs } => {
            let gateway = build_gateway(&config, store)?;
            run_quote(gateway, input, jobs).await
        }
        Command::Country { pan } => {
            if !pan::is_valid(&pan) {
                return Err(CardCostError::InvalidInput).into_diagnostic();
            }
            let gateway = build_gateway(&config, store)?;
            let result = gateway.country(&pan).await.into_diagnostic()?;
            println!("{}", result.alpha2);
            Ok(())
        }
        Command::Costs(command) => run_costs(&catalog, command).await,
    }
}

fn open_store(db_path: Option<PathBuf>) -> Result<CostStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = cardcost::infrastructure::rocksdb::RocksDbCostStore::open(path)
                .into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryCostStore::new()))
        }
        None => Ok(Arc::new(InMemoryCostStore::new())),
    }
}

fn build_gateway(config: &AppConfig, store: CostStoreRef) -> Result<CostGateway> {
    let admission = AdmissionController::new(&config.rate_limit).into_diagnostic()?;
    let lookup = BinlistClient::new(&config.lookup).into_diagnostic()?;
    let resolver = ClearingCostResolver::new(store, Arc::new(lookup));
    Ok(CostGateway::new(Arc::new(admission), Arc::new(resolver)))
}

async fn run_quote(gateway: CostGateway, input: PathBuf, jobs: usize) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let mut cards = Vec::new();
    for request in CardReader::new(file).cards() {
        match request {
            Ok(request) => cards.push(request.card_number),
            Err(e) => tracing::error!("Error reading card: {}", e),
        }
    }

    let stdout = io::stdout();
    let mut writer = QuoteWriter::new(stdout.lock());
    // At most `jobs` requests in flight; rows are written in input order.
    for batch in cards.chunks(jobs.max(1)) {
        let handles: Vec<_> = batch
            .iter()
            .cloned()
            .map(|pan| {
                let gateway = gateway.clone();
                tokio::spawn(async move {
                    let outcome = gateway.quote(&pan).await;
                    (pan, outcome)
                })
            })
            .collect();

        for handle in handles {
            let (pan, outcome) = handle.await.into_diagnostic()?;
            writer.write_outcome(&pan, &outcome).into_diagnostic()?;
        }
    }
    writer.flush().into_diagnostic()
}

async fn run_costs(catalog: &CostCatalog, command: CostsCommand) -> Result<()> {
    let records = match command {
        CostsCommand::List => catalog.list().await.into_diagnostic()?,
        CostsCommand::Get { country } => {
            let code = CountryCode::parse(&country).into_diagnostic()?;
            vec![catalog.get_by_country(&code).await.into_diagnostic()?]
        }
        CostsCommand::Create { country, cost } => {
            let code = CountryCode::parse(&country).into_diagnostic()?;
            let cost = Cost::new(cost).into_diagnostic()?;
            vec![catalog.create(code, cost).await.into_diagnostic()?]
        }
        CostsCommand::Update { id, country, cost } => {
            let code = CountryCode::parse(&country).into_diagnostic()?;
            let cost = Cost::new(cost).into_diagnostic()?;
            vec![catalog.update(id, code, cost).await.into_diagnostic()?]
        }
        CostsCommand::Delete { id } => {
            catalog.delete(id).await.into_diagnostic()?;
            Vec::new()
        }
    };

    let stdout = io::stdout();
    CostWriter::new(stdout.lock())
        .write_records(&records)
        .into_diagnostic()
}
