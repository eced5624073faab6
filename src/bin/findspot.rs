use clap::{Parser, Subcommand, ValueEnum};
use findspot::cli::{self as prog_cli, OutputMode, parse_key_val};
use findspot::{FeatureStore, config, logger};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "findspot", version, about = "Parking spot collection: HTTP service and CLI")]
struct Cli {
    /// Optional path to a TOML config file (overrides $FINDSPOT_CONFIG and ./findspot.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// GeoJSON data file (overrides config and $FINDSPOT_DATA)
    #[arg(long)]
    data: Option<PathBuf>,
    /// Writer lock timeout in milliseconds
    #[arg(long)]
    lock_timeout_ms: Option<u64>,
    /// Output format for CLI commands
    #[arg(long, value_enum, default_value_t = Format::Human)]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Human,
    Plain,
    Json,
}

impl From<Format> for OutputMode {
    fn from(f: Format) -> Self {
        match f {
            Format::Human => Self::Human,
            Format::Plain => Self::Plain,
            Format::Json => Self::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start the HTTP API server")]
    Serve {
        #[arg(long, help = "Listen address, e.g. 127.0.0.1:3000")]
        bind: Option<String>,
    },
    #[command(about = "List spots; every key=value pair must match")]
    List {
        #[arg(value_parser = parse_key_val, help = "Filters as key=value (e.g. fee=yes)")]
        filters: Vec<(String, String)>,
    },
    #[command(about = "Add a Point spot at lon/lat")]
    Add {
        #[arg(allow_hyphen_values = true)]
        lon: f64,
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(long = "prop", value_parser = parse_key_val, help = "Property as key=value; repeatable")]
        properties: Vec<(String, String)>,
    },
    #[command(about = "Update name, access, fee or surface of a spot")]
    Update {
        id: String,
        #[arg(long = "set", value_parser = parse_key_val, required = true, help = "Field as key=value; repeatable")]
        set: Vec<(String, String)>,
    },
    #[command(about = "Delete a spot by id")]
    Delete { id: String },
    #[command(about = "Print property keys usable as filters")]
    Keys,
    #[command(about = "Print value frequencies for property fields")]
    Analyze {
        #[arg(help = "Fields to summarize; defaults to surface, access, fee, capacity, maxstay, operator, supervised")]
        fields: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = real_main(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = config::load(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        cfg.data_file = data;
    }
    if let Some(ms) = cli.lock_timeout_ms {
        cfg.lock_timeout_ms = ms;
    }
    logger::configure_logging(cfg.log_dir.as_deref(), cfg.log_level.as_deref(), cfg.log_retention)?;

    let store = FeatureStore::open(&cfg.data_file, cfg.store_options())?;
    log::debug!("opened {} with {} features", store.describe_storage(), store.len());

    let cmd = match cli.command {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or(cfg.bind);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(findspot::api::serve(Arc::new(store), &addr))?;
            return Ok(());
        }
        Commands::List { filters } => prog_cli::Command::List { filters },
        Commands::Add { lon, lat, properties } => prog_cli::Command::Add { lon, lat, properties },
        Commands::Update { id, set } => prog_cli::Command::Update { id, set },
        Commands::Delete { id } => prog_cli::Command::Delete { id },
        Commands::Keys => prog_cli::Command::Keys,
        Commands::Analyze { fields } => prog_cli::Command::Analyze { fields },
    };
    prog_cli::run_with_format(&store, cmd, cli.format.into(), &mut std::io::stdout().lock())
}
