use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::style::Stylize;
use gcp_inventory::config::{Config, APP_DIR};
use gcp_inventory::gcp::auth;
use gcp_inventory::gcp::client::{GcpClient, RegionScope};
use gcp_inventory::inventory::analysis::analyze;
use gcp_inventory::inventory::{compute_change_report, store};
use gcp_inventory::report::{self, console, CsvLayout, ExportFormat, ExportOptions};
use gcp_inventory::resource::ResourceKind;
use gcp_inventory::scan::{self, DEFAULT_CONCURRENCY};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Inventory the resources of a GCP project and compare with a previous scan
#[derive(Parser, Debug)]
#[command(name = "gcp-inventory", version, about, long_about = None)]
struct Args {
    /// GCP project to scan
    #[arg(short, long)]
    project: Option<String>,

    /// Region for regional and zonal resources
    #[arg(short, long, conflicts_with = "all_regions")]
    region: Option<String>,

    /// Scan every region
    #[arg(long)]
    all_regions: bool,

    /// Service account key file (defaults to Application Default Credentials)
    #[arg(long, value_name = "FILE")]
    credentials: Option<PathBuf>,

    /// Print only the executive summary
    #[arg(short, long)]
    summary_only: bool,

    /// Use ASCII markers instead of emojis
    #[arg(long)]
    no_emojis: bool,

    /// Export formats
    #[arg(short, long, value_enum, value_delimiter = ',')]
    export: Vec<ExportFormat>,

    /// Directory for exported files [default: exports]
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Column layout of CSV exports
    #[arg(long, value_enum, default_value = "standard")]
    csv_layout: CsvLayout,

    /// Report cost-generating and potentially unused resources
    #[arg(short, long)]
    analyze: bool,

    /// Compare with a previous JSON snapshot
    #[arg(long, value_name = "FILE")]
    compare: Option<PathBuf>,

    /// Only scan these kinds
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    services: Vec<ResourceKind>,

    /// Skip these kinds
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    exclude_services: Vec<ResourceKind>,

    /// List every kind and whether it would be scanned, then exit
    #[arg(long)]
    list_services: bool,

    /// Maximum number of kinds listed at the same time
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    concurrency: Option<u16>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {}", log_path.display(), e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcp-inventory started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join(APP_DIR).join("gcp-inventory.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcp-inventory").join("gcp-inventory.log");
    }
    PathBuf::from("gcp-inventory.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);
    let config = Config::load();

    if args.list_services {
        let selected = config.selected_kinds(&args.services, &args.exclude_services);
        print!(
            "{}",
            console::render_service_list(|kind| selected.contains(&kind), use_emojis(&args, &config))
        );
        return ExitCode::SUCCESS;
    }

    tokio::select! {
        result = run(&args, &config) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!("Fatal: {:#}", err);
                eprintln!("{} {:#}", "Error:".red().bold(), err);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Scan interrupted by user");
            eprintln!("\n{}", "Scan interrupted by user.".yellow());
            ExitCode::FAILURE
        }
    }
}

fn use_emojis(args: &Args, config: &Config) -> bool {
    !args.no_emojis && config.use_emojis.unwrap_or(true)
}

async fn run(args: &Args, config: &Config) -> Result<()> {
    let emojis = use_emojis(args, config);

    let project = config
        .effective_project(args.project.as_deref())
        .context("No project configured. Use --project, the config file, or 'gcloud config set project'")?;
    if !auth::validate_project_id(&project) {
        anyhow::bail!("Invalid project ID: {}", project);
    }

    let region = if args.all_regions {
        RegionScope::All
    } else {
        RegionScope::Region(config.effective_region(args.region.as_deref()))
    };
    let scope = region.to_string();

    let kinds = config.selected_kinds(&args.services, &args.exclude_services);
    if kinds.is_empty() {
        anyhow::bail!("No resource kinds selected; check --services and --exclude-services");
    }
    let concurrency = args
        .concurrency
        .map(usize::from)
        .or(config.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);

    println!(
        "{}",
        format!("GCP Inventory Scanner v{}", env!("CARGO_PKG_VERSION")).bold()
    );
    println!("{}", "=".repeat(50));
    println!(
        "Scanning {} kinds in project {} ({})",
        kinds.len(),
        project,
        scope
    );

    let client = GcpClient::new(&project, region, args.credentials.as_deref())
        .await
        .context("Failed to initialize GCP client")?;

    let result = scan::collect(&client, &kinds, concurrency).await;

    if !args.summary_only {
        print!("{}", console::render_listing(&result.snapshot, emojis));
    }
    print!("{}", console::render_summary(&result, &project, &scope, emojis));

    if args.analyze {
        print!("{}", console::render_analysis(&analyze(&result.snapshot), emojis));
    }

    if let Some(path) = &args.compare {
        let previous = store::load_or_empty(path)
            .with_context(|| format!("Cannot compare against {}", path.display()))?;
        if let Some(reason) = &previous.fallback {
            eprintln!(
                "{}",
                format!("Warning: {}; everything is reported as added", reason).yellow()
            );
        }
        let changes = compute_change_report(&result.snapshot, &previous.snapshot);
        print!("{}", console::render_changes(&changes, emojis));
    }

    if !args.export.is_empty() {
        let output_dir = config.effective_output_dir(args.output_dir.as_deref());
        let written = report::write_exports(
            &result.snapshot,
            &ExportOptions {
                formats: &args.export,
                output_dir: &output_dir,
                csv_layout: args.csv_layout,
                project: &project,
            },
        )?;
        println!();
        for path in written {
            println!("Exported: {}", path.display());
        }
    }

    println!(
        "\nScan complete: {} resources found in {}",
        result.snapshot.total_resources(),
        scope
    );
    Ok(())
}
