use analytics::{CHART_TOP_ACTIVES, HerdOverview, MetricBreakdown, MetricsEngine};
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::ConfigArgs;
use configuration::settings::Config;
use core_types::MetricType;
use database::{DbRepository, connect, run_migrations};
use rust_decimal::Decimal;
use std::net::SocketAddr;

/// The main entry point for the AMU tracker.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if present
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config(&cli.config.config)
        .with_context(|| format!("loading {}", cli.config.config.display()))?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Seed => handle_seed().await,
        Commands::Report(args) => handle_report(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Farm antimicrobial-use tracking: records treatments and computes
/// stewardship metrics (mg/PCU, DDDvet, DCDvet, HP-CIA share).
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Reset the database to the demo herd, treatments and medication catalog.
    Seed,
    /// Print the stewardship metrics for a herd.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Listen address; defaults to `server.host`/`server.port` from the configuration.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Herd to report on; defaults to `herd.active_herd_id`.
    #[arg(long)]
    herd_id: Option<i32>,

    /// Metric for the chart breakdown table (mg_per_pcu, dddvet, dcdvet).
    #[arg(long, default_value = "mg_per_pcu")]
    metric: MetricType,

    /// Aggregate every stored treatment instead of only the herd's own.
    #[arg(long)]
    all_entries: bool,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let addr = match args.addr {
        Some(addr) => addr,
        None => config.server.socket_addr()?,
    };
    web_server::run_server(config, addr).await
}

async fn connect_repository() -> anyhow::Result<DbRepository> {
    let db_pool = connect().await.context("Failed to connect to the database")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(DbRepository::new(db_pool))
}

async fn handle_seed() -> anyhow::Result<()> {
    let db_repo = connect_repository().await?;
    let herd_id = db_repo.seed_demo_data().await?;
    println!("Seeded demo data; herd id {herd_id}.");
    Ok(())
}

async fn handle_report(args: ReportArgs, config: Config) -> anyhow::Result<()> {
    let db_repo = connect_repository().await?;
    let herd_id = args.herd_id.unwrap_or(config.herd.active_herd_id);

    let herd = db_repo
        .get_herd(herd_id)
        .await
        .with_context(|| format!("loading herd {herd_id}"))?;
    let entries = if args.all_entries {
        db_repo.get_all_entries().await?
    } else {
        db_repo.get_entries_for_herd(herd_id).await?
    };
    tracing::info!(herd_id, entries = entries.len(), "Loaded treatments.");

    let engine = MetricsEngine::new(config.metrics);
    let overview = engine.herd_overview(&herd, &entries);
    let breakdown = engine.breakdown_by_metric(&entries, args.metric, CHART_TOP_ACTIVES);

    if args.json {
        let payload = serde_json::json!({ "overview": overview, "breakdown": breakdown });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_report(&overview, &breakdown);
    }
    Ok(())
}

fn fmt(value: Decimal, dp: u32) -> String {
    value.round_dp(dp).normalize().to_string()
}

fn print_report(overview: &HerdOverview, breakdown: &MetricBreakdown) {
    let herd = &overview.herd;
    let metrics = &overview.metrics;
    println!(
        "{} ({}, {}) - {} adults",
        herd.farm_name, herd.country, herd.species, herd.adult_count
    );

    let mut kpis = Table::new();
    kpis.load_preset(UTF8_FULL)
        .set_header(vec!["mg/PCU", "DDDvet", "DCDvet", "HP-CIA share", "Total mg"])
        .add_row(vec![
            fmt(metrics.mg_per_pcu, 3),
            fmt(metrics.dddvet, 1),
            fmt(metrics.dcdvet, 1),
            format!("{}%", fmt(metrics.hp_cia_share, 1)),
            fmt(metrics.total_mg, 2),
        ]);
    println!("{kpis}");

    let mut actives = Table::new();
    actives
        .load_preset(UTF8_FULL)
        .set_header(vec!["Active ingredient", "Total mg", "Share %", "HP-CIA"]);
    for active in &overview.top_actives {
        actives.add_row(vec![
            active.name.clone(),
            fmt(active.total_mg, 2),
            fmt(active.share_percent, 1),
            if active.is_hp_cia { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{actives}");

    let mut classes = Table::new();
    classes
        .load_preset(UTF8_FULL)
        .set_header(vec!["Class", "Total mg", "Share %", "HP-CIA mg"]);
    for class in &overview.class_breakdown {
        classes.add_row(vec![
            class.class_name.clone(),
            fmt(class.total_mg, 2),
            fmt(class.share_percent, 1),
            fmt(class.hp_cia_mg, 2),
        ]);
    }
    println!("{classes}");

    let mut trends = Table::new();
    trends
        .load_preset(UTF8_FULL)
        .set_header(vec!["Month", "mg/PCU", "DDDvet", "DCDvet", "HP-CIA %"]);
    for point in &overview.trends {
        trends.add_row(vec![
            point.month.clone(),
            fmt(point.mg_per_pcu, 3),
            fmt(point.dddvet, 1),
            fmt(point.dcdvet, 1),
            fmt(point.hp_cia_share, 1),
        ]);
    }
    println!("{trends}");

    let mut by_metric = Table::new();
    by_metric.load_preset(UTF8_FULL).set_header(vec![
        format!("Class ({})", breakdown.metric),
        "Value".to_string(),
        "Share %".to_string(),
        "HP-CIA value".to_string(),
    ]);
    for class in &breakdown.classes {
        by_metric.add_row(vec![
            class.class_name.clone(),
            fmt(class.value, 3),
            fmt(class.share_percent, 1),
            fmt(class.hp_cia_value, 3),
        ]);
    }
    println!("{by_metric}");
}
