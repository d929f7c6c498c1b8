use anyhow::{Context, Result, anyhow};
use tracing::{error, info};

use fight_features::catalog::FeatureCatalog;
use fight_features::cli;
use fight_features::config::PipelineConfig;
use fight_features::export::export_features;
use fight_features::glicko::Glicko2Params;
use fight_features::pipeline::build_features;
use fight_features::store;
use fight_features::{FeatureError, FightTable};

fn main() {
    cli::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = match resolve_config(&args) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Config error: {err:#}");
            std::process::exit(2);
        }
    };
    cli::init_tracing(&cfg.log_level);

    if let Err(err) = run(&cfg) {
        match err.downcast_ref::<FeatureError>().and_then(FeatureError::row) {
            Some(row) => error!(row, "feature build failed: {err:#}"),
            None => error!("feature build failed: {err:#}"),
        }
        std::process::exit(1);
    }
}

fn resolve_config(args: &[String]) -> Result<PipelineConfig> {
    let mut cfg = PipelineConfig::from_env();
    if let Some(db) = cli::path_flag(args, "--db") {
        cfg.db_path = db;
    }
    if let Some(path) = cli::path_flag(args, "--export") {
        cfg.export_path = Some(path);
    }
    if let Some(raw) = cli::flag_value(args, "--threads") {
        let threads = raw
            .parse::<usize>()
            .map_err(|_| anyhow!("--threads expects a positive integer, got {raw:?}"))?;
        cfg.threads = Some(threads.clamp(1, 64));
    }
    Ok(cfg)
}

fn run(cfg: &PipelineConfig) -> Result<()> {
    let mut conn = store::open_db(&cfg.db_path)
        .with_context(|| format!("open sqlite db {}", cfg.db_path.display()))?;
    let records = store::load_fights(&conn).context("load fights")?;
    if records.is_empty() {
        return Err(anyhow!(
            "no fights stored in {}; run import_fights first",
            cfg.db_path.display()
        ));
    }
    let table = FightTable::new(records)?;
    info!(rows = table.len(), db = %cfg.db_path.display(), "fight table loaded");

    let catalog = FeatureCatalog::standard(cfg);
    let features = build_features(&table, &catalog, Glicko2Params::default(), cfg.threads)?;
    let saved = store::save_features(&mut conn, &features).context("save features")?;

    println!("Feature build complete");
    println!("DB: {}", cfg.db_path.display());
    println!("Fights: {}", table.len());
    println!("Columns: {}", features.schema().len());
    println!("Rows saved: {saved}");

    if let Some(path) = cfg.export_path.as_deref() {
        let report = export_features(path, &table, &features)?;
        println!(
            "Exported {} rows x {} columns to {}",
            report.rows,
            report.columns,
            path.display()
        );
    }
    Ok(())
}
