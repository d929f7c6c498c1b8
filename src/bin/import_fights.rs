use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use fight_features::cli;
use fight_features::config::PipelineConfig;
use fight_features::store::{self, ImportSummary};
use fight_features::{FightRecord, FightTable};

fn main() -> Result<()> {
    cli::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = PipelineConfig::from_env();
    cli::init_tracing(&cfg.log_level);

    let input = cli::path_flag(&args, "--input")
        .or_else(|| first_positional(&args))
        .context("usage: import_fights --input fights.jsonl [--db path]")?;
    let db_path = cli::path_flag(&args, "--db").unwrap_or(cfg.db_path);

    let file = File::open(&input).with_context(|| format!("open {}", input.display()))?;
    let mut summary = ImportSummary::default();
    let mut records: Vec<FightRecord> = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        summary.rows_read += 1;
        match serde_json::from_str::<FightRecord>(&line) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(line = line_no + 1, "skipping unparseable fight: {err}");
                summary.errors.push(format!("line {}: {err}", line_no + 1));
            }
        }
    }
    if records.is_empty() {
        return Err(anyhow!("no fights parsed from {}", input.display()));
    }

    let validated = FightTable::new(records.clone())
        .with_context(|| format!("validate fights from {}", input.display()))?;
    info!(rows = validated.len(), "input validated");

    let mut conn = store::open_db(&db_path)
        .with_context(|| format!("open sqlite db {}", db_path.display()))?;
    summary.rows_upserted = store::upsert_fights(&mut conn, &records).context("upsert fights")?;
    let (earliest, latest) = store::date_range(&conn).context("query date range")?;
    summary.earliest_date = earliest;
    summary.latest_date = latest;
    let source = input.display().to_string();
    store::record_import_run(&conn, &source, &summary).context("record import run")?;

    println!("Fight import complete");
    println!("DB: {}", db_path.display());
    println!("Lines read: {}", summary.rows_read);
    println!("Fights upserted: {}", summary.rows_upserted);
    println!("Fights stored: {}", store::count_fights(&conn)?);
    println!(
        "Dates: {} .. {}",
        summary.earliest_date.as_deref().unwrap_or("n/a"),
        summary.latest_date.as_deref().unwrap_or("n/a")
    );
    if !summary.errors.is_empty() {
        println!("  errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(6) {
            println!("   - {err}");
        }
    }
    Ok(())
}

fn first_positional(args: &[String]) -> Option<PathBuf> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = !arg.contains('=');
            continue;
        }
        return Some(PathBuf::from(arg));
    }
    None
}
