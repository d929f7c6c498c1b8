use anyhow::{Context, Result, anyhow};

use fight_features::cli;
use fight_features::config::PipelineConfig;
use fight_features::fight_table::FightResult;
use fight_features::glicko::Glicko2Params;
use fight_features::store;
use fight_features::{FightTable, RatingEngine};

fn main() -> Result<()> {
    cli::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = PipelineConfig::from_env();
    cli::init_tracing(&cfg.log_level);

    let fighter = cli::flag_value(&args, "--fighter")
        .context("usage: rating_trace --fighter <id> [--db path]")?;
    let db_path = cli::path_flag(&args, "--db").unwrap_or(cfg.db_path);

    let conn = store::open_db(&db_path)
        .with_context(|| format!("open sqlite db {}", db_path.display()))?;
    let table = FightTable::new(store::load_fights(&conn).context("load fights")?)?;

    let mut engine = RatingEngine::new(Glicko2Params::default());
    let mut appearances = 0usize;
    println!(
        "{:>6}  {:<10}  {:<24}  {:<4}  {:>8}  {:>7}  {:>8}  {:>8}",
        "row", "date", "opponent", "res", "rating", "rd", "vol", "opp"
    );
    for fight in table.iter() {
        let row = engine.record(fight)?;
        let Some(corner) = fight.corner_of(&fighter) else {
            continue;
        };
        appearances += 1;
        let own = row.get(corner);
        let opp = row.get(corner.opponent());
        let result = match fight.result_for_corner(corner) {
            FightResult::Win => "W",
            FightResult::Loss => "L",
            FightResult::Draw => "D",
        };
        println!(
            "{:>6}  {:<10}  {:<24}  {:<4}  {:>8.1}  {:>7.1}  {:>8.5}  {:>8.1}",
            fight.index,
            fight.date.format("%Y-%m-%d").to_string(),
            fight.fighter(corner.opponent()),
            result,
            own.rating,
            own.deviation,
            own.volatility,
            opp.rating
        );
    }
    if appearances == 0 {
        return Err(anyhow!("fighter {fighter:?} has no stored fights"));
    }

    let now = engine.current(&fighter);
    println!(
        "current: rating={:.1} rd={:.1} vol={:.5} after {appearances} fights",
        now.rating, now.deviation, now.volatility
    );
    Ok(())
}
