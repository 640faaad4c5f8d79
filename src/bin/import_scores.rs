use anyhow::{Context, Result};
use clap::Parser;
use kgexplain::db::{migrate, Db};
use kgexplain::model::import_scores;
use kgexplain::ScoreTable;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "import-scores")]
#[command(about = "Import exported model scores (user_id, item_id, score TSV) into the SQLite score store")]
struct Args {
    /// Score TSV exported from the trained model
    scores: PathBuf,

    /// Target database; replaces any scores already stored there
    #[arg(short, long, default_value = "scores.db")]
    db: PathBuf,

    /// Directory holding the schema migrations
    #[arg(long, default_value = "migrations")]
    migrations: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();
    let _ = dotenv::dotenv();

    let db = Db::new(&args.db);
    let migrations_dir = args.migrations.clone();
    db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
        .await
        .with_context(|| format!("Failed to migrate {}", args.db.display()))?;
    log::info!("Database ready at {}", args.db.display());

    let start = Instant::now();
    let table = ScoreTable::load_tsv(&args.scores)
        .with_context(|| format!("Failed to read scores from {}", args.scores.display()))?;
    if table.is_empty() {
        anyhow::bail!("{} holds no usable scores", args.scores.display());
    }

    let written = import_scores(&db, table).await?;
    log::info!(
        "Imported {} scores into {} in {:?}",
        written,
        args.db.display(),
        start.elapsed()
    );

    Ok(())
}
