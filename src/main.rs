use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kgexplain::db::Db;
use kgexplain::diagnose::diagnose;
use kgexplain::explain::PathRenderer;
use kgexplain::ingest::{build_index, load_interactions, load_item_names, NameDictionary};
use kgexplain::model::load_scores;
use kgexplain::{CandidateStatus, Config, EntityId, Explainer, Explanation, Recommender, ScoreTable};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "kgexplain")]
#[command(version, about = "Explain music recommendations with knowledge-graph paths")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Top-k recommendations for a user, each with explanations
    Recommend {
        #[arg(short, long)]
        user: String,
        /// Number of recommendations (defaults to recommend.default_k)
        #[arg(short, long)]
        k: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Explain a single item for a user without ranking
    Explain {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        item: String,
        #[arg(long)]
        json: bool,
    },
    /// List the graph paths between two entities
    Paths {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Hop limit (defaults to explain.max_hops)
        #[arg(long)]
        max_hops: Option<usize>,
    },
    /// Report why a user's candidates do or don't connect to their history
    Diagnose {
        #[arg(short, long)]
        user: String,
        /// Candidates to check; the user's top recommendations when omitted
        #[arg(short, long)]
        item: Vec<String>,
    },
    /// Summarize the loaded graph, interactions and scores
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.log_level.as_str())
    ).init();

    log::info!("Starting kgexplain v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Recommend { user, k, json } => {
            let (recommender, _) = load_recommender(&config).await?;
            let k = k.unwrap_or(config.recommend.default_k);
            let candidates = recommender.recommend(&user, k).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
                return Ok(());
            }
            println!("\n=== Recommendations for {} ===\n", user);
            for (rank, candidate) in candidates.iter().enumerate() {
                match candidate.status {
                    CandidateStatus::Ranked => println!(
                        "{}. {} [{}] score={:.4}",
                        rank + 1,
                        candidate.title,
                        candidate.item,
                        candidate.score
                    ),
                    CandidateStatus::UserNotFound => println!("{}", candidate.title),
                }
                print_explanations(&candidate.explanations);
            }
        }
        Command::Explain { user, item, json } => {
            let (recommender, _) = load_recommender(&config).await?;
            let explanations = recommender.explain_item(&user, &item);
            if json {
                println!("{}", serde_json::to_string_pretty(&explanations)?);
                return Ok(());
            }
            let item = EntityId::canonical(&item);
            println!(
                "\n=== Why {} for {} ===\n",
                recommender.explainer().names().name_or_id(&item),
                user
            );
            print_explanations(&explanations);
        }
        Command::Paths { from, to, max_hops } => {
            let explainer = load_explainer(&config)?;
            let max_hops = max_hops.unwrap_or(config.explain.max_hops);
            let explainer = explainer.with_max_hops(max_hops);
            let (from, to) = (EntityId::canonical(&from), EntityId::canonical(&to));

            let start = Instant::now();
            let paths = explainer.find_paths(&from, &to);
            log::debug!("Path search took {:?}", start.elapsed());

            println!("\n=== Paths {} -> {} (max {} hops) ===\n", from, to, max_hops);
            if paths.is_empty() {
                println!("No paths found.");
            }
            let renderer = PathRenderer::new(explainer.names());
            for (n, path) in paths.iter().enumerate() {
                println!("{}. [{} hop(s)] {}", n + 1, path.len(), renderer.render(path));
            }
        }
        Command::Diagnose { user, item } => {
            let (recommender, _) = load_recommender(&config).await?;
            let candidates: Vec<EntityId> = if item.is_empty() {
                recommender
                    .recommend(&user, config.recommend.default_k)
                    .await?
                    .into_iter()
                    .filter(|c| c.status == CandidateStatus::Ranked)
                    .map(|c| c.item)
                    .collect()
            } else {
                item.iter().map(|i| EntityId::canonical(i)).collect()
            };
            let report = diagnose(
                recommender.explainer().index(),
                recommender.history(&user),
                &candidates,
            );
            log::info!(
                "{} of {} distinct history items are in the graph ({:.0}%)",
                report.history_in_graph.len(),
                report.history_in_graph.len() + report.history_missing.len(),
                report.coverage() * 100.0
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Stats => {
            let (recommender, scores) = load_recommender(&config).await?;
            let stats = recommender.explainer().index().stats();

            println!("\n=== kgexplain data statistics ===\n");
            println!("Graph:");
            println!("  Entities:           {}", stats.entity_count);
            println!("  Triples:            {}", stats.triple_count);
            println!("  Duplicates dropped: {}", stats.duplicates_dropped);
            println!("  Missing inverses:   {}", stats.missing_inverse);
            println!("\nRelations:");
            for (relation, count) in &stats.relation_counts {
                println!("  {:<20} {}", relation, count);
            }
            println!("\nInteractions:");
            println!("  Users:              {}", recommender.interactions().user_count());
            println!("  Interactions:       {}", recommender.interactions().interaction_count());
            println!("\nScores:");
            println!("  Users:              {}", scores.users);
            println!("  Items:              {}", scores.items);
            println!("  Scores:             {}", scores.scores);
            println!("\nNames:               {}", recommender.explainer().names().len());
        }
    }

    Ok(())
}

/// Counts kept from the score table before it is handed to the recommender.
struct ScoreCounts {
    users: usize,
    items: usize,
    scores: usize,
}

fn print_explanations(explanations: &[Explanation]) {
    for explanation in explanations {
        println!("   - {}", explanation.text);
    }
    println!();
}

fn load_explainer(config: &Config) -> Result<Explainer> {
    let start = Instant::now();
    let index = build_index(&config.data.kg_path)
        .with_context(|| format!("Failed to load graph from {}", config.data.kg_path.display()))?;

    let names = match &config.data.items_path {
        Some(path) => load_item_names(path)
            .with_context(|| format!("Failed to load item names from {}", path.display()))?,
        None => {
            log::warn!("No data.items_path configured; explanations will show raw IDs");
            NameDictionary::new()
        }
    };
    log::info!("Graph and names loaded in {:?}", start.elapsed());

    Ok(Explainer::new(Arc::new(index), Arc::new(names))
        .with_max_hops(config.explain.max_hops)
        .with_budget(config.explain.budget)
        .with_path_cache(config.explain.path_cache_capacity))
}

async fn load_scores_from_config(config: &Config) -> Result<ScoreTable> {
    if let Some(db_path) = &config.data.scores_db {
        let db = Db::new(db_path);
        return load_scores(&db)
            .await
            .with_context(|| format!("Failed to load scores from {}", db_path.display()));
    }
    match &config.data.scores_path {
        Some(path) => ScoreTable::load_tsv(path)
            .with_context(|| format!("Failed to load scores from {}", path.display())),
        None => anyhow::bail!("No score source configured"),
    }
}

async fn load_recommender(config: &Config) -> Result<(Recommender, ScoreCounts)> {
    let explainer = load_explainer(config)?;
    let interactions = load_interactions(&config.data.inter_path)
        .with_context(|| format!("Failed to load interactions from {}", config.data.inter_path.display()))?;
    let scores = load_scores_from_config(config).await?;
    let counts = ScoreCounts {
        users: scores.user_count(),
        items: scores.item_count(),
        scores: scores.len(),
    };

    let recommender = Recommender::new(Arc::new(scores), Arc::new(interactions), explainer);
    Ok((recommender, counts))
}
