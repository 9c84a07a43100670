use anyhow::Result;
use clap::Parser;
use lexrel::db::Db;
use lexrel::graph::relation_stats;
use lexrel::{Config, RelationType};

#[derive(Parser, Debug)]
#[command(name = "stats")]
#[command(about = "Relation counts and processed-log coverage for one user")]
struct Args {
    #[arg(short, long)]
    user: String,
}

fn coverage(processed: usize, words: usize) -> f64 {
    if words == 0 {
        return 0.0;
    }
    processed as f64 * 100.0 / words as f64
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", &config.lexrel.log_level)).init();
    let db = Db::new(config.db_path());

    let stats = relation_stats(&db, &args.user).await?;

    println!("\n=== Lexrel Relation Statistics: {} ===\n", args.user);
    println!("Words: {}", stats.word_count);

    if stats.word_count == 0 {
        println!("\nNo words found for this user.");
        return Ok(());
    }

    println!("{:-<52}", "");
    println!("{:<12} {:>12} {:>12} {:>12}", "Type", "Relations", "Processed", "Coverage");
    println!("{:-<52}", "");
    for rt in RelationType::ALL {
        let relations = stats.relations.get(&rt).copied().unwrap_or(0);
        let processed = stats.processed.get(&rt).copied().unwrap_or(0);
        println!(
            "{:<12} {:>12} {:>12} {:>11.1}%",
            rt.as_str(),
            relations,
            processed,
            coverage(processed, stats.word_count)
        );
    }
    println!("{:-<52}", "");
    println!("{:<12} {:>12}", "Total", stats.total_relations);
    println!();

    Ok(())
}
