use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexrel::api::HttpServer;
use lexrel::db::{migrate, Db};
use lexrel::graph::{get_seeded_graph, GraphQuery};
use lexrel::lexicon::load_oracle;
use lexrel::{Config, RelationType, SqliteRelationStore, TaskManager, TaskStatus};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "lexrel")]
#[command(about = "Generate and explore relations between vocabulary words")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Run one generation job in the foreground
    Generate {
        #[arg(short, long)]
        user: String,
        /// synonym, antonym, root, confused or topic
        #[arg(short = 't', long = "type")]
        relation_type: String,
    },
    /// Print a relation graph as JSON
    Graph {
        #[arg(short, long)]
        user: String,
        /// Seed word id; omit for the whole graph
        #[arg(short, long)]
        word: Option<i64>,
        #[arg(short, long)]
        depth: Option<usize>,
        /// Comma separated relation types
        #[arg(long)]
        types: Option<String>,
    },
    /// Apply pending migrations
    Migrate,
    /// Check the database schema (default)
    Verify,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", &config.lexrel.log_level)).init();
    let db = open_database(&config).await?;

    match args.command.unwrap_or(Command::Verify) {
        Command::Serve => run_http_server(config, db).await,
        Command::Generate { user, relation_type } => run_generation(&config, db, &user, &relation_type).await,
        Command::Graph { user, word, depth, types } => {
            let query = GraphQuery::parse(types.as_deref(), word, depth)?;
            let graph = get_seeded_graph(&db, &user, &query).await?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            Ok(())
        }
        Command::Migrate => Ok(()),
        Command::Verify => verify_database_schema(&db).await,
    }
}

/// Open the database and apply migrations
async fn open_database(config: &Config) -> Result<Db> {
    let db = Db::new(config.db_path());
    let migrations_dir = config.migrations_dir().to_path_buf();
    let applied = db
        .with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
        .await
        .with_context(|| format!("Failed to migrate {}", config.db_path().display()))?;
    log::info!("Database ready at {} ({} migrations applied now)", config.db_path().display(), applied);
    Ok(db)
}

fn task_manager(config: &Config, db: Db) -> TaskManager {
    let oracle = load_oracle(config.lexrel.lexicon_path.as_deref());
    let store = Arc::new(SqliteRelationStore::new(db));
    TaskManager::new(store, oracle, config.generation.clone())
}

async fn run_http_server(config: Config, db: Db) -> Result<()> {
    log::info!("Starting Lexrel HTTP server v{}", env!("CARGO_PKG_VERSION"));
    let tasks = task_manager(&config, db.clone());
    HttpServer::new(&config, db, tasks).run().await?;
    Ok(())
}

/// Start a job and report its progress until it ends. Ctrl-C stops it.
async fn run_generation(config: &Config, db: Db, user: &str, relation_type: &str) -> Result<()> {
    let relation_type: RelationType = relation_type.parse()?;
    let tasks = task_manager(config, db);
    tasks.start_type(relation_type, user)?;

    let mut interval = tokio::time::interval(config.stream.poll_interval() * 4);
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, stopping {} generation", relation_type);
                tasks.stop_type(relation_type, user);
            }
        }

        let snapshot = tasks.snapshot(relation_type, user);
        if let Some(run) = &snapshot.run {
            log::info!("{}: {}/{} words, {} found, {} saved", relation_type, run.processed, run.total, run.found, run.saved);
        }
        if !snapshot.is_running() {
            break;
        }
    }

    let tasks_for_join = tasks.clone();
    let user_owned = user.to_string();
    let snapshot = tokio::task::spawn_blocking(move || tasks_for_join.join(relation_type, &user_owned)).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    if snapshot.status == TaskStatus::Error {
        let message = snapshot.run.and_then(|r| r.error).unwrap_or_default();
        anyhow::bail!("{} generation failed: {}", relation_type, message);
    }
    Ok(())
}

/// Verify that all expected database objects exist
async fn verify_database_schema(db: &Db) -> Result<()> {
    use lexrel::error::LexrelError;

    db.with_connection(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        let expected_tables = ["relation_generation_log", "schema_migrations", "words", "words_relations"];
        let missing: Vec<&str> = expected_tables.iter().copied().filter(|t| !tables.iter().any(|x| x == t)).collect();
        if !missing.is_empty() {
            return Err(LexrelError::Config(format!("Missing tables: {}", missing.join(", "))));
        }

        let applied = migrate::get_applied_migrations(conn)?;
        log::debug!("{} migrations applied", applied.len());

        let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            return Err(LexrelError::Config(format!("Journal mode is not WAL: {}", journal_mode)));
        }

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(LexrelError::Config(format!("Database integrity check failed: {}", integrity)));
        }

        Ok(())
    })
    .await?;

    log::info!("Database schema verification complete");
    Ok(())
}
