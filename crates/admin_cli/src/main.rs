use std::error::Error;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{Engine, SyncParams};
use migration::MigratorTrait;

#[derive(Parser, Debug)]
#[command(name = "joseikin_admin")]
#[command(about = "Admin utilities for joseikin (sync, orphans, reset)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./joseikin.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one reconciliation pass against the freee API.
    Sync(SyncArgs),
    /// List allocation splits not attached to any transaction line.
    Orphans,
    /// Point an allocation split at a transaction line.
    Rebind(RebindArgs),
    /// Delete every synced transaction and every allocation split.
    Reset(ResetArgs),
}

#[derive(Args, Debug)]
struct SyncArgs {
    #[arg(long)]
    start_date: NaiveDate,
    #[arg(long)]
    end_date: NaiveDate,
    /// Company to sync; defaults to the first one the token can access.
    #[arg(long)]
    company_id: Option<i64>,
    #[arg(long, env = "FREEE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,
    /// Override for test servers.
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Args, Debug)]
struct RebindArgs {
    #[arg(long)]
    allocation_id: Uuid,
    #[arg(long)]
    detail_id: i64,
}

#[derive(Args, Debug)]
struct ResetArgs {
    /// Required; the wipe is refused without it.
    #[arg(long)]
    confirm: bool,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Sync(args) => {
            let client = match &args.base_url {
                Some(base_url) => freee::FreeeClient::with_base_url(base_url),
                None => freee::FreeeClient::new(),
            };
            let mut params = SyncParams::new(args.start_date, args.end_date);
            params.company_id = args.company_id;

            let summary = engine.run_sync(&client, &args.access_token, &params).await?;
            println!(
                "fetched: {}, created: {}, updated: {}, skipped: {}",
                summary.fetched, summary.created, summary.updated, summary.skipped
            );
            for error in &summary.errors {
                eprintln!("warning: {error}");
            }
        }
        Command::Orphans => {
            let orphans = engine.list_orphaned_allocations().await?;
            if orphans.is_empty() {
                println!("no orphaned allocations");
            }
            for split in orphans {
                println!(
                    "{}  amount: {}  note: {}",
                    split.id,
                    split.amount,
                    split.note.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Rebind(args) => {
            let split = engine
                .rebind_allocation(args.allocation_id, args.detail_id)
                .await?;
            println!("allocation {} now bound to detail {}", split.id, args.detail_id);
        }
        Command::Reset(args) => {
            let summary = engine.reset_all_transactions(args.confirm).await?;
            println!(
                "deleted {} transactions and {} allocations",
                summary.transactions_deleted, summary.allocations_deleted
            );
        }
    }

    Ok(())
}
