use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalogue HTTP service")]
struct Cli {
    /// Environment to load configuration for (overrides BOOKSHELF_ENV)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_for(cli.env.as_deref())
        .with_context(|| "failed to load bookshelf settings")?;

    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookshelf bootstrap starting"
    );

    let db = Database::connect(&settings.database.db_config())
        .await
        .context("failed to open database")?;

    let mut registry = ModuleRegistry::new();
    bookshelf_app::register_all(&mut registry);

    let applied = registry.run_migrations(&db).await?;
    tracing::info!(applied, "migrations complete");

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => Ok(()),
        Command::Serve => serve(&registry, &settings, &db).await,
    };

    db.close().await;
    result
}

async fn serve(registry: &ModuleRegistry, settings: &Settings, db: &Database) -> anyhow::Result<()> {
    let ctx = InitCtx { settings, db };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(registry, &ctx).await;

    registry.stop_modules().await?;
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["bookshelf", "--env", "test"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.env.as_deref(), Some("test"));
    }
}
