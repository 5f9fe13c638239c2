use packing_buddy::{
    config::{database, features, templates},
    core::{migration, progress, template, trip},
    errors::Result,
};
use dotenvy::dotenv;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Creates the parent directory of a local `SQLite` file so `mode=rwc` can create it.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or(rest);
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Connect and make sure the schema exists
    ensure_sqlite_dir(&database::get_database_url())?;
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 4. Upgrade data from older releases
    if let Some(report) = migration::run_migrations(&db).await? {
        info!("Applied legacy migration: {:?}", report);
    }

    // 5. Seed default templates on first run
    let flags = features::load_from_env();
    info!("Plus unlocked: {}", flags.has_unlocked_plus());
    let template_config = templates::load_default_config()?;
    let seeded = template::seed_default_templates(&db, &template_config)
        .await
        .inspect_err(|e| error!("Failed to seed templates: {}", e))?;
    if seeded > 0 {
        info!("Seeded {} templates", seeded);
    }

    // 6. Summarize every trip
    for t in trip::get_all_trips(&db).await? {
        let report = progress::generate_trip_report(&db, t.id).await?;
        let bar = progress::format_progress_bar(&report.packing, None)
            .unwrap_or_else(|| "nothing to pack".to_string());
        info!("{}: {}", t.name, bar);
    }

    Ok(())
}
