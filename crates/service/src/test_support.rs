#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DATABASE_URL};
use configs::DatabaseConfig;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        url: DATABASE_URL.clone(),
        max_connections: 10,
        min_connections: 1,
        connect_timeout_secs: 5,
        acquire_timeout_secs: 10,
        ..DatabaseConfig::default()
    }
}

/// Connection for DB-backed tests, or `None` when `SKIP_DB_TESTS` is set or
/// Postgres is unreachable.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }

    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&test_config()).await else { return false };
            migration::Migrator::up(&db, None).await.is_ok()
        })
        .await;
    if !migrated {
        return None;
    }

    // Return a fresh connection for the current test's runtime
    connect_with_config(&test_config()).await.ok()
}
