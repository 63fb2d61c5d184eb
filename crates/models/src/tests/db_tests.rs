use crate::db::{connect_with_config, DATABASE_URL};
use configs::DatabaseConfig;
use sea_orm::{DatabaseBackend, Statement, ConnectionTrait};
use anyhow::Result;

/// Test connection with pool settings from `[database]`
#[tokio::test]
async fn test_custom_config_connection() -> Result<()> {
    if super::setup_test_db().await.is_none() {
        return Ok(());
    }

    let config = DatabaseConfig {
        url: DATABASE_URL.clone(),
        max_connections: 5,
        min_connections: 1,
        connect_timeout_secs: 10,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&config).await?;

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT current_database()".to_string());
    let result = db.query_one(stmt).await?;
    assert!(result.is_some());

    Ok(())
}

/// Migrations create both catalog tables
#[tokio::test]
async fn test_tables_exist_after_migration() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    for table in ["category", "product"] {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT COUNT(*)::BIGINT AS n FROM information_schema.tables WHERE table_name = $1",
            [table.into()],
        );
        let row = db.query_one(stmt).await?.expect("count row");
        let n: i64 = row.try_get("", "n")?;
        assert_eq!(n, 1, "table {table} missing");
    }
    Ok(())
}
