use crate::errors::{DbError, DbResult};
use chrono::Utc;
use sqlx::SqlitePool;

// Embed all migration SQL files at compile time
const MIGRATION_MEMBERS: &str = include_str!("../migrations/20250603000000_members.sql");
const MIGRATION_DONATIONS: &str = include_str!("../migrations/20250610000000_donations.sql");
const MIGRATION_MEMBER_NAME: &str =
    include_str!("../migrations/20250618000000_add_member_name_to_donations.sql");

// List of migrations with their names and SQL content
const MIGRATIONS: &[(&str, &str)] = &[
    ("20250603000000_members.sql", MIGRATION_MEMBERS),
    ("20250610000000_donations.sql", MIGRATION_DONATIONS),
    (
        "20250618000000_add_member_name_to_donations.sql",
        MIGRATION_MEMBER_NAME,
    ),
];

/// Bring the database up to the current schema.
///
/// Safe to call on every startup: migrations already recorded in the
/// bookkeeping table are skipped, and all pending ones run inside a single
/// transaction so a failure leaves the schema where it was.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    create_migrations_table(pool).await?;
    let last_migration = get_last_migration(pool).await?;
    apply_pending_migrations(pool, last_migration).await
}

/// Create the bookkeeping table that records which migrations have run.
async fn create_migrations_table(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| DbError::Migration(format!("Failed to create migrations table: {}", e)))?;
    Ok(())
}

/// Name of the most recently applied migration, if any.
async fn get_last_migration(pool: &SqlitePool) -> DbResult<Option<String>> {
    let last: Option<String> =
        sqlx::query_scalar("SELECT name FROM migrations ORDER BY id DESC LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(|e| DbError::Migration(format!("Failed to read migration history: {}", e)))?;
    Ok(last)
}

/// Everything in [`MIGRATIONS`] that comes after `last_migration`.
fn get_pending_migrations(last_migration: Option<&str>) -> Vec<(&'static str, &'static str)> {
    match last_migration {
        None => MIGRATIONS.to_vec(),
        Some(last) => {
            let mut seen_last = false;
            MIGRATIONS
                .iter()
                .filter(|(name, _)| {
                    if seen_last {
                        return true;
                    }
                    if *name == last {
                        seen_last = true;
                    }
                    false
                })
                .copied()
                .collect()
        }
    }
}

async fn apply_pending_migrations(
    pool: &SqlitePool,
    last_migration: Option<String>,
) -> DbResult<()> {
    let pending = get_pending_migrations(last_migration.as_deref());
    if pending.is_empty() {
        log::debug!("Database schema is up to date");
        return Ok(());
    }

    log::info!("Applying {} pending migration(s)", pending.len());
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::Transaction(e.to_string()))?;

    for (name, sql) in pending {
        sqlx::query(sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::Migration(format!("{} failed: {}", name, e)))?;

        sqlx::query("INSERT INTO migrations (name, applied_at) VALUES (?, ?)")
            .bind(name)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::Migration(format!("Failed to record {}: {}", name, e)))?;

        log::info!("Applied migration {}", name);
    }

    tx.commit()
        .await
        .map_err(|e| DbError::Transaction(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn migrations_create_all_tables() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();

        assert!(tables.contains(&"members".to_string()));
        assert!(tables.contains(&"cash_submissions".to_string()));
        assert!(tables.contains(&"in_kind_donations".to_string()));
        assert!(tables.contains(&"migrations".to_string()));
    }

    #[tokio::test]
    async fn rerun_is_a_no_op() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied as usize, MIGRATIONS.len());
    }

    #[tokio::test]
    async fn member_name_column_defaults_to_empty() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO members (email, name, mobile, is_master, created_at, updated_at)
             VALUES ('a@b.c', 'A', NULL, 0, '2025-06-18T00:00:00Z', '2025-06-18T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Insert without member_name the way pre-migration builds did.
        sqlx::query(
            "INSERT INTO cash_submissions (id, member_email, donor_name, city, gothra, phone_number, amount, recorded_at)
             VALUES ('s1', 'a@b.c', 'Donor', 'City', 'Gothra', '9876543210', '100', NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let member_name: String =
            sqlx::query_scalar("SELECT member_name FROM cash_submissions WHERE id = 's1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(member_name, "");
    }

    #[tokio::test]
    async fn pending_resume_after_partial_history() {
        let pool = test_pool().await;
        create_migrations_table(&pool).await.unwrap();

        // Pretend only the first migration ran on an older build.
        let (first_name, first_sql) = MIGRATIONS[0];
        sqlx::query(first_sql).execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO migrations (name, applied_at) VALUES (?, ?)")
            .bind(first_name)
            .bind(Utc::now().to_rfc3339())
            .execute(&pool)
            .await
            .unwrap();

        run_migrations(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied as usize, MIGRATIONS.len());

        let donation_tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('cash_submissions', 'in_kind_donations')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(donation_tables, 2);
    }
}
