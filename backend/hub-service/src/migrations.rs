use sqlx::{Pool, Postgres};

// Embed SQL migrations at compile time for deterministic startup
const MIG_0001: &str = include_str!("../migrations/0001_create_users.sql");
const MIG_0002: &str = include_str!("../migrations/0002_create_unions.sql");
const MIG_0003: &str = include_str!("../migrations/0003_create_union_members.sql");
const MIG_0004: &str = include_str!("../migrations/0004_create_groups.sql");
const MIG_0005: &str = include_str!("../migrations/0005_create_messages.sql");
const MIG_0006: &str = include_str!("../migrations/0006_create_announcements.sql");
const MIG_0007: &str = include_str!("../migrations/0007_create_resources.sql");
const MIG_0008: &str = include_str!("../migrations/0008_create_reports.sql");

pub async fn run_all(db: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    let migrations = [
        MIG_0001, MIG_0002, MIG_0003, MIG_0004, MIG_0005, MIG_0006, MIG_0007, MIG_0008,
    ];
    for (i, sql) in migrations.into_iter().enumerate() {
        let label = i + 1;
        match sqlx::query(sql).execute(db).await {
            Ok(_) => tracing::info!(migration = %label, "hub-service migration applied"),
            Err(e) => {
                // Statements are IF NOT EXISTS; a failure here usually means
                // the schema is already in place on a pre-migration database.
                tracing::warn!(migration = %label, error = %e, "migration may have been applied already");
            }
        }
    }
    Ok(())
}
