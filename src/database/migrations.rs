use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    create_guild_confession_configs_table(pool).await?;
    create_confessions_table(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

async fn create_guild_confession_configs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS guild_confession_configs (
            guild_id INTEGER PRIMARY KEY,
            enabled BOOLEAN NOT NULL DEFAULT FALSE,
            confession_channel_id INTEGER,
            admin_channel_id INTEGER,
            approval_required BOOLEAN NOT NULL DEFAULT FALSE,
            auto_approve_positive BOOLEAN NOT NULL DEFAULT FALSE,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_confessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS confessions (
            guild_id INTEGER NOT NULL,
            confession_id INTEGER NOT NULL,
            author_id INTEGER NOT NULL,
            author_name TEXT NOT NULL,
            content TEXT NOT NULL,
            sentiment TEXT NOT NULL CHECK (sentiment IN ('positive', 'negative', 'neutral', 'concerning')),
            sentiment_score REAL NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected', 'posted')),
            submitted_at DATETIME NOT NULL,
            decided_at DATETIME,
            decided_by INTEGER,
            message_id INTEGER,
            thread_id INTEGER,
            publish_claimed_at DATETIME,
            PRIMARY KEY (guild_id, confession_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
