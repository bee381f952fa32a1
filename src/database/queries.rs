use crate::database::models::{
    Confession, ConfessionStatus, GuildConfessionConfig, NewConfession,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

const CONFESSION_COLUMNS: &str = "guild_id, confession_id, author_id, author_name, content, \
     sentiment, sentiment_score, status, submitted_at, decided_at, decided_by, message_id, thread_id";

fn confession_from_row(row: &SqliteRow) -> Result<Confession> {
    Ok(Confession {
        guild_id: row.try_get("guild_id")?,
        confession_id: row.try_get("confession_id")?,
        author_id: row.try_get("author_id")?,
        author_name: row.try_get("author_name")?,
        content: row.try_get("content")?,
        sentiment: row.try_get::<String, _>("sentiment")?.parse()?,
        sentiment_score: row.try_get("sentiment_score")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        submitted_at: row.try_get("submitted_at")?,
        decided_at: row.try_get("decided_at")?,
        decided_by: row.try_get("decided_by")?,
        message_id: row.try_get("message_id")?,
        thread_id: row.try_get("thread_id")?,
    })
}

fn config_from_row(row: &SqliteRow) -> Result<GuildConfessionConfig> {
    Ok(GuildConfessionConfig {
        guild_id: row.try_get("guild_id")?,
        enabled: row.try_get("enabled")?,
        confession_channel_id: row.try_get("confession_channel_id")?,
        admin_channel_id: row.try_get("admin_channel_id")?,
        approval_required: row.try_get("approval_required")?,
        auto_approve_positive: row.try_get("auto_approve_positive")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// Guild config queries
pub async fn get_guild_config(
    pool: &SqlitePool,
    guild_id: i64,
) -> Result<Option<GuildConfessionConfig>> {
    let row_opt = sqlx::query(
        "SELECT guild_id, enabled, confession_channel_id, admin_channel_id, approval_required,
                auto_approve_positive, created_at, updated_at
         FROM guild_confession_configs WHERE guild_id = ?",
    )
    .bind(guild_id)
    .fetch_optional(pool)
    .await?;

    row_opt.as_ref().map(config_from_row).transpose()
}

pub async fn upsert_guild_config(
    pool: &SqlitePool,
    config: &GuildConfessionConfig,
) -> Result<GuildConfessionConfig> {
    sqlx::query(
        "INSERT INTO guild_confession_configs
            (guild_id, enabled, confession_channel_id, admin_channel_id, approval_required,
             auto_approve_positive, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (guild_id) DO UPDATE SET
            enabled = excluded.enabled,
            confession_channel_id = excluded.confession_channel_id,
            admin_channel_id = excluded.admin_channel_id,
            approval_required = excluded.approval_required,
            auto_approve_positive = excluded.auto_approve_positive,
            updated_at = excluded.updated_at",
    )
    .bind(config.guild_id)
    .bind(config.enabled)
    .bind(config.confession_channel_id)
    .bind(config.admin_channel_id)
    .bind(config.approval_required)
    .bind(config.auto_approve_positive)
    .bind(config.created_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_guild_config(pool, config.guild_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Guild config {} vanished after upsert", config.guild_id))
}

// Confession queries
pub async fn create_confession(pool: &SqlitePool, new: NewConfession) -> Result<Confession> {
    let decided_at = (new.status != ConfessionStatus::Pending).then_some(new.submitted_at);

    // The per-guild id is allocated inside the insert so concurrent submissions can't collide.
    let result = sqlx::query(
        "INSERT INTO confessions
            (guild_id, confession_id, author_id, author_name, content, sentiment,
             sentiment_score, status, submitted_at, decided_at)
         SELECT ?, COALESCE(MAX(confession_id), 0) + 1, ?, ?, ?, ?, ?, ?, ?, ?
         FROM confessions WHERE guild_id = ?",
    )
    .bind(new.guild_id)
    .bind(new.author_id)
    .bind(&new.author_name)
    .bind(&new.content)
    .bind(new.sentiment.as_str())
    .bind(new.sentiment_score)
    .bind(new.status.as_str())
    .bind(new.submitted_at)
    .bind(decided_at)
    .bind(new.guild_id)
    .execute(pool)
    .await?;

    let row = sqlx::query(&format!(
        "SELECT {CONFESSION_COLUMNS} FROM confessions WHERE rowid = ?"
    ))
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;

    confession_from_row(&row)
}

pub async fn get_confession(
    pool: &SqlitePool,
    guild_id: i64,
    confession_id: i64,
) -> Result<Option<Confession>> {
    let row_opt = sqlx::query(&format!(
        "SELECT {CONFESSION_COLUMNS} FROM confessions WHERE guild_id = ? AND confession_id = ?"
    ))
    .bind(guild_id)
    .bind(confession_id)
    .fetch_optional(pool)
    .await?;

    row_opt.as_ref().map(confession_from_row).transpose()
}

pub async fn count_confessions(pool: &SqlitePool, guild_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM confessions WHERE guild_id = ?")
        .bind(guild_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// One page of a guild's confessions. `offset` counts from the oldest confession,
/// so the final page holds the newest ones; rows within a page come newest first.
/// Ids are allocated in submission order, so they double as the sort key.
pub async fn list_confessions(
    pool: &SqlitePool,
    guild_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Confession>> {
    let rows = sqlx::query(&format!(
        "SELECT {CONFESSION_COLUMNS} FROM (
            SELECT * FROM confessions
            WHERE guild_id = ?
            ORDER BY confession_id ASC
            LIMIT ? OFFSET ?
         )
         ORDER BY confession_id DESC"
    ))
    .bind(guild_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(confession_from_row).collect()
}

/// Compare-and-set on `status`. Returns `false` when the row was not in `from`
/// any more (another admin got there first), in which case nothing changed.
pub async fn transition_status(
    pool: &SqlitePool,
    guild_id: i64,
    confession_id: i64,
    from: ConfessionStatus,
    to: ConfessionStatus,
    decided_by: Option<i64>,
) -> Result<bool> {
    if !from.can_transition_to(to) {
        return Err(anyhow::anyhow!(
            "Confession status cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        ));
    }

    let result = sqlx::query(
        "UPDATE confessions
         SET status = ?, decided_at = COALESCE(decided_at, ?), decided_by = COALESCE(?, decided_by)
         WHERE guild_id = ? AND confession_id = ? AND status = ?",
    )
    .bind(to.as_str())
    .bind(Utc::now())
    .bind(decided_by)
    .bind(guild_id)
    .bind(confession_id)
    .bind(from.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Reserves an `approved` confession for one publisher. Returns `false` when it
/// is no longer approved or someone else holds a claim newer than `stale_before`.
pub async fn claim_publish(
    pool: &SqlitePool,
    guild_id: i64,
    confession_id: i64,
    stale_before: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE confessions
         SET publish_claimed_at = ?
         WHERE guild_id = ? AND confession_id = ? AND status = 'approved'
           AND (publish_claimed_at IS NULL OR publish_claimed_at < ?)",
    )
    .bind(Utc::now())
    .bind(guild_id)
    .bind(confession_id)
    .bind(stale_before)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Drops the claim after a failed post so the confession can be retried.
pub async fn release_publish_claim(
    pool: &SqlitePool,
    guild_id: i64,
    confession_id: i64,
) -> Result<()> {
    sqlx::query(
        "UPDATE confessions
         SET publish_claimed_at = NULL
         WHERE guild_id = ? AND confession_id = ? AND status = 'approved'",
    )
    .bind(guild_id)
    .bind(confession_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// approved → posted, recording where the confession went.
pub async fn mark_posted(
    pool: &SqlitePool,
    guild_id: i64,
    confession_id: i64,
    message_id: i64,
    thread_id: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE confessions
         SET status = 'posted', message_id = ?, thread_id = ?, publish_claimed_at = NULL
         WHERE guild_id = ? AND confession_id = ? AND status = 'approved'",
    )
    .bind(message_id)
    .bind(thread_id)
    .bind(guild_id)
    .bind(confession_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
