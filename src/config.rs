use crate::sentiment::SentimentThresholds;
use anyhow::Result;
use std::env;

pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 10;
const MAX_HISTORY_PAGE_SIZE: usize = 25;
const DEFAULT_KEEP_ALIVE_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub admin_role_id: Option<u64>,
    pub prefix: String,
    pub history_page_size: usize,
    pub sentiment_thresholds: SentimentThresholds,
    /// `None` when the keep-alive server is disabled (`KEEP_ALIVE_PORT=0`).
    pub keep_alive_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .ok_or_else(|| anyhow::anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:confessions.db".to_string());

        let admin_role_id = match lookup("ADMIN_ROLE_ID") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("ADMIN_ROLE_ID must be a role id, got {raw:?}"))?,
            ),
            None => None,
        };

        let prefix = lookup("BOT_PREFIX").unwrap_or_else(|| "!".to_string());

        let history_page_size = match lookup("CONFESSION_HISTORY_PAGE_SIZE") {
            Some(raw) => {
                let size = raw.trim().parse::<usize>().map_err(|_| {
                    anyhow::anyhow!("CONFESSION_HISTORY_PAGE_SIZE must be a number, got {raw:?}")
                })?;
                size.clamp(1, MAX_HISTORY_PAGE_SIZE)
            }
            None => DEFAULT_HISTORY_PAGE_SIZE,
        };

        let defaults = SentimentThresholds::default();
        let auto_approve = parse_threshold(
            lookup("CONFESSION_AUTO_APPROVE_THRESHOLD"),
            "CONFESSION_AUTO_APPROVE_THRESHOLD",
            defaults.auto_approve,
        )?;
        let concerning = parse_threshold(
            lookup("CONFESSION_CONCERNING_THRESHOLD"),
            "CONFESSION_CONCERNING_THRESHOLD",
            defaults.concerning,
        )?;
        let sentiment_thresholds = SentimentThresholds::new(auto_approve, concerning);

        let keep_alive_port = match lookup("KEEP_ALIVE_PORT") {
            Some(raw) => {
                let port = raw.trim().parse::<u16>().map_err(|_| {
                    anyhow::anyhow!("KEEP_ALIVE_PORT must be a port number, got {raw:?}")
                })?;
                (port != 0).then_some(port)
            }
            None => Some(DEFAULT_KEEP_ALIVE_PORT),
        };

        Ok(Config {
            discord_token,
            database_url,
            admin_role_id,
            prefix,
            history_page_size,
            sentiment_thresholds,
            keep_alive_port,
        })
    }
}

fn parse_threshold(raw: Option<String>, name: &str, default: f64) -> Result<f64> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| anyhow::anyhow!("{name} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
