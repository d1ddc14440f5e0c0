//! Periodic archival sweep.
//!
//! Relocates segments that have sat below the vote limit past the age
//! limit into cold storage. The sweep runs on its own timer task,
//! independent of request handling, and must not assume exclusivity over
//! the live table: the copy and delete run as one statement, so a
//! concurrent vote cannot land between them and be lost.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use openskip_core::archival::{
    ArchivePolicy, DEFAULT_ARCHIVE_DAY_LIMIT, DEFAULT_ARCHIVE_VOTE_LIMIT,
};
use openskip_db::repositories::ArchivedSegmentRepo;
use openskip_db::DbPool;

/// How often the sweep runs by default: every 6 hours.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 3600);

/// Sweep schedule plus the archival predicate tunables.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    pub interval: Duration,
    pub policy: ArchivePolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            interval: DEFAULT_SWEEP_INTERVAL,
            policy: ArchivePolicy::default(),
        }
    }
}

impl SweepConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `ARCHIVE_SWEEP_INTERVAL_SECS` | `21600` |
    /// | `ARCHIVE_DAY_LIMIT`           | `20`    |
    /// | `ARCHIVE_VOTE_LIMIT`          | `0`     |
    pub fn from_env() -> Self {
        let interval_secs: u64 = std::env::var("ARCHIVE_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL.as_secs());
        let day_limit: i64 = std::env::var("ARCHIVE_DAY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ARCHIVE_DAY_LIMIT);
        let vote_limit: i32 = std::env::var("ARCHIVE_VOTE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ARCHIVE_VOTE_LIMIT);

        SweepConfig {
            interval: Duration::from_secs(interval_secs),
            policy: ArchivePolicy {
                day_limit,
                vote_limit,
            },
        }
    }
}

/// Run the archival sweep loop until `cancel` is triggered.
pub async fn run(pool: DbPool, config: SweepConfig, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        day_limit = config.policy.day_limit,
        vote_limit = config.policy.vote_limit,
        "Archival sweep started"
    );

    let mut interval = tokio::time::interval(config.interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Archival sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, &config.policy).await {
                    Ok(moved) => {
                        if moved > 0 {
                            tracing::info!(moved, "Archival sweep: segments relocated");
                        } else {
                            tracing::debug!("Archival sweep: nothing to relocate");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Archival sweep failed");
                    }
                }
            }
        }
    }
}

/// One sweep pass: relocate every row matching the predicate. Returns how
/// many rows moved.
pub async fn sweep_once(pool: &DbPool, policy: &ArchivePolicy) -> Result<u64, sqlx::Error> {
    let cutoff = policy.cutoff(Utc::now());
    ArchivedSegmentRepo::archive_expired(pool, cutoff, policy.vote_limit).await
}
