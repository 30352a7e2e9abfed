use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::application::ports::RepositoryError;
use crate::presentation::config::DatabaseSettings;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Connects to PostgreSQL. Failed connects are retried `connect_retries`
/// times, doubling the delay from `retry_delay_ms` up to five seconds.
#[instrument(skip(url, settings), fields(max_connections = settings.max_connections))]
pub async fn create_pool(url: &str, settings: &DatabaseSettings) -> Result<PgPool, RepositoryError> {
    let options = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_seconds));
    let mut delay = Duration::from_millis(settings.retry_delay_ms);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match options.clone().connect(url).await {
            Ok(pool) => {
                info!(attempt, "PostgreSQL connection pool established");
                return Ok(pool);
            }
            Err(e) if attempt <= settings.connect_retries => {
                warn!(
                    error = %e,
                    attempt,
                    retries_left = settings.connect_retries + 1 - attempt,
                    delay_ms = delay.as_millis(),
                    "PostgreSQL connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY);
            }
            Err(e) => {
                return Err(RepositoryError::ConnectionFailed(format!(
                    "gave up after {} attempts: {}",
                    attempt, e
                )));
            }
        }
    }
}
