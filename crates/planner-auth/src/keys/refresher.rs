//! Background task that keeps the key cache fresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use planner_core::result::AppResult;

use super::cache::{KeyCache, VerificationKey};
use super::source::KeySource;

/// Periodically refetches the verification key.
///
/// A failed fetch or parse leaves the previous key in place.
#[derive(Debug, Clone)]
pub struct KeyRefresher {
    cache: Arc<KeyCache>,
    source: Arc<dyn KeySource>,
    interval: Duration,
}

impl KeyRefresher {
    /// Create a refresher for `cache`.
    pub fn new(cache: Arc<KeyCache>, source: Arc<dyn KeySource>, interval: Duration) -> Self {
        Self {
            cache,
            source,
            interval,
        }
    }

    /// Fetch and parse the initial key. Failure here is fatal for startup
    /// since no token could be verified without it.
    pub async fn bootstrap(source: &dyn KeySource) -> AppResult<KeyCache> {
        let pem = source.fetch_pem().await?;
        let key = VerificationKey::from_pem(&pem)?;
        info!(source = %source.describe(), "Verification key loaded");
        Ok(KeyCache::new(key))
    }

    /// Fetch once and swap the key in. Returns whether the key changed.
    pub async fn refresh_once(&self) -> AppResult<bool> {
        let pem = self.source.fetch_pem().await?;
        let key = VerificationKey::from_pem(&pem)?;
        Ok(self.cache.replace(key))
    }

    /// Run until `cancel` flips to `true`.
    pub async fn run(&self, cancel: watch::Receiver<bool>) {
        info!(
            source = %self.source.describe(),
            interval_seconds = self.interval.as_secs(),
            "Key refresher started"
        );

        // The bootstrap fetch already happened; first refresh is one period out.
        let mut interval = time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cancel = cancel;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.refresh_once().await {
                        Ok(true) => info!("Verification key rotated"),
                        Ok(false) => {}
                        Err(e) => warn!(error = %e, "Key refresh failed, keeping previous key"),
                    }
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Key refresher stopping");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::source::StaticKeySource;
    use crate::test_keys::{ROGUE_VERIFY_PEM, VERIFY_PKIX_PEM};

    #[tokio::test]
    async fn test_failed_parse_keeps_previous_key() {
        let source = Arc::new(StaticKeySource::new(VERIFY_PKIX_PEM));
        let cache = Arc::new(KeyRefresher::bootstrap(source.as_ref()).await.unwrap());
        let refresher = KeyRefresher::new(cache.clone(), source.clone(), Duration::from_secs(60));

        source.set("garbage");
        assert!(refresher.refresh_once().await.is_err());
        let expected = VerificationKey::from_pem(VERIFY_PKIX_PEM).unwrap();
        assert!(cache.current().same_material(&expected));
    }

    #[tokio::test]
    async fn test_refresh_swaps_rotated_key() {
        let source = Arc::new(StaticKeySource::new(VERIFY_PKIX_PEM));
        let cache = Arc::new(KeyRefresher::bootstrap(source.as_ref()).await.unwrap());
        let refresher = KeyRefresher::new(cache.clone(), source.clone(), Duration::from_secs(60));

        assert!(!refresher.refresh_once().await.unwrap());
        source.set(ROGUE_VERIFY_PEM);
        assert!(refresher.refresh_once().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_refreshes_on_interval_and_stops_on_cancel() {
        let source = Arc::new(StaticKeySource::new(VERIFY_PKIX_PEM));
        let cache = Arc::new(KeyRefresher::bootstrap(source.as_ref()).await.unwrap());
        let refresher = KeyRefresher::new(cache.clone(), source.clone(), Duration::from_secs(3600));
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(async move { refresher.run(rx).await });

        source.set(ROGUE_VERIFY_PEM);
        time::sleep(Duration::from_secs(3601)).await;
        let rotated = VerificationKey::from_pem(ROGUE_VERIFY_PEM).unwrap();
        assert!(cache.current().same_material(&rotated));

        tx.send(true).unwrap();
        task.await.unwrap();
    }
}
