//! Flag evaluation.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::{CoreError, EntityKind, InvariantViolation};
use crate::services::cache::{CacheKey, FlagStatusCache};
use crate::store::FeatureStore;

/// Answers "is flag F active in environment E of the project with key K".
///
/// Cache-aside: the cache is consulted first; on a miss the status is read
/// from the store with one join query and written back to the cache. Cache
/// failures never fail an evaluation.
#[derive(Clone)]
pub struct EvaluationResolver {
    store: Arc<dyn FeatureStore>,
    cache: Arc<dyn FlagStatusCache>,
    ttl: Duration,
}

impl EvaluationResolver {
    pub fn new(store: Arc<dyn FeatureStore>, cache: Arc<dyn FlagStatusCache>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_flag_status(
        &self,
        project_key: &str,
        environment: &str,
        flag: &str,
    ) -> Result<bool, CoreError> {
        let key = CacheKey::new(project_key, environment, flag);

        match self.cache.get(&key).await {
            Ok(Some(status)) => {
                metrics::counter!("flag_status_cache_hits_total").increment(1);
                debug!(environment = %environment, flag = %flag, "Flag status cache hit");
                return Ok(status);
            }
            Ok(None) => {
                metrics::counter!("flag_status_cache_misses_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("flag_status_cache_misses_total").increment(1);
                warn!(error = %e, "Flag status cache read failed, falling back to store");
            }
        }

        let rows = self
            .store
            .find_flag_details(project_key, environment, flag)
            .await?;

        let status = match rows.as_slice() {
            [] => return Err(CoreError::NotFound(EntityKind::FlagSetting)),
            [details] => details.setting.is_active,
            many => {
                error!(
                    environment = %environment,
                    flag = %flag,
                    rows = many.len(),
                    "Evaluation join returned more than one flag setting"
                );
                return Err(InvariantViolation::IncorrectResultCardinality(many.len()).into());
            }
        };

        if let Err(e) = self.cache.set(&key, status, self.ttl).await {
            metrics::counter!("flag_status_cache_write_failures_total").increment(1);
            warn!(error = %e, "Failed to write flag status to cache");
        }

        Ok(status)
    }
}
