use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::ResultCache;
use crate::collectors::linkedin::{BATCH_SIZE, build_url};
use crate::collectors::parser::parse_listings;
use crate::collectors::{Transport, user_agent};
use crate::error::{AppError, FetchError};
use crate::models::filter::FilterState;
use crate::models::job::JobRecord;

/// Pacing and retry knobs for one search.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub batch_size: u32,
    /// Consecutive failed batches after which the search gives up.
    pub max_consecutive_errors: u32,
    /// Fixed part of the pause between successful batches.
    pub pacing_base: Duration,
    /// Upper bound of the random extra pause between successful batches.
    pub pacing_jitter: Duration,
    /// Backoff after the n-th consecutive failure is `backoff_base * 2^n`.
    pub backoff_base: Duration,
    /// Extra multiplier applied to the backoff when the source answered 429.
    pub rate_limit_backoff_factor: u32,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            max_consecutive_errors: 3,
            pacing_base: Duration::from_secs(2),
            pacing_jitter: Duration::from_secs(1),
            backoff_base: Duration::from_secs(1),
            rate_limit_backoff_factor: 1,
        }
    }
}

impl FetchPolicy {
    fn pacing_delay(&self) -> Duration {
        let jitter_ms = self.pacing_jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ms)
        };
        self.pacing_base + Duration::from_millis(extra)
    }

    fn backoff_delay(&self, consecutive_errors: u32, error: &FetchError) -> Duration {
        let factor = if error.is_rate_limit() {
            self.rate_limit_backoff_factor.max(1)
        } else {
            1
        };
        let exponent = 1u32 << consecutive_errors.min(16);
        self.backoff_base
            .saturating_mul(exponent)
            .saturating_mul(factor)
    }
}

/// Where the batch loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    /// Request the batch at this offset.
    Fetching { start: u32 },
    /// Wait, then retry the same offset.
    BackingOff { start: u32, delay: Duration },
    /// An empty batch or the record limit ended the search.
    DoneSuccess,
    /// Too many consecutive failures; whatever was collected is returned.
    DonePartial,
}

impl FetchState {
    fn is_done(self) -> bool {
        matches!(self, FetchState::DoneSuccess | FetchState::DonePartial)
    }
}

/// Runs searches against the listing source, one batch at a time, and
/// memoizes completed result sets.
pub struct JobFetcher {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn ResultCache>,
    policy: FetchPolicy,
}

impl JobFetcher {
    #[allow(dead_code)]
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<dyn ResultCache>) -> Self {
        Self::with_policy(transport, cache, FetchPolicy::default())
    }

    pub fn with_policy(
        transport: Arc<dyn Transport>,
        cache: Arc<dyn ResultCache>,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            transport,
            cache,
            policy,
        }
    }

    pub fn cache(&self) -> &Arc<dyn ResultCache> {
        &self.cache
    }

    /// All records matching `filter`, in source order, truncated to its limit.
    ///
    /// Batch failures never surface here: after the consecutive-error
    /// ceiling the records gathered so far (possibly none) are returned.
    /// Only an unbuildable URL is an error.
    pub async fn fetch_all(&self, filter: &FilterState) -> Result<Vec<JobRecord>, AppError> {
        let signature = build_url(filter, 0)?;

        if let Some(records) = self.cache.get(&signature) {
            tracing::debug!("Cache hit for {signature} ({} records)", records.len());
            return Ok(records.as_ref().clone());
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("fetch_all", %run_id);
        let (records, outcome) = self.walk(filter).instrument(span).await?;

        match outcome {
            FetchState::DonePartial => tracing::warn!(
                "Run {run_id} gave up after {} consecutive failures with {} records",
                self.policy.max_consecutive_errors,
                records.len()
            ),
            _ => tracing::info!("Run {run_id} completed with {} records", records.len()),
        }

        if !records.is_empty() {
            self.cache.set(&signature, records.clone());
        }
        Ok(records)
    }

    async fn walk(&self, filter: &FilterState) -> Result<(Vec<JobRecord>, FetchState), AppError> {
        let limit = filter.record_limit();
        let mut records: Vec<JobRecord> = Vec::new();
        let mut consecutive_errors = 0u32;
        let mut state = FetchState::Fetching { start: 0 };

        while !state.is_done() {
            state = match state {
                FetchState::Fetching { start } => {
                    let url = build_url(filter, start)?;
                    match self.fetch_batch(&url).await {
                        Ok(batch) if batch.is_empty() => {
                            tracing::debug!("Empty batch at start={start}, no more results");
                            FetchState::DoneSuccess
                        }
                        Ok(batch) => {
                            tracing::debug!("Batch at start={start}: {} records", batch.len());
                            records.extend(batch);
                            consecutive_errors = 0;

                            match limit {
                                Some(limit) if records.len() >= limit => {
                                    records.truncate(limit);
                                    FetchState::DoneSuccess
                                }
                                _ => {
                                    tokio::time::sleep(self.policy.pacing_delay()).await;
                                    FetchState::Fetching {
                                        start: start.saturating_add(self.policy.batch_size),
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            consecutive_errors += 1;
                            if consecutive_errors >= self.policy.max_consecutive_errors {
                                tracing::warn!("Batch at start={start} failed: {e}; giving up");
                                FetchState::DonePartial
                            } else {
                                let delay = self.policy.backoff_delay(consecutive_errors, &e);
                                tracing::warn!(
                                    "Batch at start={start} failed: {e}; retrying in {}s",
                                    delay.as_secs_f32()
                                );
                                FetchState::BackingOff { start, delay }
                            }
                        }
                    }
                }
                FetchState::BackingOff { start, delay } => {
                    tokio::time::sleep(delay).await;
                    FetchState::Fetching { start }
                }
                done => done,
            };
        }

        Ok((records, state))
    }

    async fn fetch_batch(&self, url: &str) -> Result<Vec<JobRecord>, FetchError> {
        let resp = self.transport.get(url, user_agent::random()).await?;

        match resp.status {
            200 => Ok(parse_listings(&resp.body)),
            429 => Err(FetchError::RateLimited),
            status => Err(FetchError::Status(status)),
        }
    }
}
