//! Signal determination engine.
//!
//! Wires the cached feed readers to the station filter, classifier and
//! reconciler. The wind side is mandatory: a wind fetch or parse failure
//! fails the determination. The warning side is not: if the official signal
//! cannot be fetched, the computed classification is still returned with the
//! official status marked unavailable. Callers that need both use
//! `determine_strict`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{
    EngineConfig, OfficialWarning, ReconciliationResult, Result, SignalClassification, WindReading,
};
use hko_client::{FeedSource, HkoClient};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::classifier::classify;
use crate::reconcile::reconcile;
use crate::stations::{missing_reference_stations, select_reference, ReferenceStation};

pub const WIND_CACHE_KEY: &str = "wind";
pub const WARNING_CACHE_KEY: &str = "warning";

/// Official side of a determination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OfficialStatus {
    Reconciled(ReconciliationResult),
    Unavailable { reason: String },
}

/// One evaluation cycle's output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Determination {
    pub evaluated_at: DateTime<Utc>,
    /// Reference readings the classification was computed from.
    pub reference_readings: Vec<WindReading>,
    /// Reference stations absent from this wind snapshot.
    pub missing_stations: Vec<ReferenceStation>,
    pub classification: SignalClassification,
    pub official: OfficialStatus,
}

impl Determination {
    pub fn reconciliation(&self) -> Option<&ReconciliationResult> {
        match &self.official {
            OfficialStatus::Reconciled(result) => Some(result),
            OfficialStatus::Unavailable { .. } => None,
        }
    }
}

/// Shared engine; clone the `Arc` into every request context.
pub struct SignalEngine {
    source: Arc<dyn FeedSource>,
    wind_cache: TtlCache<Vec<WindReading>>,
    warning_cache: TtlCache<OfficialWarning>,
    ttl: Duration,
}

impl SignalEngine {
    pub fn new(source: Arc<dyn FeedSource>, ttl: Duration) -> Self {
        Self::with_clock(source, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(source: Arc<dyn FeedSource>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            wind_cache: TtlCache::with_clock(Arc::clone(&clock)),
            warning_cache: TtlCache::with_clock(clock),
            ttl,
        }
    }

    /// Build an engine over the live HKO feeds.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let client = HkoClient::new(config)?;
        Ok(Self::new(
            Arc::new(client),
            Duration::from_secs(config.cache_ttl_secs),
        ))
    }

    /// All rows of the (cached) wind feed.
    pub async fn readings(&self) -> Result<Vec<WindReading>> {
        self.wind_cache
            .get_or_fetch(WIND_CACHE_KEY, || self.source.fetch_readings(), self.ttl)
            .await
    }

    /// The (cached) official signal.
    pub async fn official_signal(&self) -> Result<OfficialWarning> {
        self.warning_cache
            .get_or_fetch(WARNING_CACHE_KEY, || self.source.fetch_official_signal(), self.ttl)
            .await
    }

    /// Classify the current wind snapshot and reconcile it when the official
    /// signal is available.
    pub async fn determine(&self) -> Result<Determination> {
        let (reference_readings, missing_stations, classification) = self.classify_current().await?;

        let official = match self.official_signal().await {
            Ok(official) => OfficialStatus::Reconciled(self.reconcile_logged(classification, official)),
            Err(e) => {
                warn!("Official signal unavailable: {}", e);
                OfficialStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        Ok(Determination {
            evaluated_at: Utc::now(),
            reference_readings,
            missing_stations,
            classification,
            official,
        })
    }

    /// Like `determine`, but a warning-feed failure fails the call.
    pub async fn determine_strict(&self) -> Result<ReconciliationResult> {
        let (_, _, classification) = self.classify_current().await?;
        let official = self.official_signal().await?;
        Ok(self.reconcile_logged(classification, official))
    }

    async fn classify_current(
        &self,
    ) -> Result<(Vec<WindReading>, Vec<ReferenceStation>, SignalClassification)> {
        let readings = self.readings().await?;
        let reference = select_reference(&readings);
        let missing = missing_reference_stations(&reference);
        if !missing.is_empty() {
            debug!("{} reference stations missing from wind snapshot", missing.len());
        }

        let classification = classify(&reference);
        info!(
            "Computed signal {} ({} of {} reference stations qualifying)",
            classification.signal,
            classification.qualifying_station_count,
            reference.len()
        );
        Ok((reference, missing, classification))
    }

    fn reconcile_logged(
        &self,
        classification: SignalClassification,
        official: OfficialWarning,
    ) -> ReconciliationResult {
        let result = reconcile(classification, official);
        if result.agrees {
            info!("Official signal {} agrees with computed signal", result.official.signal_code);
        } else {
            warn!(
                "Computed signal {} disagrees with official {}",
                result.computed.signal, result.official.signal_code
            );
        }
        result
    }
}
