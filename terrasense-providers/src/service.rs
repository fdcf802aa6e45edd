//! The `EarthDataService` facade.
//!
//! The four operations the rest of the application calls: soil moisture,
//! vegetation index, drought assessment, and irrigation/grazing planning
//! (plus the short-horizon moisture forecast). Raw series are cached; the
//! derived assessments are cheap and deterministic, so they are recomputed
//! per call and never cached.
//!
//! Propagation policy: the moisture path never escalates a provider failure
//! (the fallback chain ends in a tier that always produces); the vegetation
//! path does, because stocking decisions should fail loudly rather than run
//! on fabricated data.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use chrono::NaiveDate;
use terrasense_analytics::{
    detect_drought, grazing_rotation, irrigation_needs, predict_moisture,
};
use terrasense_core::{
    AreaOfInterest, DroughtAssessment, FetchRequest, GrazingPlan, IrrigationPlan,
    MoisturePrediction, TimeSeriesPoint, VegetationObservation,
};
use terrasense_fetch::{
    FallbackPipeline, FetchError, HttpClient, PipelineOutcome, PollPolicy, RetryPolicy,
};
use terrasense_store::{SeriesStore, Settings, TuningSettings};

use crate::appeears::{AppearsClient, AreaTaskAdapter};
use crate::cmr::{CmrClient, CmrStrategy};
use crate::power::{PowerClient, PowerStrategy};
use crate::seasonal::SeasonalStrategy;

/// Parameter set recorded in moisture cache keys.
const MOISTURE_PARAMETER: &str = "soil_moisture";

/// Parameter set recorded in vegetation cache keys.
const VEGETATION_PARAMETER: &str = "ndvi_evi";

// ============================================================================
// Backend Traits
// ============================================================================

/// Source of soil-moisture series. Implemented by the fallback pipeline;
/// tests substitute counting or failing mocks.
#[async_trait]
pub trait MoistureBackend: Send + Sync {
    /// Produces a series for the request.
    async fn fetch_series(&self, request: &FetchRequest) -> Result<PipelineOutcome, FetchError>;
}

#[async_trait]
impl MoistureBackend for FallbackPipeline {
    async fn fetch_series(&self, request: &FetchRequest) -> Result<PipelineOutcome, FetchError> {
        self.execute(request).await
    }
}

/// Source of vegetation-index series. Implemented by the task adapter.
#[async_trait]
pub trait VegetationBackend: Send + Sync {
    /// Produces observations for the area and window.
    async fn fetch_series(
        &self,
        area: &AreaOfInterest,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VegetationObservation>, FetchError>;
}

#[async_trait]
impl VegetationBackend for AreaTaskAdapter {
    async fn fetch_series(
        &self,
        area: &AreaOfInterest,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VegetationObservation>, FetchError> {
        self.fetch(area, start, end, None).await
    }
}

// ============================================================================
// Service
// ============================================================================

/// The outward-facing Earth-observation service.
pub struct EarthDataService<M, V> {
    moisture: M,
    vegetation: V,
    store: SeriesStore,
    tuning: TuningSettings,
}

impl EarthDataService<FallbackPipeline, AreaTaskAdapter> {
    /// Wires the production service from settings.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be built.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let retry = RetryPolicy::new(settings.tuning.max_attempts)
            .with_base_delay(Duration::from_secs(settings.tuning.base_delay_secs));
        let http = HttpClient::new()?.with_retry_policy(retry);

        let pipeline = FallbackPipeline::with_strategies(vec![
            Box::new(CmrStrategy::new(CmrClient::new(
                http.clone(),
                settings.cmr.clone(),
                settings.earthdata_token.clone(),
            ))),
            Box::new(PowerStrategy::new(
                PowerClient::new(http.clone(), settings.power.clone()),
                settings.tuning.wetness_scale,
            )),
            Box::new(SeasonalStrategy::new()),
        ]);

        let poll = PollPolicy::new(
            Duration::from_secs(settings.tuning.poll_interval_secs),
            settings.tuning.max_polls,
        );
        let vegetation = AreaTaskAdapter::new(
            AppearsClient::new(http, settings.appeears.clone()),
            poll,
            &settings.appeears,
        );

        Ok(Self::new(
            pipeline,
            vegetation,
            SeriesStore::new(&settings.cache_dir),
            settings.tuning.clone(),
        ))
    }
}

impl<M: MoistureBackend, V: VegetationBackend> EarthDataService<M, V> {
    /// Assembles a service from explicit parts.
    pub fn new(moisture: M, vegetation: V, store: SeriesStore, tuning: TuningSettings) -> Self {
        Self {
            moisture,
            vegetation,
            store,
            tuning,
        }
    }

    /// Fetches a soil-moisture series for a point and window.
    ///
    /// Cache-first; on a miss the fallback chain runs and the resulting
    /// series is cached whatever tier produced it. This operation never
    /// surfaces a provider failure - it always returns *some* series, with
    /// each point's `quality` recording how far the data degraded.
    ///
    /// # Errors
    ///
    /// Only `TerminalRequest` for an invalid request (bad coordinates or an
    /// inverted date range).
    #[instrument(skip(self))]
    pub async fn get_soil_moisture(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesPoint>, FetchError> {
        let request = FetchRequest::new(latitude, longitude, start, end, MOISTURE_PARAMETER);
        request
            .validate()
            .map_err(|e| FetchError::TerminalRequest(e.to_string()))?;
        let key = request.cache_key();

        if let Some(series) = self.cached::<TimeSeriesPoint>(&key).await {
            return Ok(series);
        }

        let outcome = self.moisture.fetch_series(&request).await?;
        debug!(
            tier = %outcome.tier,
            strategy = %outcome.strategy_id,
            points = outcome.series.len(),
            "Moisture series fetched"
        );

        self.cache_put(&key, &outcome.series).await;
        Ok(outcome.series)
    }

    /// Fetches a vegetation-index series for an area and window.
    ///
    /// Cache-first; on a miss the task workflow runs. Failures escalate and
    /// nothing is cached for the request, so the next call retries.
    ///
    /// # Errors
    ///
    /// `TerminalRequest` for an invalid request; `TaskFailed`,
    /// `TaskTimeout`, and `AuthenticationFailed` from the workflow.
    #[instrument(skip(self, area))]
    pub async fn get_vegetation_index(
        &self,
        area: &AreaOfInterest,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VegetationObservation>, FetchError> {
        let (latitude, longitude) = area.centroid();
        let request = FetchRequest::new(latitude, longitude, start, end, VEGETATION_PARAMETER);
        request
            .validate()
            .map_err(|e| FetchError::TerminalRequest(e.to_string()))?;
        let key = request.cache_key();

        if let Some(series) = self.cached::<VegetationObservation>(&key).await {
            return Ok(series);
        }

        let observations = self.vegetation.fetch_series(area, start, end).await?;
        debug!(observations = observations.len(), "Vegetation series fetched");

        self.cache_put(&key, &observations).await;
        Ok(observations)
    }

    /// Assesses drought conditions from the moisture series for the window.
    ///
    /// # Errors
    ///
    /// Only `TerminalRequest` for an invalid request.
    pub async fn get_drought_assessment(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DroughtAssessment, FetchError> {
        let series = self
            .get_soil_moisture(latitude, longitude, start, end)
            .await?;
        Ok(detect_drought(&series))
    }

    /// Computes the irrigation requirement from the latest moisture point.
    ///
    /// # Errors
    ///
    /// Only `TerminalRequest` for an invalid request.
    pub async fn get_irrigation_plan(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
        target_moisture: f64,
        area_ha: f64,
    ) -> Result<IrrigationPlan, FetchError> {
        let series = self
            .get_soil_moisture(latitude, longitude, start, end)
            .await?;
        let current = series.last().map_or(0.0, |p| p.value);
        Ok(irrigation_needs(
            current,
            target_moisture,
            area_ha,
            self.tuning.root_depth_cm,
        ))
    }

    /// Derives a grazing-rotation schedule from the latest vegetation
    /// observation for the area.
    ///
    /// # Errors
    ///
    /// Escalates the vegetation path's failures; see
    /// [`Self::get_vegetation_index`].
    pub async fn get_grazing_plan(
        &self,
        area: &AreaOfInterest,
        start: NaiveDate,
        end: NaiveDate,
        area_ha: f64,
        animal_count: u32,
        daily_intake_kg: f64,
    ) -> Result<GrazingPlan, FetchError> {
        let observations = self.get_vegetation_index(area, start, end).await?;
        let ndvi = observations.last().map_or(0.0, |o| o.ndvi);
        Ok(grazing_rotation(ndvi, area_ha, animal_count, daily_intake_kg))
    }

    /// Predicts moisture over the next seven days from the window's series,
    /// optionally nudged by a rainfall forecast (mm per day).
    ///
    /// # Errors
    ///
    /// Only `TerminalRequest` for an invalid request.
    pub async fn get_moisture_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
        rainfall_mm: Option<&[f64]>,
    ) -> Result<Vec<MoisturePrediction>, FetchError> {
        let series = self
            .get_soil_moisture(latitude, longitude, start, end)
            .await?;
        Ok(predict_moisture(&series, rainfall_mm))
    }

    /// Cache read that degrades to a miss on store failure.
    async fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        match self.store.get::<T>(key).await {
            Ok(Some(entry)) => {
                debug!(key, "Serving cached series");
                Some(entry.series)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed; fetching fresh");
                None
            }
        }
    }

    /// Cache write that degrades to a warning on store failure: a fetch
    /// that succeeded should not fail because the disk write did not.
    async fn cache_put<T: serde::Serialize + Clone>(&self, key: &str, series: &[T]) {
        if let Err(e) = self.store.put(key, series.to_vec()).await {
            warn!(key, error = %e, "Cache write failed; returning uncached series");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use terrasense_core::DataQuality;
    use terrasense_fetch::SourceTier;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn moisture_series(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                TimeSeriesPoint::new(
                    date(2025, 7, 1) + chrono::Days::new(i as u64),
                    *v,
                    DataQuality::Modeled,
                    "power.gwetroot",
                )
            })
            .collect()
    }

    struct MockMoisture {
        series: Vec<TimeSeriesPoint>,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl MoistureBackend for MockMoisture {
        async fn fetch_series(
            &self,
            _request: &FetchRequest,
        ) -> Result<PipelineOutcome, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PipelineOutcome {
                series: self.series.clone(),
                tier: SourceTier::Modeled,
                strategy_id: "power.gwetroot".to_string(),
                attempts: Vec::new(),
            })
        }
    }

    struct MockVegetation {
        observations: Vec<VegetationObservation>,
        calls: Arc<AtomicU32>,
        fail_with_timeout: bool,
    }

    #[async_trait]
    impl VegetationBackend for MockVegetation {
        async fn fetch_series(
            &self,
            _area: &AreaOfInterest,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<VegetationObservation>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_with_timeout {
                return Err(FetchError::TaskTimeout { polls: 60 });
            }
            Ok(self.observations.clone())
        }
    }

    struct Harness {
        service: EarthDataService<MockMoisture, MockVegetation>,
        moisture_calls: Arc<AtomicU32>,
        vegetation_calls: Arc<AtomicU32>,
        _dir: tempfile::TempDir,
    }

    fn harness(moisture: Vec<TimeSeriesPoint>, vegetation: Vec<VegetationObservation>, veg_fails: bool) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let moisture_calls = Arc::new(AtomicU32::new(0));
        let vegetation_calls = Arc::new(AtomicU32::new(0));

        let service = EarthDataService::new(
            MockMoisture {
                series: moisture,
                calls: moisture_calls.clone(),
            },
            MockVegetation {
                observations: vegetation,
                calls: vegetation_calls.clone(),
                fail_with_timeout: veg_fails,
            },
            SeriesStore::new(dir.path()),
            TuningSettings::default(),
        );

        Harness {
            service,
            moisture_calls,
            vegetation_calls,
            _dir: dir,
        }
    }

    fn observations(ndvi: &[f64]) -> Vec<VegetationObservation> {
        ndvi.iter()
            .enumerate()
            .map(|(i, v)| {
                VegetationObservation::new(
                    date(2025, 7, 1) + chrono::Days::new(16 * i as u64),
                    *v,
                    v * 0.6,
                    DataQuality::Measured,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_second_moisture_call_hits_cache() {
        let h = harness(moisture_series(&[0.3, 0.31, 0.29]), Vec::new(), false);

        let first = h
            .service
            .get_soil_moisture(23.81, 90.41, date(2025, 7, 1), date(2025, 7, 3))
            .await
            .unwrap();
        let second = h
            .service
            .get_soil_moisture(23.81, 90.41, date(2025, 7, 1), date(2025, 7, 3))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(h.moisture_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_new_date_range_misses_cache() {
        let h = harness(moisture_series(&[0.3]), Vec::new(), false);

        h.service
            .get_soil_moisture(23.81, 90.41, date(2025, 7, 1), date(2025, 7, 3))
            .await
            .unwrap();
        h.service
            .get_soil_moisture(23.81, 90.41, date(2025, 7, 1), date(2025, 7, 4))
            .await
            .unwrap();

        assert_eq!(h.moisture_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_request_is_terminal() {
        let h = harness(moisture_series(&[0.3]), Vec::new(), false);

        let result = h
            .service
            .get_soil_moisture(123.0, 90.41, date(2025, 7, 1), date(2025, 7, 3))
            .await;

        assert!(matches!(result, Err(FetchError::TerminalRequest(_))));
        assert_eq!(h.moisture_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_vegetation_failure_escalates_without_cache_write() {
        let h = harness(Vec::new(), Vec::new(), true);
        let area = AreaOfInterest::point(23.81, 90.41);

        let result = h
            .service
            .get_vegetation_index(&area, date(2025, 7, 1), date(2025, 9, 30))
            .await;
        assert!(matches!(result, Err(FetchError::TaskTimeout { .. })));

        // Nothing cached: a retry fetches again.
        let result = h
            .service
            .get_vegetation_index(&area, date(2025, 7, 1), date(2025, 9, 30))
            .await;
        assert!(result.is_err());
        assert_eq!(h.vegetation_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_vegetation_cached_after_success() {
        let h = harness(Vec::new(), observations(&[0.55, 0.62]), false);
        let area = AreaOfInterest::point(23.81, 90.41);

        let first = h
            .service
            .get_vegetation_index(&area, date(2025, 7, 1), date(2025, 9, 30))
            .await
            .unwrap();
        let second = h
            .service
            .get_vegetation_index(&area, date(2025, 7, 1), date(2025, 9, 30))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(h.vegetation_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_polygon_and_centroid_share_cache_entry() {
        let h = harness(Vec::new(), observations(&[0.5]), false);
        let polygon = AreaOfInterest::Polygon {
            vertices: vec![(23.7, 90.3), (23.7, 90.5), (23.9, 90.5), (23.9, 90.3)],
        };
        let centroid = AreaOfInterest::point(23.8, 90.4);

        h.service
            .get_vegetation_index(&polygon, date(2025, 7, 1), date(2025, 9, 30))
            .await
            .unwrap();
        h.service
            .get_vegetation_index(&centroid, date(2025, 7, 1), date(2025, 9, 30))
            .await
            .unwrap();

        assert_eq!(h.vegetation_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drought_assessment_exceptional() {
        let h = harness(moisture_series(&[0.05, 0.05, 0.05]), Vec::new(), false);

        let assessment = h
            .service
            .get_drought_assessment(23.81, 90.41, date(2025, 7, 1), date(2025, 7, 3))
            .await
            .unwrap();

        assert_eq!(assessment.severity, 5);
        assert_eq!(assessment.level.display_name(), "exceptional");
    }

    #[tokio::test]
    async fn test_irrigation_plan_uses_latest_point() {
        let h = harness(moisture_series(&[0.30, 0.20, 0.15]), Vec::new(), false);

        let plan = h
            .service
            .get_irrigation_plan(23.81, 90.41, date(2025, 7, 1), date(2025, 7, 3), 0.30, 2.0)
            .await
            .unwrap();

        assert!(plan.needs_irrigation);
        // deficit 0.15 * 30 cm * 10 * 10,000 * 2 ha
        assert!((plan.water_liters - 900_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_grazing_plan_from_latest_observation() {
        let h = harness(Vec::new(), observations(&[0.4, 0.6]), false);
        let area = AreaOfInterest::point(23.81, 90.41);

        let plan = h
            .service
            .get_grazing_plan(&area, date(2025, 7, 1), date(2025, 9, 30), 10.0, 20, 12.0)
            .await
            .unwrap();

        assert!((plan.biomass_kg_per_ha - 9_000.0).abs() < 1e-9);
        assert!((plan.days_until_rotation - 187.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_forecast_has_seven_days() {
        let h = harness(moisture_series(&[0.3, 0.3, 0.3, 0.3, 0.3]), Vec::new(), false);

        let forecast = h
            .service
            .get_moisture_forecast(23.81, 90.41, date(2025, 7, 1), date(2025, 7, 5), None)
            .await
            .unwrap();

        assert_eq!(forecast.len(), 7);
        assert!(forecast[0].confidence > forecast[6].confidence);
    }
}
