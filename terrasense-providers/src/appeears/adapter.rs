//! Area task adapter.
//!
//! Drives the full extraction workflow for one request: reduce the area to
//! its centroid, submit a point task, poll it through the bounded driver,
//! then download and parse the result CSV. No partial results leave this
//! adapter: the workflow either yields a complete series or escalates.

use tokio::sync::watch;
use tracing::{info, instrument};

use chrono::NaiveDate;
use terrasense_core::{AreaOfInterest, VegetationObservation};
use terrasense_fetch::{poll_until_done, FetchError, PollPolicy};
use terrasense_store::AppearsSettings;

use super::api::AppearsClient;
use super::parser::parse_vegetation_csv;

/// Task-based vegetation-index adapter.
pub struct AreaTaskAdapter {
    client: AppearsClient,
    poll: PollPolicy,
    ndvi_layer: String,
    evi_layer: String,
}

impl AreaTaskAdapter {
    /// Creates the adapter.
    pub fn new(client: AppearsClient, poll: PollPolicy, settings: &AppearsSettings) -> Self {
        Self {
            client,
            poll,
            ndvi_layer: settings.ndvi_layer.clone(),
            evi_layer: settings.evi_layer.clone(),
        }
    }

    /// Submits an extraction task for the area's centroid.
    ///
    /// # Errors
    ///
    /// Escalates submission failures from the client.
    #[instrument(skip(self, area))]
    pub async fn submit_task(
        &self,
        area: &AreaOfInterest,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, FetchError> {
        let (latitude, longitude) = area.centroid();
        self.client
            .submit_task(latitude, longitude, start, end)
            .await
    }

    /// Polls a submitted task to completion and downloads its results.
    ///
    /// Cancellation (via the optional watch channel) stops polling; the
    /// upstream task is not retracted.
    ///
    /// # Errors
    ///
    /// Escalates `TaskFailed`, `TaskTimeout`, `Cancelled`, authentication
    /// failures, and download/parse failures.
    #[instrument(skip(self, cancel))]
    pub async fn await_and_download(
        &self,
        task_id: &str,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<Vec<VegetationObservation>, FetchError> {
        poll_until_done(&self.poll, cancel, |_attempt| self.client.task_status(task_id)).await?;

        let csv = self.client.find_results_csv(task_id).await?;
        let bytes = self.client.download_file(task_id, &csv.file_id).await?;
        let observations = parse_vegetation_csv(&bytes, &self.ndvi_layer, &self.evi_layer)?;

        info!(
            task_id,
            observations = observations.len(),
            "Extraction results downloaded"
        );
        Ok(observations)
    }

    /// Submits, awaits, and downloads in one call.
    ///
    /// # Errors
    ///
    /// See [`Self::submit_task`] and [`Self::await_and_download`].
    pub async fn fetch(
        &self,
        area: &AreaOfInterest,
        start: NaiveDate,
        end: NaiveDate,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<Vec<VegetationObservation>, FetchError> {
        let task_id = self.submit_task(area, start, end).await?;
        self.await_and_download(&task_id, cancel).await
    }
}
