//! Extraction API client.
//!
//! Wraps the task endpoints: submit, status, bundle listing, and file
//! download. Every call carries the session token; a call rejected for
//! authentication invalidates the token, re-authenticates once, and retries
//! before escalating.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use chrono::NaiveDate;
use terrasense_core::{TaskSnapshot, TaskStatus};
use terrasense_fetch::{FetchError, HttpClient};
use terrasense_store::AppearsSettings;

use super::auth::SessionAuth;

// ============================================================================
// Request Types
// ============================================================================

/// Task submission payload.
#[derive(Debug, Serialize)]
struct TaskRequest {
    task_type: String,
    task_name: String,
    params: TaskParams,
}

#[derive(Debug, Serialize)]
struct TaskParams {
    dates: Vec<TaskDates>,
    layers: Vec<TaskLayer>,
    coordinates: Vec<TaskCoordinate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskDates {
    start_date: String,
    end_date: String,
}

#[derive(Debug, Serialize)]
struct TaskLayer {
    product: String,
    layer: String,
}

#[derive(Debug, Serialize)]
struct TaskCoordinate {
    latitude: f64,
    longitude: f64,
}

// ============================================================================
// Response Types
// ============================================================================

/// Task submission response.
#[derive(Debug, Deserialize)]
struct TaskSubmitResponse {
    task_id: String,
}

/// Task status response.
#[derive(Debug, Deserialize)]
struct TaskStatusResponse {
    task_id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
}

impl TaskStatusResponse {
    /// Maps the provider's status string onto the task state machine.
    ///
    /// Unknown strings map to `Submitted`: the provider reports several
    /// pre-processing states ("pending", "queued") that all mean "not
    /// started yet" for our purposes.
    fn to_snapshot(&self) -> TaskSnapshot {
        let status = match self.status.as_deref() {
            Some("done") => TaskStatus::Done,
            Some("error") => TaskStatus::Error,
            Some("processing") => TaskStatus::Processing,
            _ => TaskStatus::Submitted,
        };
        let mut snapshot = TaskSnapshot::new(&self.task_id, status);
        if let Some(progress) = self.progress {
            snapshot = snapshot.with_progress(progress);
        }
        snapshot
    }
}

/// Bundle listing response.
#[derive(Debug, Deserialize)]
struct BundleResponse {
    #[serde(default)]
    files: Vec<BundleFile>,
}

/// One file in a result bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleFile {
    /// File identifier for the download endpoint.
    pub file_id: String,
    /// File name.
    pub file_name: String,
}

// ============================================================================
// API Client
// ============================================================================

/// Extraction API client.
#[derive(Debug)]
pub struct AppearsClient {
    http: HttpClient,
    settings: AppearsSettings,
    auth: SessionAuth,
}

impl AppearsClient {
    /// Creates a client from settings.
    ///
    /// Missing credentials are tolerated here; the first call that needs a
    /// session escalates `AuthenticationFailed` instead, so the moisture
    /// path can run on a host with no extraction credentials at all.
    pub fn new(http: HttpClient, settings: AppearsSettings) -> Self {
        let auth = SessionAuth::new(
            http.clone(),
            &settings.endpoint,
            settings.username.clone(),
            settings.password.clone(),
        );
        Self {
            http,
            settings,
            auth,
        }
    }

    /// Submits a point extraction task for the configured NDVI/EVI layers.
    ///
    /// # Errors
    ///
    /// Escalates authentication failures (after one re-login) and the
    /// resilient client's classification.
    #[instrument(skip(self))]
    pub async fn submit_task(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, FetchError> {
        let body = TaskRequest {
            task_type: "point".to_string(),
            task_name: format!(
                "terrasense_{:.4}_{:.4}_{}_{}",
                latitude,
                longitude,
                start.format("%Y%m%d"),
                end.format("%Y%m%d")
            ),
            params: TaskParams {
                dates: vec![TaskDates {
                    start_date: start.format("%m-%d-%Y").to_string(),
                    end_date: end.format("%m-%d-%Y").to_string(),
                }],
                layers: vec![
                    TaskLayer {
                        product: self.settings.product.clone(),
                        layer: self.settings.ndvi_layer.clone(),
                    },
                    TaskLayer {
                        product: self.settings.product.clone(),
                        layer: self.settings.evi_layer.clone(),
                    },
                ],
                coordinates: vec![TaskCoordinate {
                    latitude,
                    longitude,
                }],
            },
        };

        let url = format!("{}/task", self.settings.endpoint);
        let response: TaskSubmitResponse = self
            .with_auth_retry(|token| {
                let http = self.http.clone();
                let url = url.clone();
                let body = &body;
                async move { http.post_json(&url, body, Some(&token)).await }
            })
            .await?;

        info!(task_id = %response.task_id, "Extraction task submitted");
        Ok(response.task_id)
    }

    /// Fetches the current status of a task.
    ///
    /// # Errors
    ///
    /// Escalates authentication failures (after one re-login) and the
    /// resilient client's classification.
    #[instrument(skip(self))]
    pub async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot, FetchError> {
        let url = format!("{}/task/{task_id}", self.settings.endpoint);
        let response: TaskStatusResponse = self
            .with_auth_retry(|token| {
                let http = self.http.clone();
                let url = url.clone();
                async move { http.get_json(&url, &[], Some(&token)).await }
            })
            .await?;

        Ok(response.to_snapshot())
    }

    /// Lists the result bundle and returns the file id of the CSV results.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` when the bundle holds no CSV.
    #[instrument(skip(self))]
    pub async fn find_results_csv(&self, task_id: &str) -> Result<BundleFile, FetchError> {
        let url = format!("{}/bundle/{task_id}", self.settings.endpoint);
        let response: BundleResponse = self
            .with_auth_retry(|token| {
                let http = self.http.clone();
                let url = url.clone();
                async move { http.get_json(&url, &[], Some(&token)).await }
            })
            .await?;

        debug!(files = response.files.len(), "Bundle listed");

        response
            .files
            .into_iter()
            .find(|f| f.file_name.ends_with(".csv"))
            .ok_or_else(|| {
                warn!(task_id, "Bundle contained no CSV results file");
                FetchError::InvalidResponse("result bundle contained no CSV file".to_string())
            })
    }

    /// Downloads one bundle file.
    ///
    /// # Errors
    ///
    /// Escalates authentication failures (after one re-login) and the
    /// resilient client's classification.
    #[instrument(skip(self))]
    pub async fn download_file(&self, task_id: &str, file_id: &str) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}/bundle/{task_id}/{file_id}", self.settings.endpoint);
        self.with_auth_retry(|token| {
            let http = self.http.clone();
            let url = url.clone();
            async move { http.get_bytes(&url, Some(&token)).await }
        })
        .await
    }

    /// Runs an authenticated call, re-authenticating once on rejection.
    async fn with_auth_retry<T, F, Fut>(&self, call: F) -> Result<T, FetchError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let token = self.auth.token().await?;
        match call(token).await {
            Err(FetchError::AuthenticationFailed(reason)) => {
                warn!(reason = %reason, "Session rejected; re-authenticating once");
                let token = self.auth.refresh().await?;
                call(token).await
            }
            other => other,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let parse = |s: &str| -> TaskSnapshot {
            let response: TaskStatusResponse = serde_json::from_str(&format!(
                r#"{{"task_id": "t-1", "status": "{s}"}}"#
            ))
            .unwrap();
            response.to_snapshot()
        };

        assert_eq!(parse("done").status, TaskStatus::Done);
        assert_eq!(parse("error").status, TaskStatus::Error);
        assert_eq!(parse("processing").status, TaskStatus::Processing);
        assert_eq!(parse("pending").status, TaskStatus::Submitted);
        assert_eq!(parse("queued").status, TaskStatus::Submitted);
    }

    #[test]
    fn test_status_progress() {
        let response: TaskStatusResponse = serde_json::from_str(
            r#"{"task_id": "t-1", "status": "processing", "progress": 62.5}"#,
        )
        .unwrap();
        assert_eq!(response.to_snapshot().progress_percent, Some(62.5));
    }

    #[test]
    fn test_task_request_shape() {
        let body = TaskRequest {
            task_type: "point".to_string(),
            task_name: "terrasense_test".to_string(),
            params: TaskParams {
                dates: vec![TaskDates {
                    start_date: "07-01-2025".to_string(),
                    end_date: "09-30-2025".to_string(),
                }],
                layers: vec![TaskLayer {
                    product: "MOD13Q1.061".to_string(),
                    layer: "_250m_16_days_NDVI".to_string(),
                }],
                coordinates: vec![TaskCoordinate {
                    latitude: 23.81,
                    longitude: 90.41,
                }],
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["task_type"], "point");
        assert_eq!(json["params"]["dates"][0]["startDate"], "07-01-2025");
        assert_eq!(json["params"]["layers"][0]["product"], "MOD13Q1.061");
        assert_eq!(json["params"]["coordinates"][0]["latitude"], 23.81);
    }

    #[test]
    fn test_bundle_csv_selection_shape() {
        let response: BundleResponse = serde_json::from_str(
            r#"{"files": [
                {"file_id": "f-1", "file_name": "granule-list.txt"},
                {"file_id": "f-2", "file_name": "terrasense-results.csv"}
            ]}"#,
        )
        .unwrap();

        let csv = response
            .files
            .into_iter()
            .find(|f| f.file_name.ends_with(".csv"))
            .unwrap();
        assert_eq!(csv.file_id, "f-2");
    }

    #[test]
    fn test_client_tolerates_missing_credentials() {
        // Construction must not fail; the first session-requiring call does.
        let settings = AppearsSettings::default();
        let _client = AppearsClient::new(HttpClient::new().unwrap(), settings);
    }
}
