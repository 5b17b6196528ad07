//! FM Transportes API client implementation

use crate::wire::{TrackingRequest, TrackingResponse, decode_events};
use fm_tracking_core::carrier::{CarrierFuture, CarrierTracking};
use fm_tracking_core::{CarrierError, TrackingCode, TrackingEvent};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://integration.fmtransportes.com.br/api";

/// Connection settings for the carrier API.
#[derive(Debug, Clone)]
pub struct CarrierConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Basic-auth user.
    pub user: String,
    /// Basic-auth password.
    pub password: String,
    /// CNPJ of the client account.
    pub client_document: String,
    /// Per-call timeout for tracking requests.
    pub timeout: Duration,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user: "apikey".to_string(),
            password: String::new(),
            client_document: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// FM Transportes tracking client
#[derive(Clone)]
pub struct FmTransportesClient {
    client: Client,
    config: CarrierConfig,
}

impl FmTransportesClient {
    /// Create a client with the given settings.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::RequestFailed` if the HTTP client cannot be built.
    pub fn new(config: CarrierConfig) -> Result<Self, CarrierError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CarrierError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetch tracking events for one shipment, or the whole account feed.
    ///
    /// Events that cannot be read are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns errors for timeouts, network failures, non-2xx statuses,
    /// `success: false` answers and unparsable bodies.
    pub async fn tracking(
        &self,
        tracking_code: Option<&TrackingCode>,
    ) -> Result<Vec<TrackingEvent>, CarrierError> {
        let request = TrackingRequest {
            client_document: self.config.client_document.clone(),
            tracking_code: tracking_code.map(|code| code.as_str().to_string()),
        };

        let response = self
            .client
            .post(self.endpoint("/v1/tracking"))
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .json::<TrackingResponse>()
            .await
            .map_err(|e| CarrierError::ResponseParseFailed(e.to_string()))?;

        if !body.success {
            return Err(CarrierError::Rejected(
                body.message.unwrap_or_else(|| "no message".to_string()),
            ));
        }

        let events = decode_events(body.data.unwrap_or_default());
        Ok(events)
    }

    /// Probe connectivity with a fixed quote request.
    ///
    /// Returns `true` only when the carrier answers `success: true`.
    pub async fn check_connection(&self) -> bool {
        let probe = json!({
            "clientDocument": self.config.client_document,
            "zipCodeDestination": 1_310_100,
            "totalValue": 100,
            "totalWeight": 0.5,
            "volumes": [{ "length": 30, "height": 20, "width": 15 }],
        });

        let result = self
            .client
            .post(self.endpoint("/v1/quote"))
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&probe)
            .send()
            .await;

        let ok = match result {
            Ok(response) => response
                .json::<serde_json::Value>()
                .await
                .is_ok_and(|body| body.get("success") == Some(&serde_json::Value::Bool(true))),
            Err(e) => {
                tracing::error!(error = %e, "FM Transportes unreachable");
                false
            }
        };

        tracing::info!(reachable = ok, "FM Transportes connectivity probe");
        ok
    }
}

fn map_transport_error(e: reqwest::Error) -> CarrierError {
    if e.is_timeout() {
        CarrierError::Timeout
    } else {
        CarrierError::RequestFailed(e.to_string())
    }
}

impl CarrierTracking for FmTransportesClient {
    fn fetch_events<'a>(
        &'a self,
        tracking_code: Option<&'a TrackingCode>,
    ) -> CarrierFuture<'a, Result<Vec<TrackingEvent>, CarrierError>> {
        Box::pin(self.tracking(tracking_code))
    }

    fn is_reachable(&self) -> CarrierFuture<'_, bool> {
        Box::pin(self.check_connection())
    }
}
