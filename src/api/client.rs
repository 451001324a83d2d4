use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::models::{
    FrequencyResponse, FrequencySegment, IsochroneBand, IsochronesResponse, LastTrip,
    LastTripResponse, LocationsResponse, NamedLocation, TripRequest, TripResponse,
};

/// Error envelope the backend uses for non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ErrorBody {
    fn message(&self) -> Option<String> {
        match (&self.error, &self.detail) {
            (Some(error), Some(detail)) => Some(format!("{error}: {detail}")),
            (Some(error), None) => Some(error.clone()),
            (None, Some(detail)) => Some(detail.clone()),
            (None, None) => None,
        }
    }
}

/// Async client for the trip/analysis backend. Endpoint paths moved between
/// backend generations, so every call knows the old alias and falls back to
/// it on a 404.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("reading {what} response failed"))?;
        if !status.is_success() {
            let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
            bail!(
                "{what} failed with status {status}: {}",
                body.message().unwrap_or_else(|| "no detail".to_string())
            );
        }
        serde_json::from_str::<T>(&text)
            .with_context(|| format!("malformed {what} response"))
    }

    /// Try `paths` in order; a 404 moves on to the next (older) endpoint
    /// name, any other status is final.
    async fn get_json<T: DeserializeOwned>(&self, paths: &[&str]) -> Result<T> {
        let (last, preferred) = paths.split_last().expect("at least one path");
        for path in preferred {
            let response = self
                .client
                .get(self.url(path))
                .send()
                .await
                .with_context(|| format!("GET {path} failed"))?;
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                debug!("{path} not found, trying the older endpoint");
                continue;
            }
            return Self::decode(response, path).await;
        }
        let response = self
            .client
            .get(self.url(last))
            .send()
            .await
            .with_context(|| format!("GET {last} failed"))?;
        Self::decode(response, last).await
    }

    pub async fn get_locations(&self) -> Result<Vec<NamedLocation>> {
        let response: LocationsResponse = self
            .get_json(&["/api/locations", "/api/get-locations"])
            .await?;
        Ok(response.into_locations())
    }

    pub async fn get_last_trip(&self) -> Result<Option<LastTrip>> {
        let response: LastTripResponse = self.get_json(&["/api/trip/last"]).await?;
        Ok(response.last)
    }

    pub async fn submit_trip(&self, request: &TripRequest) -> Result<TripResponse> {
        let mut response = self
            .client
            .post(self.url("/api/trip"))
            .json(request)
            .send()
            .await
            .context("POST /api/trip failed")?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            response = self
                .client
                .post(self.url("/api/submit-trip"))
                .json(request)
                .send()
                .await
                .context("POST /api/submit-trip failed")?;
        }
        let trip: TripResponse = Self::decode(response, "trip submission").await?;
        if let Some(message) = trip.error_message() {
            bail!("trip submission rejected: {message}");
        }
        Ok(trip)
    }

    pub async fn get_isochrones(&self) -> Result<Vec<IsochroneBand>> {
        let response: IsochronesResponse = self
            .get_json(&["/api/analysis/isochrones", "/api/get-isochrones"])
            .await?;
        Ok(response.into_bands())
    }

    pub async fn get_frequency(&self) -> Result<Vec<FrequencySegment>> {
        let response: FrequencyResponse = self
            .get_json(&["/api/analysis/frequency", "/api/get-route-frequency"])
            .await?;
        Ok(response.into_segments())
    }

    /// The CSV export is a browser navigation, never parsed here.
    pub fn export_csv_url(&self) -> String {
        self.url("/api/trip/export")
    }
}
