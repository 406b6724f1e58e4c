//! REST client for the booking platform backend.
//!
//! Implements every repository trait over plain JSON endpoints. List
//! endpoints may answer with a bare array or with `{ "data": [...] }`.
//! List elements that do not decode are skipped with a warning.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tourops_core::{
    BookingRepository, CoreError, CoreResult, DepartureRepository, ModerationRepository,
    PackageRepository,
};
use tourops_shared::{
    Booking, ContactMessage, Departure, DeparturePatch, KycSubmission, Package, Review,
};
use tracing::{debug, warn};

use crate::app_config::BackendConfig;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Network, DNS, TLS or timeout
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend returned {status} for {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    #[error("Unexpected payload from {path}: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
}

impl From<BackendError> for CoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode { .. } => CoreError::Decode(err.to_string()),
            other => CoreError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope {
    Wrapped { data: Vec<Value> },
    Bare(Vec<Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

pub(crate) fn decode_list<T: DeserializeOwned>(path: &str, body: &str) -> Result<Vec<T>, BackendError> {
    let items = match serde_json::from_str::<ListEnvelope>(body) {
        Ok(ListEnvelope::Wrapped { data }) => data,
        Ok(ListEnvelope::Bare(items)) => items,
        Err(source) => {
            return Err(BackendError::Decode {
                path: path.to_string(),
                source,
            })
        }
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let id = item
                .get("_id")
                .or_else(|| item.get("id"))
                .cloned()
                .unwrap_or(Value::Null);
            serde_json::from_value(item)
                .map_err(|e| warn!(path, index, id = %id, error = %e, "Skipping undecodable list item"))
                .ok()
        })
        .collect();

    if decoded.len() < total {
        warn!(path, kept = decoded.len(), total, "Backend list partially decoded");
    }
    Ok(decoded)
}

pub(crate) fn decode_item<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, BackendError> {
    serde_json::from_str::<ItemEnvelope<T>>(body)
        .map(|envelope| match envelope {
            ItemEnvelope::Wrapped { data } => data,
            ItemEnvelope::Bare(item) => item,
        })
        .map_err(|source| BackendError::Decode {
            path: path.to_string(),
            source,
        })
}

#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_client(client, &config.base_url, config.api_token.clone()))
    }

    /// Reuse an existing client (shared connection pool)
    pub fn with_client(client: reqwest::Client, base_url: &str, api_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET returning the raw body, or `None` on 404
    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<String>, BackendError> {
        debug!(path, "GET backend");
        let response = self
            .authorize(self.client.get(self.url(path)).query(query))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::ensure_success(path, response).await?.text().await.map(Some).map_err(Into::into)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<T>, BackendError> {
        match self.get_text(path, query).await? {
            Some(body) => decode_list(path, &body),
            // a collection that does not exist yet is empty
            None => Ok(Vec::new()),
        }
    }

    async fn get_item<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, BackendError> {
        match self.get_text(path, &[]).await? {
            Some(body) => decode_item(path, &body).map(Some),
            None => Ok(None),
        }
    }

    async fn ensure_success(path: &str, response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            path: path.to_string(),
            body,
        })
    }
}

#[async_trait]
impl BookingRepository for RestBackend {
    async fn list_for_departure(&self, departure_id: &str) -> CoreResult<Vec<Booking>> {
        Ok(self
            .get_list("bookings", &[("groupDepartureId", departure_id)])
            .await?)
    }

    async fn list_all(&self) -> CoreResult<Vec<Booking>> {
        Ok(self.get_list("bookings", &[]).await?)
    }
}

#[async_trait]
impl PackageRepository for RestBackend {
    async fn list_packages(&self) -> CoreResult<Vec<Package>> {
        Ok(self.get_list("packages", &[]).await?)
    }

    async fn get_package(&self, id: &str) -> CoreResult<Option<Package>> {
        Ok(self.get_item(&format!("packages/{}", id)).await?)
    }
}

#[async_trait]
impl DepartureRepository for RestBackend {
    async fn get_departure(&self, id: &str) -> CoreResult<Option<Departure>> {
        Ok(self.get_item(&format!("departures/{}", id)).await?)
    }

    async fn list_departures(&self) -> CoreResult<Vec<Departure>> {
        Ok(self.get_list("departures", &[]).await?)
    }

    async fn update_departure(&self, id: &str, patch: &DeparturePatch) -> CoreResult<()> {
        let path = format!("departures/{}", id);
        debug!(path = %path, "PUT backend");
        let response = self
            .authorize(self.client.put(self.url(&path)).json(patch))
            .send()
            .await
            .map_err(BackendError::from)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::NotFound {
                entity: "departure",
                id: id.to_string(),
            });
        }
        Self::ensure_success(&path, response).await?;
        Ok(())
    }
}

#[async_trait]
impl ModerationRepository for RestBackend {
    async fn list_contacts(&self) -> CoreResult<Vec<ContactMessage>> {
        Ok(self.get_list("contacts", &[]).await?)
    }

    async fn list_kyc_submissions(&self) -> CoreResult<Vec<KycSubmission>> {
        Ok(self.get_list("kyc", &[]).await?)
    }

    async fn list_reviews(&self) -> CoreResult<Vec<Review>> {
        Ok(self.get_list("reviews", &[]).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_accepts_bare_and_wrapped() {
        let bare = r#"[{ "_id": "p1", "title": "Cox's Bazar", "code": "cb" }]"#;
        let wrapped = r#"{ "data": [{ "id": "p1" }, { "id": "p2" }], "total": 2 }"#;

        let packages: Vec<Package> = decode_list("packages", bare).unwrap();
        assert_eq!(packages[0].id, "p1");
        assert_eq!(packages[0].code.as_deref(), Some("cb"));

        let packages: Vec<Package> = decode_list("packages", wrapped).unwrap();
        assert_eq!(packages.len(), 2);
    }

    #[test]
    fn test_item_accepts_bare_and_wrapped() {
        let bare: Package = decode_item("packages/p1", r#"{ "id": "p1", "title": "Sundarbans" }"#).unwrap();
        let wrapped: Package = decode_item("packages/p1", r#"{ "data": { "id": "p1" } }"#).unwrap();
        assert_eq!(bare.title.as_deref(), Some("Sundarbans"));
        assert_eq!(wrapped.id, "p1");
    }

    #[test]
    fn test_list_skips_malformed_items() {
        let body = r#"{ "data": [
            { "_id": "b1", "packageId": "p1", "createdAt": "2025-07-01T10:00:00Z", "status": "CONFIRMED" },
            { "_id": "b2", "packageId": { "_id": "p1", "title": "Sajek" }, "createdAt": "2025-07-02T10:00:00Z", "status": "PENDING" },
            { "_id": "b3", "packageId": "p1", "status": "CONFIRMED" },
            "garbage"
        ] }"#;

        let bookings: Vec<Booking> = decode_list("bookings", body).unwrap();
        let ids: Vec<&str> = bookings.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert_eq!(bookings[1].package_id, "p1");
    }

    #[test]
    fn test_decode_failure_names_the_path() {
        let err = decode_list::<Package>("packages", r#"{ "error": "boom" }"#).unwrap_err();
        assert!(err.to_string().contains("packages"));
        assert!(matches!(CoreError::from(err), CoreError::Decode(_)));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let backend = RestBackend::with_client(reqwest::Client::new(), "http://api.local/v1/", None);
        assert_eq!(backend.url("/departures/d1"), "http://api.local/v1/departures/d1");
        assert_eq!(backend.url("bookings"), "http://api.local/v1/bookings");
    }
}
