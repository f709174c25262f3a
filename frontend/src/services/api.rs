use gloo::net::http::Request;
use shared::{
    CreateRecordResponse, D3StatusResponse, D3Update, ErrorResponse, FeedingRecord,
    SuccessResponse,
};

/// How a request failed. The distinction matters for the optimistic-update
/// policy: a `Network` failure keeps the local change ("saved locally
/// only"), a confirmed `Http` rejection reverts it.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The fetch itself never completed: offline, refused, DNS.
    Network(String),
    /// The server answered with a non-OK status.
    Http { status: u16, message: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(message) => write!(f, "Network error: {}", message),
            FetchError::Http { status, message } => {
                write!(f, "Server error {}: {}", status, message)
            }
        }
    }
}

/// API client for the record gateway.
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Client against the same origin the app was served from.
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
        }
    }

    /// Client against a custom base URL (development against a separately
    /// running backend).
    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Fetch the full record list, sorted by the server.
    pub async fn list_records(&self) -> Result<Vec<FeedingRecord>, FetchError> {
        let response = Request::get(&self.url("/api/records"))
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(Self::http_error(response).await);
        }
        response
            .json::<Vec<FeedingRecord>>()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to parse records: {}", e)))
    }

    /// Create (or overwrite) a record. The record's own id is sent along;
    /// the server keeps a confirmed `record_*` id but rekeys a `temp_*` one,
    /// echoing the stored id in the response either way.
    pub async fn create_record(
        &self,
        record: &FeedingRecord,
    ) -> Result<CreateRecordResponse, FetchError> {
        let response = Request::post(&self.url("/api/records"))
            .json(record)
            .map_err(|e| FetchError::Network(format!("Failed to serialize request: {}", e)))?
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(Self::http_error(response).await);
        }
        response
            .json::<CreateRecordResponse>()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to parse response: {}", e)))
    }

    /// Delete a record by id. Idempotent on the server side.
    pub async fn delete_record(&self, id: &str) -> Result<SuccessResponse, FetchError> {
        let response = Request::delete(&self.url(&format!("/api/records?id={}", id)))
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(Self::http_error(response).await);
        }
        response
            .json::<SuccessResponse>()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to parse response: {}", e)))
    }

    /// Fetch the D3 checklist status for a date; `[false, false]` when the
    /// date has never been written.
    pub async fn get_d3_status(&self, date_string: &str) -> Result<[bool; 2], FetchError> {
        let url = self.url(&format!("/api/records?type=d3&date={}", date_string));
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(Self::http_error(response).await);
        }
        response
            .json::<D3StatusResponse>()
            .await
            .map(|body| body.status)
            .map_err(|e| FetchError::Network(format!("Failed to parse response: {}", e)))
    }

    /// Replace a date's D3 checklist status wholesale.
    pub async fn set_d3_status(&self, update: &D3Update) -> Result<SuccessResponse, FetchError> {
        let response = Request::post(&self.url("/api/records"))
            .json(update)
            .map_err(|e| FetchError::Network(format!("Failed to serialize request: {}", e)))?
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(Self::http_error(response).await);
        }
        response
            .json::<SuccessResponse>()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to parse response: {}", e)))
    }

    async fn http_error(response: gloo::net::http::Response) -> FetchError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("HTTP {}", status),
        };
        FetchError::Http { status, message }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
