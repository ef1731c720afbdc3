use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::domain::{DateRange, Reading, Session};

const LOGIN_REQUEST_ID: u64 = 1607631285241;
const CONSUMPTION_REQUEST_ID: u64 = 1607631242463;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct RpcRequest<P> {
    jsonrpc: &'static str,
    method: &'static str,
    id: u64,
    params: P,
}

impl<P> RpcRequest<P> {
    fn new(method: &'static str, id: u64, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            id,
            params,
        }
    }
}

#[derive(Serialize)]
struct LoginParams<'a> {
    document: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ConsumptionParams<'a> {
    cups: &'a str,
    #[serde(rename = "fechaInicio")]
    start: String,
    #[serde(rename = "fechaFin")]
    end: String,
}

/// Both endpoints wrap their payload as JSON text inside `result`.
#[derive(Deserialize)]
struct RpcResponse {
    result: String,
}

impl RpcResponse {
    fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.result)?)
    }
}

/// Client for the E-REDES customer API.
pub struct EredesApi {
    client: reqwest::Client,
    url_login: String,
    url_consumption: String,
    apikey: String,
}

impl EredesApi {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(
        url_login: impl Into<String>,
        url_consumption: impl Into<String>,
        apikey: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url_login: url_login.into(),
            url_consumption: url_consumption.into(),
            apikey: apikey.into(),
        })
    }

    pub async fn login(&self, document: &str, password: &str) -> Result<Session, ApiError> {
        tracing::info!("logging in to e-redes");
        let request = RpcRequest::new("login", LOGIN_REQUEST_ID, LoginParams { document, password });
        let response = self.call(&self.url_login, None, &request).await?;
        let session: Session = response.decode()?;
        tracing::info!(cups = %session.cups, "login succeeded");
        Ok(session)
    }

    /// Hourly readings for `range`, in the order the API returns them.
    pub async fn get_consumption(&self, session: &Session, range: &DateRange) -> Result<Vec<Reading>, ApiError> {
        tracing::info!(
            cups = %session.cups,
            start = %range.start_label(),
            end = %range.end_label(),
            "retrieving consumption"
        );
        let request = RpcRequest::new(
            "getConsumos",
            CONSUMPTION_REQUEST_ID,
            ConsumptionParams {
                cups: &session.cups,
                start: range.start_label(),
                end: range.end_label(),
            },
        );
        let response = self
            .call(&self.url_consumption, Some(&session.access_token), &request)
            .await?;
        let readings: Vec<Reading> = response.decode()?;
        tracing::info!(readings = readings.len(), "consumption retrieved");
        Ok(readings)
    }

    async fn call<P: Serialize>(
        &self,
        url: &str,
        session_key: Option<&str>,
        request: &RpcRequest<P>,
    ) -> Result<RpcResponse, ApiError> {
        let mut builder = self.client.post(url).header("apikey", &self.apikey).json(request);
        if let Some(key) = session_key {
            builder = builder.header("sessionkey", key);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(method = request.method, %status, "e-redes responded");

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
