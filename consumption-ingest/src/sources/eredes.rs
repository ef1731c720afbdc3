use eredes_client::{
    api::EredesApi,
    domain::{DateRange, Reading},
};

use crate::{config::AppConfig, pipeline::PipelineError};

/// Logs in and pulls one window of hourly readings.
pub struct EredesConsumptionFetcher {
    api: EredesApi,
    username: String,
    password: String,
}

impl EredesConsumptionFetcher {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, PipelineError> {
        let api = EredesApi::new(
            cfg.url.url_login.clone(),
            cfg.url.url_consumption.clone(),
            cfg.url.apikey.clone(),
            cfg.http.timeout(),
        )
        .map_err(|e| PipelineError::Source(format!("failed to build e-redes client: {e}")))?;

        Ok(Self {
            api,
            username: cfg.user.username.clone(),
            password: cfg.user.password.clone(),
        })
    }

    pub async fn fetch(&self, range: &DateRange) -> Result<Vec<Reading>, PipelineError> {
        let session = self
            .api
            .login(&self.username, &self.password)
            .await
            .map_err(|e| PipelineError::Source(format!("login failed: {e}")))?;

        self.api
            .get_consumption(&session, range)
            .await
            .map_err(|e| PipelineError::Source(format!("consumption request failed: {e}")))
    }
}
