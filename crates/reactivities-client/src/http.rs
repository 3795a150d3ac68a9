//! HTTP implementation of [`RemoteServiceClient`] on top of `reqwest`.

use async_trait::async_trait;
use reqwest::{Response, Url};
use tracing::debug;

use reactivities_shared::{ActivityWire, RemoteError};
use reactivities_store::RemoteServiceClient;

use crate::config::ClientConfig;

/// Talks JSON to the activities API rooted at [`ClientConfig::api_url`].
#[derive(Debug, Clone)]
pub struct HttpActivitiesClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpActivitiesClient {
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(|e| RemoteError::Transport(format!("Invalid API URL {}: {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Transport(format!(
                "Invalid API URL {}: not a base URL",
                config.api_url
            )));
        }

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/activities/{segments..}`, each segment percent-encoded so an id
    /// can never reach a different endpoint.
    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Transport(format!("Invalid API URL {}", self.base_url)))?
            .pop_if_empty()
            .push("activities")
            .extend(segments);
        Ok(url)
    }
}

/// Map a `reqwest` failure onto the store's error taxonomy.
fn request_error(e: reqwest::Error) -> RemoteError {
    if e.is_decode() {
        RemoteError::Decode(e.to_string())
    } else {
        RemoteError::Transport(e.to_string())
    }
}

/// Turn non-success statuses into [`RemoteError::Rejected`], keeping the
/// body as the message when there is one.
async fn check(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = match body.trim() {
        "" => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
        text => text.to_string(),
    };

    Err(RemoteError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn acknowledge(resp: Response) -> Result<(), RemoteError> {
    let resp = check(resp).await?;
    debug!(status = %resp.status(), url = %resp.url(), "Request acknowledged");
    Ok(())
}

#[async_trait]
impl RemoteServiceClient for HttpActivitiesClient {
    async fn list(&self) -> Result<Vec<ActivityWire>, RemoteError> {
        let resp = self.http.get(self.url(&[])?).send().await.map_err(request_error)?;
        check(resp).await?.json().await.map_err(request_error)
    }

    async fn details(&self, id: &str) -> Result<ActivityWire, RemoteError> {
        let resp = self
            .http
            .get(self.url(&[id])?)
            .send()
            .await
            .map_err(request_error)?;
        check(resp).await?.json().await.map_err(request_error)
    }

    async fn create(&self, activity: &ActivityWire) -> Result<(), RemoteError> {
        let resp = self
            .http
            .post(self.url(&[])?)
            .json(activity)
            .send()
            .await
            .map_err(request_error)?;
        acknowledge(resp).await
    }

    async fn update(&self, activity: &ActivityWire) -> Result<(), RemoteError> {
        let resp = self
            .http
            .put(self.url(&[activity.id.as_str()])?)
            .json(activity)
            .send()
            .await
            .map_err(request_error)?;
        acknowledge(resp).await
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let resp = self
            .http
            .delete(self.url(&[id])?)
            .send()
            .await
            .map_err(request_error)?;
        acknowledge(resp).await
    }

    async fn attend(&self, id: &str) -> Result<(), RemoteError> {
        let resp = self
            .http
            .post(self.url(&[id, "attend"])?)
            .send()
            .await
            .map_err(request_error)?;
        acknowledge(resp).await
    }

    async fn unattend(&self, id: &str) -> Result<(), RemoteError> {
        let resp = self
            .http
            .delete(self.url(&[id, "attend"])?)
            .send()
            .await
            .map_err(request_error)?;
        acknowledge(resp).await
    }
}
