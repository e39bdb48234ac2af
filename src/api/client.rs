use super::*;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// `reqwest` implementation of [`AssistantBackend`].
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.client.get(self.url(path)).send().await?;
        read_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        read_json(response).await
    }
}

/// Decodes a 2xx body as `T`; anything else becomes [`ApiError::Status`]
/// carrying the body's `error` field when there is one.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error);
        tracing::warn!("Backend responded with HTTP {}", status);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl AssistantBackend for BackendClient {
    async fn process_command(&self, command: &str) -> Result<CommandResponse, ApiError> {
        tracing::debug!("Dispatching command to {}", self.base_url);
        let request = CommandRequest {
            command: command.to_string(),
        };
        self.post_json("/api/process_command", &request).await
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get_json("/health").await
    }

    async fn tip(&self) -> Result<String, ApiError> {
        let body: TipResponse = self.get_json("/api/get_tip").await?;
        Ok(body.tip)
    }

    async fn time(&self) -> Result<String, ApiError> {
        let body: TimeResponse = self.get_json("/api/get_time").await?;
        Ok(body.time)
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let request = LoginRequest { username, password };
        self.post_json("/api/login", &request).await
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let request = RegisterRequest {
            username,
            email,
            password,
        };
        let _: serde_json::Value = self.post_json("/api/register", &request).await?;
        Ok(())
    }
}
