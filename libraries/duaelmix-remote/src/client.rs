//! HTTP client for the remote mode endpoint.

use crate::channel::{ModeChannel, SUBSCRIPTION_BUFFER};
use crate::error::{RemoteError, Result};
use crate::types::{mode_of, SessionId, SessionRecord};
use async_trait::async_trait;
use duaelmix_core::SubIndex;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default interval between state polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where and how to reach the mode endpoint
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the server (e.g. "https://duaelmix.example.com")
    pub url: String,
    pub session: SessionId,
    pub poll_interval: Duration,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, session: SessionId) -> Self {
        Self {
            url: url.into(),
            session,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Mode channel over HTTP
///
/// Publishing calls `GET /api/v1?session=&on=`; subscribing polls
/// `GET /api/v1/state?session=`.
#[derive(Clone)]
pub struct HttpModeClient {
    http: Client,
    url: String,
    session: SessionId,
    poll_interval: Duration,
}

impl HttpModeClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(RemoteError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RemoteError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Duaelmix/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            url,
            session: config.session,
            poll_interval: config.poll_interval,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL a remote control calls to switch this session to `mode`
    pub fn mode_url(&self, mode: SubIndex) -> String {
        format!(
            "{}/api/v1?session={}&on={}",
            self.url,
            self.session,
            mode.index()
        )
    }

    /// Fetch the session record; `None` when the server has none yet
    pub async fn fetch_state(&self) -> Result<Option<SessionRecord>> {
        let url = format!("{}/api/v1/state", self.url);
        let response = self
            .http
            .get(&url)
            .query(&[("session", self.session.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let record = response.json::<SessionRecord>().await.map_err(|e| {
                    RemoteError::ParseError(format!("Failed to parse session record: {}", e))
                })?;
                Ok(Some(record))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(server_error(status, response).await),
        }
    }
}

#[async_trait]
impl ModeChannel for HttpModeClient {
    fn session(&self) -> &SessionId {
        &self.session
    }

    async fn publish(&self, mode: SubIndex) -> Result<()> {
        let url = self.mode_url(mode);
        debug!(url = %url, "Publishing mode");

        let response = self.http.get(&url).send().await?;
        match response.status() {
            StatusCode::NO_CONTENT => {
                info!(session = %self.session, mode = mode.index(), "Mode published");
                Ok(())
            }
            status => Err(server_error(status, response).await),
        }
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<SubIndex>> {
        let initial = mode_of(self.fetch_state().await?.as_ref());
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let client = self.clone();

        tokio::spawn(async move {
            let mut last = initial;
            if tx.send(last).await.is_err() {
                return;
            }

            let mut ticker = tokio::time::interval(client.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    _ = ticker.tick() => {}
                }

                let mode = match client.fetch_state().await {
                    Ok(record) => mode_of(record.as_ref()),
                    Err(e) => {
                        warn!("Failed to poll session state: {}", e);
                        continue;
                    }
                };
                if mode != last {
                    last = mode;
                    if tx.send(mode).await.is_err() {
                        break;
                    }
                }
            }
            debug!(session = %client.session, "Mode polling stopped");
        });

        Ok(rx)
    }
}

async fn server_error(status: StatusCode, response: reqwest::Response) -> RemoteError {
    let message = response.text().await.unwrap_or_default();
    RemoteError::ServerError {
        status: status.as_u16(),
        message,
    }
}
