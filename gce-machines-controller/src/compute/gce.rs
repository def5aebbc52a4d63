use std::fmt::Debug;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::config::GceConfig;

use super::{ComputeApi, ComputeError, Instance};

pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal";

const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Couldn't build the HTTP client! Reason: {}", .0)]
    Client(reqwest::Error),
    #[error("Couldn't fetch an access token from the metadata server! Reason: {}", .0)]
    TokenRequest(reqwest::Error),
    #[error("Metadata server refused to issue an access token (status {})!", .0)]
    TokenRefused(u16),
    #[error("'{}' is not a usable Compute Engine endpoint!", .0)]
    InvalidEndpoint(String),
}

#[derive(Clone)]
pub struct GceSession {
    access_token: String,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    message: String,
}

impl GceSession {
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Asks the metadata server of the GCE instance we're running on for a token of its default
    /// service account.
    pub async fn from_metadata_server(
        client: &Client,
        metadata_endpoint: &str,
    ) -> Result<Self, SessionError> {
        let url = format!(
            "{}{METADATA_TOKEN_PATH}",
            metadata_endpoint.trim_end_matches('/')
        );

        debug!("Requesting an access token from {url}...");

        let response = client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(SessionError::TokenRequest)?;

        if !response.status().is_success() {
            return Err(SessionError::TokenRefused(response.status().as_u16()));
        }

        let token: MetadataToken = response.json().await.map_err(SessionError::TokenRequest)?;

        Ok(Self::with_token(token.access_token))
    }
}

impl Debug for GceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GceSession")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Compute Engine REST API client.
#[derive(Debug)]
pub struct GceComputeApi {
    client: Client,
    endpoint: Url,
    session: GceSession,
}

impl GceComputeApi {
    pub fn new(client: Client, endpoint: &str, session: GceSession) -> Result<Self, SessionError> {
        let endpoint = Url::parse(endpoint)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| SessionError::InvalidEndpoint(endpoint.to_owned()))?;

        Ok(Self {
            client,
            endpoint,
            session,
        })
    }

    /// Establishes the provider session, using the configured token when there is one.
    pub async fn connect(config: &GceConfig) -> Result<Self, SessionError> {
        let client = Client::builder().build().map_err(SessionError::Client)?;
        let session = match &config.access_token {
            Some(token) => {
                info!("Using the configured GCE access token");
                GceSession::with_token(token)
            }
            None => {
                info!("Fetching a GCE access token from the metadata server...");
                GceSession::from_metadata_server(&client, &config.metadata_endpoint).await?
            }
        };

        Self::new(client, &config.compute_endpoint, session)
    }

    /// Appends `segments` to the endpoint path, percent-encoding each one so a value can never
    /// address a different resource.
    fn endpoint_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.endpoint.clone();

        // the endpoint is checked to be a base url on construction
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }

    fn instances_url(&self, project: &str, zone: &str) -> Url {
        self.endpoint_url(["projects", project, "zones", zone, "instances"])
    }

    fn instance_url(&self, project: &str, zone: &str, name: &str) -> Url {
        self.endpoint_url(["projects", project, "zones", zone, "instances", name])
    }

    async fn check(response: Response) -> Result<(), ComputeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.map_err(ComputeError::Http)?;
        let message = match serde_json::from_str::<GoogleErrorBody>(&body) {
            Ok(parsed) => parsed.error.message,
            Err(_) => body,
        };

        Err(ComputeError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ComputeApi for GceComputeApi {
    async fn insert_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &Instance,
    ) -> Result<(), ComputeError> {
        let url = self.instances_url(project, zone);

        debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.session.access_token)
            .json(instance)
            .send()
            .await
            .map_err(ComputeError::Http)?;

        Self::check(response).await
    }

    async fn delete_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<(), ComputeError> {
        let url = self.instance_url(project, zone, name);

        debug!("DELETE {url}");

        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.session.access_token)
            .send()
            .await
            .map_err(ComputeError::Http)?;

        Self::check(response).await
    }
}
