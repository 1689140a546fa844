//! Authenticated NadeoServices client.
//!
//! [`TokenClient`] owns one HTTP session and a cached token pair for a single
//! audience. Before every authenticated call the cached pair is reused,
//! refreshed with the refresh token, or re-acquired with basic credentials.
//! Failures never escape as errors: a failed authentication leaves the cache
//! empty and a failed lookup returns no maps.

use anyhow::{Context, Result};
use http::header::{AUTHORIZATION, USER_AGENT};
use http::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

pub mod download;
pub mod map_info;

pub use download::MapDownload;
pub use map_info::MapInfo;

use crate::cache::token::{AuthMode, TokenPair, TokenState};
use crate::config::service::ServiceEndpoints;
use crate::credentials::Credentials;
use crate::helpers::time::{get_instant, now};
use crate::observability::metrics::with_metrics;
use crate::parser::jwt::decode_token_times;

/// `Authorization` value for the Nadeo token scheme
pub fn nadeo_auth_header(token: &str) -> String {
    format!("nadeo_v1 t={}", token)
}

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    audience: &'a str,
}

pub struct TokenClient {
    credentials: Credentials,
    endpoints: ServiceEndpoints,
    session: Client,
    state: RwLock<TokenState>,
}

impl TokenClient {
    /// Creates the client together with its HTTP session.
    pub fn new(credentials: Credentials, endpoints: ServiceEndpoints) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        if let Some(user_agent) = &endpoints.user_agent {
            default_headers.insert(USER_AGENT, user_agent.parse().context("invalid user agent")?);
        }
        let session = Client::builder()
            .default_headers(default_headers)
            .build()
            .context("failed to build HTTP client")?;

        info!(base_url = %endpoints.base_url, audience = %endpoints.audience, "session created");
        Ok(Self {
            credentials,
            endpoints,
            session,
            state: RwLock::new(TokenState::sentinel()),
        })
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Snapshot of the cached token
    pub async fn token_state(&self) -> TokenState {
        self.state.read().await.clone()
    }

    pub async fn auth_valid(&self) -> bool {
        self.state.read().await.is_valid_at(now())
    }

    pub async fn auth_mode(&self) -> AuthMode {
        self.state.read().await.mode_at(now())
    }

    /// Makes sure a usable token is cached.
    ///
    /// Does nothing while the cached token is valid. Inside the refresh window the
    /// refresh token is used, otherwise basic credentials. Any failure resets the
    /// cache to the empty state; callers re-check [`TokenClient::auth_valid`].
    ///
    /// The cache lock is not held across the request, so concurrent callers
    /// holding an invalid token each send their own request.
    pub async fn authenticate(&self) {
        let current = self.token_state().await;
        let mode = current.mode_at(now());

        let request = match mode {
            AuthMode::Reuse => {
                debug!("cached token still valid, skipping authentication");
                return;
            }
            AuthMode::Refresh => {
                info!("Refreshing {} authentication token", self.endpoints.audience);
                self.session
                    .post(self.endpoints.auth_refresh_url())
                    .header(AUTHORIZATION, nadeo_auth_header(&current.refresh_token))
            }
            AuthMode::Initial => {
                info!("Requesting {} authentication token", self.endpoints.audience);
                self.session
                    .post(self.endpoints.auth_basic_url())
                    .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            }
        };
        let request = request.json(&AuthRequest { audience: &self.endpoints.audience });

        with_metrics(|m| m.auth_requests.with_label_values(&[mode.as_str()]).inc()).await;
        let start = get_instant();
        let new_state = match request.send().await {
            Ok(response) if response.status().is_success() => read_token_state(response).await,
            Ok(response) => {
                error!(status = %response.status(), mode = mode.as_str(), "Error returned from {} authentication", self.endpoints.audience);
                None
            }
            Err(e) => {
                error!(error = %e, mode = mode.as_str(), "{} authentication request failed", self.endpoints.audience);
                None
            }
        };
        let elapsed = start.elapsed().as_secs_f64();

        let failed = new_state.is_none();
        *self.state.write().await = new_state.unwrap_or_else(TokenState::sentinel);

        with_metrics(|m| {
            m.request_duration.with_label_values(&["auth"]).observe(elapsed);
            if failed {
                m.auth_failures.with_label_values(&[mode.as_str()]).inc();
            }
        })
        .await;
    }

    /// Looks up map records by UID.
    ///
    /// Returns the records in server order. Unknown UIDs, a rejected token or an
    /// unreadable body all end up as an empty list.
    pub async fn get_map_infos<S: AsRef<str>>(&self, map_uids: &[S]) -> Vec<MapInfo> {
        if map_uids.is_empty() {
            warn!("map lookup called without map uids");
            return Vec::new();
        }
        if !self.auth_valid().await {
            self.authenticate().await;
        }

        let joined = map_uids.iter().map(|uid| uid.as_ref()).collect::<Vec<_>>().join(",");
        let access_token = self.state.read().await.access_token.clone();
        let url = format!("{}?mapUidList={}", self.endpoints.map_lookup_url(), joined);

        with_metrics(|m| m.lookup_requests.inc()).await;
        let start = get_instant();
        let infos = self.fetch_map_infos(self.authorized_get(&url, &access_token)).await;
        let elapsed = start.elapsed().as_secs_f64();

        with_metrics(|m| {
            m.request_duration.with_label_values(&["lookup"]).observe(elapsed);
            match &infos {
                Some(infos) => m.maps_found.inc_by(infos.len() as u64),
                None => m.lookup_failures.inc(),
            }
        })
        .await;

        let infos = infos.unwrap_or_default();
        info!(requested = map_uids.len(), found = infos.len(), "map infos fetched");
        infos
    }

    /// Fetches a map file by its absolute URL, without authentication.
    ///
    /// A non-success status is logged and the handle is still returned; only a
    /// transport failure is an error. See [`MapDownload`] for the body contract.
    pub async fn download(&self, url: &str) -> Result<MapDownload> {
        with_metrics(|m| m.download_requests.inc()).await;
        let start = get_instant();
        let response = self
            .session
            .get(url)
            .send()
            .await
            .with_context(|| format!("Error when downloading map from {}", url))?;

        let elapsed = start.elapsed().as_secs_f64();
        let success = response.status().is_success();
        if !success {
            error!(status = %response.status(), "Error when downloading map from {}", url);
        }
        with_metrics(|m| {
            m.request_duration.with_label_values(&["download"]).observe(elapsed);
            if !success {
                m.download_failures.inc();
            }
        })
        .await;

        Ok(MapDownload::new(response))
    }

    /// Ends the session. Consumes the client so the session cannot be used afterwards.
    pub fn close(self) {
        info!(base_url = %self.endpoints.base_url, "session closed");
        drop(self.session);
    }

    fn authorized_get(&self, url: &str, access_token: &str) -> RequestBuilder {
        self.session
            .get(url)
            .header(AUTHORIZATION, nadeo_auth_header(access_token))
    }

    async fn fetch_map_infos(&self, request: RequestBuilder) -> Option<Vec<MapInfo>> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Error when requesting map infos");
                return None;
            }
        };
        if !response.status().is_success() {
            error!(status = %response.status(), "Error when requesting map infos");
            return None;
        }
        response
            .json::<Vec<MapInfo>>()
            .await
            .inspect_err(|e| error!(error = %e, "map infos body is not a valid map list"))
            .ok()
    }
}

async fn read_token_state(response: Response) -> Option<TokenState> {
    let pair = match response.json::<TokenPair>().await {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "authentication response is not a token pair");
            return None;
        }
    };
    match decode_token_times(&pair.access_token) {
        Ok((expires_at, refreshable_until)) => {
            debug!(%expires_at, %refreshable_until, "token cached");
            Some(TokenState::new(pair, expires_at, refreshable_until))
        }
        Err(e) => {
            error!(error = %e, "access token payload could not be decoded");
            None
        }
    }
}
