//! Best-effort live outlet probes.
//!
//! Probes only report whether an outlet's search page answered. Their
//! results are informational and never feed back into synthesized offers.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Probe errors.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Outcome of probing one outlet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LiveStatus {
    Available { url: String },
    Unavailable { reason: String },
    TimedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveAvailability {
    pub outlet: String,
    #[serde(flatten)]
    pub status: LiveStatus,
}

/// A live source for one outlet.
#[async_trait::async_trait]
pub trait OutletProbe: Send + Sync {
    fn name(&self) -> &str;

    /// Check the outlet for `medicine`, returning the page that answered.
    async fn probe(&self, medicine: &str) -> ProbeResult<String>;
}

/// How an outlet encodes a search term.
#[derive(Debug, Clone, Copy)]
pub enum SearchRoute {
    /// `base?param=<medicine>`
    Query {
        base: &'static str,
        param: &'static str,
    },
    /// `base/<medicine>/suffix`
    Path {
        base: &'static str,
        suffix: &'static str,
    },
}

impl SearchRoute {
    pub fn url(&self, medicine: &str) -> ProbeResult<Url> {
        match *self {
            SearchRoute::Query { base, param } => Url::parse_with_params(base, &[(param, medicine)])
                .map_err(|e| ProbeError::InvalidUrl(e.to_string())),
            SearchRoute::Path { base, suffix } => {
                let mut url = Url::parse(base).map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;
                url.path_segments_mut()
                    .map_err(|_| ProbeError::InvalidUrl(base.to_string()))?
                    .push(medicine)
                    .push(suffix);
                Ok(url)
            }
        }
    }
}

/// Probes an outlet's public search page over HTTP.
pub struct HttpProbe {
    name: String,
    route: SearchRoute,
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(name: impl Into<String>, route: SearchRoute, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            route,
            client,
        }
    }
}

#[async_trait::async_trait]
impl OutletProbe for HttpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn probe(&self, medicine: &str) -> ProbeResult<String> {
        let url = self.route.url(medicine)?;
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ProbeError::Status(response.status().as_u16()));
        }
        Ok(url.to_string())
    }
}

/// Shared client for the built-in probes.
pub fn probe_client(timeout: Duration) -> ProbeResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Probes for the outlets with known public search pages.
pub fn default_probes(timeout: Duration) -> ProbeResult<Vec<Arc<dyn OutletProbe>>> {
    let client = probe_client(timeout)?;
    let probes: Vec<Arc<dyn OutletProbe>> = vec![
        Arc::new(HttpProbe::new(
            "1mg",
            SearchRoute::Query {
                base: "https://www.1mg.com/search/all",
                param: "name",
            },
            client.clone(),
        )),
        Arc::new(HttpProbe::new(
            "PharmEasy",
            SearchRoute::Query {
                base: "https://pharmeasy.in/search/all",
                param: "name",
            },
            client.clone(),
        )),
        Arc::new(HttpProbe::new(
            "Netmeds",
            SearchRoute::Path {
                base: "https://www.netmeds.com/catalogsearch/result",
                suffix: "all",
            },
            client,
        )),
    ];
    Ok(probes)
}

/// Run every probe concurrently, each bounded by `timeout`.
///
/// One probe failing or hanging never affects the others.
pub async fn probe_all(
    probes: &[Arc<dyn OutletProbe>],
    medicine: &str,
    timeout: Duration,
) -> Vec<LiveAvailability> {
    let tasks = probes.iter().map(|probe| async move {
        let status = match tokio::time::timeout(timeout, probe.probe(medicine)).await {
            Ok(Ok(url)) => LiveStatus::Available { url },
            Ok(Err(err)) => {
                warn!(outlet = probe.name(), medicine, "Live probe failed: {err}");
                LiveStatus::Unavailable {
                    reason: err.to_string(),
                }
            }
            Err(_) => {
                let err = ProbeError::Timeout(timeout);
                warn!(outlet = probe.name(), medicine, "Live probe abandoned: {err}");
                LiveStatus::TimedOut
            }
        };
        LiveAvailability {
            outlet: probe.name().to_string(),
            status,
        }
    });
    join_all(tasks).await
}
