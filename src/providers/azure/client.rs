use log::debug;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

use crate::auth::Token;
use crate::build::BuildRecord;
use crate::error::{ReportError, Result};

use super::types::BuildList;

const API_VERSION: &str = "7.0";

/// Thin Azure DevOps Build API client.
///
/// Issues a single request per fetch, with no retries. Only one fetch may be
/// outstanding at a time.
pub struct AzureDevOpsClient {
    client: Client,
    builds_url: Url,
    token: Option<Token>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the fetch finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AzureDevOpsClient {
    pub fn new(
        base_url: &str,
        organization: &str,
        project: &str,
        token: Option<Token>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ado-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to create HTTP client: {e}")))?;

        let builds_url = builds_url(base_url, organization, project)?;

        Ok(Self {
            client,
            builds_url,
            token,
            in_flight: AtomicBool::new(false),
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            // PATs go in as the password of an empty-user basic credential.
            request.basic_auth("", Some(token.as_str()))
        } else {
            request
        }
    }

    /// Fetches the project's builds, most recently finished first.
    pub async fn fetch_builds(&self) -> Result<Vec<BuildRecord>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(ReportError::FetchInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        debug!("GET {}", self.builds_url);
        let response = self
            .auth_request(self.client.get(self.builds_url.clone()))
            .send()
            .await?;

        let status = response.status();

        // Rejected credentials come back as a 203 sign-in page, not a 401.
        if status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
            return Err(ReportError::Api {
                status: status.as_u16(),
                message: "authentication failed, check the personal access token".to_string(),
            });
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ReportError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let list: BuildList = response.json().await?;
        debug!("API reported {} builds, received {}", list.count, list.value.len());

        Ok(list.value)
    }
}

fn builds_url(base_url: &str, organization: &str, project: &str) -> Result<Url> {
    let mut url =
        Url::parse(base_url).map_err(|e| ReportError::Config(format!("Invalid base URL: {e}")))?;

    url.path_segments_mut()
        .map_err(|()| ReportError::Config(format!("Base URL cannot hold a path: {base_url}")))?
        .pop_if_empty()
        .extend([organization, project, "_apis", "build", "builds"]);

    url.query_pairs_mut()
        .append_pair("queryOrder", "finishTimeDescending")
        .append_pair("api-version", API_VERSION);

    Ok(url)
}
