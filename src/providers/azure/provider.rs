use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::auth::Token;
use crate::build::BuildRecord;
use crate::error::Result;

use super::client::AzureDevOpsClient;

/// Azure DevOps build provider.
///
/// Fetches a project's builds and narrows them to the ones that finished
/// within the reporting window.
pub struct AzureDevOpsProvider {
    client: AzureDevOpsClient,
    organization: String,
    project: String,
}

impl AzureDevOpsProvider {
    /// Creates a provider for `organization/project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the builds endpoint URL cannot be constructed.
    pub fn new(
        base_url: &str,
        organization: String,
        project: String,
        token: Option<Token>,
    ) -> Result<Self> {
        let client = AzureDevOpsClient::new(base_url, &organization, &project, token)?;

        Ok(Self {
            client,
            organization,
            project,
        })
    }

    /// Fetches builds that finished in the `window_hours` before `now`.
    ///
    /// Builds without a finish time or a pipeline name are left out. Order
    /// follows the API (most recently finished first).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    /// Nothing is retried.
    pub async fn fetch_recent_builds(
        &self,
        window_hours: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<BuildRecord>> {
        info!(
            "Fetching builds for {}/{} finished in the last {window_hours}h",
            self.organization, self.project
        );

        let builds = self.client.fetch_builds().await?;
        let fetched = builds.len();
        let recent = filter_recent(builds, window_hours, now);

        info!("Kept {} of {fetched} builds", recent.len());
        Ok(recent)
    }
}

/// Keeps builds whose finish time is at or after `now - window_hours`.
pub fn filter_recent(
    builds: Vec<BuildRecord>,
    window_hours: u32,
    now: DateTime<Utc>,
) -> Vec<BuildRecord> {
    let cutoff = now - Duration::hours(i64::from(window_hours));

    builds
        .into_iter()
        .filter(|build| build.finish_time().is_some_and(|t| t >= cutoff))
        .filter(|build| {
            let named = build.pipeline_name().is_some();
            if !named {
                warn!(
                    "Skipping build {} without a pipeline name",
                    build.build_number().unwrap_or("<unknown>")
                );
            }
            named
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap()
    }

    fn build(number: &str, finish: Option<&str>) -> BuildRecord {
        let mut value = json!({"buildNumber": number, "definition": {"name": "CI"}});
        if let Some(finish) = finish {
            value["finishTime"] = json!(finish);
        }
        BuildRecord::new(value)
    }

    fn numbers(builds: &[BuildRecord]) -> Vec<&str> {
        builds.iter().filter_map(BuildRecord::build_number).collect()
    }

    #[test]
    fn test_filter_keeps_builds_inside_window() {
        let builds = vec![
            build("recent", Some("2024-03-02T11:00:00Z")),
            build("edge", Some("2024-03-01T12:00:00Z")),
            build("old", Some("2024-03-01T11:59:59Z")),
            build("running", None),
            build("garbage", Some("yesterday")),
        ];

        let kept = filter_recent(builds, 24, now());
        assert_eq!(numbers(&kept), vec!["recent", "edge"]);
    }

    #[test]
    fn test_filter_honours_window_length() {
        let builds = vec![
            build("a", Some("2024-03-02T11:30:00Z")),
            build("b", Some("2024-03-02T10:30:00Z")),
        ];

        assert_eq!(numbers(&filter_recent(builds, 1, now())), vec!["a"]);
    }

    #[test]
    fn test_filter_drops_builds_without_pipeline_name() {
        let builds = vec![
            BuildRecord::new(json!({"buildNumber": "1", "finishTime": "2024-03-02T11:00:00Z"})),
            build("2", Some("2024-03-02T11:00:00Z")),
        ];

        assert_eq!(numbers(&filter_recent(builds, 24, now())), vec!["2"]);
    }
}
