use chrono::{DateTime, FixedOffset, Utc};

use super::{
    aggregate, count_where, elapsed, group_by_pipeline, BuildRow, Chart, ChartKind, ChartSet,
    PullRequestBuild, ReportContext, ReportSection, NOT_AVAILABLE, RESULT_FAILED,
    RESULT_SUCCEEDED,
};
use crate::build::{BuildRecord, FieldPath};

/// Requester name ADO uses for builds triggered by GitHub pull requests.
const GITHUB_REQUESTER: &str = "GitHub";

const PR_SENDER: &str = "pr.sender.name";
const PR_TITLE: &str = "pr.title";

/// Matches the en-US locale string, e.g. `3/1/2024, 7:05:09 AM`.
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// (title, field path, default, chart kind) of every chart in a chart set.
const CHARTS: [(&str, &str, Option<&str>, ChartKind); 6] = [
    ("Build Results", "result", Some("Unknown"), ChartKind::Proportion),
    ("Build Status", "status", None, ChartKind::Proportion),
    ("Build Reasons", "reason", Some("Unknown"), ChartKind::Count),
    ("Build Priorities", "priority", Some("Normal"), ChartKind::Count),
    ("Repository Types", "repository.type", Some("Unknown"), ChartKind::Proportion),
    ("Requested By", "requestedBy.displayName", Some("Unknown"), ChartKind::Count),
];

/// Turns a filtered build list into the ordered sections of the report:
/// cover, one table per pipeline, one chart set per pipeline, the aggregate
/// chart set, and the summary.
///
/// Pure: the same builds and context always produce the same sections.
pub fn assemble(builds: &[BuildRecord], ctx: &ReportContext) -> Vec<ReportSection> {
    let groups = group_by_pipeline(builds);

    let mut sections = Vec::with_capacity(groups.len() * 2 + 3);
    sections.push(ReportSection::Cover {
        generated_at: ctx.generated_at,
        generated_at_display: format_timestamp(ctx.generated_at, ctx.offset),
        window_hours: ctx.window_hours,
    });

    sections.extend(groups.iter().map(|group| ReportSection::PipelineTable {
        pipeline_name: group.pipeline_name.to_string(),
        rows: group
            .builds
            .iter()
            .map(|build| build_row(build, ctx.offset))
            .collect(),
    }));

    sections.extend(groups.iter().map(|group| ReportSection::PipelineCharts {
        pipeline_name: group.pipeline_name.to_string(),
        charts: chart_set(&group.builds),
    }));

    let all: Vec<&BuildRecord> = builds.iter().collect();
    sections.push(ReportSection::AggregateCharts {
        charts: chart_set(&all),
    });

    let result = FieldPath::from("result");
    sections.push(ReportSection::Summary {
        total: builds.len(),
        succeeded: count_where(builds, &result, RESULT_SUCCEEDED),
        failed: count_where(builds, &result, RESULT_FAILED),
    });

    sections
}

fn build_row(build: &BuildRecord, offset: FixedOffset) -> BuildRow {
    let or_na = |value: Option<&str>| value.unwrap_or(NOT_AVAILABLE).to_string();
    let time = |value: Option<DateTime<Utc>>| {
        value.map_or_else(|| NOT_AVAILABLE.to_string(), |t| format_timestamp(t, offset))
    };

    let queued = build.queue_time();
    let started = build.start_time();
    let finished = build.finish_time();

    BuildRow {
        build_number: or_na(build.build_number()),
        status: or_na(build.status()),
        result: or_na(build.result()),
        reason: or_na(build.reason()),
        priority: build.priority().unwrap_or("Normal").to_string(),
        queue_time: time(queued),
        start_time: time(started),
        finish_time: time(finished),
        build_duration: elapsed(started, finished),
        queue_duration: elapsed(queued, started),
        repository: or_na(build.repository_type()),
        requested_by: or_na(build.requested_by()),
        pr_sender: or_na(build.trigger_info(PR_SENDER)),
        pr_title: or_na(build.trigger_info(PR_TITLE)),
        link: build.web_url().map(str::to_string),
    }
}

fn chart_set(builds: &[&BuildRecord]) -> ChartSet {
    let charts = CHARTS
        .iter()
        .map(|&(title, path, default, kind)| Chart {
            title: title.to_string(),
            kind,
            buckets: aggregate(builds.iter().copied(), &FieldPath::from(path), default),
        })
        .collect();

    let pull_requests = builds
        .iter()
        .filter(|b| b.requested_by() == Some(GITHUB_REQUESTER))
        .filter_map(|b| {
            let sender = b.trigger_info(PR_SENDER)?;
            Some(PullRequestBuild {
                sender: sender.to_string(),
                title: b.trigger_info(PR_TITLE).unwrap_or(NOT_AVAILABLE).to_string(),
                result: b.result().unwrap_or(NOT_AVAILABLE).to_string(),
                status: b.status().unwrap_or(NOT_AVAILABLE).to_string(),
            })
        })
        .collect();

    ChartSet {
        total: builds.len(),
        charts,
        pull_requests,
    }
}

fn format_timestamp(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn ctx() -> ReportContext {
        ReportContext {
            generated_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
            window_hours: 24,
            offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn records(values: Vec<Value>) -> Vec<BuildRecord> {
        values.into_iter().map(BuildRecord::new).collect()
    }

    fn scenario() -> Vec<BuildRecord> {
        records(vec![
            json!({"buildNumber": "1", "result": "succeeded", "definition": {"name": "A"},
                   "finishTime": "2024-03-02T01:00:00Z"}),
            json!({"buildNumber": "2", "result": "failed", "definition": {"name": "A"},
                   "finishTime": "2024-03-02T02:00:00Z"}),
            json!({"buildNumber": "3", "result": "succeeded", "definition": {"name": "B"},
                   "finishTime": "2024-03-02T03:00:00Z"}),
        ])
    }

    fn chart<'a>(set: &'a ChartSet, title: &str) -> &'a Chart {
        set.charts.iter().find(|c| c.title == title).unwrap()
    }

    #[test]
    fn test_sections_emitted_in_document_order() {
        let sections = assemble(&scenario(), &ctx());
        let tags: Vec<_> = sections
            .iter()
            .map(|s| match s {
                ReportSection::Cover { .. } => "cover".to_string(),
                ReportSection::PipelineTable { pipeline_name, .. } => {
                    format!("table:{pipeline_name}")
                }
                ReportSection::PipelineCharts { pipeline_name, .. } => {
                    format!("charts:{pipeline_name}")
                }
                ReportSection::AggregateCharts { .. } => "aggregate".to_string(),
                ReportSection::Summary { .. } => "summary".to_string(),
            })
            .collect();

        assert_eq!(
            tags,
            vec!["cover", "table:A", "table:B", "charts:A", "charts:B", "aggregate", "summary"]
        );
    }

    #[test]
    fn test_scenario_summary_and_result_buckets() {
        let sections = assemble(&scenario(), &ctx());

        let Some(ReportSection::Summary { total, succeeded, failed }) = sections.last() else {
            panic!("summary must be the last section");
        };
        assert_eq!((*total, *succeeded, *failed), (3, 2, 1));

        let ReportSection::AggregateCharts { charts } = &sections[5] else {
            panic!("expected aggregate charts");
        };
        let results = chart(charts, "Build Results");
        assert_eq!(results.kind, ChartKind::Proportion);
        let pairs: Vec<_> = results.buckets.iter().map(|b| (b.name.as_str(), b.count)).collect();
        assert_eq!(pairs, vec![("succeeded", 2), ("failed", 1)]);
        assert_eq!(charts.total, 3);

        let ReportSection::PipelineTable { rows, .. } = &sections[1] else {
            panic!("expected pipeline table");
        };
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_pipeline_charts_cover_only_their_own_builds() {
        let sections = assemble(&scenario(), &ctx());

        let per_pipeline: Vec<_> = sections
            .iter()
            .filter_map(|s| match s {
                ReportSection::PipelineCharts {
                    pipeline_name,
                    charts,
                } => Some((pipeline_name.as_str(), charts)),
                _ => None,
            })
            .collect();
        assert_eq!(per_pipeline.len(), 2);

        let result_pairs = |set: &ChartSet| -> Vec<(String, usize)> {
            chart(set, "Build Results")
                .buckets
                .iter()
                .map(|b| (b.name.clone(), b.count))
                .collect()
        };

        let (name, charts) = per_pipeline[0];
        assert_eq!(name, "A");
        assert_eq!(charts.total, 2);
        assert_eq!(
            result_pairs(charts),
            vec![("succeeded".to_string(), 1), ("failed".to_string(), 1)]
        );

        let (name, charts) = per_pipeline[1];
        assert_eq!(name, "B");
        assert_eq!(charts.total, 1);
        assert_eq!(result_pairs(charts), vec![("succeeded".to_string(), 1)]);
    }

    #[test]
    fn test_row_durations_and_defaults() {
        let builds = records(vec![json!({
            "buildNumber": "20240302.4",
            "status": "completed",
            "definition": {"name": "CI"},
            "startTime": "2024-03-02T07:00:00Z",
            "finishTime": "2024-03-02T07:01:30Z"
        })]);

        let sections = assemble(&builds, &ctx());
        let ReportSection::PipelineTable { rows, .. } = &sections[1] else {
            panic!("expected pipeline table");
        };
        let row = &rows[0];

        assert_eq!(row.build_duration, "1m 30s");
        assert_eq!(row.queue_duration, "N/A");
        assert_eq!(row.queue_time, "N/A");
        assert_eq!(row.start_time, "3/2/2024, 7:00:00 AM");
        assert_eq!(row.finish_time, "3/2/2024, 7:01:30 AM");
        assert_eq!(row.result, "N/A");
        assert_eq!(row.reason, "N/A");
        assert_eq!(row.priority, "Normal");
        assert_eq!(row.requested_by, "N/A");
        assert_eq!(row.pr_sender, "N/A");
        assert_eq!(row.link, None);
    }

    #[test]
    fn test_timestamps_use_context_offset() {
        let builds = records(vec![json!({
            "definition": {"name": "CI"},
            "finishTime": "2024-03-02T07:01:30Z"
        })]);
        let mut ctx = ctx();
        ctx.offset = FixedOffset::west_opt(4 * 3600).unwrap();

        let sections = assemble(&builds, &ctx);
        let ReportSection::PipelineTable { rows, .. } = &sections[1] else {
            panic!("expected pipeline table");
        };
        assert_eq!(rows[0].finish_time, "3/2/2024, 3:01:30 AM");

        let ReportSection::Cover { generated_at_display, .. } = &sections[0] else {
            panic!("expected cover");
        };
        assert_eq!(generated_at_display, "3/2/2024, 4:00:00 AM");
    }

    #[test]
    fn test_missing_requester_lands_in_unknown_bucket() {
        let builds = records(vec![
            json!({"definition": {"name": "CI"}, "requestedBy": {"displayName": "Jane"}}),
            json!({"definition": {"name": "CI"}}),
        ]);

        let sections = assemble(&builds, &ctx());
        let ReportSection::PipelineCharts { charts, .. } = &sections[2] else {
            panic!("expected pipeline charts");
        };
        let requested = chart(charts, "Requested By");

        assert_eq!(requested.kind, ChartKind::Count);
        assert!(requested
            .buckets
            .iter()
            .any(|b| b.name == "Unknown" && b.count == 1));
    }

    #[test]
    fn test_pull_request_builds_require_github_requester_and_sender() {
        let builds = records(vec![
            json!({"definition": {"name": "CI"}, "result": "succeeded", "status": "completed",
                   "requestedBy": {"displayName": "GitHub"},
                   "triggerInfo": {"pr.sender.name": "octocat", "pr.title": "Add feature"}}),
            json!({"definition": {"name": "CI"}, "requestedBy": {"displayName": "GitHub"}}),
            json!({"definition": {"name": "CI"}, "requestedBy": {"displayName": "Jane"},
                   "triggerInfo": {"pr.sender.name": "jane"}}),
        ]);

        let sections = assemble(&builds, &ctx());
        let ReportSection::AggregateCharts { charts } = &sections[3] else {
            panic!("expected aggregate charts");
        };

        assert_eq!(
            charts.pull_requests,
            vec![PullRequestBuild {
                sender: "octocat".to_string(),
                title: "Add feature".to_string(),
                result: "succeeded".to_string(),
                status: "completed".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_build_list() {
        let sections = assemble(&[], &ctx());

        assert_eq!(sections.len(), 3);
        assert!(matches!(sections[0], ReportSection::Cover { window_hours: 24, .. }));
        let ReportSection::AggregateCharts { charts } = &sections[1] else {
            panic!("expected aggregate charts");
        };
        assert!(charts.charts.iter().all(|c| c.buckets.is_empty()));
        assert_eq!(
            sections[2],
            ReportSection::Summary { total: 0, succeeded: 0, failed: 0 }
        );
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let builds = scenario();
        assert_eq!(assemble(&builds, &ctx()), assemble(&builds, &ctx()));
    }
}
