mod aggregate;
mod assembler;
mod duration;
mod grouping;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

pub use aggregate::{aggregate, count_where, Bucket};
pub use assembler::assemble;
pub use duration::elapsed;
pub use grouping::group_by_pipeline;

/// Sentinel shown wherever a value is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Result values counted by the summary section. Matched exactly, case included.
pub const RESULT_SUCCEEDED: &str = "succeeded";
pub const RESULT_FAILED: &str = "failed";

/// Caller-owned inputs of one report generation.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext {
    pub generated_at: DateTime<Utc>,
    pub window_hours: u32,
    /// Offset used to display build timestamps.
    pub offset: FixedOffset,
}

/// One logical part of the report, emitted by [`assemble`] in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum ReportSection {
    Cover {
        generated_at: DateTime<Utc>,
        /// Generation time rendered in the report's display offset.
        generated_at_display: String,
        window_hours: u32,
    },
    PipelineTable {
        pipeline_name: String,
        rows: Vec<BuildRow>,
    },
    PipelineCharts {
        pipeline_name: String,
        charts: ChartSet,
    },
    AggregateCharts {
        charts: ChartSet,
    },
    Summary {
        total: usize,
        succeeded: usize,
        failed: usize,
    },
}

/// Display-ready row of a pipeline table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRow {
    pub build_number: String,
    pub status: String,
    pub result: String,
    pub reason: String,
    pub priority: String,
    pub queue_time: String,
    pub start_time: String,
    pub finish_time: String,
    pub build_duration: String,
    pub queue_duration: String,
    pub repository: String,
    pub requested_by: String,
    pub pr_sender: String,
    pub pr_title: String,
    pub link: Option<String>,
}

impl BuildRow {
    pub const HEADERS: [&'static str; 14] = [
        "Build #",
        "Status",
        "Result",
        "Reason",
        "Priority",
        "Queue Time",
        "Start Time",
        "Finish Time",
        "Build Duration",
        "Queue Duration",
        "Repository",
        "Requested By",
        "PR Sender",
        "PR Title",
    ];

    /// Cell values in [`Self::HEADERS`] order.
    pub fn cells(&self) -> [&str; 14] {
        [
            self.build_number.as_str(),
            self.status.as_str(),
            self.result.as_str(),
            self.reason.as_str(),
            self.priority.as_str(),
            self.queue_time.as_str(),
            self.start_time.as_str(),
            self.finish_time.as_str(),
            self.build_duration.as_str(),
            self.queue_duration.as_str(),
            self.repository.as_str(),
            self.requested_by.as_str(),
            self.pr_sender.as_str(),
            self.pr_title.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Share of the whole (pie).
    Proportion,
    /// Absolute counts per category (bar).
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestBuild {
    pub sender: String,
    pub title: String,
    pub result: String,
    pub status: String,
}

/// Charts drawn for one set of builds (a pipeline or all of them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    pub total: usize,
    pub charts: Vec<Chart>,
    pub pull_requests: Vec<PullRequestBuild>,
}
