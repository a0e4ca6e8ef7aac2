use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An explicit sequence of keys used to reach a (possibly nested) field of a
/// build record, e.g. `requestedBy.displayName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Walks `value` key by key. Returns `None` as soon as a segment is
    /// missing or an intermediate value is not an object.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(value, |current, key| current.as_object()?.get(key))
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::new(dotted.split('.'))
    }
}

/// One pipeline execution as returned by the Azure DevOps Build API.
///
/// The raw JSON is kept as-is so any field can be aggregated; accessors cover
/// the fields the report needs. Missing or mistyped fields read as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildRecord {
    raw: Value,
}

impl BuildRecord {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.resolve(&self.raw)
    }

    /// Non-empty string at `path`, if any.
    pub fn text(&self, path: &FieldPath) -> Option<&str> {
        self.get(path)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    fn field(&self, dotted: &str) -> Option<&str> {
        self.text(&FieldPath::from(dotted))
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        self.field(key)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn build_number(&self) -> Option<&str> {
        self.field("buildNumber")
    }

    pub fn status(&self) -> Option<&str> {
        self.field("status")
    }

    pub fn result(&self) -> Option<&str> {
        self.field("result")
    }

    pub fn reason(&self) -> Option<&str> {
        self.field("reason")
    }

    pub fn priority(&self) -> Option<&str> {
        self.field("priority")
    }

    pub fn queue_time(&self) -> Option<DateTime<Utc>> {
        self.timestamp("queueTime")
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.timestamp("startTime")
    }

    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.timestamp("finishTime")
    }

    pub fn pipeline_name(&self) -> Option<&str> {
        self.field("definition.name")
    }

    pub fn repository_type(&self) -> Option<&str> {
        self.field("repository.type")
    }

    pub fn requested_by(&self) -> Option<&str> {
        self.field("requestedBy.displayName")
    }

    /// Looks up a trigger-info entry. Keys contain dots (`pr.sender.name`),
    /// so they are a single path segment.
    pub fn trigger_info(&self, key: &str) -> Option<&str> {
        self.text(&FieldPath::new(["triggerInfo", key]))
    }

    pub fn web_url(&self) -> Option<&str> {
        self.field("_links.web.href")
    }
}
