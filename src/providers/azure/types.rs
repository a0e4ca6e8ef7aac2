use serde::Deserialize;

use crate::build::BuildRecord;

/// Envelope of `GET _apis/build/builds`.
#[derive(Debug, Deserialize)]
pub(super) struct BuildList {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub value: Vec<BuildRecord>,
}
