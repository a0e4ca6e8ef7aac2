use indexmap::IndexMap;

use crate::build::BuildRecord;

/// Builds of one pipeline, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineGroup<'a> {
    pub pipeline_name: &'a str,
    pub builds: Vec<&'a BuildRecord>,
}

/// Partitions builds by `definition.name`, keeping pipelines in the order
/// they first appear.
///
/// Every build is expected to carry a pipeline name; the fetch layer drops
/// builds that don't. Should one slip through it is grouped under `""`.
pub fn group_by_pipeline(builds: &[BuildRecord]) -> Vec<PipelineGroup<'_>> {
    let mut groups: IndexMap<&str, Vec<&BuildRecord>> = IndexMap::new();
    for build in builds {
        let name = build.pipeline_name().unwrap_or_default();
        groups.entry(name).or_default().push(build);
    }

    groups
        .into_iter()
        .map(|(pipeline_name, builds)| PipelineGroup {
            pipeline_name,
            builds,
        })
        .collect()
}
