//! Tag mutation operations
//!
//! One handler per operation kind. Every handler receives the resolved
//! snapshot and the tag arguments; only the by-name handlers and
//! duplicate-tag re-read live tags from the service.
//!
//! - [`attach`] - attach-tag, attach-unique-tag
//! - [`detach`] - detach-tag, detach-tag-by-name
//! - [`replace`] - replace-tag, replace-tag-name
//! - [`duplicate`] - duplicate-tag, with per-resource failure isolation
//! - [`prune`] - clean-unused-tags
//! - [`report`] - report-present-tags, report-absent-tags

pub mod attach;
pub mod detach;
pub mod duplicate;
pub mod prune;
pub mod replace;
pub mod report;

use crate::ibm::service::TaggingService;
use crate::inventory::model::{Resource, ResourceRef};
use anyhow::Result;
use duplicate::DuplicateSummary;
use report::{ReportMode, TagReport};
use std::fmt;
use std::str::FromStr;

/// Every supported operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    AttachTag,
    AttachUniqueTag,
    DetachTag,
    DetachTagByName,
    ReplaceTag,
    ReplaceTagName,
    DuplicateTag,
    CleanUnusedTags,
    ReportPresentTags,
    ReportAbsentTags,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        Self::AttachTag,
        Self::AttachUniqueTag,
        Self::DetachTag,
        Self::DetachTagByName,
        Self::ReplaceTag,
        Self::ReplaceTagName,
        Self::DuplicateTag,
        Self::CleanUnusedTags,
        Self::ReportPresentTags,
        Self::ReportAbsentTags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AttachTag => "attach-tag",
            Self::AttachUniqueTag => "attach-unique-tag",
            Self::DetachTag => "detach-tag",
            Self::DetachTagByName => "detach-tag-by-name",
            Self::ReplaceTag => "replace-tag",
            Self::ReplaceTagName => "replace-tag-name",
            Self::DuplicateTag => "duplicate-tag",
            Self::CleanUnusedTags => "clean-unused-tags",
            Self::ReportPresentTags => "report-present-tags",
            Self::ReportAbsentTags => "report-absent-tags",
        }
    }

    /// Minimum number of tag arguments
    pub fn min_tags(&self) -> usize {
        match self {
            Self::CleanUnusedTags => 0,
            Self::ReplaceTag | Self::ReplaceTagName | Self::DuplicateTag => 2,
            _ => 1,
        }
    }

    /// Reject tag argument lists too short for this operation
    pub fn check_tags(&self, tags: &[String]) -> Result<()> {
        if tags.len() < self.min_tags() {
            anyhow::bail!(
                "{} needs at least {} tag argument(s), got {}",
                self.as_str(),
                self.min_tags(),
                tags.len()
            );
        }
        if tags.iter().any(|t| t.is_empty()) {
            anyhow::bail!("{}: empty tag argument", self.as_str());
        }
        Ok(())
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                anyhow::anyhow!("Unknown operation '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// One run's worth of work
#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub tag_args: Vec<String>,
    pub resources: Vec<Resource>,
}

/// Result of running one handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Mutations issued
    Applied { resources: usize, calls: usize },
    /// Logical no-match, nothing issued
    Skipped { reason: String },
    Duplicated(DuplicateSummary),
    Pruned { removed: u64 },
    Reported(TagReport),
}

impl Outcome {
    pub fn skipped(reason: &str) -> Self {
        Self::Skipped {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied { resources, calls } => {
                write!(f, "{} resource(s) updated with {} call(s)", resources, calls)
            }
            Self::Skipped { reason } => write!(f, "nothing to do: {}", reason),
            Self::Duplicated(summary) => write!(
                f,
                "{} changed, {} skipped, {} failed",
                summary.changed(),
                summary.skipped(),
                summary.failures().len()
            ),
            Self::Pruned { removed } => write!(f, "{} unused tag(s) removed", removed),
            Self::Reported(report) => write!(f, "{} row(s) reported", report.total()),
        }
    }
}

/// Run the handler for `request.kind`
pub async fn dispatch(tagging: &dyn TaggingService, request: &OperationRequest) -> Result<Outcome> {
    let tags = &request.tag_args;
    let resources = &request.resources;
    request.kind.check_tags(tags)?;

    match request.kind {
        OperationKind::AttachTag => attach::attach_tags(tagging, tags, resources).await,
        OperationKind::AttachUniqueTag => {
            attach::attach_unique_tag(tagging, &tags[0], resources).await
        }
        OperationKind::DetachTag => detach::detach_tags(tagging, tags, resources).await,
        OperationKind::DetachTagByName => {
            detach::detach_tags_by_name(tagging, tags, resources).await
        }
        OperationKind::ReplaceTag => {
            replace::replace_tag(tagging, &tags[0], &tags[1], resources).await
        }
        OperationKind::ReplaceTagName => {
            replace::replace_tag_name(tagging, &tags[0], &tags[1], resources).await
        }
        OperationKind::DuplicateTag => Ok(Outcome::Duplicated(
            duplicate::duplicate_tag(tagging, &tags[0], &tags[1], resources).await,
        )),
        OperationKind::CleanUnusedTags => prune::clean_unused_tags(tagging).await,
        OperationKind::ReportPresentTags => Ok(Outcome::Reported(report::build_report(
            ReportMode::Present,
            tags,
            resources,
        ))),
        OperationKind::ReportAbsentTags => Ok(Outcome::Reported(report::build_report(
            ReportMode::Absent,
            tags,
            resources,
        ))),
    }
}

/// Id-only references for tagging calls
pub(crate) fn references(resources: &[Resource]) -> Vec<ResourceRef> {
    resources.iter().map(Resource::reference).collect()
}
