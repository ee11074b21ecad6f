//! Reconciliation Driver
//!
//! Loads the inventory once, runs exactly one operation over it and reports
//! completion. All collaborators arrive through a [`Session`] built at
//! startup.

use crate::ibm::service::{SearchService, TaggingService};
use crate::inventory::{load_resources, SearchOptions, Selector};
use crate::ops::{dispatch, OperationKind, OperationRequest, Outcome};
use anyhow::Result;

/// Separator between command line groups
pub const GROUP_SEPARATOR: &str = "--";

/// Services and settings for one run
pub struct Session {
    pub search: Box<dyn SearchService>,
    pub tagging: Box<dyn TaggingService>,
    pub search_options: SearchOptions,
}

impl Session {
    pub fn new(search: Box<dyn SearchService>, tagging: Box<dyn TaggingService>) -> Self {
        Self {
            search,
            tagging,
            search_options: SearchOptions::default(),
        }
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub kind: OperationKind,
    pub tags: Vec<String>,
    pub selector: Selector,
    /// Token from the third group, if given
    pub token: Option<String>,
}

impl Invocation {
    /// Build from `<operation> <tag...>` and the raw words following the first `--`,
    /// i.e. `<selector...> -- <token>`.
    ///
    /// Missing groups resolve to an empty selector or no token rather than an error.
    pub fn from_parts(operation: &str, tags: &[String], rest: &[String]) -> Result<Self> {
        let kind: OperationKind = operation.trim().parse()?;
        let tags: Vec<String> = tags
            .iter()
            .flat_map(|t| t.split_whitespace())
            .map(String::from)
            .collect();
        kind.check_tags(&tags)?;

        let mut groups = rest.split(|w| w == GROUP_SEPARATOR);
        let selector = Selector::new(
            groups
                .next()
                .unwrap_or_default()
                .iter()
                .flat_map(|w| w.split_whitespace())
                .map(String::from),
        );
        let token = groups
            .next()
            .map(|words| words.join(" ").trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            kind,
            tags,
            selector,
            token,
        })
    }
}

/// Load, dispatch, finish
pub async fn reconcile(session: &Session, invocation: &Invocation) -> Result<Outcome> {
    tracing::debug!("[reconcile] Starting {}", invocation.kind);

    let resources = load_resources(
        session.search.as_ref(),
        &invocation.selector,
        &session.search_options,
    )
    .await?;

    let request = OperationRequest {
        kind: invocation.kind,
        tag_args: invocation.tags.clone(),
        resources,
    };

    let outcome = dispatch(session.tagging.as_ref(), &request).await?;
    tracing::info!("[reconcile] {} finished: {}", invocation.kind, outcome);

    Ok(outcome)
}
