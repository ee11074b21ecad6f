//! clean-unused-tags

use super::Outcome;
use crate::ibm::service::TaggingService;
use anyhow::Result;

/// Delete every tag without attachments, account wide
pub async fn clean_unused_tags(tagging: &dyn TaggingService) -> Result<Outcome> {
    let removed = tagging.delete_unused_tags().await?;
    tracing::info!("[clean-unused-tags] Removed {} unused tag(s)", removed);
    Ok(Outcome::Pruned { removed })
}
