use crate::scrapers::types::{Group, GroupPage};
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for group feed sources
/// Lets the pipeline run against plain HTTP, a headless browser or canned pages
#[async_trait]
pub trait GroupSource: Send + Sync {
    /// Fetch one page of the group feed. `cursor` is the `next_page` of the previous page,
    /// `None` for the first one.
    async fn fetch_page(&self, group: &Group, cursor: Option<&str>) -> Result<GroupPage>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}
