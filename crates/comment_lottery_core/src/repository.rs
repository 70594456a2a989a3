//! crates/comment_lottery_core/src/repository.rs
//!
//! Wraps the comment source, shapes raw comments into entries, and
//! deduplicates commenters.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{CommentEntry, CommentPool, VideoId};
use crate::error::FetchError;
use crate::ports::{CommentSource, RawComment};

#[derive(Clone)]
pub struct CommentRepository {
    source: Arc<dyn CommentSource>,
}

impl CommentRepository {
    pub fn new(source: Arc<dyn CommentSource>) -> Self {
        Self { source }
    }

    /// Fetches the first page of comment threads and returns the deduplicated pool.
    ///
    /// Issues exactly one request; there is no retry here.
    pub async fn fetch(&self, video_id: &VideoId) -> Result<CommentPool, FetchError> {
        let page = self.source.fetch_comment_page(video_id, None).await?;

        let items = match page.items {
            Some(items) if !items.is_empty() => items,
            _ => {
                info!(%video_id, "Comment source returned no items.");
                return Err(FetchError::NoComments);
            }
        };

        let fetched = items.len();
        let entries = dedup_by_author(items);
        debug!(%video_id, fetched, distinct = entries.len(), "Deduplicated commenters.");

        Ok(CommentPool::new(entries))
    }
}

/// Keeps the first comment per author, in source order.
///
/// Comments without an author name are dropped, since the name is the
/// deduplication key.
pub fn dedup_by_author(candidates: impl IntoIterator<Item = RawComment>) -> Vec<CommentEntry> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|raw| !raw.author_display_name.trim().is_empty())
        .filter(|raw| seen.insert(raw.author_display_name.clone()))
        .map(|raw| CommentEntry {
            author: raw.author_display_name,
            text: raw.text_display,
            avatar_url: raw.author_profile_image_url,
        })
        .collect()
}
