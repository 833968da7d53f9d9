//! Selection policy: the first eligible post wins; videos are only
//! consulted when no post qualifies.

use crate::source::{parse_created_time, ContentSource};
use adpilot_core::types::{ContentItem, ContentKind};
use adpilot_core::{PipelineError, PipelineResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Picks one content item per orchestration run. A fetch failure from one
/// source is absorbed (treated as that source being empty) so an outage on
/// the video edge cannot mask a working post feed, and vice versa.
#[derive(Clone)]
pub struct ContentSelector {
    source: Arc<dyn ContentSource>,
}

impl ContentSelector {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn select(&self) -> PipelineResult<ContentItem> {
        let posts = match self.source.fetch_posts().await {
            Ok(posts) => posts,
            Err(e) => {
                warn!(error = %e, "Post fetch failed, treating post source as empty");
                Vec::new()
            }
        };

        for post in posts {
            let Some(message) = post.message else { continue };
            if message.trim().is_empty() {
                continue;
            }
            info!(kind = "post", "Selected content item");
            return Ok(ContentItem {
                kind: ContentKind::Post,
                text: message,
                image_url: post.full_picture,
                created_at: parse_created_time(post.created_time.as_deref()),
            });
        }

        let videos = match self.source.fetch_videos().await {
            Ok(videos) => videos,
            Err(e) => {
                warn!(error = %e, "Video fetch failed, treating video source as empty");
                Vec::new()
            }
        };

        for video in videos {
            if video.source.is_none() {
                continue;
            }
            info!(kind = "video", "Selected content item");
            return Ok(ContentItem {
                kind: ContentKind::Video,
                text: video.description.unwrap_or_default(),
                image_url: None,
                created_at: parse_created_time(video.created_time.as_deref()),
            });
        }

        Err(PipelineError::NoContentAvailable)
    }
}
