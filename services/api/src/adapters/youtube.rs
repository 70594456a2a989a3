//! services/api/src/adapters/youtube.rs
//!
//! This module contains the adapter for the YouTube Data API `commentThreads` endpoint.
//! It implements the `CommentSource` port from the `core` crate.

use async_trait::async_trait;
use comment_lottery_core::domain::VideoId;
use comment_lottery_core::ports::{CommentPage, CommentSource, PortError, PortResult, RawComment};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `CommentSource` port over the YouTube Data API.
#[derive(Clone)]
pub struct YouTubeCommentAdapter {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeCommentAdapter {
    /// Creates a new `YouTubeCommentAdapter`.
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Builds the HTTP client used by the adapter; every request is bounded by `timeout`.
    pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(timeout).build()
    }
}

//=========================================================================================
// "Impure" Response Record Structs
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadListRecord {
    items: Option<Vec<CommentThreadRecord>>,
    next_page_token: Option<String>,
    error: Option<ApiErrorRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadRecord {
    snippet: CommentThreadSnippetRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippetRecord {
    top_level_comment: CommentRecord,
}

#[derive(Deserialize)]
struct CommentRecord {
    snippet: CommentSnippetRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippetRecord {
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    text_display: String,
    author_profile_image_url: Option<String>,
}
impl CommentThreadRecord {
    fn to_domain(self) -> RawComment {
        let snippet = self.snippet.top_level_comment.snippet;
        RawComment {
            author_display_name: snippet.author_display_name,
            text_display: snippet.text_display,
            author_profile_image_url: snippet
                .author_profile_image_url
                .filter(|url| !url.is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorRecord {
    code: Option<u16>,
    message: Option<String>,
}

/// Decodes a `commentThreads` response body.
///
/// An API error body has no `items` and decodes to a page without items.
pub fn parse_comment_page(body: &str) -> PortResult<CommentPage> {
    let record: CommentThreadListRecord = serde_json::from_str(body)
        .map_err(|e| PortError::Malformed(format!("commentThreads response: {}", e)))?;

    if let Some(error) = &record.error {
        warn!(
            code = ?error.code,
            message = error.message.as_deref().unwrap_or(""),
            "Comment source reported an error."
        );
    }

    Ok(CommentPage {
        items: record
            .items
            .map(|items| items.into_iter().map(CommentThreadRecord::to_domain).collect()),
        next_page_token: record.next_page_token,
    })
}

/// Maps a `reqwest` error, stripping the URL so the API key never reaches a log line.
fn port_error(e: reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Timeout
    } else {
        PortError::Unexpected(e.without_url().to_string())
    }
}

//=========================================================================================
// `CommentSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl CommentSource for YouTubeCommentAdapter {
    async fn fetch_comment_page(
        &self,
        video_id: &VideoId,
        page_token: Option<&str>,
    ) -> PortResult<CommentPage> {
        let url = format!("{}/commentThreads", self.base_url);
        let mut query = vec![
            ("key", self.api_key.as_str()),
            ("textFormat", "plainText"),
            ("part", "snippet"),
            ("videoId", video_id.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(port_error)?;

        let status = response.status();
        debug!(%video_id, %status, "commentThreads responded.");
        if status.is_server_error() {
            return Err(PortError::Unexpected(format!(
                "Comment source responded with {}",
                status
            )));
        }

        let body = response.text().await.map_err(port_error)?;
        parse_comment_page(&body)
    }
}
