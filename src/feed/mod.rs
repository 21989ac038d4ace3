pub mod fetch;
pub mod video;

use isahc::http::StatusCode;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub use fetch::{FeedLocation, Fetch, Fetched};
pub use video::{Thumbnail, ThumbnailVariant, VideoEntry};

#[derive(Debug, Error, Diagnostic)]
pub enum FeedError {
    #[error("Invalid feed address.")]
    Address(#[from] url::ParseError),

    #[error("Could not download the video feed.")]
    Http(#[from] isahc::Error),

    #[error("Feed request failed with status {0}.")]
    Status(StatusCode),

    #[error("Could not read the video feed.")]
    Io(#[from] std::io::Error),

    #[error("Video feed is not valid.")]
    Json(#[from] serde_json::Error),

    #[error("Video feed does not contain a list of videos.")]
    MissingVideos,

    #[error("Video feed contains no videos.")]
    Empty,
}

/// Shapes of feeds in circulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedSchema {
    /// Cleaned feed: one pre-selected thumbnail per video.
    Clean,
    /// Raw feed: thumbnail variants per video.
    Raw,
}

impl FeedSchema {
    pub fn detect(videos: &[VideoEntry]) -> FeedSchema {
        if videos.iter().any(VideoEntry::has_variants) {
            FeedSchema::Raw
        } else {
            FeedSchema::Clean
        }
    }
}

/// Videos selected for display.
#[derive(Clone, Debug)]
pub struct Feed {
    pub schema: FeedSchema,
    pub videos: Vec<VideoEntry>,
}

/// Parse feed document and keep its first `limit` videos. Entries past the
/// limit are not looked at.
pub fn parse_feed(body: &str, limit: usize) -> Result<Feed, FeedError> {
    let document: Value = serde_json::from_str(body)?;

    let videos = document
        .get("videos")
        .and_then(Value::as_array)
        .ok_or(FeedError::MissingVideos)?;

    if videos.is_empty() {
        return Err(FeedError::Empty);
    }

    let videos = videos
        .iter()
        .take(limit)
        .cloned()
        .map(serde_json::from_value)
        .collect::<Result<Vec<VideoEntry>, _>>()?;

    Ok(Feed {
        schema: FeedSchema::detect(&videos),
        videos,
    })
}

/// Retrieve and parse the feed at `location`.
pub async fn fetch_feed<F: Fetch>(
    fetcher: &F,
    location: &FeedLocation,
    limit: usize,
) -> Result<Feed, FeedError> {
    let fetched = fetcher.fetch(location).await?;

    if let Some(ct) = &fetched.content_type {
        if ct.subtype() != mime::JSON && ct.suffix() != Some(mime::JSON) {
            warn!(%location, content_type = %ct, "feed is not served as JSON");
        }
    }

    parse_feed(&fetched.body, limit)
}
