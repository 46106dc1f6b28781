//! YouTube video ID extraction.
//!
//! Supported URL shapes:
//! - https://youtube.com/watch?v=VIDEO_ID (also `&v=` later in the query)
//! - https://youtu.be/VIDEO_ID
//! - https://youtube.com/embed/VIDEO_ID
//! - https://youtube.com/v/VIDEO_ID
//! - https://youtube.com/shorts/VIDEO_ID
//! - https://youtube.com/live/VIDEO_ID

use thiserror::Error;

/// Length of every YouTube video ID.
pub const YOUTUBE_ID_LEN: usize = 11;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YoutubeIdError {
    #[error("URL is not a valid YouTube URL")]
    InvalidYoutubeUrl,

    #[error("Video ID has invalid format")]
    InvalidVideoId,

    #[error("Video ID not found in URL")]
    VideoIdNotFound,
}

/// Result type for YouTube ID extraction.
pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// Markers that precede the video ID, in order of preference.
const ID_MARKERS: [&str; 7] = ["?v=", "&v=", "youtu.be/", "/embed/", "/v/", "/shorts/", "/live/"];

/// Extract the 11-character YouTube video ID from a URL.
pub fn extract_youtube_id(url: &str) -> YoutubeIdResult<String> {
    let url = url.trim();
    let lowered = url.to_ascii_lowercase();

    if !lowered.contains("youtube.com") && !lowered.contains("youtu.be") {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    }

    for marker in ID_MARKERS {
        // Markers are ASCII, so byte offsets from the lowered copy are valid in `url`.
        let Some(pos) = lowered.find(marker) else {
            continue;
        };
        let start = pos + marker.len();
        if start >= url.len() && marker != "?v=" && marker != "&v=" {
            continue;
        }

        let segment = &url[start..];
        let end = segment
            .find(['&', '#', '?', '/'])
            .unwrap_or(segment.len());
        let id = segment[..end].trim();

        return if is_valid_youtube_id(id) {
            Ok(id.to_string())
        } else {
            Err(YoutubeIdError::InvalidVideoId)
        };
    }

    Err(YoutubeIdError::VideoIdNotFound)
}

/// True if `id` looks like a YouTube video ID (11 chars of `[A-Za-z0-9_-]`).
pub fn is_valid_youtube_id(id: &str) -> bool {
    id.len() == YOUTUBE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
