//! Typed view of a finished task's `result` payload
//!
//! The backend returns a different shape per job category. Each shape is
//! recognised by explicit markers (`playlist: true`, `batch: true`) or, for
//! single downloads, by the presence of a download link or title.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One downloaded playlist entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    pub download_url: Option<String>,
}

/// Outcome of one URL inside a batch job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskResult {
    Playlist {
        videos: Vec<VideoEntry>,
    },
    Batch {
        total_urls: Option<i64>,
        completed: Option<i64>,
        failed: Option<i64>,
        items: Vec<BatchItem>,
    },
    Single {
        title: Option<String>,
        download_url: Option<String>,
        filename: Option<String>,
    },
    /// Missing result or a shape none of the categories recognise
    Unknown,
}

#[derive(Deserialize)]
struct RawResult {
    #[serde(default, deserialize_with = "crate::status::lenient::flag")]
    playlist: bool,
    #[serde(default, deserialize_with = "crate::status::lenient::flag")]
    batch: bool,
    #[serde(default)]
    videos: Option<Value>,
    #[serde(default)]
    results: Option<Value>,
    #[serde(default, deserialize_with = "crate::status::lenient::int")]
    total_urls: Option<i64>,
    #[serde(default, deserialize_with = "crate::status::lenient::int")]
    completed: Option<i64>,
    #[serde(default, deserialize_with = "crate::status::lenient::int")]
    failed: Option<i64>,
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    download_url: Option<String>,
    #[serde(default, deserialize_with = "crate::status::lenient::text")]
    filename: Option<String>,
}

impl TaskResult {
    /// Classify a raw `result` value. Never fails.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::Unknown;
        }
        let Ok(raw) = serde_json::from_value::<RawResult>(value.clone()) else {
            return Self::Unknown;
        };

        if raw.playlist {
            Self::Playlist {
                videos: entries(raw.videos.as_ref()),
            }
        } else if raw.batch {
            Self::Batch {
                total_urls: raw.total_urls,
                completed: raw.completed,
                failed: raw.failed,
                items: entries(raw.results.as_ref()),
            }
        } else if raw.download_url.is_some() || raw.title.is_some() || raw.filename.is_some() {
            Self::Single {
                title: raw.title,
                download_url: raw.download_url,
                filename: raw.filename,
            }
        } else {
            Self::Unknown
        }
    }
}

/// Parse every well-formed element of an array, skipping the rest
fn entries<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_playlist_result() {
        let result = TaskResult::from_value(&json!({
            "playlist": true,
            "videos": [
                {"title": "A", "download_url": "/x"},
                {"title": "B", "download_url": "/y"},
                "garbage"
            ]
        }));
        match result {
            TaskResult::Playlist { videos } => {
                assert_eq!(videos.len(), 2);
                assert_eq!(videos[0].title.as_deref(), Some("A"));
                assert_eq!(videos[1].download_url.as_deref(), Some("/y"));
            }
            other => panic!("expected playlist, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_result() {
        let result = TaskResult::from_value(&json!({
            "batch": true,
            "total_urls": 3,
            "completed": 2,
            "failed": 1,
            "results": [{"url": "u1", "status": "success"}, {"url": "u2", "status": "failed", "error": "x"}]
        }));
        assert_eq!(
            result,
            TaskResult::Batch {
                total_urls: Some(3),
                completed: Some(2),
                failed: Some(1),
                items: vec![
                    BatchItem {
                        url: Some("u1".into()),
                        status: Some("success".into()),
                        ..BatchItem::default()
                    },
                    BatchItem {
                        url: Some("u2".into()),
                        status: Some("failed".into()),
                        error: Some("x".into()),
                        ..BatchItem::default()
                    },
                ],
            }
        );
    }

    #[test]
    fn test_single_result() {
        let result = TaskResult::from_value(&json!({
            "title": "Song",
            "download_url": "/downloads/song.mp3",
            "filename": "song.mp3"
        }));
        assert!(matches!(
            result,
            TaskResult::Single { download_url: Some(ref url), .. } if url == "/downloads/song.mp3"
        ));
    }

    #[test]
    fn test_unrecognised_results() {
        assert_eq!(TaskResult::from_value(&json!(null)), TaskResult::Unknown);
        assert_eq!(TaskResult::from_value(&json!("done")), TaskResult::Unknown);
        assert_eq!(TaskResult::from_value(&json!({"x": 1})), TaskResult::Unknown);
    }
}
