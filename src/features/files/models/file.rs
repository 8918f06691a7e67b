use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File category derived from the payload's declared MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

impl FileCategory {
    /// Derive the category from a declared MIME type.
    ///
    /// Empty or unknown MIME types fall back to `Other`.
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.is_empty() {
            return FileCategory::Other;
        }

        if mime_type.starts_with("image/") {
            return FileCategory::Image;
        }
        if mime_type.starts_with("video/") {
            return FileCategory::Video;
        }
        if mime_type.starts_with("audio/") {
            return FileCategory::Audio;
        }
        if mime_type.contains("pdf")
            || mime_type.contains("document")
            || mime_type.contains("text")
            || mime_type.contains("msword")
            || mime_type.contains("wordprocessingml")
            || mime_type.contains("spreadsheet")
            || mime_type.contains("presentation")
        {
            return FileCategory::Document;
        }

        FileCategory::Other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
            FileCategory::Document => "document",
            FileCategory::Other => "other",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog record for an uploaded file.
///
/// `owner` is immutable after creation; `users` membership and `name`
/// are the only permitted mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    /// Retrievable view URL of the underlying blob
    pub url: String,
    #[serde(rename = "type")]
    pub category: FileCategory,
    #[serde(default)]
    pub extension: String,
    pub size: u64,
    #[serde(rename = "bucketField")]
    pub bucket_field: String,
    #[serde(rename = "accountId", default)]
    pub account_id: String,
    /// Owning catalog-user identifier; set exactly once at creation
    pub owner: String,
    /// Sharing set: grants read visibility, never mutate/delete rights
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Blob identifier parsed back out of the stored view URL
    /// (`…/storage/buckets/{bucket}/files/{id}/view`).
    pub fn blob_id(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let segments: Vec<&str> = parsed.path_segments()?.collect();
        segments
            .iter()
            .position(|s| *s == "files")
            .and_then(|i| segments.get(i + 1))
            .map(|s| s.to_string())
    }
}

/// Per-category usage bucket
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryUsage {
    pub size: u64,
    /// Most recent record creation in this category
    pub latest: Option<DateTime<Utc>>,
}

/// One presentation entry in a category summary
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: FileCategory,
    pub size: u64,
    pub latest: Option<DateTime<Utc>>,
}

/// Aggregate storage usage across all records visible to a user.
///
/// Exposes raw per-category sizes (video and audio separately); the
/// video/audio merge is a presentation concern, see `merged_media`.
#[derive(Debug, Clone, Serialize)]
pub struct UsageSummary {
    pub per_category: HashMap<FileCategory, CategoryUsage>,
    pub total_used: u64,
    pub total_capacity: u64,
}

impl UsageSummary {
    pub fn new(total_capacity: u64) -> Self {
        Self {
            per_category: HashMap::new(),
            total_used: 0,
            total_capacity,
        }
    }

    /// Fold one record into the summary
    pub fn record(&mut self, category: FileCategory, size: u64, created_at: DateTime<Utc>) {
        let bucket = self.per_category.entry(category).or_default();
        bucket.size += size;
        bucket.latest = Some(match bucket.latest {
            Some(latest) if latest > created_at => latest,
            _ => created_at,
        });
        self.total_used += size;
    }

    pub fn category(&self, category: FileCategory) -> CategoryUsage {
        self.per_category.get(&category).cloned().unwrap_or_default()
    }

    /// Presentation summary with audio folded into the video bucket:
    /// sizes summed, latest timestamp taken as the max of the two.
    pub fn merged_media(&self) -> Vec<CategorySummary> {
        let display_order = [
            FileCategory::Document,
            FileCategory::Image,
            FileCategory::Video,
            FileCategory::Other,
        ];

        display_order
            .iter()
            .filter_map(|&category| {
                if category == FileCategory::Video {
                    let video = self.per_category.get(&FileCategory::Video);
                    let audio = self.per_category.get(&FileCategory::Audio);
                    if video.is_none() && audio.is_none() {
                        return None;
                    }
                    let size = video.map(|u| u.size).unwrap_or(0)
                        + audio.map(|u| u.size).unwrap_or(0);
                    let latest = match (
                        video.and_then(|u| u.latest),
                        audio.and_then(|u| u.latest),
                    ) {
                        (Some(a), Some(b)) => Some(a.max(b)),
                        (a, b) => a.or(b),
                    };
                    return Some(CategorySummary {
                        category,
                        size,
                        latest,
                    });
                }

                let usage = self.per_category.get(&category)?;
                Some(CategorySummary {
                    category,
                    size: usage.size,
                    latest: usage.latest,
                })
            })
            .collect()
    }
}
