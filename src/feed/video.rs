use serde::Deserialize;

/// One video record of the feed. Every field may be missing; rendering
/// substitutes defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<Thumbnail>,
    /// Variant list as delivered by raw feeds.
    pub thumbnails: Option<Vec<ThumbnailVariant>>,
}

/// Thumbnail reference in either of the shapes feeds use.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Thumbnail {
    /// Pre-selected thumbnail.
    Single { url: Option<String> },
    /// Variants ordered from the lowest to the highest quality.
    Variants(Vec<ThumbnailVariant>),
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ThumbnailVariant {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ThumbnailVariant {
    fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

impl VideoEntry {
    /// Best available thumbnail: the explicit one, or the best of the
    /// variants (last, then second, then first).
    pub fn thumbnail_url(&self) -> Option<&str> {
        if let Some(Thumbnail::Single { url: Some(url) }) = &self.thumbnail {
            if !url.is_empty() {
                return Some(url);
            }
        }

        let variants = match &self.thumbnail {
            Some(Thumbnail::Variants(v)) => v.as_slice(),
            _ => self.thumbnails.as_deref().unwrap_or_default(),
        };

        variants
            .last()
            .and_then(ThumbnailVariant::url)
            .or_else(|| variants.get(1).and_then(ThumbnailVariant::url))
            .or_else(|| variants.first().and_then(ThumbnailVariant::url))
    }

    /// Whether the entry comes in the raw shape with thumbnail variants.
    pub fn has_variants(&self) -> bool {
        matches!(self.thumbnail, Some(Thumbnail::Variants(_))) || self.thumbnails.is_some()
    }
}
