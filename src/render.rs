use std::sync::OnceLock;

use regex::Regex;
use url::form_urlencoded::byte_serialize;

use crate::document::{Anchor, Card, CardKind, Fragment};
use crate::feed::VideoEntry;

pub const PLACEHOLDER_THUMBNAIL: &str = "https://placehold.co/320x180/1F2937/E5E7EB?text=Video";
pub const UNTITLED: &str = "Untitled Video";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Shown in the grid when the feed cannot be used.
pub const FEED_PLACEHOLDER: &str = r#"<p style="color: #9CA3AF; text-align: center; grid-column: 1 / -1;">Videos coming soon...</p>"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptionFormat {
    Verbatim,
    /// Keep at most this many characters, followed by an ellipsis.
    Truncate(usize),
}

fn hashtag() -> &'static Regex {
    static HASHTAG: OnceLock<Regex> = OnceLock::new();
    HASHTAG.get_or_init(|| Regex::new(r"#[A-Za-z0-9_]+").expect("valid hashtag regex"))
}

/// Title without hashtags and surrounding whitespace.
pub fn clean_title(title: Option<&str>) -> String {
    let cleaned = title
        .map(|t| hashtag().replace_all(t, "").trim().to_string())
        .unwrap_or_default();

    if cleaned.is_empty() {
        UNTITLED.to_string()
    } else {
        cleaned
    }
}

pub fn description(description: Option<&str>, format: DescriptionFormat) -> String {
    let Some(description) = description.filter(|d| !d.is_empty()) else {
        return NO_DESCRIPTION.to_string();
    };

    match format {
        DescriptionFormat::Truncate(budget) if description.chars().count() > budget => {
            let mut short = description.chars().take(budget).collect::<String>();
            short.push_str("...");
            short
        }
        _ => description.to_string(),
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL}{}", byte_serialize(video_id.as_bytes()).collect::<String>())
}

/// Markup and card of one video. Entries without an identifier get no link.
pub fn video_card(entry: &VideoEntry, format: DescriptionFormat) -> (String, Card) {
    let thumbnail = entry.thumbnail_url().unwrap_or(PLACEHOLDER_THUMBNAIL);
    let title = html_escape(&clean_title(entry.title.as_deref()));
    let description = html_escape(&description(entry.description.as_deref(), format));

    let link = entry
        .video_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| Anchor::video(watch_url(id)));

    let anchor = match &link {
        Some(Anchor {
            href: Some(href), ..
        }) => format!(
            r#"
                    <a href="{}" target="_blank" rel="noopener noreferrer" class="video-link">Watch Video →</a>"#,
            html_escape(href)
        ),
        _ => String::new(),
    };

    let html = format!(
        r#"
            <article class="{class}">
                <img src="{thumbnail}" alt="{title}" class="video-thumbnail">
                <div class="video-content">
                    <h3 class="video-title">{title}</h3>
                    <p class="video-description">{description}</p>{anchor}
                </div>
            </article>
        "#,
        class = CardKind::Video.class(),
        thumbnail = html_escape(thumbnail),
    );

    let card = Card {
        link,
        ..Card::new(CardKind::Video)
    };

    (html, card)
}

/// Content of the video grid for `videos`.
pub fn video_grid(videos: &[VideoEntry], format: DescriptionFormat) -> Fragment {
    let (html, cards): (Vec<String>, Vec<Card>) =
        videos.iter().map(|v| video_card(v, format)).unzip();

    Fragment {
        html: html.concat(),
        cards,
    }
}

pub fn placeholder() -> Fragment {
    Fragment::markup(FEED_PLACEHOLDER)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
