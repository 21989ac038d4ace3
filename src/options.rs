use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::read_to_string;

use crate::feed::FeedSchema;
use crate::render::DescriptionFormat;

/// Configuration options of the site.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteOptions {
    /// Address of the page the feed path is resolved against. Without it,
    /// the feed path is either an absolute URL or a local file.
    pub base_url: Option<String>,
    /// Location of the video feed.
    pub feed_path: String,
    /// Maximum number of videos shown in the grid.
    pub max_videos: usize,
    /// Mount point of the header.
    pub header_mount: String,
    /// Mount point of the footer.
    pub footer_mount: String,
    /// Mount point of the video grid.
    pub video_grid: String,
    /// External channel linked from the navigation.
    pub channel_url: String,
    /// How video descriptions are shown.
    pub description: DescriptionPolicy,
    /// Number of characters kept when descriptions are truncated.
    pub description_budget: usize,
}

impl Default for SiteOptions {
    fn default() -> Self {
        SiteOptions {
            base_url: None,
            feed_path: "./videos-clean.json".to_string(),
            max_videos: 6,
            header_mount: "main-header".to_string(),
            footer_mount: "main-footer".to_string(),
            video_grid: "video-grid".to_string(),
            channel_url: "https://www.youtube.com/@DeeperHockey/shorts".to_string(),
            description: DescriptionPolicy::Auto,
            description_budget: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionPolicy {
    /// Decide by the shape of the feed.
    #[default]
    Auto,
    Verbatim,
    Truncate,
}

#[derive(Debug, Error, Diagnostic)]
pub enum OptionsError {
    #[error("Could not read configuration file {path}.")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse configuration file.")]
    Parse(#[from] toml::de::Error),
}

impl SiteOptions {
    /// Load options from `config`, or from `config.toml` in the platform
    /// configuration directory. A missing default file means default options.
    pub async fn load(config: Option<&Path>) -> Result<SiteOptions, OptionsError> {
        match config {
            Some(path) => {
                let s = read_to_string(path).await.map_err(|source| OptionsError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(toml::from_str(&s)?)
            }
            None => match ProjectDirs::from("com.deephockey", "", "DeepHockey") {
                Some(dirs) => match read_to_string(dirs.config_dir().join("config.toml")).await {
                    Ok(s) => Ok(toml::from_str(&s)?),
                    Err(_) => Ok(Default::default()),
                },
                None => Ok(Default::default()),
            },
        }
    }

    /// Description format for a feed of given `schema`.
    pub fn description_format(&self, schema: FeedSchema) -> DescriptionFormat {
        match (self.description, schema) {
            (DescriptionPolicy::Verbatim, _) | (DescriptionPolicy::Auto, FeedSchema::Clean) => {
                DescriptionFormat::Verbatim
            }
            (DescriptionPolicy::Truncate, _) | (DescriptionPolicy::Auto, FeedSchema::Raw) => {
                DescriptionFormat::Truncate(self.description_budget)
            }
        }
    }
}
