pub mod assemble;
pub mod binder;
pub mod document;
pub mod feed;
pub mod options;
pub mod page;
pub mod render;
pub mod template;

use chrono::{Datelike, Local};
use isahc::config::RedirectPolicy;
use isahc::prelude::Configurable;
use isahc::HttpClient;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::options::SiteOptions;
use crate::page::PageView;

/// Everything a page load needs that outlives a single page.
#[derive(Debug)]
pub struct Site {
    /// HTTP client used for the video feed.
    http_client: HttpClient,
    /// Configuration options of the site.
    options: SiteOptions,
}

#[derive(Debug, Error, Diagnostic)]
pub enum SiteError {
    #[error("Could not create HTTP client.")]
    HttpClient(#[from] isahc::Error),
}

impl Site {
    /// Create new site session with given options.
    pub fn with_options(options: SiteOptions) -> Result<Site, SiteError> {
        let http_client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::Follow)
            .build()?;

        Ok(Site {
            http_client,
            options,
        })
    }

    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    /// Standard page at `location`.
    pub fn open(&self, location: &str) -> PageView {
        PageView::standard(location, &self.options)
    }

    /// Run the page load of `view` for the current year.
    pub async fn load(&self, view: &mut PageView) {
        page::load(view, &self.http_client, &self.options, Local::now().year()).await
    }

    /// Fill only the video grid of `view`.
    pub async fn load_videos(&self, view: &mut PageView) {
        view.load_videos(&self.http_client, &self.options).await
    }
}

/// Record an analytics event.
pub fn track_event(name: &str, properties: &Value) {
    info!(target: "analytics", event = name, %properties, "event tracked");
}
