use isahc::http::uri::InvalidUri;
use isahc::http::Uri;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::{Document, Fragment};
use crate::options::SiteOptions;
use crate::template::{footer, header};

/// Prefix used when the relative one cannot be computed.
pub const ROOT_FALLBACK: &str = "/";

#[derive(Debug, Error, Diagnostic)]
#[error("Location {location:?} is not a valid URI.")]
pub struct PathError {
    location: String,
    source: InvalidUri,
}

/// Relative path from the page at `location` back to the site root, such as
/// `./` or `../../`. `location` is a path or a full URL; query and
/// fragment are ignored, and so is a trailing file name.
pub fn try_home_path(location: &str) -> Result<String, PathError> {
    let location = location
        .split(|c: char| c == '?' || c == '#')
        .next()
        .filter(|l| !l.is_empty())
        .unwrap_or("/");

    // Only full URLs go through the URI parser; plain paths are split as they are.
    let path = if has_scheme(location) || location.starts_with("//") {
        let absolute = if location.starts_with("//") {
            format!("http:{location}")
        } else {
            location.to_string()
        };
        let uri = absolute.parse::<Uri>().map_err(|source| PathError {
            location: location.to_string(),
            source,
        })?;
        uri.path().to_string()
    } else {
        location.to_string()
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>();

    if segments.last().map_or(false, |s| s.contains('.')) {
        segments.pop();
    }

    if segments.is_empty() {
        Ok("./".to_string())
    } else {
        Ok("../".repeat(segments.len()))
    }
}

fn has_scheme(location: &str) -> bool {
    location.split_once("://").map_or(false, |(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Like [`try_home_path`], falling back to the absolute root.
pub fn home_path(location: &str) -> String {
    try_home_path(location).unwrap_or_else(|e| {
        warn!(error = %e, "could not compute home path, using fallback");
        ROOT_FALLBACK.to_string()
    })
}

/// Inject header and footer into their mount points. Pages without a mount
/// point simply do not get the fragment.
pub fn assemble(document: &mut Document, options: &SiteOptions, year: i32) {
    let home = home_path(document.location());

    if !document.replace_content(&options.header_mount, Fragment::markup(header(&home, options))) {
        debug!(mount = %options.header_mount, "no header mount point");
    }

    if !document.replace_content(&options.footer_mount, Fragment::markup(footer(year))) {
        debug!(mount = %options.footer_mount, "no footer mount point");
    }
}
