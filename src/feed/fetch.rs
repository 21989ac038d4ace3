use std::fmt;
use std::path::PathBuf;

use isahc::http::header::CONTENT_TYPE;
use isahc::prelude::*;
use isahc::HttpClient;
use mime::Mime;
use url::Url;

use super::FeedError;
use crate::options::SiteOptions;

/// Where the feed document lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedLocation {
    Http(Url),
    File(PathBuf),
}

impl FeedLocation {
    /// Resolve the configured feed path. Relative paths are resolved against
    /// the base URL when one is set, otherwise they name a local file.
    pub fn resolve(options: &SiteOptions) -> Result<FeedLocation, FeedError> {
        if let Some(base) = &options.base_url {
            return Ok(FeedLocation::Http(Url::parse(base)?.join(&options.feed_path)?));
        }

        match Url::parse(&options.feed_path) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(FeedLocation::Http(url)),
            _ => Ok(FeedLocation::File(PathBuf::from(&options.feed_path))),
        }
    }
}

impl fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedLocation::Http(url) => write!(f, "{url}"),
            FeedLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Raw feed document.
#[derive(Clone, Debug)]
pub struct Fetched {
    pub content_type: Option<Mime>,
    pub body: String,
}

/// Something that can retrieve the feed document.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, location: &FeedLocation) -> Result<Fetched, FeedError>;
}

impl Fetch for HttpClient {
    async fn fetch(&self, location: &FeedLocation) -> Result<Fetched, FeedError> {
        match location {
            FeedLocation::Http(url) => {
                let mut response = self.get_async(url.as_str()).await?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FeedError::Status(status));
                }

                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<Mime>().ok());
                let body = response.text().await?;

                Ok(Fetched { content_type, body })
            }
            FeedLocation::File(path) => {
                let content_type = match path.extension().and_then(|e| e.to_str()) {
                    Some("json") => Some(mime::APPLICATION_JSON),
                    _ => None,
                };
                let body = tokio::fs::read_to_string(path).await?;

                Ok(Fetched { content_type, body })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use isahc::http::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::page::PageView;
    use crate::render::FEED_PLACEHOLDER;

    /// Answer every connection with `response`.
    async fn serve(response: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        addr
    }

    fn client() -> HttpClient {
        HttpClient::builder()
            .proxy(None::<isahc::http::Uri>)
            .build()
            .unwrap()
    }

    const NOT_FOUND: &str =
        "HTTP/1.1 404 Not Found\r\nContent-Type: text/html\r\nContent-Length: 9\r\nConnection: close\r\n\r\nNot Found";

    #[tokio::test]
    async fn unsuccessful_status_is_an_error() {
        let addr = serve(NOT_FOUND).await;
        let location = FeedLocation::Http(Url::parse(&format!("http://{addr}/videos-clean.json")).unwrap());

        let result = client().fetch(&location).await;
        assert!(matches!(result, Err(FeedError::Status(StatusCode::NOT_FOUND))));
    }

    #[tokio::test]
    async fn unsuccessful_status_shows_placeholder() {
        let addr = serve(NOT_FOUND).await;
        let options = SiteOptions {
            base_url: Some(format!("http://{addr}/index.html")),
            ..Default::default()
        };

        let mut view = PageView::standard("/", &options);
        view.load_videos(&client(), &options).await;

        assert_eq!(view.document().inner_html("video-grid"), Some(FEED_PLACEHOLDER));
        assert!(view.document().cards_in("video-grid").is_empty());
    }

    #[tokio::test]
    async fn fetch_over_http() {
        let addr = serve(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 14\r\nConnection: close\r\n\r\n{\"videos\": []}",
        )
        .await;
        let location = FeedLocation::Http(Url::parse(&format!("http://{addr}/videos-clean.json")).unwrap());

        let fetched = client().fetch(&location).await.unwrap();
        assert_eq!(fetched.content_type, Some(mime::APPLICATION_JSON));
        assert_eq!(fetched.body, r#"{"videos": []}"#);
    }

    #[test]
    fn resolve_against_base_url() {
        let options = SiteOptions {
            base_url: Some("https://deephockey.com/index.html".to_string()),
            ..Default::default()
        };
        assert_eq!(
            FeedLocation::resolve(&options).unwrap(),
            FeedLocation::Http(Url::parse("https://deephockey.com/videos-clean.json").unwrap())
        );
    }

    #[test]
    fn resolve_without_base_url() {
        let options = SiteOptions::default();
        assert_eq!(
            FeedLocation::resolve(&options).unwrap(),
            FeedLocation::File(PathBuf::from("./videos-clean.json"))
        );

        let options = SiteOptions {
            feed_path: "http://localhost:8000/videos.json".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            FeedLocation::resolve(&options).unwrap(),
            FeedLocation::Http(_)
        ));
    }

    #[test]
    fn invalid_base_url() {
        let options = SiteOptions {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            FeedLocation::resolve(&options),
            Err(FeedError::Address(_))
        ));
    }

    #[tokio::test]
    async fn fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.json");
        std::fs::write(&path, r#"{"videos": []}"#).unwrap();

        let client = HttpClient::new().unwrap();
        let fetched = client.fetch(&FeedLocation::File(path)).await.unwrap();

        assert_eq!(fetched.content_type, Some(mime::APPLICATION_JSON));
        assert_eq!(fetched.body, r#"{"videos": []}"#);
    }
}
