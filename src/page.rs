use tracing::{debug, error};

use crate::assemble::assemble;
use crate::binder::CardBinder;
use crate::document::Document;
use crate::feed::{fetch_feed, Feed, FeedError, FeedLocation, Fetch};
use crate::options::SiteOptions;
use crate::render::{placeholder, video_grid};

/// One page view: the document and the cards bound in it so far.
#[derive(Debug)]
pub struct PageView {
    document: Document,
    binder: CardBinder,
}

impl PageView {
    pub fn new(document: Document) -> PageView {
        PageView {
            document,
            binder: CardBinder::new(),
        }
    }

    /// Page at `location` with header, footer and video grid mount points.
    pub fn standard(location: &str, options: &SiteOptions) -> PageView {
        PageView::new(
            Document::new(location)
                .with_mount(&options.header_mount)
                .with_mount(&options.video_grid)
                .with_mount(&options.footer_mount),
        )
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn binder(&self) -> &CardBinder {
        &self.binder
    }

    /// Header, footer and the cards already present in the page.
    pub fn initialize(&mut self, options: &SiteOptions, year: i32) {
        assemble(&mut self.document, options, year);
        self.binder.bind(&mut self.document);
    }

    /// Fetch the feed and fill the video grid, or show the placeholder when
    /// the feed cannot be used. Never fails.
    pub async fn load_videos<F: Fetch>(&mut self, fetcher: &F, options: &SiteOptions) {
        let feed = match FeedLocation::resolve(options) {
            Ok(location) => fetch_feed(fetcher, &location, options.max_videos).await,
            Err(e) => Err(e),
        };

        match feed {
            Ok(feed) => self.show_videos(feed, options),
            Err(e) => self.show_placeholder(&e, options),
        }
    }

    fn show_videos(&mut self, feed: Feed, options: &SiteOptions) {
        let format = options.description_format(feed.schema);

        if self
            .document
            .replace_content(&options.video_grid, video_grid(&feed.videos, format))
        {
            self.binder.bind(&mut self.document);
        } else {
            debug!(mount = %options.video_grid, "no video grid mount point");
        }
    }

    fn show_placeholder(&mut self, e: &FeedError, options: &SiteOptions) {
        error!(error = %e, "error loading videos");
        self.document.replace_content(&options.video_grid, placeholder());
    }
}

/// Run the whole page load: header and footer first, then static cards,
/// then videos. Everything before the fetch is done synchronously.
pub async fn load<F: Fetch>(view: &mut PageView, fetcher: &F, options: &SiteOptions, year: i32) {
    view.initialize(options, year);
    view.load_videos(fetcher, options).await;
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::*;
    use crate::document::{Activation, Anchor, Card, CardKind};
    use crate::feed::Fetched;
    use crate::render::FEED_PLACEHOLDER;

    /// Feed served from memory.
    struct StaticFeed {
        body: Result<&'static str, ()>,
        calls: Cell<usize>,
    }

    impl StaticFeed {
        fn new(body: &'static str) -> StaticFeed {
            StaticFeed {
                body: Ok(body),
                calls: Cell::new(0),
            }
        }

        fn unreachable() -> StaticFeed {
            StaticFeed {
                body: Err(()),
                calls: Cell::new(0),
            }
        }
    }

    impl Fetch for StaticFeed {
        async fn fetch(&self, _location: &FeedLocation) -> Result<Fetched, FeedError> {
            self.calls.set(self.calls.get() + 1);
            match self.body {
                Ok(body) => Ok(Fetched {
                    content_type: Some(mime::APPLICATION_JSON),
                    body: body.to_string(),
                }),
                Err(()) => Err(FeedError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
            }
        }
    }

    const ONE_VIDEO: &str =
        r#"{"videos": [{"videoId": "abc", "title": "Great Goal #nhl", "description": "desc"}]}"#;

    fn view(location: &str) -> PageView {
        let options = SiteOptions::default();
        let mut view = PageView::standard(location, &options);
        view.document_mut()
            .add_card(Card::new(CardKind::Blog).with_link(Anchor::card("blog/post.html")));
        view
    }

    #[tokio::test]
    async fn full_page_load() {
        let options = SiteOptions::default();
        let feed = StaticFeed::new(ONE_VIDEO);
        let mut view = view("/");

        load(&mut view, &feed, &options, 2026).await;

        let doc = view.document();
        assert!(doc.inner_html("main-header").unwrap().contains("./about.html"));
        assert!(doc.inner_html("main-footer").unwrap().contains("2026"));

        let grid = doc.inner_html("video-grid").unwrap();
        assert!(grid.contains(r#"<h3 class="video-title">Great Goal</h3>"#));
        assert!(grid.contains("https://www.youtube.com/watch?v=abc"));

        let videos = doc.cards_in("video-grid");
        assert_eq!(videos.len(), 1);
        assert_eq!(feed.calls.get(), 1);

        for id in doc.card_ids() {
            assert!(view.binder().is_bound(id));
            assert_eq!(doc.listener_count(id), 2);
        }
    }

    #[tokio::test]
    async fn video_cards_activate_watch_page() {
        let options = SiteOptions::default();
        let mut view = view("/");
        load(&mut view, &StaticFeed::new(ONE_VIDEO), &options, 2026).await;

        let video = view.document().cards_in("video-grid")[0];
        let dispatch = view.document_mut().dispatch_key(video, "Enter");

        assert_eq!(dispatch.invoked, 1);
        assert_eq!(
            view.document().activations(),
            &[Activation::Open {
                url: "https://www.youtube.com/watch?v=abc".to_string(),
                target: "_blank".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn static_cards_are_not_bound_twice() {
        let options = SiteOptions::default();
        let mut view = view("/");
        load(&mut view, &StaticFeed::new(ONE_VIDEO), &options, 2026).await;
        view.load_videos(&StaticFeed::new(ONE_VIDEO), &options).await;

        let blog = view.document().card_ids()[0];
        assert_eq!(view.document().listener_count(blog), 2);

        let dispatch = view.document_mut().dispatch_key(blog, "Enter");
        assert_eq!(dispatch.invoked, 1);
        assert_eq!(view.document().activations().len(), 1);
    }

    #[tokio::test]
    async fn at_most_six_videos() {
        let options = SiteOptions::default();
        let mut view = view("/");
        let feed = StaticFeed::new(
            r#"{"videos": [
                {"videoId": "1"}, {"videoId": "2"}, {"videoId": "3"}, {"videoId": "4"},
                {"videoId": "5"}, {"videoId": "6"}, {"videoId": "7"}, {"videoId": "8"}
            ]}"#,
        );
        load(&mut view, &feed, &options, 2026).await;

        let doc = view.document();
        let urls = doc
            .cards_in("video-grid")
            .into_iter()
            .filter_map(|id| doc.card(id)?.primary_link()?.href.clone())
            .collect::<Vec<_>>();
        let expected = (1..=6)
            .map(|i| format!("https://www.youtube.com/watch?v={i}"))
            .collect::<Vec<_>>();
        assert_eq!(urls, expected);
    }

    #[tokio::test]
    async fn unusable_feeds_show_placeholder() {
        let options = SiteOptions::default();

        for feed in [
            StaticFeed::new(r#"{"videos": []}"#),
            StaticFeed::new(r#"{"title": "no videos"}"#),
            StaticFeed::new("<!doctype html>"),
            StaticFeed::unreachable(),
        ] {
            let mut view = view("/blog/post.html");
            load(&mut view, &feed, &options, 2026).await;

            let doc = view.document();
            assert_eq!(doc.inner_html("video-grid"), Some(FEED_PLACEHOLDER));
            assert!(doc.cards_in("video-grid").is_empty());
            assert!(doc.inner_html("main-header").unwrap().contains("../about.html"));
        }
    }

    #[tokio::test]
    async fn page_without_grid_is_left_alone() {
        let options = SiteOptions::default();
        let mut view = PageView::new(Document::new("/about.html").with_mount("main-header"));
        load(&mut view, &StaticFeed::new(ONE_VIDEO), &options, 2026).await;

        assert!(view.document().card_ids().is_empty());
        assert!(view.document().inner_html("main-header").is_some());
    }

    #[tokio::test]
    async fn invalid_feed_address_shows_placeholder() {
        let options = SiteOptions {
            base_url: Some("::".to_string()),
            ..Default::default()
        };
        let feed = StaticFeed::new(ONE_VIDEO);
        let mut view = view("/");
        load(&mut view, &feed, &options, 2026).await;

        assert_eq!(feed.calls.get(), 0);
        assert_eq!(view.document().inner_html("video-grid"), Some(FEED_PLACEHOLDER));
    }
}
