use std::path::PathBuf;

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use comfy_table::{presets, Attribute, Cell, CellAlignment, Table};
use deep_hockey::assemble::home_path;
use deep_hockey::document::{Anchor, Card, CardKind, Document};
use deep_hockey::options::SiteOptions;
use deep_hockey::page::PageView;
use deep_hockey::template::{footer, header};
use deep_hockey::Site;
use miette::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut options = SiteOptions::load(args.config.as_deref()).await?;
    if let Some(feed) = args.feed {
        options.feed_path = feed;
    }
    if let Some(base_url) = args.base_url {
        options.base_url = Some(base_url);
    }

    let site = Site::with_options(options)?;

    match args.command {
        Command::Prefix(Location { location }) => println!("{}", home_path(&location)),
        Command::Header(Location { location }) => {
            println!("{}", header(&home_path(&location), site.options()))
        }
        Command::Footer => println!("{}", footer(Local::now().year())),
        Command::Videos => {
            let mut view = site.open("/");
            site.load_videos(&mut view).await;

            let grid = &site.options().video_grid;
            println!("{}", view.document().inner_html(grid).unwrap_or_default());
        }
        Command::Preview(Preview {
            location,
            blog_cards,
            disabled_cards,
        }) => {
            let mut view = site.open(&location);
            let document = view.document_mut();
            for href in blog_cards {
                document.add_card(Card::new(CardKind::Blog).with_link(Anchor::card(href)));
            }
            for href in disabled_cards {
                document.add_card(Card::new(CardKind::Blog).with_link(Anchor::card(href).disabled()));
            }

            site.load(&mut view).await;

            display_page(&view, site.options());
        }
    }

    Ok(())
}

fn display_page(view: &PageView, options: &SiteOptions) {
    let document = view.document();

    for mount in [&options.header_mount, &options.video_grid, &options.footer_mount] {
        if let Some(html) = document.inner_html(mount) {
            println!("<!-- #{mount} -->{html}");
        }
    }

    println!("{}", cards_table(document));
}

fn cards_table(document: &Document) -> Table {
    let mut table = Table::new();

    table.load_preset(presets::NOTHING);
    table.set_header(
        ["Card", "Kind", "Link", "Focusable", "Listeners"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for id in document.card_ids() {
        let Some(card) = document.card(id) else {
            continue;
        };
        let link = card
            .primary_link()
            .and_then(|l| l.href.clone())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(id).set_alignment(CellAlignment::Right),
            Cell::new(card.kind.class()),
            Cell::new(link),
            Cell::new(if card.is_focusable() { "yes" } else { "no" }),
            Cell::new(document.listener_count(id)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

#[derive(Parser, Debug)]
#[command(name = "deep-hockey", about = "Preview page assembly of the Deep Hockey website")]
struct Args {
    /// Custom location of configuration file.
    #[arg(short, long, id = "FILE")]
    config: Option<PathBuf>,

    /// Location of the video feed (URL, or path relative to the base URL).
    #[arg(long, global = true)]
    feed: Option<String>,

    /// Address of the page the feed is resolved against.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
struct Location {
    /// Path or URL of the page.
    location: String,
}

#[derive(Parser, Debug)]
struct Preview {
    /// Path or URL of the page.
    #[arg(default_value = "/")]
    location: String,

    /// Add a static blog card linking to HREF (can be used repeatedly).
    #[arg(long = "blog-card", id = "HREF")]
    blog_cards: Vec<String>,

    /// Add a static blog card with a disabled link.
    #[arg(long = "disabled-card", id = "DISABLED_HREF")]
    disabled_cards: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the relative path from a page back to the site root.
    Prefix(Location),
    /// Print the header of a page.
    Header(Location),
    /// Print the footer.
    Footer,
    /// Fetch the feed and print the video grid.
    Videos,
    /// Simulate a complete page load.
    Preview(Preview),
}
