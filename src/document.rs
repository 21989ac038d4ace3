use std::collections::HashMap;
use std::fmt;

use serde_json::json;

use crate::binder::{Event, Listener};

/// Identity of a card element within a [`Document`]. Identities are never
/// reused, so a card created by replacing content is always a new card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kinds of elements that behave as cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardKind {
    Blog,
    Video,
}

impl CardKind {
    pub fn class(&self) -> &'static str {
        match self {
            CardKind::Blog => "blog-card",
            CardKind::Video => "video-card",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkClass {
    /// `card-link`, used by blog cards. Can be disabled.
    Card,
    /// `video-link`, used by video cards.
    Video,
}

/// Anchor embedded in a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub class: LinkClass,
    pub href: Option<String>,
    /// Carries the `card-link-disabled` class.
    pub disabled: bool,
    /// Browsing context the link opens in, such as `_blank`.
    pub target: Option<String>,
}

impl Anchor {
    pub fn card(href: impl Into<String>) -> Anchor {
        Anchor {
            class: LinkClass::Card,
            href: Some(href.into()),
            disabled: false,
            target: None,
        }
    }

    pub fn video(href: impl Into<String>) -> Anchor {
        Anchor {
            class: LinkClass::Video,
            href: Some(href.into()),
            disabled: false,
            target: Some("_blank".to_string()),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Anchor {
        self.target = Some(target.into());
        self
    }

    pub fn disabled(mut self) -> Anchor {
        self.disabled = true;
        self
    }

    /// Whether this anchor may act as the activation target of its card.
    pub fn is_primary(&self) -> bool {
        self.href.is_some()
            && match self.class {
                LinkClass::Card => !self.disabled,
                LinkClass::Video => true,
            }
    }

    /// What following this anchor does: navigate in place, or open a new
    /// browsing context when a target is set.
    pub fn activation(&self) -> Option<Activation> {
        let url = self.href.clone()?;
        Some(match &self.target {
            Some(target) => Activation::Open {
                url,
                target: target.clone(),
            },
            None => Activation::Navigate { url },
        })
    }
}

/// Card-like element with at most one embedded link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub kind: CardKind,
    pub link: Option<Anchor>,
    pub tab_index: Option<i32>,
    pub pointer_cursor: bool,
}

impl Card {
    pub fn new(kind: CardKind) -> Card {
        Card {
            kind,
            link: None,
            tab_index: None,
            pointer_cursor: false,
        }
    }

    pub fn with_link(mut self, link: Anchor) -> Card {
        self.link = Some(link);
        self
    }

    pub fn primary_link(&self) -> Option<&Anchor> {
        self.link.as_ref().filter(|l| l.is_primary())
    }

    pub fn is_focusable(&self) -> bool {
        self.tab_index.map_or(false, |i| i >= 0)
    }
}

/// Effect of activating a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    Navigate { url: String },
    Open { url: String, target: String },
}

impl Activation {
    pub fn url(&self) -> &str {
        match self {
            Activation::Navigate { url } | Activation::Open { url, .. } => url,
        }
    }
}

/// Where inside a card a click landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    /// Directly on the card's anchor.
    Link,
    /// Anywhere else on the card.
    Body,
}

/// Outcome of dispatching one event to a card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Number of listeners that received the event.
    pub invoked: usize,
    pub default_prevented: bool,
}

/// Generated markup together with the cards it contains.
#[derive(Clone, Debug, Default)]
pub struct Fragment {
    pub html: String,
    pub cards: Vec<Card>,
}

impl Fragment {
    pub fn markup(html: impl Into<String>) -> Fragment {
        Fragment {
            html: html.into(),
            cards: vec![],
        }
    }
}

#[derive(Debug)]
struct Element {
    id: CardId,
    /// Mount point that owns the card, `None` for cards that are part of the
    /// static page.
    mount: Option<String>,
    card: Card,
}

/// In-memory page: mount points whose content gets replaced, cards,
/// listeners attached to cards and a log of link activations.
#[derive(Debug)]
pub struct Document {
    location: String,
    mounts: HashMap<String, String>,
    elements: Vec<Element>,
    listeners: HashMap<CardId, Vec<Listener>>,
    activations: Vec<Activation>,
    next_id: u64,
}

impl Document {
    /// Create an empty document loaded from `location`.
    pub fn new(location: impl Into<String>) -> Document {
        Document {
            location: location.into(),
            mounts: HashMap::new(),
            elements: vec![],
            listeners: HashMap::new(),
            activations: vec![],
            next_id: 0,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn with_mount(mut self, id: impl Into<String>) -> Document {
        self.add_mount(id);
        self
    }

    pub fn add_mount(&mut self, id: impl Into<String>) {
        self.mounts.entry(id.into()).or_default();
    }

    pub fn has_mount(&self, id: &str) -> bool {
        self.mounts.contains_key(id)
    }

    /// Current markup of mount point `id`.
    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.mounts.get(id).map(String::as_str)
    }

    /// Add a card that is part of the static page.
    pub fn add_card(&mut self, card: Card) -> CardId {
        self.insert(None, card)
    }

    fn insert(&mut self, mount: Option<String>, card: Card) -> CardId {
        let id = CardId(self.next_id);
        self.next_id += 1;
        self.elements.push(Element { id, mount, card });
        id
    }

    /// Replace whole content of mount point `id` with `fragment`. Cards
    /// previously rendered into the mount are removed with their listeners.
    /// Returns `false` when the document has no such mount point.
    pub fn replace_content(&mut self, id: &str, fragment: Fragment) -> bool {
        match self.mounts.get_mut(id) {
            Some(html) => *html = fragment.html,
            None => return false,
        }

        let listeners = &mut self.listeners;
        self.elements.retain(|e| {
            let owned = e.mount.as_deref() == Some(id);
            if owned {
                listeners.remove(&e.id);
            }
            !owned
        });

        for card in fragment.cards {
            self.insert(Some(id.to_string()), card);
        }

        true
    }

    /// Identities of all cards in document order.
    pub fn card_ids(&self) -> Vec<CardId> {
        self.elements.iter().map(|e| e.id).collect()
    }

    /// Identities of cards rendered into mount point `mount`.
    pub fn cards_in(&self, mount: &str) -> Vec<CardId> {
        self.elements
            .iter()
            .filter(|e| e.mount.as_deref() == Some(mount))
            .map(|e| e.id)
            .collect()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.elements.iter().find(|e| e.id == id).map(|e| &e.card)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.card)
    }

    pub fn add_listener(&mut self, id: CardId, listener: Listener) {
        self.listeners.entry(id).or_default().push(listener);
    }

    pub fn listener_count(&self, id: CardId) -> usize {
        self.listeners.get(&id).map_or(0, Vec::len)
    }

    /// Deliver a key press to card `id`. `key` is the DOM `KeyboardEvent.key`
    /// value, so Space is `" "` (or `"Spacebar"` in older user agents).
    pub fn dispatch_key(&mut self, id: CardId, key: &str) -> Dispatch {
        self.dispatch(id, Event::Key(key))
    }

    /// Deliver a click to card `id`. A click on the link itself is followed
    /// natively unless a listener prevented the default action.
    pub fn dispatch_click(&mut self, id: CardId, target: ClickTarget) -> Dispatch {
        let dispatch = self.dispatch(id, Event::Click(target));

        if target == ClickTarget::Link && !dispatch.default_prevented {
            if let Some(activation) = self
                .card(id)
                .and_then(|c| c.link.as_ref())
                .and_then(Anchor::activation)
            {
                self.activate(id, activation);
            }
        }

        dispatch
    }

    fn dispatch(&mut self, id: CardId, event: Event) -> Dispatch {
        let mut dispatch = Dispatch::default();

        let Some(card) = self.card(id).cloned() else {
            return dispatch;
        };
        let listeners = self.listeners.get(&id).cloned().unwrap_or_default();

        for listener in listeners.iter().filter(|l| l.accepts(&event)) {
            dispatch.invoked += 1;
            let response = listener.handle(&event, &card);
            dispatch.default_prevented |= response.prevent_default;
            if let Some(activation) = response.activation {
                self.activate(id, activation);
            }
        }

        dispatch
    }

    fn activate(&mut self, id: CardId, activation: Activation) {
        crate::track_event(
            "card_activated",
            &json!({ "card": id.to_string(), "url": activation.url() }),
        );
        self.activations.push(activation);
    }

    /// Every link activation that happened in this document, oldest first.
    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn replacing_content_drops_previous_cards() {
        let mut doc = Document::new("/").with_mount("grid");
        let static_card = doc.add_card(Card::new(CardKind::Blog));

        let fragment = Fragment {
            html: "<article></article>".to_string(),
            cards: vec![Card::new(CardKind::Video), Card::new(CardKind::Video)],
        };
        assert!(doc.replace_content("grid", fragment.clone()));
        let first = doc.cards_in("grid");
        assert_eq!(first.len(), 2);

        assert!(doc.replace_content("grid", fragment));
        let second = doc.cards_in("grid");
        assert_eq!(second.len(), 2);
        assert!(first.iter().all(|id| !second.contains(id)));
        assert!(doc.contains(static_card));
        assert_eq!(doc.card_ids().len(), 3);
    }

    #[test]
    fn missing_mount_is_not_replaced() {
        let mut doc = Document::new("/");
        assert!(!doc.replace_content("main-header", Fragment::markup("<p></p>")));
        assert_eq!(doc.inner_html("main-header"), None);
    }

    #[test]
    fn native_link_click_follows_link() {
        let mut doc = Document::new("/");
        let id = doc.add_card(Card::new(CardKind::Blog).with_link(Anchor::card("blog/a.html")));

        let dispatch = doc.dispatch_click(id, ClickTarget::Link);
        assert_eq!(dispatch.invoked, 0);
        assert_eq!(
            doc.activations(),
            &[Activation::Navigate {
                url: "blog/a.html".to_string()
            }]
        );
    }

    #[test]
    fn anchors_qualify_as_primary() {
        assert!(Anchor::card("a.html").is_primary());
        assert!(!Anchor::card("a.html").disabled().is_primary());
        assert!(Anchor::video("https://example.com").disabled().is_primary());

        let mut no_href = Anchor::video("x");
        no_href.href = None;
        assert!(!no_href.is_primary());
        assert_eq!(no_href.activation(), None);
    }
}
