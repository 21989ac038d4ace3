use std::collections::HashSet;

use tracing::debug;

use crate::document::{Activation, Card, CardId, ClickTarget, Document};

/// Events delivered to card listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// Key press, by DOM key name.
    Key(&'a str),
    Click(ClickTarget),
}

/// Listeners attached to a card by [`CardBinder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listener {
    /// `Enter` or Space activates the primary link.
    Keydown,
    /// Click anywhere on the card activates the primary link.
    Click,
}

/// What a listener asks of the document after handling an event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub prevent_default: bool,
    pub activation: Option<Activation>,
}

impl Listener {
    /// Whether this listener is registered for the type of `event`.
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (Listener::Keydown, Event::Key(_)) | (Listener::Click, Event::Click(_))
        )
    }

    pub fn handle(&self, event: &Event, card: &Card) -> Response {
        let link = card.primary_link();

        match (self, event) {
            (Listener::Keydown, Event::Key(key)) if is_activation_key(key) => match link {
                Some(link) => Response {
                    prevent_default: true,
                    activation: link.activation(),
                },
                None => Response::default(),
            },
            // Clicks on the anchor itself are left to the browser.
            (Listener::Click, Event::Click(ClickTarget::Body)) => Response {
                prevent_default: false,
                activation: link.and_then(|l| l.activation()),
            },
            _ => Response::default(),
        }
    }
}

/// `Spacebar` is what older user agents report for the space key.
fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Spacebar")
}

/// Makes whole cards act as their primary link. Keeps track of cards it has
/// already seen, so it can be run again after parts of the page are
/// re-rendered.
#[derive(Debug, Default)]
pub struct CardBinder {
    bound: HashSet<CardId>,
}

impl CardBinder {
    pub fn new() -> CardBinder {
        CardBinder::default()
    }

    pub fn is_bound(&self, id: CardId) -> bool {
        self.bound.contains(&id)
    }

    /// Attach listeners to every card of `document` that was not bound
    /// before. Cards without a primary link get no listeners and stay out
    /// of the tab order. Returns the number of newly bound cards.
    pub fn bind(&mut self, document: &mut Document) -> usize {
        // Cards replaced since the last run are gone for good.
        self.bound.retain(|id| document.contains(*id));

        let mut newly_bound = 0;

        for id in document.card_ids() {
            if !self.bound.insert(id) {
                continue;
            }
            newly_bound += 1;

            let Some(card) = document.card_mut(id) else {
                continue;
            };
            if card.primary_link().is_none() {
                continue;
            }
            card.tab_index = Some(0);
            card.pointer_cursor = true;

            document.add_listener(id, Listener::Keydown);
            document.add_listener(id, Listener::Click);
        }

        debug!(newly_bound, total = self.bound.len(), "bound card interactions");

        newly_bound
    }
}
