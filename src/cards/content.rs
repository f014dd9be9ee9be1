use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::data_models::CardContent;
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::signature::{child_elements, descendant_elements, text_of};

/// Fetches `page_url` and extracts one [`CardContent`] per element matching
/// `card_selector`, in document order.
pub async fn extract_cards<F: Fetcher>(
    fetcher: &F,
    page_url: &str,
    card_selector: &str,
) -> Result<Vec<CardContent>> {
    let page = fetcher.fetch(page_url).await?;
    let cards = cards_from_html(&page.body, &page.url, card_selector)?;
    log::debug!("extracted {} cards from {page_url}", cards.len());
    Ok(cards)
}

pub fn cards_from_html(html: &str, base: &Url, card_selector: &str) -> Result<Vec<CardContent>> {
    let selector = Selector::parse(card_selector).map_err(|e| {
        DiscoveryError::MalformedInput(format!("invalid card selector {card_selector:?}: {e}"))
    })?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .map(|card| extract_card(card, base))
        .collect())
}

/// Title and URL come from the card's first anchor (the card itself when it is one).
/// Every other non-empty leaf outside that anchor becomes an `other_text` fragment.
pub fn extract_card(card: ElementRef, base: &Url) -> CardContent {
    let anchor = if card.value().name() == "a" {
        Some(card)
    } else {
        descendant_elements(card).find(|el| el.value().name() == "a")
    };

    let title = anchor
        .map(|a| text_of(a).trim().to_string())
        .unwrap_or_default();
    let url = anchor
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve_href(base, href.trim()))
        .unwrap_or_default();

    let other_text = descendant_elements(card)
        .filter(|el| child_elements(*el).next().is_none())
        .filter(|el| el.value().name() != "a")
        .filter(|el| anchor.is_none_or(|a| !is_within(*el, a)))
        .map(|el| text_of(el).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    CardContent {
        title,
        url,
        other_text,
    }
}

/// Absolute hrefs are kept verbatim; relative ones are resolved against `base`.
fn resolve_href(base: &Url, href: &str) -> String {
    match Url::parse(href) {
        Ok(_) => href.to_string(),
        Err(_) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
    }
}

fn is_within(element: ElementRef, ancestor: ElementRef) -> bool {
    element.ancestors().any(|node| node.id() == ancestor.id())
}
