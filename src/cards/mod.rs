pub mod content;
pub mod differential;
pub mod frequency;

use scraper::ElementRef;

use crate::config::DiscoveryConfig;
use crate::data_models::{CardSelector, SearchLink, Tier};
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::signature::{child_elements, signature};

pub use content::{cards_from_html, extract_card, extract_cards};
pub use differential::{diff_analysis, differential_scrape};
pub use frequency::{best_repeating_signature, frequency_analysis};

/// Runs the differential tier, falling back to frequency analysis when it fails.
pub async fn find_card_selector<F: Fetcher>(
    fetcher: &F,
    link: &SearchLink,
    config: &DiscoveryConfig,
) -> Result<CardSelector> {
    let differential = match differential_scrape(fetcher, link, config).await {
        Ok(selector) => {
            log::info!("differential scrape found {selector} on {}", link.search_url);
            return Ok(card_selector(link, selector, Tier::Differential));
        }
        Err(e) => e,
    };
    log::warn!(
        "differential scrape failed on {}: {differential}; trying frequency analysis",
        link.search_url
    );

    match frequency_analysis(fetcher, link, config).await {
        Ok(selector) => {
            log::info!("frequency analysis found {selector} on {}", link.search_url);
            Ok(card_selector(link, selector, Tier::Frequency))
        }
        Err(frequency) => Err(DiscoveryError::AllTiersFailed {
            url: link.search_url.clone(),
            differential: Box::new(differential),
            frequency: Box::new(frequency),
        }),
    }
}

fn card_selector(link: &SearchLink, selector: String, tier: Tier) -> CardSelector {
    CardSelector {
        title: link.title.clone(),
        url: link.search_url.clone(),
        selector,
        tier,
    }
}

/// Direct-child signature counts of `parent`, in order of first appearance.
pub fn child_signature_counts(parent: ElementRef) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for sig in child_elements(parent).map(signature).filter(|s| !s.is_empty()) {
        match counts.iter_mut().find(|(seen, _)| *seen == sig) {
            Some((_, count)) => *count += 1,
            None => counts.push((sig, 1)),
        }
    }
    counts
}

/// The most frequent direct-child signature of `container`, if it appears more than
/// once. Equal counts go to the signature seen first.
pub fn find_repeating_child(container: ElementRef) -> Option<String> {
    let mut best: Option<(String, usize)> = None;
    for (sig, count) in child_signature_counts(container) {
        let current = best.as_ref().map_or(1, |(_, c)| *c);
        if count > current {
            best = Some((sig, count));
        }
    }
    best.map(|(sig, _)| sig)
}

/// Runs `analyze` on the generic-query results page, retrying once with the category's
/// fallback query if fetching or analysis fails.
async fn with_results_page<F, T, A>(
    fetcher: &F,
    link: &SearchLink,
    config: &DiscoveryConfig,
    analyze: A,
) -> Result<T>
where
    F: Fetcher,
    A: Fn(&str) -> Result<T> + Sync,
{
    let generic = analyze_page(fetcher, &link.url_for(&config.generic_query), &analyze).await;
    let err = match generic {
        Ok(found) => return Ok(found),
        Err(e) => e,
    };

    let Some(fallback) = config.fallback_query(link.category.as_deref()) else {
        return Err(err);
    };
    log::debug!(
        "generic query failed on {} ({err}); retrying with {fallback:?}",
        link.search_url
    );
    analyze_page(fetcher, &link.url_for(fallback), &analyze).await
}

async fn analyze_page<F, T, A>(fetcher: &F, url: &str, analyze: &A) -> Result<T>
where
    F: Fetcher,
    A: Fn(&str) -> Result<T> + Sync,
{
    let page = fetcher.fetch(url).await?;
    analyze(&page.body)
}
