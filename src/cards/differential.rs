use scraper::Html;

use crate::cards::{find_repeating_child, with_results_page};
use crate::config::DiscoveryConfig;
use crate::data_models::SearchLink;
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::signature::{
    SignatureSet, body_elements, child_elements, depth, signature, signature_set,
};

/// Tier 1. Blacklists every signature of the "no results" page, then looks for the
/// shallowest new container with repeating children on the "with results" page.
pub async fn differential_scrape<F: Fetcher>(
    fetcher: &F,
    link: &SearchLink,
    config: &DiscoveryConfig,
) -> Result<String> {
    let no_results_url = link.url_for(&config.nonsense_query);
    let page = fetcher.fetch(&no_results_url).await?;
    let blacklist = signature_set(&Html::parse_document(&page.body));
    log::debug!(
        "blacklisted {} signatures from {no_results_url}",
        blacklist.len()
    );

    with_results_page(fetcher, link, config, |html| {
        diff_analysis(&Html::parse_document(html), &blacklist)
    })
    .await
}

/// Returns `container > card` for the shallowest element that has at least two
/// children, is absent from `blacklist`, and has a repeating child signature.
pub fn diff_analysis(document: &Html, blacklist: &SignatureSet) -> Result<String> {
    let best = body_elements(document)
        .filter(|el| child_elements(*el).nth(1).is_some())
        .filter(|el| !blacklist.contains(&signature(*el)))
        .filter(|el| find_repeating_child(*el).is_some())
        .min_by_key(|el| depth(*el))
        .ok_or_else(|| {
            DiscoveryError::NoCandidate(
                "diff failed: could not find any unique container with repeating children"
                    .to_string(),
            )
        })?;

    let container = signature(best);
    let card = find_repeating_child(best).ok_or_else(|| {
        DiscoveryError::NoCandidate(format!(
            "found container ({container}), but failed to find repeating cards inside"
        ))
    })?;
    Ok(format!("{container} > {card}"))
}
