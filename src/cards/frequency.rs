use std::collections::BTreeMap;

use scraper::Html;

use crate::cards::{child_signature_counts, with_results_page};
use crate::config::DiscoveryConfig;
use crate::data_models::SearchLink;
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::signature::{body_elements, depth};

/// Points per repetition of a child signature under one parent.
const REPEAT_WEIGHT: usize = 5;

/// Tier 2. Scores repeating child signatures on a single results page.
pub async fn frequency_analysis<F: Fetcher>(
    fetcher: &F,
    link: &SearchLink,
    config: &DiscoveryConfig,
) -> Result<String> {
    with_results_page(fetcher, link, config, |html| {
        best_repeating_signature(&Html::parse_document(html))
    })
    .await
}

/// Every parent adds `count * 5 + parent depth` for each child signature it repeats.
/// The single highest aggregate wins; a shared top score is an error.
pub fn best_repeating_signature(document: &Html) -> Result<String> {
    let mut scores: BTreeMap<String, usize> = BTreeMap::new();
    for parent in body_elements(document) {
        let parent_depth = depth(parent);
        for (sig, count) in child_signature_counts(parent) {
            if count > 1 {
                *scores.entry(sig).or_default() += count * REPEAT_WEIGHT + parent_depth;
            }
        }
    }

    let Some(top_score) = scores.values().copied().max() else {
        return Err(DiscoveryError::NoCandidate(
            "frequency analysis failed: no elements with repeating signatures found".to_string(),
        ));
    };
    let top: Vec<&str> = scores
        .iter()
        .filter(|(_, score)| **score == top_score)
        .map(|(sig, _)| sig.as_str())
        .collect();

    match top.as_slice() {
        [winner] => Ok(winner.to_string()),
        tied => Err(DiscoveryError::Ambiguous(format!(
            "frequency analysis failed: found {} candidates with same top score {top_score}: {}",
            tied.len(),
            tied.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deeper_repeats_win() {
        let doc = Html::parse_document(
            r#"<body><div class="wrap">
                <section class="shelf"><article class="book"></article><article class="book"></article></section>
                <span class="dot"></span><span class="dot"></span>
            </div></body>"#,
        );
        // span.dot: 2*5 + 2 = 12; article.book: 2*5 + 3 = 13
        assert_eq!(best_repeating_signature(&doc).unwrap(), "article.book");
    }

    #[test]
    fn test_scores_aggregate_across_parents() {
        let doc = Html::parse_document(
            r#"<body><div class="page">
                <ul class="a"><li class="r"></li><li class="r"></li></ul>
                <ul class="b"><li class="r"></li><li class="r"></li></ul>
                <p class="x"></p><p class="x"></p><p class="x"></p><p class="x"></p>
            </div></body>"#,
        );
        // li.r: 2 * (2*5 + 3) = 26; p.x: 4*5 + 2 = 22; ul: a and b differ
        assert_eq!(best_repeating_signature(&doc).unwrap(), "li.r");
    }

    #[test]
    fn test_tie_is_an_error() {
        let doc = Html::parse_document(
            r#"<body>
                <div class="left"><div class="cardA"></div><div class="cardA"></div><div class="cardA"></div></div>
                <div class="right"><div class="cardB"></div><div class="cardB"></div><div class="cardB"></div></div>
            </body>"#,
        );
        let err = best_repeating_signature(&doc).unwrap_err();
        assert!(err.is_ambiguous());
        assert!(err.to_string().contains("2 candidates"));
    }

    #[test]
    fn test_no_repeats_is_an_error() {
        let doc = Html::parse_document(r#"<body><div><p>a</p><span>b</span></div></body>"#);
        assert!(best_repeating_signature(&doc).unwrap_err().is_no_candidate());
    }
}
