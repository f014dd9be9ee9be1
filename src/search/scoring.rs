use scraper::ElementRef;

use crate::error::{DiscoveryError, Result};
use crate::search::gate::input_type;
use crate::signature::{classes, closest, closest_tag, descendant_elements, has_class, text_of};

/// Top two viable scores closer than this are reported as ambiguous.
pub const MIN_SCORE_GAP: i32 = 20;

const SEARCH_ATTRIBUTES: [&str; 4] = ["id", "name", "aria-label", "data-testid"];
const SEARCH_ICON_WORDS: [&str; 3] = ["search", "magnify", "loupe"];

#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub input: ElementRef<'a>,
    pub score: i32,
    pub positive_signals: u32,
    pub reasons: Vec<String>,
}

impl<'a> ScoredCandidate<'a> {
    fn new(input: ElementRef<'a>) -> Self {
        Self {
            input,
            score: 0,
            positive_signals: 0,
            reasons: Vec::new(),
        }
    }

    fn add(&mut self, points: i32, reason: &str) {
        self.score += points;
        self.reasons.push(format!("{points:+} ({reason})"));
    }

    fn signal(&mut self, points: i32, reason: &str) {
        self.add(points, reason);
        self.positive_signals += 1;
    }
}

/// Accumulates the weighted signals for one candidate input.
pub fn score_candidate(input: ElementRef) -> ScoredCandidate {
    let mut c = ScoredCandidate::new(input);

    if input_type(input) == "search" {
        c.add(100, "type=search");
    } else {
        c.add(10, "type=text");
    }

    // context
    let in_search_role = closest(input, |e| {
        e.value()
            .attr("role")
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("search"))
    });
    if in_search_role.is_some() {
        c.signal(75, "in role=search");
    }
    if closest_tag(input, "header").is_some() {
        c.signal(50, "in <header>");
    } else if closest_tag(input, "nav").is_some() {
        c.signal(40, "in <nav>");
    }
    for attr in SEARCH_ATTRIBUTES {
        if let Some(value) = input.value().attr(attr) {
            let value = value.to_lowercase();
            if value.contains("search") || matches!(value.as_str(), "q" | "s" | "query") {
                c.signal(35, &format!("attr {attr}"));
            }
        }
    }
    if input
        .value()
        .attr("placeholder")
        .is_some_and(|p| p.to_lowercase().contains("search"))
    {
        c.add(20, "placeholder");
    }
    if let Some(form) = closest_tag(input, "form") {
        if let Some(reason) = search_button_signal(form) {
            c.signal(50, reason);
        }
    }

    // penalties
    if closest_tag(input, "footer").is_some() {
        c.add(-200, "in <footer>");
    }
    if closest(input, |e| e.value().name() == "aside" || has_class(e, "sidebar")).is_some() {
        c.add(-100, "in sidebar");
    }

    if c.positive_signals >= 3 {
        c.add(50, "certainty bonus");
    }
    c
}

/// Looks at the form's buttons in document order and stops at the first one that
/// reads as a search button.
fn search_button_signal(form: ElementRef) -> Option<&'static str> {
    let buttons = descendant_elements(form).filter(|el| match el.value().name() {
        "button" => true,
        "a" => el.value().attr("role") == Some("button"),
        _ => false,
    });
    for button in buttons {
        if text_of(button).to_lowercase().contains("search") {
            return Some("button text");
        }
        let has_icon = std::iter::once(button)
            .chain(descendant_elements(button))
            .flat_map(classes)
            .any(|class| {
                let class = class.to_lowercase();
                SEARCH_ICON_WORDS.iter().any(|w| class.contains(w))
            });
        if has_icon {
            return Some("button icon");
        }
    }
    None
}

/// Picks the single best search input, failing closed on ambiguity.
///
/// One candidate is returned unscored. With several, only positively scored ones are
/// viable and the winner must lead the runner-up by at least [`MIN_SCORE_GAP`].
pub fn choose_best<'a>(candidates: Vec<ElementRef<'a>>, source: &str) -> Result<ElementRef<'a>> {
    match candidates.as_slice() {
        [] => {
            return Err(DiscoveryError::NoCandidate(format!(
                "no valid form with a single search input was found on: {source}"
            )));
        }
        [only] => return Ok(*only),
        _ => {}
    }

    let mut viable: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(score_candidate)
        .inspect(|c| {
            log::debug!(
                "search input candidate on {source}: score {} [{}]",
                c.score,
                c.reasons.join(", ")
            )
        })
        .filter(|c| c.score > 0)
        .collect();
    viable.sort_by(|a, b| b.score.cmp(&a.score));

    match viable.as_slice() {
        [] => Err(DiscoveryError::NoCandidate(format!(
            "multiple inputs found, but none could be confidently identified on: {source}"
        ))),
        [only] => Ok(only.input),
        [top, next, ..] if top.score - next.score < MIN_SCORE_GAP => {
            Err(DiscoveryError::Ambiguous(format!(
                "multiple inputs have very close scores (top: {}, next: {}), unable to resolve ambiguity on: {source}",
                top.score, next.score
            )))
        }
        [top, ..] => Ok(top.input),
    }
}
