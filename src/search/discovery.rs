use std::collections::BTreeMap;

use reqwest::Url;
use scraper::{ElementRef, Html};
use url::form_urlencoded;

use crate::config::DiscoveryConfig;
use crate::data_models::{Method, QUERY_TOKEN, SearchInput, SearchTemplate, WebsiteLink};
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::search::gate::{SearchFormGate, candidate_inputs};
use crate::search::scoring::choose_best;
use crate::signature::{closest_tag, descendant_elements, non_empty_attr, selector_path};

/// Encoding-safe stand-in for [`QUERY_TOKEN`] while the query string is serialized.
const PLACEHOLDER: &str = "QUERY_PLACEHOLDER";

/// Fetches `link` and locates its primary search input.
pub async fn find_search_input<F: Fetcher>(
    fetcher: &F,
    link: &WebsiteLink,
    config: &DiscoveryConfig,
) -> Result<SearchInput> {
    let page = fetcher.fetch(&link.url).await?;
    let gate = SearchFormGate::new(&config.skip_keywords)?;
    let found = search_input_from_html(&page.body, page.url.as_str(), &gate)?;
    log::info!(
        "found search input for {}: {} ({})",
        link.url,
        found.css_selector,
        found.method
    );
    Ok(found)
}

/// Fetches `link` and derives a GET request template for its search.
pub async fn find_search_template<F: Fetcher>(
    fetcher: &F,
    link: &WebsiteLink,
    config: &DiscoveryConfig,
) -> Result<SearchTemplate> {
    let page = fetcher.fetch(&link.url).await?;
    let gate = SearchFormGate::new(&config.skip_keywords)?;
    let found = search_template_from_html(&page.body, &page.url, &gate)?;
    log::info!("found search link for {}: {}", link.url, found.url_template);
    Ok(found)
}

pub fn search_input_from_html(html: &str, source: &str, gate: &SearchFormGate) -> Result<SearchInput> {
    let document = Html::parse_document(html);
    find_search_input_in_document(&document, source, gate)
}

pub fn search_template_from_html(
    html: &str,
    page_url: &Url,
    gate: &SearchFormGate,
) -> Result<SearchTemplate> {
    let document = Html::parse_document(html);
    find_search_template_in_document(&document, page_url, gate)
}

pub fn find_search_input_in_document(
    document: &Html,
    source: &str,
    gate: &SearchFormGate,
) -> Result<SearchInput> {
    let forms = likely_search_forms(document, gate);
    if forms.is_empty() {
        return Err(DiscoveryError::NoCandidate(format!(
            "no likely search forms found on page: {source}"
        )));
    }

    let input = choose_best(single_input_candidates(&forms), source)?;
    let method = closest_tag(input, "form")
        .map(|form| Method::from_attr(form.value().attr("method")))
        .unwrap_or_default();

    Ok(SearchInput {
        css_selector: selector_path(input),
        method,
    })
}

pub fn find_search_template_in_document(
    document: &Html,
    page_url: &Url,
    gate: &SearchFormGate,
) -> Result<SearchTemplate> {
    let forms: Vec<ElementRef> = likely_search_forms(document, gate)
        .into_iter()
        .filter(|form| is_get_form(*form))
        .collect();
    if forms.is_empty() {
        return Err(DiscoveryError::NoCandidate(format!(
            "no likely search forms with method=GET were found on: {page_url}"
        )));
    }

    let input = choose_best(single_input_candidates(&forms), page_url.as_str())?;
    let form = closest_tag(input, "form").ok_or_else(|| {
        DiscoveryError::MalformedInput(format!(
            "winning search input is not inside a form on: {page_url}"
        ))
    })?;
    let input_name = non_empty_attr(input, "name").ok_or_else(|| {
        DiscoveryError::MalformedInput(format!(
            "winning search input has no 'name' attribute on: {page_url}"
        ))
    })?;

    let action = form.value().attr("action").unwrap_or_default().trim();
    let action_url = page_url.join(action).map_err(|e| {
        DiscoveryError::MalformedInput(format!("could not parse form action URL '{action}': {e}"))
    })?;

    Ok(SearchTemplate {
        method: Method::Get,
        url_template: build_url_template(&action_url, input_name),
    })
}

/// `scheme://host/path?params` with `input_name` set to [`QUERY_TOKEN`] and every other
/// parameter of `action` kept. Parameters are emitted sorted by name.
pub fn build_url_template(action: &Url, input_name: &str) -> String {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in action.query_pairs() {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params.insert(input_name.to_string(), vec![PLACEHOLDER.to_string()]);

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in &params {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    let query = serializer.finish().replacen(PLACEHOLDER, QUERY_TOKEN, 1);

    let mut base = action.clone();
    base.set_query(None);
    base.set_fragment(None);
    format!("{base}?{query}")
}

fn likely_search_forms<'a>(document: &'a Html, gate: &SearchFormGate) -> Vec<ElementRef<'a>> {
    descendant_elements(document.root_element())
        .filter(|el| el.value().name() == "form")
        .filter(|form| gate.is_likely_search_form(*form))
        .collect()
}

/// The sole candidate input of every form that has exactly one.
fn single_input_candidates<'a>(forms: &[ElementRef<'a>]) -> Vec<ElementRef<'a>> {
    forms
        .iter()
        .filter_map(|form| match candidate_inputs(*form).as_slice() {
            [only] => Some(*only),
            _ => None,
        })
        .collect()
}

fn is_get_form(form: ElementRef) -> bool {
    match form.value().attr("method").map(str::trim) {
        None | Some("") => true,
        Some(method) => method.eq_ignore_ascii_case("get"),
    }
}
