use regex::{Regex, RegexBuilder};
use scraper::ElementRef;

use crate::error::{DiscoveryError, Result};
use crate::signature::{descendant_elements, text_of};

/// Rejects forms that are obviously for login, comments, subscriptions, etc.
#[derive(Debug, Clone)]
pub struct SearchFormGate {
    keywords: Option<Regex>,
}

impl SearchFormGate {
    pub fn new(skip_keywords: &[String]) -> Result<SearchFormGate> {
        let alternatives: Vec<String> = skip_keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(SearchFormGate { keywords: None });
        }

        let keywords = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| DiscoveryError::Config(format!("skip keywords: {e}")))?;
        Ok(SearchFormGate {
            keywords: Some(keywords),
        })
    }

    pub fn is_likely_search_form(&self, form: ElementRef) -> bool {
        // Password fields and textareas mean login or comment/contact forms.
        let disqualified = descendant_elements(form).any(|el| match el.value().name() {
            "textarea" => true,
            "input" => input_type(el) == "password",
            _ => false,
        });
        if disqualified {
            return false;
        }

        match &self.keywords {
            Some(keywords) => !keywords.is_match(&form_label_text(form)),
            None => true,
        }
    }
}

/// Text of the form's headings, buttons and submit inputs, space separated.
fn form_label_text(form: ElementRef) -> String {
    let mut out = String::new();
    for el in descendant_elements(form) {
        let text = match el.value().name() {
            "h1" | "h2" | "h3" | "button" => text_of(el),
            "a" if el.value().attr("role") == Some("button") => text_of(el),
            "input" if input_type(el) == "submit" => {
                el.value().attr("value").unwrap_or_default().to_string()
            }
            _ => continue,
        };
        out.push_str(&text);
        out.push(' ');
    }
    out
}

/// Lowercased `type` attribute; `text` when absent, matching the HTML default.
pub fn input_type(input: ElementRef) -> String {
    input
        .value()
        .attr("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "text".to_string())
}

/// `<input>` elements of type `search` or `text` inside `form`.
pub fn candidate_inputs<'a>(form: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    descendant_elements(form)
        .filter(|el| el.value().name() == "input")
        .filter(|el| matches!(input_type(*el).as_str(), "search" | "text"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;
    use scraper::{Html, Selector};

    fn gate() -> SearchFormGate {
        SearchFormGate::new(&DiscoveryConfig::default().skip_keywords).unwrap()
    }

    fn check(html: &str) -> bool {
        let doc = Html::parse_document(html);
        let form = doc.select(&Selector::parse("form").unwrap()).next().unwrap();
        gate().is_likely_search_form(form)
    }

    #[test]
    fn test_plain_search_form_passes() {
        assert!(check(
            r#"<form action="/search"><input type="search" name="q"><button>Go</button></form>"#
        ));
    }

    #[test]
    fn test_password_field_disqualifies() {
        assert!(!check(
            r#"<form><input name="user"><input type="PASSWORD" name="pw"></form>"#
        ));
    }

    #[test]
    fn test_textarea_disqualifies() {
        assert!(!check(r#"<form><input name="q"><textarea></textarea></form>"#));
    }

    #[test]
    fn test_keyword_in_button_disqualifies() {
        assert!(!check(r#"<form><input name="e"><button>Subscribe now</button></form>"#));
        assert!(!check(r#"<form><h2>Sign In</h2><input name="u"></form>"#));
        assert!(!check(
            r#"<form><input name="e"><a role="button">Newsletter</a></form>"#
        ));
    }

    #[test]
    fn test_keyword_in_submit_value_disqualifies() {
        assert!(!check(
            r#"<form><input name="e"><input type="submit" value="Register"></form>"#
        ));
    }

    #[test]
    fn test_keyword_outside_label_elements_is_ignored() {
        assert!(check(
            r#"<form><label>Email us</label><input type="search" name="q"></form>"#
        ));
    }

    #[test]
    fn test_empty_keyword_list_only_checks_structure() {
        let gate = SearchFormGate::new(&[]).unwrap();
        let doc = Html::parse_document(r#"<form><button>Login</button><input></form>"#);
        let form = doc.select(&Selector::parse("form").unwrap()).next().unwrap();
        assert!(gate.is_likely_search_form(form));
    }

    #[test]
    fn test_candidate_inputs_default_type_is_text() {
        let doc = Html::parse_document(
            r#"<form><input name="q"><input type="hidden" name="lang"><input type="Search"><input type="checkbox"></form>"#,
        );
        let form = doc.select(&Selector::parse("form").unwrap()).next().unwrap();
        assert_eq!(candidate_inputs(form).len(), 2);
    }
}
