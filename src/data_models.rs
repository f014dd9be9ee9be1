use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Token standing in for the url-encoded query inside a search URL template.
pub const QUERY_TOKEN: &str = "%s";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WebsiteLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl WebsiteLink {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> WebsiteLink {
        WebsiteLink {
            title: title.into(),
            url: url.into(),
            category: None,
        }
    }
}

/// A site whose search URL template is known, e.g. `https://site.com/search?q=%s`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
    pub search_url: String,
}

impl SearchLink {
    pub fn new(search_url: impl Into<String>) -> SearchLink {
        let search_url = search_url.into();
        SearchLink {
            title: String::new(),
            url: search_url.clone(),
            category: None,
            search_url,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> SearchLink {
        self.category = Some(category.into());
        self
    }

    /// Substitutes the form-urlencoded `query` for the first placeholder token.
    pub fn url_for(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.search_url.replacen(QUERY_TOKEN, &encoded, 1)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    /// Absent or unrecognised methods resolve to GET.
    pub fn from_attr(value: Option<&str>) -> Method {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("post") => Method::Post,
            _ => Method::Get,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("get"),
            Method::Post => f.write_str("post"),
        }
    }
}

/// Locator for a site's search input.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchInput {
    pub css_selector: String,
    pub method: Method,
}

/// Browser-free request template for a site's search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchTemplate {
    pub method: Method,
    pub url_template: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Differential,
    Frequency,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CardSelector {
    pub title: String,
    pub url: String,
    pub selector: String,
    pub tier: Tier,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CardContent {
    pub title: String,
    pub url: String,
    pub other_text: Vec<String>,
}
