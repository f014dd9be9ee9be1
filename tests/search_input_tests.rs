use sitescout::data_models::{Method, WebsiteLink};
use sitescout::search::{SearchFormGate, search_input_from_html};
use sitescout::{DiscoveryConfig, DiscoveryError, MemoryFetcher, find_search_input, find_search_template};

mod test_helpers {
    use super::*;

    pub const HOME: &str = "https://books.test/home";

    pub fn site(html: &str) -> (MemoryFetcher, WebsiteLink) {
        site_at(HOME, html)
    }

    pub fn site_at(url: &str, html: &str) -> (MemoryFetcher, WebsiteLink) {
        let fetcher = MemoryFetcher::new().with_page(url, html);
        (fetcher, WebsiteLink::new("Books", url))
    }

    pub fn config() -> DiscoveryConfig {
        DiscoveryConfig::default()
    }

    /// A page with a login form and a newsletter form around one real search form.
    pub fn busy_page(search_form: &str) -> String {
        format!(
            r#"<html><head><title>Books</title></head><body>
            <header class="site-header">{search_form}</header>
            <main>
              <form action="/login" method="post">
                <input type="text" name="user"><input type="password" name="pw">
                <button>Log in</button>
              </form>
            </main>
            <footer>
              <form action="/subscribe"><input type="text" name="email"><button>Subscribe</button></form>
            </footer>
            </body></html>"#
        )
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_finds_the_only_real_search_form() {
    let html = busy_page(
        r#"<form action="/search" method="GET" class="search-form"><input type="search" name="q" placeholder="Search"><button type="submit">Search</button></form>"#,
    );
    let (fetcher, link) = site(&html);

    let found = find_search_input(&fetcher, &link, &config()).await.unwrap();
    assert_eq!(
        found.css_selector,
        r#"html > body > header.site-header > form[action="/search"].search-form > input[name="q"]"#
    );
    assert_eq!(found.method, Method::Get);
}

#[tokio::test]
async fn test_search_input_reports_post_method() {
    let html = busy_page(r#"<form action="/find" method="POST"><input type="text" name="term"></form>"#);
    let (fetcher, link) = site(&html);

    let found = find_search_input(&fetcher, &link, &config()).await.unwrap();
    assert_eq!(found.method, Method::Post);
}

#[tokio::test]
async fn test_search_input_defaults_unknown_method_to_get() {
    let html = busy_page(r#"<form method="dialog"><input type="text" name="term"></form>"#);
    let (fetcher, link) = site(&html);

    let found = find_search_input(&fetcher, &link, &config()).await.unwrap();
    assert_eq!(found.method, Method::Get);
}

#[tokio::test]
async fn test_search_template_preserves_action_params() {
    let html = busy_page(
        r#"<form action="/search?lang=en"><input type="search" name="q"><input type="hidden" name="src" value="nav"></form>"#,
    );
    let (fetcher, link) = site(&html);

    let found = find_search_template(&fetcher, &link, &config()).await.unwrap();
    assert_eq!(found.method, Method::Get);
    assert_eq!(found.url_template, "https://books.test/search?lang=en&q=%s");
}

#[tokio::test]
async fn test_search_template_empty_action_uses_page_url() {
    let url = "https://books.test/find?x=1";
    let (fetcher, link) = site_at(url, r#"<form><input type="text" name="q"></form>"#);

    let found = find_search_template(&fetcher, &link, &config()).await.unwrap();
    assert_eq!(found.url_template, "https://books.test/find?q=%s&x=1");
}

#[tokio::test]
async fn test_search_template_absolute_action_other_host() {
    let (fetcher, link) = site(
        r#"<form action="https://search.books.test/s"><input type="search" name="query"></form>"#,
    );

    let found = find_search_template(&fetcher, &link, &config()).await.unwrap();
    assert_eq!(found.url_template, "https://search.books.test/s?query=%s");
}

#[tokio::test]
async fn test_search_template_requires_get_form() {
    let html = busy_page(r#"<form action="/find" method="post"><input type="search" name="q"></form>"#);
    let (fetcher, link) = site(&html);

    let err = find_search_template(&fetcher, &link, &config()).await.unwrap_err();
    assert!(err.is_no_candidate(), "{err}");
    assert!(err.to_string().contains("method=GET"));
}

#[tokio::test]
async fn test_search_template_requires_input_name() {
    let (fetcher, link) = site(r#"<form action="/search"><input type="search" id="q"></form>"#);

    let err = find_search_template(&fetcher, &link, &config()).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::MalformedInput(_)), "{err}");
}

#[tokio::test]
async fn test_multi_input_forms_are_excluded() {
    let (fetcher, link) = site(
        r#"<form action="/search"><input type="text" name="title"><input type="text" name="author"></form>"#,
    );

    let err = find_search_input(&fetcher, &link, &config()).await.unwrap_err();
    assert!(err.is_no_candidate());
    assert!(err.to_string().contains("single search input"));
}

#[tokio::test]
async fn test_no_forms_at_all() {
    let (fetcher, link) = site("<html><body><p>static page</p></body></html>");

    let err = find_search_input(&fetcher, &link, &config()).await.unwrap_err();
    assert!(err.is_no_candidate());
    assert!(err.to_string().contains("no likely search forms"));
}

#[tokio::test]
async fn test_scoring_picks_header_search_over_body_form() {
    let html = r#"<html><body>
        <header><form action="/search"><input type="search" name="q" aria-label="Search site"></form></header>
        <main><form action="/filter"><input type="text" name="filter"></form></main>
        </body></html>"#;
    let (fetcher, link) = site(html);

    let found = find_search_template(&fetcher, &link, &config()).await.unwrap();
    assert_eq!(found.url_template, "https://books.test/search?q=%s");
}

#[tokio::test]
async fn test_close_scores_are_ambiguous() {
    let html = r#"<html><body>
        <main><form action="/a"><input type="search" name="a1"></form></main>
        <section><form action="/b"><input type="search" name="b1"></form></section>
        </body></html>"#;
    let (fetcher, link) = site(html);

    let err = find_search_input(&fetcher, &link, &config()).await.unwrap_err();
    assert!(err.is_ambiguous(), "{err}");
}

#[tokio::test]
async fn test_fetch_failure_propagates() {
    let fetcher = MemoryFetcher::new();
    let link = WebsiteLink::new("Gone", "https://gone.test/");

    let err = find_search_input(&fetcher, &link, &config()).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Fetch(_)));
}

#[tokio::test]
async fn test_custom_skip_keywords() {
    let html = r#"<form action="/search"><h2>Find a store</h2><input type="search" name="q"></form>"#;
    let (fetcher, link) = site(html);
    let mut cfg = config();
    cfg.skip_keywords = vec!["store".to_string()];

    let err = find_search_input(&fetcher, &link, &cfg).await.unwrap_err();
    assert!(err.is_no_candidate());
    assert!(find_search_input(&fetcher, &link, &config()).await.is_ok());
}

#[test]
fn test_discovery_is_idempotent() {
    let html = busy_page(r#"<form action="/search"><input type="search" name="q"></form>"#);
    let gate = SearchFormGate::new(&config().skip_keywords).unwrap();
    let first = search_input_from_html(&html, HOME, &gate).unwrap();
    let second = search_input_from_html(&html, HOME, &gate).unwrap();
    assert_eq!(first, second);
}
