pub mod discovery;
pub mod gate;
pub mod scoring;

pub use discovery::{
    build_url_template, find_search_input, find_search_input_in_document, find_search_template,
    find_search_template_in_document, search_input_from_html, search_template_from_html,
};
pub use gate::SearchFormGate;
pub use scoring::{ScoredCandidate, choose_best, score_candidate};
