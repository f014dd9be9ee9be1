pub mod cards;
pub mod config;
pub mod data_models;
pub mod error;
pub mod fetch;
pub mod search;
pub mod signature;

pub use cards::{extract_cards, find_card_selector};
pub use config::{Config, DiscoveryConfig, FetchConfig};
pub use error::{DiscoveryError, FetchError};
pub use fetch::{Fetcher, HttpFetcher, MemoryFetcher, Page};
pub use search::{find_search_input, find_search_template};
