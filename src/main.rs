use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use sitescout::data_models::{SearchLink, WebsiteLink};
use sitescout::{
    Config, HttpFetcher, extract_cards, find_card_selector, find_search_input,
    find_search_template,
};

#[derive(Parser)]
#[command(name = "sitescout", about = "Discover search entry points and result-card selectors")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate the page's search input and its form method
    SearchInput { url: String },
    /// Derive a GET search URL template (`%s` marks the query)
    SearchTemplate { url: String },
    /// Discover the repeating result-card selector for a search URL template
    CardSelector {
        template: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Extract result cards from a page with a known selector
    Cards { url: String, selector: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let config = Config::from_env()?;
    let fetcher = HttpFetcher::new(&config.fetch).context("failed to build http client")?;

    match command {
        Command::SearchInput { url } => {
            let link = WebsiteLink::new("", url);
            print_json(&find_search_input(&fetcher, &link, &config.discovery).await?)
        }
        Command::SearchTemplate { url } => {
            let link = WebsiteLink::new("", url);
            print_json(&find_search_template(&fetcher, &link, &config.discovery).await?)
        }
        Command::CardSelector {
            template,
            category,
            title,
        } => {
            let mut link = SearchLink::new(template);
            link.title = title;
            link.category = category;
            print_json(&find_card_selector(&fetcher, &link, &config.discovery).await?)
        }
        Command::Cards { url, selector } => {
            print_json(&extract_cards(&fetcher, &url, &selector).await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
