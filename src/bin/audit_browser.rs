//! Line-driven terminal viewer for the product audit API.
//!
//! Commands: `n` next, `p` previous, `j <page>` jump, `f <text>` filter,
//! `f` clear filter, `r` requirement detail, `s <k>` spec of result k,
//! `c` close detail, `q` quit.

use anyhow::Context;
use clap::Parser;
use product_audit::client::HttpFeed;
use product_audit::config::DEFAULT_FETCH_TIMEOUT_SECS;
use product_audit::viewer::{Browser, Modal, RelevanceTier, Viewer, ViewerState};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "audit-browser")]
#[command(about = "Browse grouped product audit results from a running server")]
struct Args {
    /// Server base URL
    #[arg(long, env = "AUDIT_API_URL", default_value = "http://localhost:3000")]
    server: String,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let feed = HttpFeed::with_timeout(&args.server, args.timeout_secs)
        .context("creating HTTP client")?;

    let mut viewer = Viewer::new();
    println!("Loading data from {} ...", feed.endpoint());
    viewer.load(&feed).await;

    if let ViewerState::Failed(reason) = viewer.state() {
        println!("Error loading data: {}", reason);
        return Ok(());
    }

    render(&viewer);

    let stdin = io::stdin();
    let mut out = io::stdout();
    loop {
        print!("> ");
        out.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim_end_matches(['\r', '\n']);
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command.trim() {
            "q" => break,
            "n" => viewer.next(),
            "p" => viewer.previous(),
            "j" => {
                if let Some(b) = viewer.browser_mut() {
                    if !b.jump_to_input(rest) {
                        println!("No page '{}'", rest.trim());
                    }
                }
            }
            "f" => viewer.set_filter(rest),
            "r" => viewer.open_requirement_modal(),
            "s" => {
                let opened = match (rest.trim().parse::<usize>(), viewer.browser_mut()) {
                    (Ok(k), Some(b)) if k >= 1 => b.open_spec_at(k - 1),
                    _ => false,
                };
                if !opened {
                    println!("No result '{}'", rest.trim());
                }
            }
            "c" => viewer.close_modal(),
            "" => {}
            other => println!("Unknown command '{}'", other),
        }

        render(&viewer);
    }

    Ok(())
}

fn render(viewer: &Viewer) {
    let Some(browser) = viewer.browser() else {
        return;
    };

    println!();
    if !browser.filter_text().trim().is_empty() {
        println!(
            "Filter \"{}\": {} of {} groups",
            browser.filter_text(),
            browser.filtered_len(),
            browser.total_len()
        );
    }

    match browser.modal() {
        Modal::None => render_group(browser),
        Modal::RequirementDetail => render_requirement(browser),
        Modal::SpecDetail(result) => {
            println!("── {} ({})", result.title, result.display_id);
            println!("{}", result.specifications);
            if !result.search_page_url.is_empty() {
                println!("Search page: {}", result.search_page_url);
            }
        }
    }
}

fn render_group(browser: &Browser) {
    let Some(group) = browser.current_group() else {
        println!("No results found. Try a different search term.");
        return;
    };

    println!("[{}] {} - {}", browser.position_label(), group.query, group.city);
    println!(
        "Core product: {} | Type: {}",
        group.query_agent_response.core_product, group.query_agent_response.query_type
    );
    for (key, value) in browser.attribute_preview() {
        println!("  {}: {}", key, value);
    }

    for (i, result) in group.results().iter().enumerate() {
        println!(
            "{:>3}. [{}] {} (#{})",
            i + 1,
            RelevanceTier::classify(&result.relevance).label(),
            result.title,
            result.result_number
        );
    }
}

fn render_requirement(browser: &Browser) {
    if let Some(group) = browser.current_group() {
        let q = &group.query_agent_response;
        println!("── Requirement ({})", q.agent_name);
        println!("{}", q.user_requirement);
        for (key, value) in &q.predicted_attributes {
            println!("  {}: {}", key, value);
        }
    }
}
