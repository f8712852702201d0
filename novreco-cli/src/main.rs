mod render;

use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use novreco_core::{
    CachedRecordSource, ClientConfig, DEFAULT_MAX_RESPONSES, DEFAULT_MAX_VISIBLE_PAGES,
    DEFAULT_PAGE_SIZE, FetchStrategy, FieldsContain, JsonResponseCache, ListConfig,
    ListController, ListLoader, LoadOutcome, RecoError, Record, RecordClient,
    create_response_cache_with_config, default_cache_path, parse_records,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "novreco")]
#[command(about = "Page, search and filter NOV-RECO lists from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a list endpoint and show one page of it
    List {
        /// Endpoint returning a JSON array or a {"results": [...]} envelope
        url: String,
        #[command(flatten)]
        view: ViewArgs,
        /// cache-first, network-first or network-only
        #[arg(long, default_value = "cache-first")]
        strategy: FetchStrategy,
        /// Request timeout in seconds
        #[arg(long, default_value = "15")]
        timeout: u64,
        /// Offline cache file (defaults to the platform cache directory)
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },
    /// Show one page of a JSON export on disk
    File {
        path: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Inspect or empty the offline cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
        #[arg(long, global = true)]
        cache_file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print cached endpoints and cache statistics
    Info,
    /// Remove every cached response
    Clear,
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Free-text search, case-insensitive
    #[arg(short, long)]
    search: Option<String>,
    /// Page to show, starting at 1
    #[arg(short, long, default_value = "1")]
    page: usize,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_VISIBLE_PAGES)]
    max_visible_pages: usize,
    /// Restrict search to these fields (comma-separated)
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,
    /// Exact match on a field, e.g. --filter status=late (repeatable)
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
    /// Columns to print (comma-separated); defaults to the first fields of each row
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,
}

fn parse_filter(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected field=value, got '{}'", arg)),
    }
}

fn init_logging() {
    // RUST_LOG overrides, e.g. RUST_LOG=novreco_core::offline=debug
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "novreco_core=info,novreco_cli=info".into()),
        )
        .init();
}

/// Builds a controller for `view`; the last rendered frame lands in the returned buffer.
fn build_controller(view: &ViewArgs) -> (ListController, Rc<RefCell<String>>) {
    let frame = Rc::new(RefCell::new(String::new()));
    let columns = view.columns.clone();
    let target = Rc::clone(&frame);

    let mut list = ListController::new(ListConfig {
        page_size: view.page_size,
        max_visible_pages: view.max_visible_pages,
    })
    .on_render(move |state| {
        *target.borrow_mut() = render::render_page(state, &columns);
    })
    .on_search(|matches| info!("{} records match the search", matches.len()));

    if !view.fields.is_empty() {
        list.set_predicate(FieldsContain::new(view.fields.iter().cloned()));
    }
    for (field, value) in &view.filters {
        list.set_field_filter(field, value);
    }
    if let Some(query) = &view.search {
        list.set_search_query(query);
    }
    (list, frame)
}

fn show(list: &mut ListController, frame: &RefCell<String>, page: usize) {
    if page != list.current_page() && !list.change_page(page) {
        warn!(
            "Page {} is out of range, showing page {} of {}",
            page,
            list.current_page(),
            list.total_pages()
        );
    }
    println!("{}", frame.borrow());
}

fn outcome_to_result(outcome: LoadOutcome) -> Result<usize, RecoError> {
    match outcome {
        LoadOutcome::Applied(count) => Ok(count),
        LoadOutcome::Failed(e) => Err(e),
        LoadOutcome::Superseded => Err(RecoError::Cache(
            "load was superseded before it completed".to_string(),
        )),
    }
}

fn read_export(path: &Path) -> Result<Vec<Record>, RecoError> {
    let text = std::fs::read_to_string(path)?;
    parse_records(serde_json::from_str(&text)?)
}

fn open_cache(cache_file: Option<PathBuf>) -> Result<JsonResponseCache, RecoError> {
    let path = cache_file.unwrap_or_else(default_cache_path);
    create_response_cache_with_config(path, DEFAULT_MAX_RESPONSES)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    let mut loader = ListLoader::new();

    match cli.command {
        Commands::List {
            url,
            view,
            strategy,
            timeout,
            cache_file,
        } => {
            let client = RecordClient::new(ClientConfig {
                timeout: Duration::from_secs(timeout),
                ..ClientConfig::default()
            })?;
            let history = client.history().clone();
            let source = CachedRecordSource::new(client, open_cache(cache_file)?, strategy)
                .with_history(history);

            let (mut list, frame) = build_controller(&view);
            let count = outcome_to_result(loader.load(&source, &url, &mut list).await)?;
            info!("Loaded {} records from {} ({})", count, url, source.strategy());

            show(&mut list, &frame, view.page);
        }
        Commands::File { path, view } => {
            let (mut list, frame) = build_controller(&view);
            let ticket = loader.begin();
            let count = outcome_to_result(loader.complete(ticket, read_export(&path), &mut list))?;
            info!("Loaded {} records from {}", count, path.display());

            show(&mut list, &frame, view.page);
        }
        Commands::Cache { action, cache_file } => {
            let mut cache = open_cache(cache_file)?;
            match action {
                CacheAction::Info => {
                    let stats = cache.stats();
                    println!("Cached responses: {}", stats.entry_count);
                    println!("Estimated size: {} KiB", stats.size_bytes / 1024);
                    if let Some(oldest) = stats.oldest_entry {
                        println!("Oldest entry: {}", oldest);
                    }
                    if let Some(recent) = stats.most_recent_access {
                        println!("Last used: {}", recent);
                    }
                    for key in cache.keys() {
                        if let Some(entry) = cache.peek(key) {
                            println!(
                                "  {} ({} records, {} min old)",
                                entry.value.url,
                                entry.value.records.len(),
                                entry.age().whole_minutes()
                            );
                        }
                    }
                }
                CacheAction::Clear => {
                    let removed = cache.len();
                    cache.clear()?;
                    println!("Removed {} cached responses", removed);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("status=late").unwrap(),
            ("status".to_string(), "late".to_string())
        );
        assert_eq!(
            parse_filter(" department = IT ").unwrap(),
            ("department".to_string(), "IT".to_string())
        );
        assert_eq!(
            parse_filter("status=").unwrap(),
            ("status".to_string(), String::new())
        );
        assert!(parse_filter("status").is_err());
        assert!(parse_filter("=late").is_err());
    }

    #[test]
    fn test_cli_parses_list_flags() {
        let cli = Cli::try_parse_from([
            "novreco",
            "list",
            "https://reco.example.com/api/checkins",
            "--search",
            "admin",
            "--page",
            "2",
            "--fields",
            "name,email",
            "--filter",
            "status=late",
            "--strategy",
            "network-first",
        ])
        .unwrap();

        match cli.command {
            Commands::List { view, strategy, .. } => {
                assert_eq!(view.search.as_deref(), Some("admin"));
                assert_eq!(view.page, 2);
                assert_eq!(view.page_size, DEFAULT_PAGE_SIZE);
                assert_eq!(view.fields, vec!["name", "email"]);
                assert_eq!(view.filters, vec![("status".to_string(), "late".to_string())]);
                assert_eq!(strategy, FetchStrategy::NetworkFirst);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_controller_from_view_args() {
        let cli = Cli::try_parse_from([
            "novreco", "file", "export.json", "--page-size", "2", "--filter", "status=late",
        ])
        .unwrap();
        let Commands::File { view, .. } = cli.command else {
            panic!("expected file command");
        };

        let (mut list, frame) = build_controller(&view);
        let records = (1..=6)
            .map(|i| {
                novreco_core::record_from([
                    ("id", serde_json::json!(i)),
                    ("status", serde_json::json!(if i % 2 == 0 { "late" } else { "on_time" })),
                ])
            })
            .collect();
        list.set_data(records);

        assert_eq!(list.total_items(), 3);
        assert_eq!(list.total_pages(), 2);
        assert!(frame.borrow().contains("Showing 1-2 of 3"));
    }
}
