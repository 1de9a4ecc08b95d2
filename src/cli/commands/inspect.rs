//! Inspect Command
//!
//! Dry run: fetch (or load) a page and print how it segments and where each
//! segment would be routed. No model or chat calls.
//!
//! Usage:
//!   seminar-digest inspect [PAGE] [--groups] [--file export.json] [-f json]

use serde::Serialize;
use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{parse_authors, resolve_page, runtime};
use crate::config::Config;
use crate::digest::{Route, Router};
use crate::outline::{GroupedPresenter, Line, Segment, parse, parse_groups};
use crate::source::{DocumentStore, MemoryStore, ScrapboxStore};
use crate::types::Result;

pub struct InspectOptions {
    pub page: Option<String>,
    /// Page export to read instead of the Scrapbox API
    pub file: Option<PathBuf>,
    pub groups: bool,
    pub authors: Option<String>,
    pub format: String,
}

#[derive(Debug, Serialize)]
struct SegmentView {
    label: String,
    anchor: String,
    lines: usize,
    destination: String,
}

pub fn run(config: &Config, options: InspectOptions) -> Result<()> {
    let (page, lines) = load_lines(config, &options)?;

    if options.groups {
        let presenters = parse_groups(&lines);
        if options.format == "json" {
            println!("{}", serde_json::to_string_pretty(&presenters)?);
        } else {
            print_groups(&page, &presenters);
        }
        return Ok(());
    }

    let mut router = Router::new(&config.routing, &config.audience);
    if let Some(authors) = options.authors.as_deref() {
        router = router.with_audience(parse_authors(authors));
    }

    let views: Vec<SegmentView> = parse(&lines)
        .iter()
        .map(|segment| view(&router, segment))
        .collect();

    if options.format == "json" {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print_segments(&page, lines.len(), &views);
    }
    Ok(())
}

fn load_lines(config: &Config, options: &InspectOptions) -> Result<(String, Vec<Line>)> {
    let rt = runtime()?;
    match &options.file {
        Some(path) => {
            let (title, store) = MemoryStore::from_export(path)?;
            let page = options.page.clone().unwrap_or(title);
            let lines = rt.block_on(store.fetch_lines(&page))?;
            Ok((page, lines))
        }
        None => {
            let page = resolve_page(config, options.page.clone());
            let store = ScrapboxStore::new(&config.scrapbox)?;
            let lines = rt.block_on(store.fetch_lines(&page))?;
            Ok((page, lines))
        }
    }
}

fn view(router: &Router, segment: &Segment) -> SegmentView {
    let destination = match router.route(segment) {
        Ok(Route::Presenter { key, channel }) => format!("{} ({})", channel, key),
        Ok(Route::Meta { channel }) => format!("{} (meta)", channel),
        Ok(Route::Filtered) => "filtered".to_string(),
        Err(e) => format!("skip: {}", e),
    };
    let destination = if segment.is_blank() {
        format!("skip: empty body ({})", destination)
    } else {
        destination
    };

    SegmentView {
        label: segment.label.clone(),
        anchor: segment.anchor.clone(),
        lines: segment.body.len(),
        destination,
    }
}

fn print_segments(page: &str, line_count: usize, views: &[SegmentView]) {
    let out = Output::new();
    out.header(&format!("{} ({} lines, {} segments)", page, line_count, views.len()));

    for view in views {
        println!(
            "  {:<16} #{:<26} {:>4} lines  → {}",
            view.label, view.anchor, view.lines, view.destination
        );
    }
}

fn print_groups(page: &str, presenters: &[GroupedPresenter]) {
    let out = Output::new();
    out.header(&format!("{} (grouped)", page));

    for presenter in presenters {
        out.section(&format!("{} #{}", presenter.label, presenter.anchor));
        if presenter.groups.is_empty() {
            out.note("no groups");
        }
        for (name, lines) in &presenter.groups {
            println!("  {} ({} lines)", name, lines.len());
            for line in lines {
                println!("    {}", line);
            }
        }
    }
}
