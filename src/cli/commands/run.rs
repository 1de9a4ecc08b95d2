//! Run Command
//!
//! Fetch one seminar page, summarize every segment and post the digest.
//!
//! Usage:
//!   seminar-digest run [PAGE] [--authors SATO,田中] [-f json]

use crate::cli::ui::Output;
use crate::cli::util::{parse_authors, resolve_page, runtime};
use crate::config::Config;
use crate::digest::{DistributionReport, Services};
use crate::types::Result;

pub struct RunOptions {
    pub page: Option<String>,
    /// Overrides `SELECT_AUTHORS` when given
    pub authors: Option<String>,
    pub format: String,
}

pub fn run(config: &Config, options: RunOptions) -> Result<DistributionReport> {
    let page = resolve_page(config, options.page);
    let mut services = Services::from_config(config)?;
    if let Some(authors) = options.authors.as_deref() {
        services.router = services.router.with_audience(parse_authors(authors));
    }

    let report = runtime()?.block_on(services.distributor().run(&page))?;

    if options.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Output::new().report(&report);
    }
    Ok(report)
}
