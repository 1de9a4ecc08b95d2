pub mod commands;
pub mod ui;
pub mod util;

pub use util::{load_config, parse_authors, resolve_page, runtime};
