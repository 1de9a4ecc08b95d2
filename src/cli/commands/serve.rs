//! Serve Command
//!
//! Usage:
//!   seminar-digest serve [--bind 0.0.0.0:3000]

use crate::cli::util::runtime;
use crate::config::Config;
use crate::server;
use crate::types::Result;

pub fn run(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    runtime()?.block_on(server::serve(&config))
}
