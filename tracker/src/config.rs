use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    export::DEFAULT_FILE_NAME,
    pagination::{DEFAULT_MAX_PAGES, FetchLimits},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Base url of the search proxy.
    #[arg(long, env = "TRACKER_PROXY_URL", default_value = "http://localhost:1111")]
    pub proxy_url: String,

    /// Upper bound on pages fetched per search.
    #[arg(long, env = "TRACKER_MAX_PAGES", default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Where exports are written.
    #[arg(long, env = "TRACKER_OUTPUT", default_value = DEFAULT_FILE_NAME)]
    pub output: PathBuf,

    /// Log destination while the terminal UI owns the screen.
    #[arg(long, env = "TRACKER_LOG_FILE", default_value = "tracker.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Interactive search, selection, chart and export.
    Tui,

    /// Search once and write the workbook without the interface.
    Export {
        query: String,

        /// Products to include, repeatable. Defaults to the busiest ones.
        #[arg(long)]
        select: Vec<String>,

        /// How many of the busiest products to include when nothing is selected.
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

impl Args {
    pub fn limits(&self) -> FetchLimits {
        FetchLimits {
            max_pages: self.max_pages.max(1),
        }
    }
}
