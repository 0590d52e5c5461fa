use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Serve a MyAnimeList list to a scrolling stream overlay
#[derive(Parser)]
#[command(name = "onstream")]
#[command(about = "Scrape a public MyAnimeList list and serve it to an OBS overlay", long_about = None)]
pub struct Cli {
    /// Config file (TOML, or JSON with a .json extension). Defaults to
    /// onstream.toml, falling back to a legacy config.json
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Fetch the list once and print the JSON payload
    Fetch {
        #[arg(short, long, default_value = "ALL")]
        status: String,
        /// manga, anime, or both
        #[arg(short, long, default_value = "manga")]
        media: String,
        /// Query both media kinds and merge them
        #[arg(long)]
        mixed: bool,
        /// default, title, status, progress or random
        #[arg(long, default_value = "default")]
        sort: String,
        #[arg(long)]
        speed: Option<u32>,
    },
}
