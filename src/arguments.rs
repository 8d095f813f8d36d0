use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{config::DEFAULT_CONFIG_PATH, preselect_setting::PreselectSetting};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[arg(short, long)]
    pub base_url: Option<String>,

    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[arg(short, long)]
    pub username: Option<String>,

    /// Value of the `sessionid` cookie of a logged in browser
    #[arg(short, long)]
    pub session_id: Option<String>,

    #[arg(long, default_value_t = false)]
    pub store_session: bool,

    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass the browser challenge and follow the redirect
    Verify {
        #[arg(short, long)]
        next: Option<String>,
    },
    /// Show the items of a folder
    List {
        #[arg(default_value = "")]
        path: String,
    },
    /// Pick items interactively, then download or delete them
    Select {
        #[arg(default_value = "")]
        path: String,

        #[arg(long, value_enum, default_value_t = PreselectSetting::Page)]
        preselect: PreselectSetting,
    },
    /// Download items given as `file:<path>` keys
    Download {
        #[arg(short, long, default_value = "")]
        path: String,

        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },
    /// Delete items given as `file:<path>` or `folder:<path>` keys
    Delete {
        #[arg(short, long, default_value = "")]
        path: String,

        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,

        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
}
