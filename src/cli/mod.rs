// src/cli/mod.rs — CLI definition (clap derive)

pub mod discover;
pub mod progress;
pub mod run;
pub mod summary;
pub mod whoami;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::infra::config::Overrides;
use crate::infra::paths;

#[derive(Parser)]
#[command(
    name = "recipe-sweep",
    about = "Run every code and Spark recipe in a DSS project folder to validate a migration",
    version
)]
pub struct Cli {
    /// Settings file (default: ~/dataiku-tools-settings.yml)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// DSS instance URL
    #[arg(long, global = true)]
    pub instance: Option<String>,

    /// Project folder to sweep (a direct child of the root folder)
    #[arg(long, global = true)]
    pub folder: Option<String>,

    /// Maximum number of recipes running at once
    #[arg(short = 'j', long, global = true)]
    pub concurrency: Option<usize>,

    /// Work list written by `discover` and replayed by `run`
    #[arg(long, global = true, default_value = paths::WORK_LIST_FILE)]
    pub work_list: PathBuf,

    /// Results file (appended to)
    #[arg(long, global = true, default_value = paths::RESULTS_FILE)]
    pub results: PathBuf,

    /// Suppress per-recipe progress output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Find the code and Spark recipes under the folder and save the work list
    Discover {
        /// Overwrite an existing work list
        #[arg(long)]
        force: bool,
    },
    /// Run every recipe in the work list and append results
    Run {
        /// Skip recipes that already have a row in the results file
        #[arg(long)]
        resume: bool,
    },
    /// Show the identity behind the configured API key
    Whoami,
    /// Tally an existing results file
    Summary,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            instance: self.instance.clone(),
            folder: self.folder.clone(),
            concurrency: self.concurrency,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(paths::settings_path)
    }

    /// The subcommand to execute. Without one, replay the work list if it
    /// exists, otherwise build it.
    pub fn resolved_command(&self) -> Commands {
        match self.command {
            Some(ref command) => command.clone(),
            None if self.work_list.exists() => Commands::Run { resume: false },
            None => Commands::Discover { force: false },
        }
    }
}
