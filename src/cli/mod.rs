pub mod commands;

use clap::{ArgGroup, Parser, Subcommand};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "covid-news")]
#[command(about = "COVID-19 country summaries and user-contributed news")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show today's summary for a country
    Summary {
        /// Country slug, e.g. "italy"
        country: String,

        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create, delete and list news
    News {
        #[command(subcommand)]
        command: NewsCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NewsCommands {
    /// Upload a cover image and save a news item
    #[command(group(ArgGroup::new("body").required(true).args(["content", "content_file"])))]
    Submit {
        /// Location the news belongs to
        #[arg(short, long)]
        location: String,

        #[arg(short, long)]
        title: String,

        /// Markdown body
        #[arg(long)]
        content: Option<String>,

        /// Read the markdown body from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Cover image (jpg, png or gif, at most 5 MiB)
        #[arg(short, long)]
        image: PathBuf,

        #[arg(long, env = "COVID_NEWS_AUTHOR_ID")]
        author_id: String,

        #[arg(long, env = "COVID_NEWS_AUTHOR_NAME")]
        author_name: String,

        /// Rewrite an existing news document instead of creating one
        #[arg(long)]
        update: Option<String>,
    },

    /// Delete a news item and its image
    Delete {
        id: String,
    },

    /// List news by location or by author
    #[command(group(ArgGroup::new("filter").required(true).args(["location", "user"])))]
    List {
        #[arg(short, long)]
        location: Option<String>,

        /// Author id
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Show a single news item
    Show {
        id: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if let Commands::Completions { shell } = self.command {
            commands::generate_completions(shell);
            return Ok(());
        }

        let config_file = commands::get_config_file(self.config)?;
        let config = commands::load_config(&config_file)?;
        commands::init_logging(self.debug, self.verbose, &config.logging)?;

        match self.command {
            Commands::Init { force } => {
                commands::init(&config_file, force).await
            }
            Commands::Summary { country, json } => {
                commands::summary(&config, &country, json).await
            }
            Commands::News { command } => {
                commands::news(&config, command).await
            }
            Commands::Completions { .. } => Ok(()),
        }
    }
}
