use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use clap_complete::{generate, Shell};
use clap::CommandFactory;
use tracing::{debug, info, warn};

use crate::app::Services;
use crate::cli::{Cli, NewsCommands};
use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use crate::news::{load_image, Author, NewsSubmission, StoredNews};
use crate::summary::CountrySummary;

/// Write a default configuration file
pub async fn init(config_file: &Path, force: bool) -> Result<()> {
    info!("Initializing configuration at {}", config_file.display());

    if config_file.exists() && !force {
        warn!("Configuration file already exists: {}", config_file.display());
        println!("Configuration already exists: {}", config_file.display());
        println!("   Use --force to overwrite it.");
        return Ok(());
    }

    if let Some(parent) = config_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = Config::default();
    config.save(config_file)?;

    println!("✅ covid-news initialized");
    println!("   Config file: {}", config_file.display());
    if let Ok(data_dir) = config.resolved_data_dir() {
        println!("   Data directory: {}", data_dir.display());
    }
    Ok(())
}

/// Print the summary for one country
pub async fn summary(config: &Config, country: &str, json: bool) -> Result<()> {
    let services = Services::from_config(config)?;

    let summary = services
        .summaries
        .get_summary(country)
        .await
        .map_err(|e| Error::HttpError(e.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &CountrySummary) {
    println!("📊 {} ({})", summary.country, summary.slug);
    println!("   Updated:   {}", summary.date.format("%Y-%m-%d %H:%M UTC"));
    println!("   Confirmed: {} (+{})", summary.total_confirmed, summary.new_confirmed);
    println!("   Recovered: {} (+{})", summary.total_recovered, summary.new_recovered);
    println!("   Deaths:    {} (+{})", summary.total_deaths, summary.new_deaths);
    println!("   Active:    {}", summary.active());
}

pub async fn news(config: &Config, command: NewsCommands) -> Result<()> {
    let services = Services::from_config(config)?;

    match command {
        NewsCommands::Submit {
            location,
            title,
            content,
            content_file,
            image,
            author_id,
            author_name,
            update,
        } => {
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => fs::read_to_string(&path)?,
                (None, None) => String::new(),
            };
            let image = load_image(&image)?;

            let mut submission = NewsSubmission::new(
                location,
                title,
                content,
                Some(image),
                Author::new(author_id, author_name),
            );
            if let Some(id) = update {
                submission = submission.updating(id);
            }

            match services.news.submit(&submission).await {
                Ok(()) => {
                    println!("✅ News '{}' saved", submission.title);
                    Ok(())
                }
                Err(e) if e.is_user_error() => Err(Error::Invalid(e.to_string())),
                Err(e) => Err(Error::Storage(e.to_string())),
            }
        }
        NewsCommands::Delete { id } => {
            services
                .news
                .delete(&id)
                .await
                .map_err(|e| Error::Storage(e.to_string()))?;
            println!("🗑️  News {} deleted", id);
            Ok(())
        }
        NewsCommands::List { location, user } => {
            let news = match (location, user) {
                (Some(location), _) => services.news.news_by_location(&location).await?,
                (None, Some(user)) => services.news.news_by_user(&user).await?,
                (None, None) => Vec::new(),
            };
            print_news_list(&news);
            Ok(())
        }
        NewsCommands::Show { id } => {
            let stored = services
                .news
                .get(&id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("News '{}' not found", id)))?;
            print_news(&stored);
            Ok(())
        }
    }
}

fn print_news_list(news: &[StoredNews]) {
    if news.is_empty() {
        println!("📋 No news found.");
        return;
    }

    println!("📋 {} news item(s):", news.len());
    for stored in news {
        println!(
            "   {}  {}  {} by {} ({})",
            stored.id,
            stored.item.created_date,
            stored.item.title,
            stored.item.author_name,
            stored.item.location
        );
    }
}

fn print_news(stored: &StoredNews) {
    let item = &stored.item;
    println!("📰 {}", item.title);
    println!("   Id:       {}", stored.id);
    println!("   Location: {}", item.location);
    println!("   Author:   {} ({})", item.author_name, item.author_id);
    println!("   Date:     {}", item.created_date);
    println!("   Image:    {}", item.image_url);
    println!();
    println!("{}", item.content);
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

pub fn init_logging(debug: bool, verbose: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(&logging.level)
            .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", logging.level, e)))?
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug);

    let result = if logging.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized");
    Ok(())
}

/// Resolve the configuration file path
pub fn get_config_file(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => Config::default_path(),
    }
}

pub fn load_config(config_file: &Path) -> Result<Config> {
    let config = Config::load_or_default(config_file)?;
    debug!("Loaded configuration from {}", config_file.display());
    Ok(config)
}
