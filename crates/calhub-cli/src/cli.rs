use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use calhub_calendar::{Calendar, GetCalendars, PageParams, Request, SqliteCalendarStore};
use calhub_core::Config;
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "Get one calendar by ID, or a page of calendars", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Calendar to fetch; incompatible with --from/--size
    #[arg(long)]
    id: Option<String>,

    /// Offset of the first calendar in the page
    #[arg(long, allow_negative_numbers = true)]
    from: Option<i64>,

    /// Maximum number of calendars in the page
    #[arg(long, allow_negative_numbers = true)]
    size: Option<i64>,

    /// JSON file holding an array of calendars to store before the request
    #[arg(long)]
    import: Option<PathBuf>,
}

impl Cli {
    /// Build the request; page params are only set when --from or --size is given.
    fn request(&self) -> Result<Request> {
        let mut request = Request::new();
        if let Some(id) = &self.id {
            request.set_calendar_id(id.clone());
        }
        if self.from.is_some() || self.size.is_some() {
            let page = match PageParams::new(
                self.from.unwrap_or(i64::from(PageParams::DEFAULT_FROM)),
                self.size.unwrap_or(i64::from(PageParams::DEFAULT_SIZE)),
            ) {
                Ok(page) => page,
                // With --id set the conflict is what gets reported, whatever the numbers.
                Err(_) if request.calendar_id().is_some() => PageParams::default_params(),
                Err(e) => return Err(e.into()),
            };
            request.set_page_params(page);
        }
        Ok(request)
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let (config, validation) = Config::load_validated(cli.config.as_deref())?;
    calhub_core::init(config.log_filter())?;
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let store = open_store(&config)?;

    if let Some(path) = &cli.import {
        import_calendars(&store, path).await?;
    }

    let request = cli.request()?;
    let dispatcher = GetCalendars::new(Arc::new(store));

    let response = match dispatcher.handle(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(status = e.status_code(), "Get calendars failed: {}", e);
            anyhow::bail!(e.user_message());
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn open_store(config: &Config) -> Result<SqliteCalendarStore> {
    let path = &config.storage.database_path;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create data directory")?;
    }

    tracing::debug!("Opening calendar store at {}", path.display());
    SqliteCalendarStore::new(path, Duration::from_millis(config.storage.busy_timeout_ms))
        .with_context(|| format!("Failed to open calendar store at {}", path.display()))
}

async fn import_calendars(store: &SqliteCalendarStore, path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let calendars: Vec<Calendar> =
        serde_json::from_str(&contents).context("Failed to parse calendars file")?;

    let total = calendars.len();
    for calendar in calendars {
        store.put_calendar(calendar).await?;
    }

    tracing::info!("Imported {} calendars from {}", total, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_no_flags_lists_default_page() {
        let cli = Cli::parse_from(["calhub"]);
        assert_eq!(cli.request().unwrap(), Request::new());
    }

    #[test]
    fn test_size_only_uses_default_from() {
        let cli = Cli::parse_from(["calhub", "--size", "5"]);
        let request = cli.request().unwrap();
        assert_eq!(request.page_params(), Some(PageParams::new(0, 5).unwrap()));
    }

    #[test]
    fn test_negative_from_is_rejected() {
        let cli = Cli::parse_from(["calhub", "--from", "-1"]);
        assert!(cli.request().is_err());
    }

    #[test]
    fn test_id_with_bad_page_reports_conflict() {
        let cli = Cli::parse_from(["calhub", "--id", "holidays", "--from", "-1"]);
        let request = cli.request().unwrap();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("incompatible with [calendar_id]"));
    }

    #[test]
    fn test_id_and_page_both_reach_validation() {
        let cli = Cli::parse_from(["calhub", "--id", "holidays", "--from", "10"]);
        let request = cli.request().unwrap();
        assert!(request.validate().is_err());
    }
}
