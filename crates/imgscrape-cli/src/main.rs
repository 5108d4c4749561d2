mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use tracing_subscriber::{filter::LevelFilter, fmt};

use cli::Cli;
use imgscrape_core::{
    CredentialStore, Credentials, FsDownloader, RunStatus, ScrapeController, ScrapeError,
    SearchClient,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(determine_log_level(cli.verbose));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            match err.downcast_ref::<ScrapeError>() {
                Some(ScrapeError::InvalidRequest(_)) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn determine_log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn init_tracing(level: LevelFilter) {
    let subscriber = fmt().with_max_level(level).with_target(false).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = credential_store();
    let saved = match &store {
        Some(store) => store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable saved credentials");
            None
        }),
        None => None,
    };
    let credentials = merge_credentials(cli.api_key, cli.engine_id, saved);

    if cli.save_credentials {
        let store = store.context("no config directory available for saving credentials")?;
        if !save_if_complete(&store, &credentials)? {
            tracing::warn!("not saving incomplete credentials");
        }
    }

    let fetcher = SearchClient::new()?;
    let downloader = FsDownloader::new(&cli.out)?;
    let mut controller = ScrapeController::new(fetcher, downloader);
    controller.set_progress(|p| {
        println!("Downloaded image {}/{} -> {}", p.ordinal, p.total_requested, p.path.display());
    });

    let cancel = controller.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Stopping after the current page...");
            cancel.cancel();
        }
    });

    let result = controller.start(&cli.query, cli.count, &credentials).await;
    let report = match result {
        Ok(report) => report,
        Err(err @ ScrapeError::Download { .. }) => {
            return Err(err).with_context(|| {
                format!(
                    "stopped after {} images in {}",
                    controller.artifacts().len(),
                    cli.out.display()
                )
            });
        }
        Err(err) => return Err(err.into()),
    };

    match report.status {
        RunStatus::Completed => println!("Scraping completed!"),
        RunStatus::Exhausted => println!("No more images found."),
        RunStatus::Cancelled => println!("Cancelled."),
        status => tracing::debug!(?status, "unexpected final status"),
    }
    println!(
        "{} of {} images saved to {}",
        report.state.total_downloaded,
        report.state.total_requested,
        cli.out.display()
    );
    Ok(())
}

fn credential_store() -> Option<CredentialStore> {
    ProjectDirs::from("dev", "imgscrape", "imgscrape").map(|dirs| CredentialStore::in_dir(dirs.config_dir()))
}

/// Persist `credentials` only when both fields are set.
fn save_if_complete(store: &CredentialStore, credentials: &Credentials) -> Result<bool> {
    if !credentials.is_complete() {
        return Ok(false);
    }
    store.save(credentials)?;
    tracing::info!(path = %store.path().display(), "saved credentials");
    Ok(true)
}

/// Flags win over saved values, field by field.
fn merge_credentials(
    api_key: Option<String>,
    engine_id: Option<String>,
    saved: Option<Credentials>,
) -> Credentials {
    let saved = saved.unwrap_or_else(|| Credentials::new("", ""));
    Credentials::new(
        api_key.unwrap_or(saved.api_key),
        engine_id.unwrap_or(saved.search_engine_id),
    )
}
